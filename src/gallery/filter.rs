//! Filter criteria and the visible subset.
//!
//! Three independent predicates, ANDed together. An unset criterion never
//! excludes anything:
//!
//! - year: exact match on `MediaItem::year`
//! - month: exact match on `MediaItem::month` (options are scoped to the selected year)
//! - search: case-insensitive substring of `MediaItem::filename`

use super::timeline::month_name;
use crate::types::MediaItem;
use maud::{Markup, html};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub year: Option<String>,
    pub month: Option<String>,
    pub search: Option<String>,
}

impl FilterCriteria {
    /// True when no criterion is set.
    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.month.is_none() && self.search.is_none()
    }

    pub fn matches(&self, item: &MediaItem) -> bool {
        if let Some(year) = &self.year
            && item.year != *year
        {
            return false;
        }
        if let Some(month) = &self.month
            && item.month != *month
        {
            return false;
        }
        if let Some(term) = &self.search
            && !item
                .filename
                .to_lowercase()
                .contains(&term.to_lowercase())
        {
            return false;
        }
        true
    }
}

/// Treat an empty select value as "no criterion".
pub fn normalize(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Search terms are compared as typed. Only empty input clears the filter;
/// a lone space is a real term.
pub fn normalize_search(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Items passing every set criterion, in input order.
pub fn apply(items: &[MediaItem], criteria: &FilterCriteria) -> Vec<MediaItem> {
    items
        .iter()
        .filter(|item| criteria.matches(item))
        .cloned()
        .collect()
}

/// Distinct years, newest first.
pub fn year_options(items: &[MediaItem]) -> Vec<String> {
    let years: BTreeSet<&str> = items.iter().map(|i| i.year.as_str()).collect();
    years.into_iter().rev().map(str::to_string).collect()
}

/// Distinct months within `year`, ascending. Empty when no year is selected.
pub fn month_options(items: &[MediaItem], year: Option<&str>) -> Vec<String> {
    let Some(year) = year else {
        return Vec::new();
    };
    let months: BTreeSet<&str> = items
        .iter()
        .filter(|i| i.year == year)
        .map(|i| i.month.as_str())
        .collect();
    months.into_iter().map(str::to_string).collect()
}

/// Year and month selects plus the search box, reflecting `criteria`.
pub fn render_controls(
    years: &[String],
    months: &[String],
    criteria: &FilterCriteria,
) -> Markup {
    let selected_year = criteria.year.as_deref();
    let selected_month = criteria.month.as_deref();
    html! {
        div.filters {
            select id="yearFilter" name="year" {
                option value="" selected[selected_year.is_none()] { "All years" }
                @for year in years {
                    option value=(year) selected[selected_year == Some(year.as_str())] { (year) }
                }
            }
            select id="monthFilter" name="month" disabled[months.is_empty()] {
                option value="" selected[selected_month.is_none()] { "All months" }
                @for month in months {
                    option value=(month) selected[selected_month == Some(month.as_str())] {
                        (month_name(month))
                    }
                }
            }
            input id="searchInput" type="search" name="search" placeholder="Search file names"
                value=[criteria.search.as_deref()];
        }
    }
}
