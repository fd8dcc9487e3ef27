//! Year/month timeline grouping and markup.
//!
//! [`build`] is a pure function of the visible subset, the expansion state
//! and a render generation. Calling it again always yields a complete new
//! view; nothing is patched in place, so it is safe to call from inside any
//! event handler.
//!
//! ```text
//! 2024 (3 photos) ▼          ← header, toggles expansion
//!     June (2)               ← months only when the year is expanded
//!         beach.jpg
//!         Cat-Nap.png
//!     January (1)
//!         snow.webp
//! 2023 (2 photos) ▶          ← collapsed: count only
//! ```

use super::bindings::{Action, Bindings, NodeId};
use super::lazy::{LoadState, render_placeholder};
use crate::types::MediaItem;
use maud::{Markup, html};
use std::collections::{BTreeMap, BTreeSet};

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Display name for a two-digit month key.
pub fn month_name(month: &str) -> String {
    month
        .parse::<usize>()
        .ok()
        .and_then(|m| m.checked_sub(1))
        .and_then(|idx| MONTH_NAMES.get(idx))
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("Month {month}"))
}

/// Which year groups are open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    years: BTreeSet<String>,
}

impl ExpansionState {
    /// Initial state: only the most recent year is open.
    pub fn with_latest(latest: Option<&str>) -> Self {
        Self {
            years: latest.map(str::to_string).into_iter().collect(),
        }
    }

    pub fn is_expanded(&self, year: &str) -> bool {
        self.years.contains(year)
    }

    /// Flip `year` and return whether it is now expanded.
    pub fn toggle(&mut self, year: &str) -> bool {
        if self.years.remove(year) {
            false
        } else {
            self.years.insert(year.to_string());
            true
        }
    }

    pub fn expand_all<'a>(&mut self, years: impl IntoIterator<Item = &'a str>) {
        self.years.extend(years.into_iter().map(str::to_string));
    }

    pub fn years(&self) -> impl Iterator<Item = &str> {
        self.years.iter().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub node: NodeId,
    /// Position in the visible subset; what the viewer opens at
    pub index: usize,
    pub item: MediaItem,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGroup {
    pub month: String,
    pub name: String,
    pub entries: Vec<TimelineEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearGroup {
    pub year: String,
    /// Items in this year, whether or not it is expanded
    pub count: usize,
    pub expanded: bool,
    pub header: NodeId,
    /// Empty when collapsed
    pub months: Vec<MonthGroup>,
}

/// One complete render of the timeline.
#[derive(Debug, Clone)]
pub struct TimelineView {
    pub years: Vec<YearGroup>,
    pub bindings: Bindings,
}

/// Group `visible` by year then month, newest first at both levels.
///
/// Items keep the order they have in `visible` within their month.
pub fn build(visible: &[MediaItem], expansion: &ExpansionState, generation: u64) -> TimelineView {
    let mut grouped: BTreeMap<&str, BTreeMap<&str, Vec<(usize, &MediaItem)>>> = BTreeMap::new();
    for (index, item) in visible.iter().enumerate() {
        grouped
            .entry(item.year.as_str())
            .or_default()
            .entry(item.month.as_str())
            .or_default()
            .push((index, item));
    }

    let mut bindings = Bindings::new(generation);
    let mut years = Vec::with_capacity(grouped.len());
    for (year, by_month) in grouped.into_iter().rev() {
        let count = by_month.values().map(Vec::len).sum();
        let expanded = expansion.is_expanded(year);
        let header = bindings.bind(Action::ToggleYear(year.to_string()));

        let mut months = Vec::new();
        if expanded {
            for (month, items) in by_month.into_iter().rev() {
                let entries = items
                    .into_iter()
                    .map(|(index, item)| TimelineEntry {
                        node: bindings.bind(Action::OpenViewer(index)),
                        index,
                        item: item.clone(),
                    })
                    .collect();
                months.push(MonthGroup {
                    month: month.to_string(),
                    name: month_name(month),
                    entries,
                });
            }
        }

        years.push(YearGroup {
            year: year.to_string(),
            count,
            expanded,
            header,
            months,
        });
    }

    TimelineView { years, bindings }
}

impl TimelineView {
    /// True when the visible subset was empty.
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.bindings.generation()
    }

    /// Every rendered card, top to bottom.
    pub fn entries(&self) -> impl Iterator<Item = &TimelineEntry> {
        self.years
            .iter()
            .flat_map(|y| &y.months)
            .flat_map(|m| &m.entries)
    }

    pub fn render(&self) -> Markup {
        html! {
            div id="timeline" data-generation=(self.generation()) {
                @if self.is_empty() {
                    div.timeline-empty { "No matching images" }
                } @else {
                    @for group in &self.years {
                        (render_year(group))
                    }
                }
            }
        }
    }
}

/// Last two digits of the year, shown in the timeline gutter.
fn year_marker(year: &str) -> &str {
    year.get(year.len().saturating_sub(2)..).unwrap_or(year)
}

fn render_year(group: &YearGroup) -> Markup {
    html! {
        div.timeline-year data-year=(group.year) {
            div.timeline-year-marker { (year_marker(&group.year)) }
            div.timeline-year-header id=(group.header) data-node=(group.header) {
                h2 { (group.year) }
                span.count { (group.count) " photos" }
                span.toggle-icon {
                    @if group.expanded { "▼" } @else { "▶" }
                }
            }
            @for month in &group.months {
                div.month-group data-month=(month.month) {
                    div.month-header {
                        span.icon { "📆" }
                        span { (month.name) }
                        span.month-count { "(" (month.entries.len()) ")" }
                    }
                    div.gallery-masonry {
                        @for entry in &month.entries {
                            (render_card(entry))
                        }
                    }
                }
            }
        }
    }
}

/// An image card. The `img` only carries `data-src`; the lazy loader
/// assigns the real `src` once the card nears the viewport.
fn render_card(entry: &TimelineEntry) -> Markup {
    let item = &entry.item;
    html! {
        div.image-card id=(entry.node) data-node=(entry.node) data-index=(entry.index)
            data-filename=(item.filename) data-date=(item.date) {
            div.wrapper {
                (render_placeholder(LoadState::Pending))
                img.lazy-image data-src=(item.url) alt=(item.filename);
                div.overlay { span.icon { "🔍" } }
            }
            div.info {
                div.filename title=(item.filename) { (item.filename) }
                div.date { (item.date) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    fn scenario() -> Vec<MediaItem> {
        let mut items = vec![
            dated("2023-01-01", "a.jpg"),
            dated("2024-06-15", "b.jpg"),
            dated("2024-01-02", "c.jpg"),
        ];
        crate::types::sort_newest_first(&mut items);
        items
    }

    fn all_expanded(items: &[MediaItem]) -> ExpansionState {
        let mut state = ExpansionState::default();
        state.expand_all(items.iter().map(|i| i.year.as_str()));
        state
    }

    #[test]
    fn years_then_months_descending() {
        let items = scenario();
        let view = build(&items, &all_expanded(&items), 1);

        let years: Vec<&str> = view.years.iter().map(|y| y.year.as_str()).collect();
        assert_eq!(years, vec!["2024", "2023"]);

        let months: Vec<&str> = view.years[0].months.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["06", "01"]);
    }

    #[test]
    fn collapsed_year_keeps_count_but_no_months() {
        let items = sample_items();
        let view = build(&items, &ExpansionState::with_latest(Some("2024")), 1);

        let y2023 = &view.years[1];
        assert_eq!(y2023.year, "2023");
        assert!(!y2023.expanded);
        assert_eq!(y2023.count, 2);
        assert!(y2023.months.is_empty());

        let y2024 = &view.years[0];
        assert!(y2024.expanded);
        assert_eq!(y2024.count, 3);
    }

    #[test]
    fn entries_keep_visible_order_and_index() {
        let items = sample_items();
        let view = build(&items, &all_expanded(&items), 1);

        let indices: Vec<usize> = view.entries().map(|e| e.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        for entry in view.entries() {
            assert_eq!(entry.item, items[entry.index]);
        }
    }

    #[test]
    fn bindings_cover_headers_and_cards() {
        let items = sample_items();
        let view = build(&items, &all_expanded(&items), 7);

        let header = view.years[1].header;
        assert_eq!(
            view.bindings.resolve(header),
            Some(&Action::ToggleYear("2023".to_string()))
        );
        for entry in view.entries() {
            assert_eq!(
                view.bindings.resolve(entry.node),
                Some(&Action::OpenViewer(entry.index))
            );
            assert_eq!(entry.node.generation, 7);
        }
        // two headers + five cards
        assert_eq!(view.bindings.len(), 7);
    }

    #[test]
    fn rebuild_is_a_full_replacement() {
        let items = sample_items();
        let state = ExpansionState::with_latest(Some("2024"));
        let first = build(&items, &state, 3);
        let second = build(&items, &state, 3);
        assert_eq!(first.years, second.years);
    }

    #[test]
    fn empty_subset_is_empty_view() {
        let view = build(&[], &ExpansionState::default(), 1);
        assert!(view.is_empty());
        let html = view.render().into_string();
        assert!(html.contains("No matching images"));
        assert!(!html.contains("timeline-year"));
    }

    #[test]
    fn toggle_is_an_involution() {
        let mut state = ExpansionState::with_latest(Some("2024"));
        let before = state.clone();

        assert!(state.toggle("2023"));
        assert!(!state.toggle("2023"));
        assert_eq!(state, before);

        assert!(!state.toggle("2024"));
        assert!(state.toggle("2024"));
        assert_eq!(state, before);
    }

    #[test]
    fn initial_expansion_is_latest_only() {
        let state = ExpansionState::with_latest(Some("2024"));
        assert_eq!(state.years().collect::<Vec<_>>(), vec!["2024"]);
        assert_eq!(ExpansionState::with_latest(None).years().count(), 0);
    }

    #[test]
    fn month_names() {
        assert_eq!(month_name("01"), "January");
        assert_eq!(month_name("12"), "December");
        assert_eq!(month_name("13"), "Month 13");
        assert_eq!(month_name("00"), "Month 00");
        assert_eq!(month_name("x"), "Month x");
    }

    #[test]
    fn year_marker_is_last_two_digits() {
        assert_eq!(year_marker("2024"), "24");
        assert_eq!(year_marker("7"), "7");
    }

    // =========================================================================
    // Markup
    // =========================================================================

    #[test]
    fn markup_defers_image_source() {
        let items = sample_items();
        let html = build(&items, &all_expanded(&items), 1).render().into_string();

        assert!(html.contains(r#"data-src="/api/i/2024/06/15/beach.jpg""#));
        assert!(!html.contains(r#" src="/api/i"#));
        assert!(html.contains("image-placeholder"));
        assert!(html.contains("overlay"));
    }

    #[test]
    fn markup_headers_show_counts_and_toggle() {
        let items = sample_items();
        let html = build(&items, &ExpansionState::with_latest(Some("2024")), 1)
            .render()
            .into_string();

        assert!(html.contains("3 photos"));
        assert!(html.contains("2 photos"));
        assert!(html.contains("▼"));
        assert!(html.contains("▶"));
        assert!(html.contains("June"));
        // collapsed year's items are not rendered
        assert!(!html.contains("tree.jpg"));
    }

    #[test]
    fn markup_carries_node_ids() {
        let items = sample_items();
        let view = build(&items, &all_expanded(&items), 4);
        let html = view.render().into_string();

        let first = view.entries().next().unwrap();
        assert!(html.contains(&format!(r#"data-node="{}""#, first.node)));
        assert!(html.contains(r#"data-generation="4""#));
    }

    #[test]
    fn markup_escapes_filenames() {
        let items = vec![dated("2024-01-01", "<b>.jpg")];
        let html = build(&items, &all_expanded(&items), 1).render().into_string();
        assert!(!html.contains("<b>.jpg"));
        assert!(html.contains("&lt;b&gt;.jpg"));
    }
}
