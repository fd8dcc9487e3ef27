//! Manifest loading and aggregate statistics.
//!
//! The stored order of the manifest is never trusted: items are re-sorted
//! newest first on every load.

use crate::types::{MediaItem, sort_newest_first};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Cannot read manifest: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed manifest: {0}")]
    Json(#[from] serde_json::Error),
}

/// Totals shown above the timeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    /// Distinct years
    pub years: usize,
    /// Distinct year-month pairs
    pub months: usize,
}

impl Stats {
    pub fn of(items: &[MediaItem]) -> Self {
        let years: HashSet<&str> = items.iter().map(|i| i.year.as_str()).collect();
        let months: HashSet<String> = items.iter().map(MediaItem::year_month).collect();
        Self {
            total: items.len(),
            years: years.len(),
            months: months.len(),
        }
    }
}

/// A successfully loaded manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// Every item, newest first
    pub items: Vec<MediaItem>,
    pub stats: Stats,
    /// Greatest year present; expanded by default
    pub latest_year: Option<String>,
}

impl Catalog {
    pub fn from_items(mut items: Vec<MediaItem>) -> Self {
        sort_newest_first(&mut items);
        let stats = Stats::of(&items);
        let latest_year = items.iter().map(|i| &i.year).max().cloned();
        Self {
            items,
            stats,
            latest_year,
        }
    }
}

/// Parse manifest JSON.
pub fn parse_manifest(json: &str) -> Result<Catalog, LoadError> {
    let items: Vec<MediaItem> = serde_json::from_str(json)?;
    Ok(Catalog::from_items(items))
}

/// Read and parse the manifest at `path`.
pub fn load_manifest(path: &Path) -> Result<Catalog, LoadError> {
    let content = fs::read_to_string(path)?;
    parse_manifest(&content)
}
