//! Shared types for the manifest boundary.
//!
//! The index builder serializes these and the gallery engine deserializes
//! them, so both sides agree on the JSON shape by construction.

use serde::{Deserialize, Serialize};

/// One indexed media file.
///
/// All fields are strings because that is what the manifest carries.
/// `month` and `day` are always zero-padded to two digits, which makes
/// `date` (`YYYY-MM-DD`) sort lexicographically in calendar order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Fetch address: `/<mount>/<YYYY>/<MM>/<DD>/<filename>`
    pub url: String,
    /// Base name including extension
    pub filename: String,
    pub year: String,
    pub month: String,
    pub day: String,
    /// Composite sort and grouping key
    pub date: String,
}

impl MediaItem {
    /// `YYYY-MM` key used for the distinct-month statistic.
    pub fn year_month(&self) -> String {
        format!("{}-{}", self.year, self.month)
    }
}

/// The whole manifest: a bare JSON array of [`MediaItem`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    pub items: Vec<MediaItem>,
}

impl Manifest {
    /// Build a manifest, sorting newest first.
    pub fn from_items(mut items: Vec<MediaItem>) -> Self {
        sort_newest_first(&mut items);
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Sort by `date` descending. Stable, so equal dates keep their input order.
pub fn sort_newest_first(items: &mut [MediaItem]) {
    items.sort_by(|a, b| b.date.cmp(&a.date));
}
