//! Shared test utilities for the timeline-gal test suite.
//!
//! Provides item constructors, a throwaway media tree builder, and bulk
//! extractors for asserting on item order.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = media_tree(&["2024/3/5/cat.jpg", "2023/1/1/dog.png"]);
//! let result = scan(tmp.path(), &GalleryConfig::default());
//! assert_eq!(filenames(&result.manifest.items), vec!["cat.jpg", "dog.png"]);
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::types::MediaItem;

// =========================================================================
// Item constructors
// =========================================================================

/// Build an item the way the path parser would under the default mount.
pub fn item(year: &str, month: &str, day: &str, filename: &str) -> MediaItem {
    MediaItem {
        url: format!("/api/i/{year}/{month}/{day}/{filename}"),
        filename: filename.to_string(),
        year: year.to_string(),
        month: month.to_string(),
        day: day.to_string(),
        date: format!("{year}-{month}-{day}"),
    }
}

/// Build an item from a `YYYY-MM-DD` date.
pub fn dated(date: &str, filename: &str) -> MediaItem {
    let mut parts = date.split('-');
    let (Some(y), Some(m), Some(d)) = (parts.next(), parts.next(), parts.next()) else {
        panic!("date '{date}' is not YYYY-MM-DD");
    };
    item(y, m, d, filename)
}

/// The scenario set used across gallery tests: two years, three months.
pub fn sample_items() -> Vec<MediaItem> {
    vec![
        dated("2024-06-15", "beach.jpg"),
        dated("2024-06-02", "Cat-Nap.png"),
        dated("2024-01-02", "snow.webp"),
        dated("2023-12-24", "tree.jpg"),
        dated("2023-01-01", "fireworks.gif"),
    ]
}

// =========================================================================
// Fixture setup
// =========================================================================

/// Create a temp media root containing an empty file at each relative path.
pub fn media_tree(paths: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for rel in paths {
        touch(tmp.path(), rel);
    }
    tmp
}

/// Create an empty file (and its parents) under `root`.
pub fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, b"fake image").unwrap();
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All filenames in order.
pub fn filenames(items: &[MediaItem]) -> Vec<&str> {
    items.iter().map(|i| i.filename.as_str()).collect()
}

/// All dates in order.
pub fn dates(items: &[MediaItem]) -> Vec<&str> {
    items.iter().map(|i| i.date.as_str()).collect()
}
