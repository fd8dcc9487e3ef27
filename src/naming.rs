//! Path parsing for the `YYYY/M/D/filename.ext` layout.
//!
//! Media files live under date directories. Any number of leading segments
//! is allowed; only the last four matter:
//!
//! ```text
//! 2024/3/5/cat.jpg            → year 2024, month 03, day 05
//! uploads/2024/03/05/dog.png  → year 2024, month 03, day 05
//! 2024/3/cat.jpg              → no match (three segments)
//! 2024/03/05/README           → no match (no extension)
//! ```
//!
//! A path that does not fit is not an error. The caller drops it and moves
//! on, so a stray file can never abort an index build.

use crate::types::MediaItem;

/// Parse a path relative to the media root into a [`MediaItem`].
///
/// `mount` is the URL prefix the gallery fetches from (e.g. `/api/i`).
/// Backslash separators are accepted so Windows-relative paths parse the same.
///
/// Rules for the last four segments:
/// - year: exactly four ASCII digits
/// - month: one or two ASCII digits, 1-12
/// - day: one or two ASCII digits, 1-31
/// - filename: `stem.ext` with both parts non-empty
///
/// Returns `None` for anything else.
pub fn parse_media_path(relative: &str, mount: &str) -> Option<MediaItem> {
    let normalized = relative.replace('\\', "/");
    let segments: Vec<&str> = normalized.split('/').collect();
    if segments.len() < 4 {
        return None;
    }
    let &[year, month, day, filename] = &segments[segments.len() - 4..] else {
        return None;
    };

    if year.len() != 4 || !all_digits(year) {
        return None;
    }
    let month = parse_component(month, 12)?;
    let day = parse_component(day, 31)?;
    if !has_extension(filename) {
        return None;
    }

    let month = format!("{month:02}");
    let day = format!("{day:02}");
    Some(MediaItem {
        url: format!(
            "{}/{year}/{month}/{day}/{filename}",
            mount.trim_end_matches('/')
        ),
        filename: filename.to_string(),
        year: year.to_string(),
        date: format!("{year}-{month}-{day}"),
        month,
        day,
    })
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// A one- or two-digit date component within `1..=max`.
fn parse_component(s: &str, max: u32) -> Option<u32> {
    if s.is_empty() || s.len() > 2 || !all_digits(s) {
        return None;
    }
    let value: u32 = s.parse().ok()?;
    (1..=max).contains(&value).then_some(value)
}

fn has_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
}
