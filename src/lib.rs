//! # Timeline Gal
//!
//! A photo timeline for a date-partitioned media directory. Files live at
//! `…/YYYY/M/D/name.ext`; the directory layout *is* the metadata. There is
//! no database and no EXIF parsing: the path says when a photo was taken.
//!
//! # Architecture: Two Halves Around One Manifest
//!
//! ```text
//! 1. Index    media root  →  images.json     (filesystem → JSON array)
//! 2. Gallery  images.json →  timeline view   (filter, group, lazy load, lightbox)
//! ```
//!
//! The manifest is the only thing the two halves share. The indexer writes it
//! wholesale on every run; the gallery never trusts its order and re-sorts on
//! load.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Index builder: walks the media root and writes the manifest atomically |
//! | [`naming`] | `YYYY/M/D/name.ext` path parser shared by the indexer |
//! | [`types`] | `MediaItem` and `Manifest`, the JSON boundary |
//! | [`gallery`] | Gallery engine: state, events, filtering, timeline, lazy loading, viewer |
//! | [`config`] | `config.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting |
//! | [`logger`] | `env_logger` setup for the binary |
//!
//! # Design Decisions
//!
//! ## State In, Markup Out
//!
//! The gallery engine is a plain struct updated by discrete events. Rendering
//! is a pure function of that state and always produces a complete new tree
//! (HTML via [Maud](https://maud.lambda.xyz/)), tagged with a render
//! generation. Click and image-load callbacks that arrive for an older
//! generation are ignored, so a re-render from inside a handler can never act
//! on the wrong item.
//!
//! ## Explicit Visibility Watcher
//!
//! Deferred image loading goes through one watcher the host creates up front
//! and lends to every render. See [`gallery::lazy`].
//!
//! ## Permissive Prefixes, Strict Dates
//!
//! Anything before the year segment is ignored, so `phone/2024/3/5/x.jpg`
//! and `2024/03/05/x.jpg` both index. The date segments themselves are
//! checked: a 4-digit year, month 1–12, day 1–31.

pub mod config;
pub mod gallery;
pub mod logger;
pub mod naming;
pub mod output;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
