//! Filesystem scanning and manifest generation.
//!
//! Walks the media root, keeps files that look like dated media, and writes
//! them to a single JSON manifest sorted newest first.
//!
//! ## Directory Structure
//!
//! ```text
//! public/api/i/                    # Media root
//! ├── config.toml                  # Gallery configuration (optional)
//! ├── images.json                  # Manifest (output, skipped on scan)
//! ├── favicon.ico                  # Housekeeping (skipped)
//! ├── index.html                   # Landing page (skipped)
//! ├── cache/                       # Auxiliary directory (skipped)
//! ├── gallery-meow/                # Gallery assets (skipped)
//! ├── 2024/
//! │   ├── 3/5/cat.jpg              # → 2024-03-05
//! │   └── 03/05/dog.png            # → 2024-03-05
//! └── phone/2023/12/24/tree.jpg    # Prefixes before the year are fine
//! ```
//!
//! ## Failure Model
//!
//! Only persisting the manifest can fail a build. Unreadable entries, wrong
//! extensions and paths that don't parse are counted in [`ScanStats`] and
//! logged, never propagated. Re-running against an unchanged tree produces a
//! byte-identical manifest: the walk is ordered by file name and the date
//! sort is stable.

use crate::config::{self, GalleryConfig};
use crate::naming::parse_media_path;
use crate::types::Manifest;
use log::{debug, info, warn};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Cannot write manifest {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Counters for everything the scan looked at but did not index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Regular files reached by the walk
    pub files_seen: usize,
    /// Manifest, housekeeping and hidden files
    pub excluded: usize,
    /// Files whose extension is not in the allow-list
    pub wrong_extension: usize,
    /// Media files whose path is not `YYYY/M/D/name.ext`
    pub unmatched: usize,
    /// Entries the walk could not read
    pub unreadable: usize,
}

/// Output of [`scan`]: the manifest plus what was left out of it.
#[derive(Debug)]
pub struct ScanResult {
    pub manifest: Manifest,
    pub stats: ScanStats,
}

/// Default manifest location for a media root.
pub fn manifest_path(root: &Path, config: &GalleryConfig) -> PathBuf {
    root.join(&config.manifest)
}

/// Walk `root` and collect every dated media file into a sorted manifest.
pub fn scan(root: &Path, config: &GalleryConfig) -> ScanResult {
    let mut items = Vec::new();
    let mut stats = ScanStats::default();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e, config));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable entry: {err}");
                stats.unreadable += 1;
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        stats.files_seen += 1;

        let name = entry.file_name().to_string_lossy();
        if is_excluded_file(&name, config) {
            debug!("Excluded {}", entry.path().display());
            stats.excluded += 1;
            continue;
        }

        let ext = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        if !config.allows_extension(ext) {
            stats.wrong_extension += 1;
            continue;
        }

        let Some(rel) = entry.path().strip_prefix(root).ok().and_then(|p| p.to_str()) else {
            debug!("Non UTF-8 path {}", entry.path().display());
            stats.unmatched += 1;
            continue;
        };
        match parse_media_path(rel, &config.mount) {
            Some(item) => items.push(item),
            None => {
                debug!("Path does not match YYYY/M/D/name.ext: {rel}");
                stats.unmatched += 1;
            }
        }
    }

    let manifest = Manifest::from_items(items);
    info!(
        "Indexed {} of {} files under {}",
        manifest.len(),
        stats.files_seen,
        root.display()
    );
    ScanResult { manifest, stats }
}

/// Serialize the manifest and replace `path` with it.
///
/// The JSON goes to a temp file in the same directory first and is renamed
/// over the target, so readers never observe a half-written manifest.
pub fn write_manifest(manifest: &Manifest, path: &Path) -> Result<(), ScanError> {
    let json = serde_json::to_string_pretty(manifest)?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let write_err = |source| ScanError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(json.as_bytes()).map_err(write_err)?;
    // Temp files are created 0600; the manifest is served to browsers.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .map_err(write_err)?;
    }
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// Scan `root` and write the manifest to `output` (or the default location).
pub fn build_index(
    root: &Path,
    output: Option<&Path>,
    config: &GalleryConfig,
) -> Result<ScanResult, ScanError> {
    let result = scan(root, config);
    let target = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| manifest_path(root, config));
    write_manifest(&result.manifest, &target)?;
    info!("Wrote {} items to {}", result.manifest.len(), target.display());
    Ok(result)
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn is_skipped_dir(entry: &DirEntry, config: &GalleryConfig) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    is_hidden(&name) || config.index.exclude_dirs.iter().any(|d| *d == name)
}

fn is_excluded_file(name: &str, config: &GalleryConfig) -> bool {
    is_hidden(name)
        || name == config.manifest
        || config.index.exclude_files.iter().any(|f| f == name)
}
