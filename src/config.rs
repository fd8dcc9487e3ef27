//! Gallery configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a `config.toml` at the media root overrides any subset of
//! them.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! mount = "/api/i"           # URL prefix for every MediaItem.url
//! manifest = "images.json"   # Manifest file name, written at the media root
//!
//! [index]
//! extensions = ["jpg", "jpeg", "png", "gif", "webp", "svg", "bmp", "ico", "avif"]
//! exclude_dirs = ["cache", "gallery-meow"]
//! exclude_files = ["favicon.ico", "index.html"]
//!
//! [lazy_load]
//! root_margin_px = 50        # Start loading this far outside the viewport
//! threshold = 0.1            # Fraction of the image that must be inside
//!
//! [schedule]
//! interval_secs = 5          # Period of the `watch` command
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Gallery configuration loaded from `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// URL prefix the gallery fetches media from.
    pub mount: String,
    /// File name of the manifest inside the media root.
    pub manifest: String,
    /// What the index builder picks up and what it skips.
    pub index: IndexConfig,
    /// Viewport watcher tuning for deferred image loading.
    pub lazy_load: LazyLoadConfig,
    /// Rebuild period for `watch`.
    pub schedule: ScheduleConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            mount: "/api/i".to_string(),
            manifest: "images.json".to_string(),
            index: IndexConfig::default(),
            lazy_load: LazyLoadConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.mount.starts_with('/') {
            return Err(ConfigError::Validation(
                "mount must start with '/'".into(),
            ));
        }
        if self.manifest.is_empty() || self.manifest.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "manifest must be a bare file name".into(),
            ));
        }
        if self.index.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "index.extensions must not be empty".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.lazy_load.threshold) {
            return Err(ConfigError::Validation(
                "lazy_load.threshold must be 0.0-1.0".into(),
            ));
        }
        if self.schedule.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "schedule.interval_secs must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Case-insensitive membership test against the extension allow-list.
    pub fn allows_extension(&self, ext: &str) -> bool {
        self.index
            .extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    }
}

/// Index builder inclusion rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    /// File extensions (without dot) that count as media.
    pub extensions: Vec<String>,
    /// Directory names skipped wherever they appear in the tree.
    pub exclude_dirs: Vec<String>,
    /// File names skipped wherever they appear in the tree.
    pub exclude_files: Vec<String>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            extensions: ["jpg", "jpeg", "png", "gif", "webp", "svg", "bmp", "ico", "avif"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exclude_dirs: vec!["cache".to_string(), "gallery-meow".to_string()],
            exclude_files: vec!["favicon.ico".to_string(), "index.html".to_string()],
        }
    }
}

/// Deferred image loading settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LazyLoadConfig {
    /// Vertical margin added above and below the viewport, in pixels.
    pub root_margin_px: u32,
    /// Minimum visible fraction of an image before it loads.
    pub threshold: f32,
}

impl Default for LazyLoadConfig {
    fn default() -> Self {
        Self {
            root_margin_px: 50,
            threshold: 0.1,
        }
    }
}

/// Periodic rebuild settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScheduleConfig {
    pub interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { interval_secs: 5 }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Stock defaults as a TOML table: the layer a media root's `config.toml`
/// is laid over.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(GalleryConfig::default()).expect("default config must serialize")
}

/// Lay `user` over `base`.
///
/// Sections (`[index]`, `[lazy_load]`, `[schedule]`) merge key by key, so a
/// file can change one field of a section and keep the rest. Any other value,
/// arrays included, replaces the default outright: setting
/// `index.extensions` lists the full allow-list.
pub fn merge_toml(base: toml::Value, user: toml::Value) -> toml::Value {
    match (base, user) {
        (toml::Value::Table(defaults), toml::Value::Table(user)) => {
            toml::Value::Table(user.into_iter().fold(defaults, |mut table, (key, value)| {
                let value = match table.remove(&key) {
                    Some(default) => merge_toml(default, value),
                    None => value,
                };
                table.insert(key, value);
                table
            }))
        }
        (_, user) => user,
    }
}

/// Parse a `config.toml` body over the stock defaults and validate it.
///
/// Unknown keys fail deserialization.
pub fn parse_config(content: &str) -> Result<GalleryConfig, ConfigError> {
    let user: toml::Value = toml::from_str(content)?;
    let config: GalleryConfig = merge_toml(stock_defaults_value(), user).try_into()?;
    config.validate()?;
    Ok(config)
}

/// Config for the media root: `<root>/config.toml` over the stock defaults,
/// or the defaults alone when there is no such file.
pub fn load_config(root: &Path) -> Result<GalleryConfig, ConfigError> {
    let path = root.join("config.toml");
    if !path.is_file() {
        return Ok(GalleryConfig::default());
    }
    parse_config(&fs::read_to_string(&path)?)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Timeline Gal Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Place this file at the media root.
# Unknown keys will cause an error.

# URL prefix every manifest entry is addressed under:
#   <mount>/<YYYY>/<MM>/<DD>/<filename>
mount = "/api/i"

# Manifest file name, written at the media root and skipped by the indexer.
manifest = "images.json"

# ---------------------------------------------------------------------------
# Indexing
# ---------------------------------------------------------------------------
[index]
# Extensions (case-insensitive, no dot) that count as media.
extensions = ["jpg", "jpeg", "png", "gif", "webp", "svg", "bmp", "ico", "avif"]

# Directory names skipped anywhere in the tree.
exclude_dirs = ["cache", "gallery-meow"]

# File names skipped anywhere in the tree.
exclude_files = ["favicon.ico", "index.html"]

# ---------------------------------------------------------------------------
# Lazy loading
# ---------------------------------------------------------------------------
[lazy_load]
# Images start loading this many pixels before they scroll into view.
root_margin_px = 50

# Fraction of an image (0.0-1.0) that must be inside the margin.
threshold = 0.1

# ---------------------------------------------------------------------------
# Watch
# ---------------------------------------------------------------------------
[schedule]
# Seconds between rebuilds when running `timeline-gal watch`.
interval_secs = 5
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = GalleryConfig::default();
        assert_eq!(config.mount, "/api/i");
        assert_eq!(config.manifest, "images.json");
        assert_eq!(config.index.extensions.len(), 9);
        assert_eq!(config.lazy_load.root_margin_px, 50);
        assert_eq!(config.schedule.interval_secs, 5);
    }

    #[test]
    fn allows_extension_ignores_case() {
        let config = GalleryConfig::default();
        assert!(config.allows_extension("JPG"));
        assert!(config.allows_extension("avif"));
        assert!(!config.allows_extension("txt"));
        assert!(!config.allows_extension("json"));
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
mount = "/media"

[lazy_load]
root_margin_px = 200
"#;
        let config: GalleryConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.mount, "/media");
        assert_eq!(config.lazy_load.root_margin_px, 200);
        // Defaults preserved
        assert_eq!(config.lazy_load.threshold, 0.1);
        assert_eq!(config.manifest, "images.json");
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config, GalleryConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[index]
exclude_dirs = ["thumbs"]
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.index.exclude_dirs, vec!["thumbs"]);
        // Sibling keys keep their defaults
        assert_eq!(config.index.exclude_files, vec!["favicon.ico", "index.html"]);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[lazy_load]
threshold = 1.5
"#,
        )
        .unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn parse_config_keeps_unset_section_fields() {
        let config = parse_config("[schedule]\ninterval_secs = 60\n").unwrap();
        assert_eq!(config.schedule.interval_secs, 60);
        assert_eq!(config.lazy_load, LazyLoadConfig::default());
        assert_eq!(config.mount, "/api/i");
    }

    #[test]
    fn parse_config_rejects_unknown_keys_after_merge() {
        let result = parse_config("mout = \"/x\"\n");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"mount = "/api/i""#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"mount = "/m""#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("mount").unwrap().as_str(), Some("/m"));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[lazy_load]
root_margin_px = 50
threshold = 0.1
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[lazy_load]
root_margin_px = 10
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let lazy = merged.get("lazy_load").unwrap();
        assert_eq!(lazy.get("root_margin_px").unwrap().as_integer(), Some(10));
        assert_eq!(lazy.get("threshold").unwrap().as_float(), Some(0.1));
    }

    #[test]
    fn merge_toml_arrays_replace() {
        let base: toml::Value = toml::from_str(r#"extensions = ["jpg", "png"]"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"extensions = ["heic"]"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("extensions").unwrap().as_array().unwrap().len(), 1);
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[index]
extentions = ["jpg"]
"#;
        let result: Result<GalleryConfig, _> = toml::from_str(toml_str);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<GalleryConfig, _> = toml::from_str("[indx]\nextensions = []\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(GalleryConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_mount_needs_leading_slash() {
        let config = GalleryConfig {
            mount: "api/i".to_string(),
            ..GalleryConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("mount"));
    }

    #[test]
    fn validate_manifest_is_bare_name() {
        let config = GalleryConfig {
            manifest: "nested/images.json".to_string(),
            ..GalleryConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_extensions_not_empty() {
        let mut config = GalleryConfig::default();
        config.index.extensions.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_threshold_boundaries() {
        let mut config = GalleryConfig::default();
        config.lazy_load.threshold = 0.0;
        assert!(config.validate().is_ok());
        config.lazy_load.threshold = 1.0;
        assert!(config.validate().is_ok());
        config.lazy_load.threshold = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_interval_non_zero() {
        let mut config = GalleryConfig::default();
        config.schedule.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // stock config tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: GalleryConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, GalleryConfig::default());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        assert!(content.contains("[index]"));
        assert!(content.contains("[lazy_load]"));
        assert!(content.contains("[schedule]"));
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        assert!(val.is_table());
        assert!(val.get("index").is_some());
        assert!(val.get("lazy_load").is_some());
        assert!(val.get("schedule").is_some());
    }
}
