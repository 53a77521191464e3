//! Application configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults
//! are the base layer; a `config.toml` in the directory passed with
//! `--config` overrides them key by key.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [limits]
//! max_photos = 8            # Photos per page
//! max_videos = 2            # Videos per page
//! max_video_size_mb = 50    # Per-video size cap, in MiB
//!
//! [render]
//! locale = "tr"             # "tr" or "en": long dates and page lang
//! grid_columns = 3          # Columns of the grid layout
//! sidebar_max_items = 6     # Thumbnails in the sidebar before "+N more"
//! sidebar_bio_chars = 120   # Bio characters in the sidebar
//!
//! [storage]
//! root = "users"            # First path segment of uploaded objects
//!
//! [logging]
//! filter = "memoria=info"   # Used when RUST_LOG is not set
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse, override just the values you want:
//!
//! ```toml
//! [render]
//! locale = "en"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::memory::{MAX_PHOTOS, MAX_VIDEOS, MediaLimits};
use crate::preview::RenderOptions;
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
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Application configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Media caps applied when memories are added.
    pub limits: LimitsConfig,
    /// Projection renderer knobs.
    pub render: RenderOptions,
    /// Object storage layout.
    pub storage: StorageConfig,
    /// Fallback log filter.
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_photos == 0 && self.limits.max_videos == 0 {
            return Err(ConfigError::Validation(
                "limits must allow at least one photo or video".into(),
            ));
        }
        if self.limits.max_video_size_mb == 0 {
            return Err(ConfigError::Validation(
                "limits.max_video_size_mb must be non-zero".into(),
            ));
        }
        if !(1..=6).contains(&self.render.grid_columns) {
            return Err(ConfigError::Validation(
                "render.grid_columns must be 1-6".into(),
            ));
        }
        if self.render.sidebar_bio_chars == 0 {
            return Err(ConfigError::Validation(
                "render.sidebar_bio_chars must be non-zero".into(),
            ));
        }
        let root = self.storage.root.trim_matches('/');
        if root.is_empty() || root.contains("..") {
            return Err(ConfigError::Validation(
                "storage.root must be a non-empty relative path".into(),
            ));
        }
        Ok(())
    }
}

/// Per-page media caps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    pub max_photos: usize,
    pub max_videos: usize,
    /// Per-video size cap in MiB.
    pub max_video_size_mb: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_photos: MAX_PHOTOS,
            max_videos: MAX_VIDEOS,
            max_video_size_mb: 50,
        }
    }
}

impl LimitsConfig {
    pub fn to_media_limits(&self) -> MediaLimits {
        MediaLimits {
            max_photos: self.max_photos,
            max_videos: self.max_videos,
            max_video_size_bytes: self.max_video_size_mb * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub root: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: "users".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "memoria=info".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(AppConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AppConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<AppConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Memoria Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Media limits
# ---------------------------------------------------------------------------
[limits]
# Maximum photos and videos on one page. Checked only when media is added;
# pages already over a lowered limit keep their items.
max_photos = 8
max_videos = 2

# Largest accepted video, in MiB.
max_video_size_mb = 50

# ---------------------------------------------------------------------------
# Rendering
# ---------------------------------------------------------------------------
[render]
# Language of long dates and the page lang attribute: "tr" or "en".
locale = "tr"

# Columns of the grid layout.
grid_columns = 3

# Thumbnails shown in the sidebar preview before "+N more".
sidebar_max_items = 6

# Bio characters shown in the sidebar preview before the ellipsis.
sidebar_bio_chars = 120

# ---------------------------------------------------------------------------
# Object storage
# ---------------------------------------------------------------------------
[storage]
# Uploads go to {root}/{owner}/pages/{page}/{hash}-{file}.
root = "users"

# ---------------------------------------------------------------------------
# Logging
# ---------------------------------------------------------------------------
[logging]
# tracing filter used when RUST_LOG is not set.
filter = "memoria=info"
"##
}
