//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. The file lives in
//! the content root (next to `images/`) and is entirely optional: stock
//! defaults reproduce the conventions the site was built around.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "Notable Work"
//!
//! [probe]
//! max_folder_id = 200                            # Highest folder ID probed
//! max_extras = 10                                # Highest image number inside a folder
//! folder_extensions = ["jpg", "jpeg", "png"]     # Tried for primary + extras
//! fallback_extensions = ["jpg", "jpeg", "png", "webp", "gif"]
//! timeout_ms = 5000                              # Per-probe bound, 0 = unbounded
//!
//! [gallery]
//! items_per_row = 3
//! fallback_tile_width = 300.0                    # Used when no width is measured
//! placeholder_size = [400, 400]
//!
//! [overlay]
//! fade_ms = 600                                  # Matches the CSS transition
//!
//! [home]
//! notable_work = 40                              # Candidate counts per source
//! archive_project = 10
//! narcissus = 6
//! home = 30
//! slots = 8                                      # Background images shown
//!
//! [processing]
//! max_processes = 4                              # Omit for auto = CPU cores
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

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

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub site: SiteSection,
    pub probe: ProbeConfig,
    pub gallery: GalleryConfig,
    pub overlay: OverlayConfig,
    pub home: HomeConfig,
    pub processing: ProcessingConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.probe.max_folder_id == 0 {
            return Err(ConfigError::Validation(
                "probe.max_folder_id must be at least 1".into(),
            ));
        }
        if self.probe.max_extras == 0 {
            return Err(ConfigError::Validation(
                "probe.max_extras must be at least 1".into(),
            ));
        }
        if self.probe.folder_extensions.is_empty() || self.probe.fallback_extensions.is_empty() {
            return Err(ConfigError::Validation(
                "probe extension lists must not be empty".into(),
            ));
        }
        if self.gallery.items_per_row == 0 {
            return Err(ConfigError::Validation(
                "gallery.items_per_row must be non-zero".into(),
            ));
        }
        let width = self.gallery.fallback_tile_width;
        if width.is_nan() || width <= 0.0 {
            return Err(ConfigError::Validation(
                "gallery.fallback_tile_width must be positive".into(),
            ));
        }
        if self.gallery.placeholder_size[0] == 0 || self.gallery.placeholder_size[1] == 0 {
            return Err(ConfigError::Validation(
                "gallery.placeholder_size values must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    /// Page title used by the rendered site.
    pub title: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: "Notable Work".to_string(),
        }
    }
}

/// Probing bounds and extension fallbacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    /// Folder IDs `1..=max_folder_id` are probed during discovery.
    pub max_folder_id: u32,
    /// Images `1..=max_extras` are probed inside an opened folder.
    pub max_extras: u32,
    /// Extensions tried for a folder's numbered images.
    pub folder_extensions: Vec<String>,
    /// Extensions tried for gallery tiles, project images, and home backgrounds.
    pub fallback_extensions: Vec<String>,
    /// Upper bound on a single load attempt. `0` waits indefinitely.
    pub timeout_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            max_folder_id: 200,
            max_extras: 10,
            folder_extensions: ["jpg", "jpeg", "png"].map(String::from).to_vec(),
            fallback_extensions: ["jpg", "jpeg", "png", "webp", "gif"]
                .map(String::from)
                .to_vec(),
            timeout_ms: 5000,
        }
    }
}

/// Gallery grid and row regulation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    pub items_per_row: usize,
    /// Tile width assumed when none has been measured.
    pub fallback_tile_width: f64,
    /// Dimensions recorded for tiles whose image never loaded.
    pub placeholder_size: [u32; 2],
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            items_per_row: 3,
            fallback_tile_width: 300.0,
            placeholder_size: [400, 400],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlayConfig {
    /// Delay between the reveal action and the overlay leaving the layout.
    pub fade_ms: u64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self { fade_ms: 600 }
    }
}

/// How many candidates of each kind feed the home background rotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HomeConfig {
    pub notable_work: u32,
    pub archive_project: u32,
    pub narcissus: u32,
    pub home: u32,
    /// Number of background images placed on the home overlay.
    pub slots: usize,
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            notable_work: 40,
            archive_project: 10,
            narcissus: 6,
            home: 30,
            slots: 8,
        }
    }
}

/// Parallel probing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel probe workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
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

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file doesn't exist.
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
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the content root.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let overlay = load_raw_config(root)?;
    if overlay.is_some() {
        log::info!("loaded {}", root.join("config.toml").display());
    }
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# notable-gal configuration
# ========================
# All settings are optional. Values shown below are the defaults.
# Place this file in the content root, next to images/.
# Unknown keys will cause an error.

[site]
# Title of the rendered gallery page.
title = "Notable Work"

# ---------------------------------------------------------------------------
# Probing
# ---------------------------------------------------------------------------
[probe]
# Folder IDs 1..=max_folder_id are probed when no manifest.json exists.
max_folder_id = 200

# Images 1..=max_extras are probed inside an opened piece.
max_extras = 10

# Extensions tried for a piece folder's numbered images, in order.
folder_extensions = ["jpg", "jpeg", "png"]

# Extensions tried for gallery tiles, project pages, and home backgrounds.
fallback_extensions = ["jpg", "jpeg", "png", "webp", "gif"]

# Upper bound on a single load attempt, in milliseconds.
# A probe that takes longer counts as not found. 0 waits indefinitely.
timeout_ms = 5000

# ---------------------------------------------------------------------------
# Gallery grid
# ---------------------------------------------------------------------------
[gallery]
# Tiles per row; each row is balanced to a common height.
items_per_row = 3

# Tile width (px) assumed when computing row heights.
fallback_tile_width = 300.0

# Dimensions recorded for tiles whose image could not be loaded.
placeholder_size = [400, 400]

# ---------------------------------------------------------------------------
# Intro overlay
# ---------------------------------------------------------------------------
[overlay]
# Fade-out duration; the overlay leaves the layout after this delay.
fade_ms = 600

# ---------------------------------------------------------------------------
# Home background rotation
# ---------------------------------------------------------------------------
[home]
# Candidate counts probed from each source.
notable_work = 40
archive_project = 10
narcissus = 6
home = 30

# Number of background images placed on the overlay.
slots = 8

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel probe workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
