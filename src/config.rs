//! Export configuration module.
//!
//! Handles loading, validating, and merging `config.toml` files. Values are
//! layered: stock defaults, then a `config.toml` shipped inside the template
//! pack, then a file passed on the command line.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [images]
//! jpeg_quality = 90          # JPEG quality for photographic artwork (1-100)
//!
//! [templates]
//! block_match = "first"      # "first" or "last" occurrence of a repeated block
//!
//! [export]
//! sections = ["movies", "tvshows", "concerts"]
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse: override just the values you want:
//!
//! ```toml
//! [export]
//! sections = ["movies"]
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::Quality;
use crate::template::BlockMatch;
use crate::types::Section;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Export configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Artwork encoding settings.
    pub images: ImagesConfig,
    /// Template interpretation settings.
    pub templates: TemplatesConfig,
    /// Which sections a run exports.
    pub export: SectionsConfig,
}

impl ExportConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.images.jpeg_quality) {
            return Err(ConfigError::Validation(
                "images.jpeg_quality must be 1-100".into(),
            ));
        }
        if self.export.sections.is_empty() {
            return Err(ConfigError::Validation(
                "export.sections must not be empty".into(),
            ));
        }
        if let Some(item) = self.export.sections.iter().find(|s| !s.is_list()) {
            return Err(ConfigError::Validation(format!(
                "export.sections accepts movies, tvshows or concerts, not {item}"
            )));
        }
        Ok(())
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.images.jpeg_quality)
    }
}

/// Artwork encoding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// JPEG quality for poster, fanart, banner, disc and thumbnail artwork.
    pub jpeg_quality: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: Quality::default().value(),
        }
    }
}

/// Template interpretation settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplatesConfig {
    /// Which occurrence of a block name is expanded when it repeats.
    pub block_match: BlockMatch,
}

/// Sections exported by a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SectionsConfig {
    pub sections: Vec<Section>,
}

impl Default for SectionsConfig {
    fn default() -> Self {
        Self {
            sections: Section::LISTS.to_vec(),
        }
    }
}

/// Stock defaults as a TOML value, the base layer for merging.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ExportConfig::default()).expect("default config must serialize")
}

/// Deep-merge `overlay` onto `base`. Tables merge key by key; any other
/// value in the overlay replaces the base value.
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

/// Load a TOML file as a raw value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge overlays in order onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(
    overlays: impl IntoIterator<Item = toml::Value>,
) -> Result<ExportConfig, ConfigError> {
    let merged = overlays
        .into_iter()
        .fold(stock_defaults_value(), merge_toml);
    let config: ExportConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective config for an export.
///
/// Layers: stock defaults, `<pack_dir>/config.toml` if present, then
/// `user_config` if given. A `user_config` path that does not exist is an
/// error; a missing pack config is not.
pub fn load_config(pack_dir: &Path, user_config: Option<&Path>) -> Result<ExportConfig, ConfigError> {
    let mut overlays = Vec::new();
    if let Some(pack) = load_raw_config(&pack_dir.join(CONFIG_FILE))? {
        overlays.push(pack);
    }
    if let Some(path) = user_config {
        let content = fs::read_to_string(path)?;
        overlays.push(toml::from_str(&content)?);
    }
    resolve_config(overlays)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Media Export Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Config is read from two places, later overriding earlier:
#   <template pack>/config.toml   -> shipped with the templates
#   --config <file>               -> passed on the command line
#
# Each layer only needs the keys it wants to override.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Artwork
# ---------------------------------------------------------------------------
[images]
# JPEG quality for poster, fanart, banner, disc and thumbnail artwork
# (1 = worst, 100 = best). Other roles are stored as lossless PNG.
jpeg_quality = 90

# ---------------------------------------------------------------------------
# Templates
# ---------------------------------------------------------------------------
[templates]
# When a template repeats a block name, which occurrence is expanded.
# "first" expands the first complete block. "last" reproduces the output of
# older exporters: entity blocks expand their last occurrence, value blocks
# (tags, genres, actors, ...) their first, and every identical copy of the
# expanded block is replaced.
block_match = "first"

# ---------------------------------------------------------------------------
# Export
# ---------------------------------------------------------------------------
[export]
# Sections to export, always processed in the order movies, tvshows, concerts.
sections = ["movies", "tvshows", "concerts"]
"##
}
