//! Configuration module.
//!
//! Handles loading, validating, and merging `derivgen.toml`. Stock defaults
//! are the base layer; the user file only needs the keys it overrides.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [storage]
//! scheme = "public"         # URI scheme of the managed store
//! root = "files"            # Local directory backing public://
//!
//! [index]
//! # path = "file_managed.json"  # JSON export of managed files; omit to walk the store
//!
//! [images]
//! quality = 90              # JPEG quality of derivatives (1-100)
//!
//! [[styles]]
//! name = "thumbnail"
//! label = "Thumbnail (100×100)"
//! effects = [{ kind = "scale", width = 100, height = 100 }]
//! # medium (220×220) and large (480×480) follow
//! ```
//!
//! ## Merging
//!
//! Tables merge key by key, so overriding `images.quality` keeps the stock
//! `[storage]` section. Arrays replace wholesale: a single `[[styles]]` entry
//! in the user file replaces all three stock styles, and its order becomes the
//! processing order.
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Effect, Quality};
use crate::storage::PublicStore;
use crate::style::{Style, StyleRegistry};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "derivgen.toml";

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

/// Configuration loaded from `derivgen.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DerivConfig {
    /// Where originals and derivatives live.
    pub storage: StorageConfig,
    /// Where the managed-file index comes from.
    pub index: IndexConfig,
    /// Derivative encoding settings.
    pub images: ImagesConfig,
    /// Styles in processing order.
    pub styles: Vec<Style>,
}

impl Default for DerivConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            index: IndexConfig::default(),
            images: ImagesConfig::default(),
            styles: stock_styles(),
        }
    }
}

impl DerivConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scheme = &self.storage.scheme;
        if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::Validation(format!(
                "storage.scheme must be non-empty and alphanumeric, got '{scheme}'"
            )));
        }
        if !(1..=100).contains(&self.images.quality) {
            return Err(ConfigError::Validation(
                "images.quality must be 1-100".into(),
            ));
        }

        let mut seen = HashSet::new();
        for style in &self.styles {
            if !is_valid_style_name(&style.name) {
                return Err(ConfigError::Validation(format!(
                    "style name '{}' must be non-empty and use only letters, digits, '_' or '-'",
                    style.name
                )));
            }
            if !seen.insert(style.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "style '{}' is defined more than once",
                    style.name
                )));
            }
            for effect in &style.effects {
                validate_effect(effect).map_err(|msg| {
                    ConfigError::Validation(format!("style '{}': {}", style.name, msg))
                })?;
            }
        }
        Ok(())
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.images.quality)
    }

    pub fn store(&self) -> PublicStore {
        PublicStore::new(self.storage.scheme.clone(), self.storage.root.clone())
    }

    pub fn registry(&self) -> StyleRegistry {
        StyleRegistry::new(self.styles.clone())
    }
}

fn is_valid_style_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Largest side the JPEG and GIF encoders can write.
const MAX_DIMENSION: u32 = 65_535;

fn validate_effect(effect: &Effect) -> Result<(), String> {
    let (width, height) = match *effect {
        Effect::Scale { width, height, .. } => {
            if width.is_none() && height.is_none() {
                return Err("scale needs a width, a height, or both".into());
            }
            (width.unwrap_or(1), height.unwrap_or(1))
        }
        Effect::ScaleAndCrop { width, height }
        | Effect::Resize { width, height }
        | Effect::Crop { width, height, .. } => (width, height),
        Effect::Rotate { .. } | Effect::Desaturate => return Ok(()),
    };
    if width == 0 || height == 0 {
        return Err(format!("{effect} has a zero dimension"));
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(format!("{effect} exceeds the {MAX_DIMENSION}px limit"));
    }
    Ok(())
}

/// Managed store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// URI scheme served by the store, e.g. `public` for `public://…`.
    pub scheme: String,
    /// Local directory backing the scheme.
    pub root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            scheme: "public".to_string(),
            root: PathBuf::from("files"),
        }
    }
}

/// Managed-file index settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    /// JSON export of the managed-file table. When absent the store root is
    /// walked instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Derivative encoding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            quality: Quality::default().value(),
        }
    }
}

fn stock_styles() -> Vec<Style> {
    [("thumbnail", "Thumbnail", 100), ("medium", "Medium", 220), ("large", "Large", 480)]
        .into_iter()
        .map(|(name, label, side)| Style {
            name: name.to_string(),
            label: Some(format!("{label} ({side}×{side})")),
            effects: vec![Effect::Scale {
                width: Some(side),
                height: Some(side),
                upscale: false,
            }],
        })
        .collect()
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(DerivConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay (arrays included) replace base values entirely.
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

/// Load a config file as a raw TOML value.
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

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<DerivConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: DerivConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result. A missing file yields the stock defaults.
pub fn load_config(path: &Path) -> Result<DerivConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    if overlay.is_none() {
        tracing::debug!(path = %path.display(), "no config file, using stock defaults");
    }
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `derivgen.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# derivgen Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Storage
# ---------------------------------------------------------------------------
[storage]
# URI scheme of the managed store. Originals are addressed as
# <scheme>://path/to/file.jpg and derivatives as
# <scheme>://styles/<style>/<scheme>/path/to/file.jpg
scheme = "public"

# Local directory backing the scheme (overridden by --root).
root = "files"

# ---------------------------------------------------------------------------
# File index
# ---------------------------------------------------------------------------
[index]
# JSON export of the managed-file table: an array of
# { fid, filename, uri, filemime } objects (overridden by --index).
# Omit to walk the storage root instead.
# path = "file_managed.json"

# ---------------------------------------------------------------------------
# Derivative encoding
# ---------------------------------------------------------------------------
[images]
# JPEG encoding quality (1 = worst, 100 = best). PNG and GIF are lossless.
quality = 90

# ---------------------------------------------------------------------------
# Styles
# ---------------------------------------------------------------------------
# Styles are processed in the order they appear here. Defining any
# [[styles]] entry replaces the whole stock list.
#
# Effects run in order:
#   { kind = "scale", width = 100, height = 100, upscale = false }
#       Fit inside the box; one side may be omitted.
#   { kind = "scale_and_crop", width = 100, height = 100 }
#       Fill the box, then center-crop to exactly that size.
#   { kind = "resize", width = 100, height = 100 }
#       Exact size, aspect ratio not preserved.
#   { kind = "crop", width = 100, height = 100, anchor_x = "center", anchor_y = "center" }
#       Cut a region without scaling. anchor_x: left|center|right,
#       anchor_y: top|center|bottom.
#   { kind = "rotate", degrees = 90 }
#       Clockwise; 90, 180 or 270.
#   { kind = "desaturate" }
#       Convert to greyscale.

[[styles]]
name = "thumbnail"
label = "Thumbnail (100×100)"
effects = [{ kind = "scale", width = 100, height = 100 }]

[[styles]]
name = "medium"
label = "Medium (220×220)"
effects = [{ kind = "scale", width = 220, height = 220 }]

[[styles]]
name = "large"
label = "Large (480×480)"
effects = [{ kind = "scale", width = 480, height = 480 }]
"##
}
