//! Mosaic configuration module.
//!
//! Handles loading, validating, and merging `mosaic.toml` files. Stock
//! defaults are the base layer; a user file only overrides what it names.
//!
//! ## Config File Location
//!
//! `load_config` looks for `mosaic.toml` in a directory (the CLI uses the
//! input image's directory). `load_config_file` takes an explicit path, as
//! passed with `--config`.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [mosaic]
//! preset = "medium"         # small (5) | medium (10) | large (25) | extra-large (40)
//! # block_size = 12         # explicit edge length in pixels, overrides preset (1-512)
//! alpha = "average"         # average | preserve
//!
//! [export]
//! suffix = "_mosaicked"     # inserted before the extension
//! default_name = "mosaic-image"  # used when the source has no filename
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! ```toml
//! # Only switch to coarse blocks
//! [mosaic]
//! preset = "large"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::export::ExportNaming;
use crate::mosaic::{AlphaMode, BlockSize, MAX_BLOCK_SIZE, MIN_BLOCK_SIZE, MosaicParams, Preset};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up by [`load_config`].
pub const CONFIG_FILE_NAME: &str = "mosaic.toml";

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

/// Configuration loaded from `mosaic.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MosaicConfig {
    /// Block size and alpha handling.
    pub mosaic: MosaicSection,
    /// Suggested export filenames.
    pub export: ExportConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl MosaicConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.mosaic.block_size {
            Some(size) if !(MIN_BLOCK_SIZE..=MAX_BLOCK_SIZE).contains(&size) => {
                return Err(ConfigError::Validation(format!(
                    "mosaic.block_size must be {MIN_BLOCK_SIZE}-{MAX_BLOCK_SIZE}, got {size}"
                )));
            }
            _ => {}
        }
        if self.export.default_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "export.default_name must not be empty".into(),
            ));
        }
        if self.export.suffix.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "export.suffix must not contain path separators".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Transform parameters: explicit `block_size` wins over `preset`.
    pub fn params(&self) -> MosaicParams {
        MosaicParams {
            block: self.mosaic.block(),
            alpha: self.mosaic.alpha,
        }
    }

    pub fn naming(&self) -> ExportNaming {
        ExportNaming {
            suffix: self.export.suffix.clone(),
            default_name: self.export.default_name.clone(),
        }
    }
}

/// The `[mosaic]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MosaicSection {
    pub preset: Preset,
    /// Explicit block edge length. When set, `preset` is ignored.
    pub block_size: Option<u32>,
    pub alpha: AlphaMode,
}

impl MosaicSection {
    pub fn block(&self) -> BlockSize {
        match self.block_size {
            Some(size) => BlockSize::new(size),
            None => self.preset.into(),
        }
    }
}

/// The `[export]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub suffix: String,
    pub default_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        let naming = ExportNaming::default();
        Self {
            suffix: naming.suffix,
            default_name: naming.default_name,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of rayon workers used by a transform.
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
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(MosaicConfig::default())?)
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

/// Load `mosaic.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `mosaic.toml`.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        return Ok(None);
    }
    read_toml(&config_path).map(Some)
}

fn read_toml(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<MosaicConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: MosaicConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `mosaic.toml` in the given directory, falling back to
/// stock defaults when the file is absent.
pub fn load_config(dir: &Path) -> Result<MosaicConfig, ConfigError> {
    resolve_config(stock_defaults_value()?, load_raw_config(dir)?)
}

/// Load config from an explicit file. A missing file is an error.
pub fn load_config_file(path: &Path) -> Result<MosaicConfig, ConfigError> {
    resolve_config(stock_defaults_value()?, Some(read_toml(path)?))
}

/// Returns a fully-commented stock `mosaic.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Simple Mosaic Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# mosaic.toml is read from the input image's directory, or from the path
# given with --config. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Pixelation
# ---------------------------------------------------------------------------
[mosaic]
# Named block size: small (5px), medium (10px), large (25px), extra-large (40px).
preset = "medium"

# Explicit block edge length in pixels (1-512). Overrides the preset.
# block_size = 12

# Alpha channel handling inside a block:
#   average  - alpha is averaged like the color channels
#   preserve - each pixel keeps its own alpha
alpha = "average"

# ---------------------------------------------------------------------------
# Export naming
# ---------------------------------------------------------------------------
[export]
# Inserted between the source stem and its extension: photo.jpg -> photo_mosaicked.jpg
suffix = "_mosaicked"

# Stem used when the image has no source filename (pasted images).
default_name = "mosaic-image"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for a transform.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = MosaicConfig::default();
        assert_eq!(config.mosaic.preset, Preset::Medium);
        assert_eq!(config.mosaic.block_size, None);
        assert_eq!(config.mosaic.alpha, AlphaMode::Average);
        assert_eq!(config.export.suffix, "_mosaicked");
        assert_eq!(config.export.default_name, "mosaic-image");
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn default_params_are_medium_average() {
        let params = MosaicConfig::default().params();
        assert_eq!(params.block.value(), 10);
        assert_eq!(params.alpha, AlphaMode::Average);
    }

    #[test]
    fn parse_partial_config() {
        let config: MosaicConfig = toml::from_str(
            r#"
[mosaic]
preset = "extra-large"
"#,
        )
        .unwrap();
        assert_eq!(config.mosaic.preset, Preset::ExtraLarge);
        assert_eq!(config.mosaic.alpha, AlphaMode::Average);
        assert_eq!(config.export.suffix, "_mosaicked");
    }

    #[test]
    fn explicit_block_size_overrides_preset() {
        let config: MosaicConfig = toml::from_str(
            r#"
[mosaic]
preset = "small"
block_size = 17
alpha = "preserve"
"#,
        )
        .unwrap();
        let params = config.params();
        assert_eq!(params.block.value(), 17);
        assert_eq!(params.alpha, AlphaMode::Preserve);
    }

    #[test]
    fn naming_comes_from_export_section() {
        let config: MosaicConfig = toml::from_str(
            r#"
[export]
suffix = "-redacted"
"#,
        )
        .unwrap();
        let naming = config.naming();
        assert_eq!(naming.suffix, "-redacted");
        assert_eq!(naming.default_name, "mosaic-image");
    }

    // =========================================================================
    // Merging
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"alpha = "average""#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"alpha = "preserve""#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("alpha").unwrap().as_str(), Some("preserve"));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[mosaic]
preset = "medium"
alpha = "average"
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[mosaic]
block_size = 8
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let mosaic = merged.get("mosaic").unwrap();
        assert_eq!(mosaic.get("block_size").unwrap().as_integer(), Some(8));
        assert_eq!(mosaic.get("preset").unwrap().as_str(), Some("medium"));
        assert_eq!(mosaic.get("alpha").unwrap().as_str(), Some("average"));
    }

    #[test]
    fn merge_toml_non_table_replaces_table() {
        let base: toml::Value = toml::from_str("[a]\nb = 1").unwrap();
        let overlay: toml::Value = toml::from_str("a = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("a").unwrap().as_integer(), Some(3));
    }

    // =========================================================================
    // Unknown key rejection
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let result: Result<MosaicConfig, _> = toml::from_str(
            r#"
[mosaic]
blocksize = 9
"#,
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<MosaicConfig, _> = toml::from_str("[mosiac]\npreset = \"small\"");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_preset_rejected() {
        let result: Result<MosaicConfig, _> = toml::from_str("[mosaic]\npreset = \"huge\"");
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(MosaicConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_block_size_bounds() {
        let mut config = MosaicConfig::default();
        config.mosaic.block_size = Some(MAX_BLOCK_SIZE);
        assert!(config.validate().is_ok());
        config.mosaic.block_size = Some(0);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
        config.mosaic.block_size = Some(MAX_BLOCK_SIZE + 1);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_export_naming() {
        let mut config = MosaicConfig::default();
        config.export.default_name = "  ".into();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = MosaicConfig::default();
        config.export.suffix = "/../x".into();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_zero_processes() {
        let mut config = MosaicConfig::default();
        config.processing.max_processes = Some(0);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // Loading
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(load_config(tmp.path()).unwrap(), MosaicConfig::default());
        assert!(load_raw_config(tmp.path()).unwrap().is_none());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            r#"
[mosaic]
preset = "large"

[processing]
max_processes = 2
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.mosaic.preset, Preset::Large);
        assert_eq!(config.params().block.value(), 25);
        assert_eq!(config.processing.max_processes, Some(2));
        assert_eq!(config.export, ExportConfig::default());
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), "[mosaic\npreset =").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            "[mosaic]\nblock_size = 1000\n",
        )
        .unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn load_config_file_reads_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        fs::write(&path, "[mosaic]\nalpha = \"preserve\"\n").unwrap();
        let config = load_config_file(&path).unwrap();
        assert_eq!(config.mosaic.alpha, AlphaMode::Preserve);
        assert_eq!(config.mosaic.preset, Preset::Medium);
    }

    #[test]
    fn load_config_file_missing_is_error() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            load_config_file(&tmp.path().join("absent.toml")),
            Err(ConfigError::Io(_))
        ));
    }

    // =========================================================================
    // Processing
    // =========================================================================

    #[test]
    fn effective_threads_auto() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let config = ProcessingConfig {
            max_processes: Some(cores + 64),
        };
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // Stock config
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: MosaicConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, MosaicConfig::default());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        assert!(content.contains("[mosaic]"));
        assert!(content.contains("[export]"));
        assert!(content.contains("[processing]"));
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value().unwrap();
        assert!(val.is_table());
        assert!(val.get("mosaic").is_some());
        assert!(val.get("export").is_some());
        assert!(val.get("processing").is_some());
        assert!(val.get("mosaic").unwrap().get("block_size").is_none());
    }
}
