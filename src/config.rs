//! Tool configuration.
//!
//! Configuration is layered: stock defaults are overridden by an optional
//! `brand-assets.toml`, which is in turn overridden by command-line flags.
//! Only *how* assets are produced is configurable; the asset contracts
//! (sizes and byte budgets) are fixed in [`crate::target`].
//!
//! ## Config File Location
//!
//! Passed with `--config <path>`, or picked up from `brand-assets.toml` in the
//! working directory when present.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [backend]
//! kind = "sips"         # "sips" (external tool) or "rust" (built in)
//! program = "sips"      # Executable used by the sips backend
//!
//! [workspace]
//! # parent = "/tmp"     # Where scratch directories go (default: OS temp dir)
//!
//! [output]
//! keep_invalid = false  # Leave an output that failed validation on disk
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::pipeline::PipelineOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "brand-assets.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Full configuration. Every field has a default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    /// Which image backend does the pixel work.
    pub backend: BackendConfig,
    /// Scratch directory placement.
    pub workspace: WorkspaceConfig,
    /// Handling of finished outputs.
    pub output: OutputConfig,
}

impl AssetsConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.program.trim().is_empty() {
            return Err(ConfigError::Validation(
                "backend.program must not be empty".into(),
            ));
        }
        match &self.workspace.parent {
            Some(parent) if !parent.is_dir() => Err(ConfigError::Validation(format!(
                "workspace.parent {} is not a directory",
                parent.display()
            ))),
            _ => Ok(()),
        }
    }

    /// Options handed to each pipeline run.
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            workspace_parent: self.workspace.parent.clone(),
            keep_invalid_output: self.output.keep_invalid,
        }
    }
}

/// Image backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Shell out to the platform image tool.
    #[default]
    Sips,
    /// Decode, crop and encode in-process with the `image` crate.
    Rust,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    pub kind: BackendKind,
    /// Executable name or path for the sips backend.
    pub program: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Sips,
            program: "sips".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkspaceConfig {
    /// Parent directory for scratch workspaces. `None` = OS temp dir.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Keep an output on disk after it fails validation.
    pub keep_invalid: bool,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer that file and CLI overrides are merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(AssetsConfig::default()).expect("default config must serialize")
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

/// Read a config file as a raw TOML value.
///
/// With `explicit = false` a missing file is `Ok(None)`; with `explicit = true`
/// (the user named it) a missing file is an error.
pub fn load_raw_config(path: &Path, explicit: bool) -> Result<Option<toml::Value>, ConfigError> {
    if !explicit && !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Overlay that sets `backend.program`, for the `--tool` flag.
pub fn program_override(program: &Path) -> toml::Value {
    let mut backend = toml::Table::new();
    backend.insert(
        "program".to_string(),
        toml::Value::String(program.to_string_lossy().into_owned()),
    );
    let mut root = toml::Table::new();
    root.insert("backend".to_string(), toml::Value::Table(backend));
    toml::Value::Table(root)
}

/// Merge each layer in order onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(layers: Vec<toml::Value>) -> Result<AssetsConfig, ConfigError> {
    let merged = layers
        .into_iter()
        .fold(stock_defaults_value(), merge_toml);
    let config: AssetsConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective config.
///
/// `path` is the `--config` flag; when absent, [`DEFAULT_CONFIG_FILE`] in the
/// working directory is used if it exists. `cli_overrides` are merged last.
pub fn load_config(
    path: Option<&Path>,
    cli_overrides: Option<toml::Value>,
) -> Result<AssetsConfig, ConfigError> {
    let file = match path {
        Some(p) => load_raw_config(p, true)?,
        None => load_raw_config(Path::new(DEFAULT_CONFIG_FILE), false)?,
    };
    resolve_config(file.into_iter().chain(cli_overrides).collect())
}

/// Returns a fully-commented stock `brand-assets.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# brand-assets configuration
# ==========================
# All options are optional. Values shown are the defaults.
# The asset contracts themselves are fixed:
#   logo.png          1000x1000 PNG
#   social-share.png  1280x640 PNG, strictly under 1,000,000 bytes

[backend]
# "sips" shells out to the platform image tool; "rust" does the crop and
# resize in-process.
kind = "sips"

# Executable used by the sips backend. A bare name is looked up on PATH.
# Overridden by --tool or BRAND_ASSETS_TOOL.
program = "sips"

[workspace]
# Directory in which per-run scratch directories are created.
# Defaults to the OS temp dir.
# parent = "/tmp"

[output]
# When an output is written but then fails validation (wrong size, too many
# bytes), it is deleted. Set to true to leave it in place for inspection.
keep_invalid = false
"##
}
