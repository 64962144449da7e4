use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchConfig {
    #[serde(default)]
    pub import: ImportOptions,
    #[serde(default)]
    pub annotation_format: AnnotationFormat,
}

/// Options for the completion engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Hash class sources that point to readable local files.
    #[serde(default)]
    pub enable_md5_in_class_sources: bool,
}

/// How annotations are rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationFormat {
    pub quote_strings: bool,
    /// Appended to class literals, e.g. `.class`.
    pub class_suffix: String,
    pub array_style: ArrayStyle,
    /// Render `@A(value=1)` as `@A(1)`.
    pub omit_single_value_name: bool,
}

impl Default for AnnotationFormat {
    fn default() -> Self {
        AnnotationFormat {
            quote_strings: true,
            class_suffix: ".class".to_string(),
            array_style: ArrayStyle::Curly,
            omit_single_value_name: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayStyle {
    /// `{a, b}`
    #[default]
    Curly,
    /// `[a, b]`
    Square,
}

/// Default config file names, searched in order.
const CONFIG_FILENAMES: &[&str] = &[".archgraph/config.toml", "archgraph.toml"];

/// Find the config file for a project.
///
/// If `config_override` is provided, use that path directly.
/// Otherwise, search for config files in the project root.
pub fn find_config_path(project_root: &Path, config_override: Option<&Path>) -> Option<PathBuf> {
    if let Some(override_path) = config_override {
        if override_path.exists() {
            return Some(override_path.to_path_buf());
        }
        return None;
    }

    CONFIG_FILENAMES
        .iter()
        .map(|filename| project_root.join(filename))
        .find(|path| path.exists())
}

/// Load and parse a config from a TOML file.
pub fn load_config(path: &Path) -> Result<ArchConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Parse a config from a TOML string.
pub fn parse_config(toml_str: &str) -> Result<ArchConfig> {
    let config: ArchConfig = toml::from_str(toml_str)?;
    Ok(config)
}

/// Resolve the effective configuration, falling back to defaults when no
/// config file exists.
pub fn resolve_config(project_root: &Path, config_override: Option<&Path>) -> Result<ArchConfig> {
    match find_config_path(project_root, config_override) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading configuration");
            load_config(&path)
        }
        None if config_override.is_some() => {
            anyhow::bail!(
                "Config file not found: {}",
                config_override.map(|p| p.display().to_string()).unwrap_or_default()
            )
        }
        None => Ok(ArchConfig::default()),
    }
}
