//! Configuration file discovery and loading
//!
//! The file holds a `TranslatorConfig` in YAML, JSON or TOML, chosen by
//! extension. Lookup order is the explicit `--config` path, then
//! `./tongues.{yaml,yml,json,toml}`, then `<config dir>/tongues/config.*`.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tongues_core::TranslatorConfig;

const EXTENSIONS: [&str; 4] = ["yaml", "yml", "json", "toml"];

/// Load configuration from a specific file
pub fn from_file(path: &Path) -> Result<TranslatorConfig> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let config = match extension.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&content)?,
        "json" => serde_json::from_str(&content)?,
        "toml" => toml::from_str(&content)?,
        _ => {
            return Err(Error::InvalidFormat {
                path: path.to_path_buf(),
                expected: "yaml, json or toml".to_string(),
            })
        }
    };

    tracing::debug!(path = %path.display(), "Loaded configuration file");
    Ok(config)
}

/// Load from the first existing default location, or an empty config
pub fn load() -> Result<TranslatorConfig> {
    for path in default_config_paths() {
        if path.is_file() {
            return from_file(&path);
        }
    }

    tracing::info!("No configuration file found, no engines are registered");
    Ok(TranslatorConfig::default())
}

/// Load the explicit file when given, otherwise search the default locations
pub fn load_with_file(file: Option<&Path>) -> Result<TranslatorConfig> {
    match file {
        Some(path) => from_file(path),
        None => load(),
    }
}

fn default_config_paths() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = EXTENSIONS
        .iter()
        .map(|ext| PathBuf::from(format!("tongues.{}", ext)))
        .collect();

    if let Some(config_dir) = dirs::config_dir() {
        let tongues_dir = config_dir.join("tongues");
        paths.extend(EXTENSIONS.iter().map(|ext| tongues_dir.join(format!("config.{}", ext))));
    }

    paths
}
