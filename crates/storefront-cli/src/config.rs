//! Configuration and path resolution for the CLI.
//!
//! Handles finding the catalog snapshot and loading engine settings:
//! - Explicit: `--catalog` / `--config` flags
//! - Environment: `$STOREFRONT_CATALOG`
//! - Default: the platform data directory

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use storefront_core::config::SearchConfig;

/// Catalog file name inside the data directory
const CATALOG_FILENAME: &str = "catalog.json";

/// Environment variable for a custom catalog location
pub const CATALOG_ENV: &str = "STOREFRONT_CATALOG";

/// Finds the catalog snapshot to search.
///
/// Search order:
/// 1. `explicit` (the `--catalog` flag)
/// 2. `$STOREFRONT_CATALOG` environment variable
/// 3. `catalog.json` in the platform data directory
pub fn resolve_catalog_path(explicit: Option<&PathBuf>) -> Result<PathBuf> {
    resolve_catalog_path_with(explicit, std::env::var(CATALOG_ENV).ok())
}

fn resolve_catalog_path_with(
    explicit: Option<&PathBuf>,
    env_value: Option<String>,
) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.clone());
    }

    if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
        return Ok(PathBuf::from(value));
    }

    Ok(get_data_dir()?.join(CATALOG_FILENAME))
}

/// Returns the platform data directory.
///
/// - macOS: `~/Library/Application Support/com.storefront.StorefrontSearch/`
/// - Linux: `~/.local/share/storefrontsearch/`
/// - Windows: `%APPDATA%\storefront\StorefrontSearch\data\`
pub fn get_data_dir() -> Result<PathBuf> {
    ProjectDirs::from("com", "storefront", "StorefrontSearch")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| anyhow!("Could not determine data directory"))
}

/// Loads engine settings, or the defaults when no file is given.
///
/// Missing keys in the file fall back to their defaults.
pub fn load_search_config(path: Option<&Path>) -> Result<SearchConfig> {
    let Some(path) = path else {
        return Ok(SearchConfig::default());
    };

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: SearchConfig = serde_json::from_str(&json)
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    Ok(config)
}
