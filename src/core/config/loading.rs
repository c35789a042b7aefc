//! Locates and parses the optional TOML configuration file.

use super::file::ConfigFile;
use crate::core::error::{AppError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "mailcast.toml";

/// Loads the configuration file.
///
/// An explicit path must exist. Without one, `mailcast.toml` in the working
/// directory is used when present; otherwise `Ok(None)`.
pub fn load_config_file(explicit: Option<&Path>) -> Result<Option<(ConfigFile, PathBuf)>> {
    let path = match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(AppError::Config(format!(
                    "config file '{}' not found",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => {
            let candidate = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !candidate.is_file() {
                tracing::debug!("No {} in working directory, using defaults", DEFAULT_CONFIG_FILE);
                return Ok(None);
            }
            candidate
        }
    };

    let file = parse_config_file(&path)?;
    tracing::info!("Loaded configuration from {}", path.display());
    Ok(Some((file, path)))
}

fn parse_config_file(path: &Path) -> Result<ConfigFile> {
    let raw = fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!("cannot read '{}': {}", path.display(), e))
    })?;
    toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("invalid TOML in '{}': {}", path.display(), e)))
}
