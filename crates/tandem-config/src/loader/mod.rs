//! TOML config file loading and creation.

mod paths;
mod template;

pub use paths::{create_default_config, default_config_path};

use std::path::Path;

use tandem_common::ConfigError;
use tracing::info;

use crate::schema::RelayConfig;

/// Load config from a specific TOML file path.
///
/// Missing fields take their defaults. Validation is left to the caller so
/// command-line overrides can be applied first.
pub fn load_from_path(path: &Path) -> Result<RelayConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;

    let config: RelayConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config from the platform default path, or built-in defaults when no
/// file is there. Unlike an explicit path, absence is not an error.
pub fn load_default() -> Result<RelayConfig, ConfigError> {
    let path = match default_config_path() {
        Ok(path) => path,
        Err(_) => return Ok(RelayConfig::default()),
    };

    match load_from_path(&path) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(_)) => Ok(RelayConfig::default()),
        Err(e) => Err(e),
    }
}
