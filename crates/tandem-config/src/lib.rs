//! Relay configuration.
//!
//! TOML-based configuration layered as defaults, then an optional file,
//! then command-line overrides. Every field has a default so partial
//! files work.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{create_default_config, default_config_path, load_from_path};
pub use schema::{ConfigOverrides, RelayConfig};

use std::path::Path;

use tandem_common::ConfigError;

/// Resolve the effective config for the relay.
///
/// An explicit `path` must exist. Without one, the platform default path is
/// used when present and built-in defaults otherwise. Overrides are applied
/// last and the result is validated.
pub fn load_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<RelayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_from_path(path)?,
        None => loader::load_default()?,
    };
    overrides.apply(&mut config);
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &RelayConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
