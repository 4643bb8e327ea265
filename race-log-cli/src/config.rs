//! Race configuration file loading
//!
//! The configuration is a JSON record by default; a `.toml` extension selects
//! the TOML reader. Both use the same camelCase keys.

use anyhow::{Context, Result};
use race_log_decoder::{RaceConfig, RaceConfigFile, RegistrationPolicy};
use std::fs;
use std::path::Path;

/// Load and validate the race configuration
pub fn load_config(path: &Path, registration: RegistrationPolicy) -> Result<RaceConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let file: RaceConfigFile = if is_toml {
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?
    };
    log::debug!("Raw configuration: {:?}", file);

    let config = RaceConfig::try_from(file)
        .with_context(|| format!("Invalid race configuration in {:?}", path))?;

    Ok(config.with_registration_policy(registration))
}
