//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `provider.rpc_url`.
pub const RPC_URL_ENV_VAR: &str = "PRICING_RPC_URL";

/// Environment variable overriding `contracts.main_address`.
pub const MAIN_CONTRACT_ENV_VAR: &str = "PRICING_MAIN_CONTRACT";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse a TOML document without validating it.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::Parse)
}

/// Load configuration: file (if given), then environment overrides, then validation.
///
/// A missing path means "defaults only"; the Main address must then come
/// from the environment or a later override.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    load_config_with(path, |_| {})
}

/// Like [`load_config`], with a final override hook (CLI flags) applied
/// before validation.
pub fn load_config_with(
    path: Option<&Path>,
    overrides: impl FnOnce(&mut AppConfig),
) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            parse_config(&content)?
        }
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    overrides(&mut config);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides through a lookup function.
pub fn apply_env_overrides(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(RPC_URL_ENV_VAR) {
        tracing::debug!(rpc_url = %url, "RPC URL overridden from environment");
        config.provider.rpc_url = url;
    }
    if let Some(address) = lookup(MAIN_CONTRACT_ENV_VAR) {
        tracing::debug!(main_address = %address, "Main contract overridden from environment");
        config.contracts.main_address = address;
    }
}
