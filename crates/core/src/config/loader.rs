use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "CAMPS_CONFIG";

/// Configuration file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "camps.toml";

/// Plain environment variables understood without a prefix.
const PLAIN_ENV_KEYS: [&str; 3] = ["INPUT_DIR", "BITRATE", "SLACK_WEBHOOK_URL"];

/// Load configuration with environment variable overrides
///
/// `path`, when given, must exist. Without a file the configuration comes
/// entirely from the environment.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut figment = Figment::new();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        figment = figment.merge(Toml::file(path));
    }

    let config: Config = figment
        .merge(Env::raw().only(&PLAIN_ENV_KEYS))
        .merge(Env::prefixed("CAMPS_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
