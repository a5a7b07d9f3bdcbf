use super::{types::Config, ConfigError};

/// Highest bitrate any supported lossy encoder accepts.
const MAX_BITRATE_KBPS: u32 = 640;

/// Validate configuration
/// Currently validates:
/// - input_dir is not empty
/// - bitrate is within 1..=640 kbps
/// - workers, when set, is not 0
/// - webhook URL, when set, is http(s)
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.input_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "input_dir cannot be empty".to_string(),
        ));
    }

    if config.bitrate == 0 || config.bitrate > MAX_BITRATE_KBPS {
        return Err(ConfigError::ValidationError(format!(
            "bitrate must be between 1 and {} kbps, got {}",
            MAX_BITRATE_KBPS, config.bitrate
        )));
    }

    if config.workers == Some(0) {
        return Err(ConfigError::ValidationError(
            "workers cannot be 0".to_string(),
        ));
    }

    if let Some(url) = config.webhook_url() {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(
                "slack_webhook_url must be an http(s) URL".to_string(),
            ));
        }
    }

    Ok(())
}
