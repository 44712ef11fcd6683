use crate::config::types::{Config, RemoteConfig, ScheduleConfig, StorageConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_remote_config(&config.remote)?;
    validate_storage_config(&config.storage)?;
    validate_schedule_config(&config.schedule)?;
    Ok(())
}

/// Validates the remote endpoint configuration
fn validate_remote_config(config: &RemoteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' has no host",
            config.base_url
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if !config.card_holder_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "card-holder-path must be an absolute path, got '{}'",
            config.card_holder_path
        )));
    }

    Ok(())
}

/// Validates that every storage location is set
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    let paths = [
        ("cookies-path", &config.cookies_path),
        ("lines-dir", &config.lines_dir),
        ("airports-dir", &config.airports_dir),
        ("dump-dir", &config.dump_dir),
        ("lines-summary-path", &config.lines_summary_path),
        ("airplanes-summary-path", &config.airplanes_summary_path),
        ("bonus-results-dir", &config.bonus_results_dir),
    ];

    for (name, path) in paths {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}

/// Validates interval bounds and the pagination ceiling
fn validate_schedule_config(config: &ScheduleConfig) -> Result<(), ConfigError> {
    if config.request_interval_min > config.request_interval_max {
        return Err(ConfigError::Validation(format!(
            "request-interval-min ({}) must not exceed request-interval-max ({})",
            config.request_interval_min, config.request_interval_max
        )));
    }

    if config.pass_interval_min > config.pass_interval_max {
        return Err(ConfigError::Validation(format!(
            "pass-interval-min ({}) must not exceed pass-interval-max ({})",
            config.pass_interval_min, config.pass_interval_max
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    Ok(())
}
