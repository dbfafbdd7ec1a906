use crate::config::types::{ApiConfig, Config, ExportConfig, PollingConfig, StoreBackend, StoreConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_polling_config(&config.polling)?;
    validate_store_config(&config.store)?;
    validate_export_config(&config.export)?;
    Ok(())
}

/// Validates that the configured store can actually receive documents
///
/// The REST backend credentials are optional until something is saved, so
/// this check runs only when persistence is requested.
pub fn validate_store_for_save(config: &StoreConfig) -> Result<(), ConfigError> {
    match config.backend {
        StoreBackend::Rest => {
            let rest_url = config.rest_url.as_deref().unwrap_or("");
            if rest_url.is_empty() {
                return Err(ConfigError::Validation(
                    "store.rest-url is required for the rest backend".to_string(),
                ));
            }
            let has_key = config.rest_key.as_deref().is_some_and(|k| !k.is_empty());
            if !has_key {
                return Err(ConfigError::Validation(
                    "store.rest-key is required for the rest backend".to_string(),
                ));
            }
            Ok(())
        }
        StoreBackend::Sqlite => Ok(()),
    }
}

/// Validates API configuration
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    validate_http_url("api.base-url", &config.base_url)?;

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "api.connect-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates polling configuration
fn validate_polling_config(config: &PollingConfig) -> Result<(), ConfigError> {
    if config.interval_ms < 1 {
        return Err(ConfigError::Validation(format!(
            "polling.interval-ms must be >= 1, got {}",
            config.interval_ms
        )));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "polling.max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    Ok(())
}

/// Validates store configuration
fn validate_store_config(config: &StoreConfig) -> Result<(), ConfigError> {
    if let Some(rest_url) = config.rest_url.as_deref().filter(|u| !u.is_empty()) {
        validate_http_url("store.rest-url", rest_url)?;
    }

    if config.backend == StoreBackend::Sqlite && config.sqlite_path.is_empty() {
        return Err(ConfigError::Validation(
            "store.sqlite-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates export configuration
fn validate_export_config(config: &ExportConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "export.directory cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", field, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "{} must use http or https, got '{}'",
            field,
            url.scheme()
        )));
    }

    Ok(())
}
