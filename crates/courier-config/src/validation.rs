// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as sane retry parameters, non-empty paths, and well-formed endpoint URLs.

use crate::diagnostic::ConfigError;
use crate::model::CourierConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &CourierConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Validate log_level is a known level
    let level = config.daemon.log_level.trim();
    if !LOG_LEVELS.contains(&level) {
        errors.push(ConfigError::Validation {
            message: format!(
                "daemon.log_level `{level}` is not one of trace, debug, info, warn, error"
            ),
        });
    }

    if config.daemon.poll_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "daemon.poll_interval_secs must be at least 1".to_string(),
        });
    }

    // Validate backoff parameters form a usable schedule
    if config.queue.base_delay_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "queue.base_delay_ms must be at least 1".to_string(),
        });
    }

    if config.queue.growth_factor == 0 {
        errors.push(ConfigError::Validation {
            message: "queue.growth_factor must be at least 1".to_string(),
        });
    }

    if config.queue.max_delay_ms < config.queue.base_delay_ms {
        errors.push(ConfigError::Validation {
            message: format!(
                "queue.max_delay_ms ({}) must be at least queue.base_delay_ms ({})",
                config.queue.max_delay_ms, config.queue.base_delay_ms
            ),
        });
    }

    if config.queue.lock_timeout_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "queue.lock_timeout_ms must be at least 1".to_string(),
        });
    }

    if config.queue.error_log_capacity == 0 {
        errors.push(ConfigError::Validation {
            message: "queue.error_log_capacity must be at least 1".to_string(),
        });
    }

    // Validate database_path is not empty
    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    // Validate endpoint URL if set
    if let Some(url) = &config.endpoint.url
        && !(url.starts_with("http://") || url.starts_with("https://"))
    {
        errors.push(ConfigError::Validation {
            message: format!("endpoint.url `{url}` must start with http:// or https://"),
        });
    }

    if config.endpoint.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "endpoint.timeout_secs must be at least 1".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = CourierConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn bad_log_level_fails_validation() {
        let mut config = CourierConfig::default();
        config.daemon.log_level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("log_level"))));
    }

    #[test]
    fn zero_base_delay_fails_validation() {
        let mut config = CourierConfig::default();
        config.queue.base_delay_ms = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("base_delay_ms"))));
    }

    #[test]
    fn delay_cap_below_base_fails_validation() {
        let mut config = CourierConfig::default();
        config.queue.base_delay_ms = 5000;
        config.queue.max_delay_ms = 1000;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("max_delay_ms"))));
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = CourierConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))));
    }

    #[test]
    fn non_http_endpoint_url_fails_validation() {
        let mut config = CourierConfig::default();
        config.endpoint.url = Some("ftp://relay.example.com".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("endpoint.url"))));
    }

    #[test]
    fn multiple_problems_are_all_reported() {
        let mut config = CourierConfig::default();
        config.daemon.log_level = "loud".to_string();
        config.queue.growth_factor = 0;
        config.endpoint.timeout_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn valid_custom_config_passes() {
        let mut config = CourierConfig::default();
        config.daemon.log_level = "debug".to_string();
        config.queue.max_retries = 10;
        config.storage.database_path = "/tmp/courier-test.db".to_string();
        config.endpoint.url = Some("https://relay.example.com/messages".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let toml_str = r#"
            [queue]
            max_retries = 5

            [endpoint]
            url = "https://relay.example.com/messages"
        "#;
        let config: CourierConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.queue.max_retries, 5);
        assert_eq!(config.queue.base_delay_ms, 1_000);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn unknown_keys_are_rejected_at_parse_time() {
        let toml_str = r#"
            [queue]
            max_retrys = 5
        "#;
        assert!(toml::from_str::<CourierConfig>(toml_str).is_err());
    }
}
