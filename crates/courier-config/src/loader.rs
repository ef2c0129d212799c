// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./courier.toml` > `~/.config/courier/courier.toml` > `/etc/courier/courier.toml`
//! with environment variable overrides via `COURIER_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::CourierConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/courier/courier.toml` (system-wide)
/// 3. `~/.config/courier/courier.toml` (user XDG config)
/// 4. `./courier.toml` (local directory)
/// 5. `COURIER_*` environment variables
pub fn load_config() -> Result<CourierConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CourierConfig::default()))
        .merge(Toml::file("/etc/courier/courier.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("courier/courier.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("courier.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<CourierConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CourierConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CourierConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CourierConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// CRITICAL: Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example, `COURIER_QUEUE_MAX_RETRIES` must
/// map to `queue.max_retries`, not `queue.max.retries`.
fn env_provider() -> Env {
    Env::prefixed("COURIER_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: COURIER_QUEUE_MAX_RETRIES -> "queue_max_retries"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("daemon_", "daemon.", 1)
            .replacen("queue_", "queue.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("endpoint_", "endpoint.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_files() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.daemon.log_level, "info");
        assert_eq!(config.queue.max_retries, 3);
        assert_eq!(config.queue.base_delay_ms, 1000);
        assert_eq!(config.queue.max_delay_ms, 60_000);
        assert_eq!(config.queue.lock_timeout_ms, 30_000);
        assert_eq!(config.endpoint.timeout_secs, 30);
        assert!(config.endpoint.url.is_none());
    }

    #[test]
    fn toml_overrides_defaults() {
        let toml = r#"
[daemon]
log_level = "debug"

[queue]
max_retries = 5
base_delay_ms = 500

[endpoint]
url = "https://relay.example.com/messages"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.daemon.log_level, "debug");
        assert_eq!(config.queue.max_retries, 5);
        assert_eq!(config.queue.base_delay_ms, 500);
        // Untouched keys keep their defaults.
        assert_eq!(config.queue.max_delay_ms, 60_000);
        assert_eq!(
            config.endpoint.url.as_deref(),
            Some("https://relay.example.com/messages")
        );
    }

    #[test]
    fn unknown_key_is_rejected() {
        let toml = r#"
[queue]
max_retrys = 5
"#;
        assert!(load_config_from_str(toml).is_err());
    }

    #[test]
    fn env_mapping_targets_sections() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("COURIER_QUEUE_MAX_RETRIES", "7");
            jail.set_env("COURIER_ENDPOINT_BEARER_TOKEN", "secret");
            let config: CourierConfig = Figment::new()
                .merge(Serialized::defaults(CourierConfig::default()))
                .merge(env_provider())
                .extract()?;
            assert_eq!(config.queue.max_retries, 7);
            assert_eq!(config.endpoint.bearer_token.as_deref(), Some("secret"));
            Ok(())
        });
    }
}
