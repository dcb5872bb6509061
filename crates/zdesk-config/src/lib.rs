//! Configuration for the zdesk server.
//!
//! Reads configuration from multiple sources with precedence:
//! CLI flags > env vars > config file > defaults

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use zdesk_api::RetryPolicy;
use zdesk_types::ConfigError;

/// Default per-attempt request timeout against the Zendesk API.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Default bound on in-flight work after shutdown begins.
pub const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 10_000;

/// Resolved configuration for a zdesk process.
#[derive(Debug, Clone)]
pub struct ZdeskConfig {
    pub subdomain: String,
    pub email: String,
    pub api_token: String,
    /// Override of the derived `https://{subdomain}.zendesk.com/api/v2` base.
    pub base_url: Option<String>,
    pub request_timeout_ms: u64,
    pub shutdown_timeout_ms: u64,
    pub retry: RetryPolicy,
}

/// Settings that can be read from a TOML config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub zendesk: ZendeskSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub retry: RetryPolicy,
}

/// Credentials section of the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZendeskSettings {
    pub subdomain: Option<String>,
    pub email: Option<String>,
    pub api_token: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSettings {
    pub request_timeout_ms: Option<u64>,
    pub shutdown_timeout_ms: Option<u64>,
}

/// CLI overrides that take highest precedence.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub subdomain: Option<String>,
    pub email: Option<String>,
    pub api_token: Option<String>,
}

impl ZdeskConfig {
    /// Load configuration from all sources, applying precedence rules.
    ///
    /// Precedence (highest to lowest):
    /// 1. CLI flags
    /// 2. Environment variables (ZENDESK_SUBDOMAIN, ZENDESK_EMAIL,
    ///    ZENDESK_API_TOKEN, ZENDESK_BASE_URL)
    /// 3. Config file (~/.zdesk/config.toml)
    /// 4. Defaults
    ///
    /// Missing credentials are a startup failure.
    pub fn load(overrides: CliOverrides) -> Result<Self, ConfigError> {
        let config_dir = config_dir();
        let settings = load_settings_file(&config_dir.join("config.toml"));

        let subdomain = overrides
            .subdomain
            .or_else(|| std::env::var("ZENDESK_SUBDOMAIN").ok())
            .or(settings.zendesk.subdomain)
            .ok_or_else(|| ConfigError::MissingKey {
                key: "subdomain (set ZENDESK_SUBDOMAIN or add to ~/.zdesk/config.toml)".into(),
            })?;

        let email = overrides
            .email
            .or_else(|| std::env::var("ZENDESK_EMAIL").ok())
            .or(settings.zendesk.email)
            .ok_or_else(|| ConfigError::MissingKey {
                key: "email (set ZENDESK_EMAIL or add to ~/.zdesk/config.toml)".into(),
            })?;

        let api_token = overrides
            .api_token
            .or_else(|| std::env::var("ZENDESK_API_TOKEN").ok())
            .or(settings.zendesk.api_token)
            .ok_or_else(|| ConfigError::MissingKey {
                key: "api_token (set ZENDESK_API_TOKEN or add to ~/.zdesk/config.toml)".into(),
            })?;

        if subdomain.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "subdomain".into(),
                message: "must not be empty".into(),
            });
        }

        validate_retry(&settings.retry)?;

        let base_url = std::env::var("ZENDESK_BASE_URL")
            .ok()
            .or(settings.zendesk.base_url);

        Ok(ZdeskConfig {
            subdomain,
            email,
            api_token,
            base_url,
            request_timeout_ms: settings
                .server
                .request_timeout_ms
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),
            shutdown_timeout_ms: settings
                .server
                .shutdown_timeout_ms
                .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_MS),
            retry: settings.retry,
        })
    }
}

fn validate_retry(retry: &RetryPolicy) -> Result<(), ConfigError> {
    if retry.backoff_factor < 1.0 {
        return Err(ConfigError::InvalidValue {
            key: "retry.backoff_factor".into(),
            message: "must be at least 1.0".into(),
        });
    }
    if retry.initial_delay_ms > retry.max_delay_ms {
        return Err(ConfigError::InvalidValue {
            key: "retry.initial_delay_ms".into(),
            message: "must not exceed retry.max_delay_ms".into(),
        });
    }
    Ok(())
}

/// Get the zdesk config directory path (~/.zdesk/).
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("ZDESK_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".zdesk")
}

/// Load and parse a TOML settings file, returning defaults on any error.
fn load_settings_file(path: &std::path::Path) -> SettingsFile {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Failed to parse {}: {}", path.display(), e);
            SettingsFile::default()
        }),
        Err(_) => SettingsFile::default(),
    }
}
