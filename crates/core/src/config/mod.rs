//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (AQUAJAL_*)
//! 2. TOML config file (if AQUAJAL_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (AQUAJAL_*)
/// 2. TOML config file (if AQUAJAL_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Origin the worker controls; relative asset and endpoint paths resolve against it.
    ///
    /// Set via AQUAJAL_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Name of the current cache generation.
    ///
    /// Bump it to roll every client over to a fresh asset bundle.
    #[serde(default = "default_cache_name")]
    pub cache_name: String,

    /// Asset list precached on install.
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,

    /// Page served to navigations that miss the cache while offline.
    #[serde(default = "default_offline_path")]
    pub offline_path: String,

    /// Endpoint receiving push subscription descriptors.
    #[serde(default = "default_subscribe_path")]
    pub subscribe_path: String,

    /// Title used when a push payload has none.
    #[serde(default = "default_notification_title")]
    pub notification_title: String,

    #[serde(default = "default_icon")]
    pub notification_icon: String,

    #[serde(default = "default_icon")]
    pub notification_badge: String,

    /// VAPID public key handed to the page agent (base64url).
    ///
    /// Set via AQUAJAL_VAPID_PUBLIC_KEY environment variable.
    /// Required only when subscribing.
    #[serde(default)]
    pub vapid_public_key: Option<String>,

    /// Path to SQLite cache storage database.
    ///
    /// Set via AQUAJAL_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via AQUAJAL_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_origin() -> String {
    "http://localhost:5000".into()
}

fn default_cache_name() -> String {
    "aquajal-cache-v2".into()
}

fn default_precache() -> Vec<String> {
    [
        "/",
        "/index",
        "/offline",
        "/static/manifest.json",
        "/static/images/logo-192.png",
        "/static/images/logo-512.png",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_offline_path() -> String {
    "/offline".into()
}

fn default_subscribe_path() -> String {
    "/notifications/subscribe".into()
}

fn default_notification_title() -> String {
    "Aquajal Notification".into()
}

fn default_icon() -> String {
    "/static/images/logo-192.png".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./aquajal-cache.sqlite")
}

fn default_user_agent() -> String {
    "aquajal-pwa/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            cache_name: default_cache_name(),
            precache: default_precache(),
            offline_path: default_offline_path(),
            subscribe_path: default_subscribe_path(),
            notification_title: default_notification_title(),
            notification_icon: default_icon(),
            notification_badge: default_icon(),
            vapid_public_key: None,
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `AQUAJAL_`
    /// 2. TOML file from `AQUAJAL_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment()
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("AQUAJAL_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment.merge(
            Env::prefixed("AQUAJAL_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        )
    }

    /// Check if the VAPID public key is available (for deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the key is not set or blank.
    pub fn require_vapid_public_key(&self) -> Result<&str, ConfigError> {
        self.vapid_public_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "vapid_public_key".into(),
                hint: "Set AQUAJAL_VAPID_PUBLIC_KEY environment variable".into(),
            })
    }
}
