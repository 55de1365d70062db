//! Capabilities handed to every event handler.
//!
//! The worker never reaches for globals: cache storage, the network, the
//! notification surface and client control all come in through
//! [`WorkerContext`], so a host (or a test) decides what each one is.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use aquajal_core::http::resolve;
use aquajal_core::{AppConfig, CacheDb, CacheGeneration, Error, Network, NotificationPayload};

/// A system notification, as handed to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Main icon.
    pub icon: String,
    /// Small icon for the status bar.
    pub badge: String,
}

/// Title and icons applied to every push notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDefaults {
    pub title: String,
    pub icon: String,
    pub badge: String,
}

impl Notification {
    pub fn from_payload(payload: &NotificationPayload, defaults: &NotificationDefaults) -> Self {
        Self {
            title: payload.title_or(&defaults.title).to_string(),
            body: payload.body.clone(),
            icon: defaults.icon.clone(),
            badge: defaults.badge.clone(),
        }
    }
}

/// Displays notifications on behalf of the worker.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Resolves once the notification is shown.
    async fn show_notification(&self, notification: Notification) -> Result<(), Error>;
}

/// The pages controlled by this worker's origin.
#[async_trait]
pub trait Clients: Send + Sync {
    /// Take control of already-open pages without waiting for a reload.
    async fn claim(&self) -> Result<(), Error>;
}

/// Resolved worker configuration: every URL absolute, the generation named.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub origin: url::Url,
    pub generation: CacheGeneration,
    pub precache: Vec<url::Url>,
    pub offline_url: url::Url,
    pub notification: NotificationDefaults,
    /// Activate as soon as install succeeds instead of waiting.
    pub skip_waiting: bool,
}

impl WorkerConfig {
    /// Resolve the asset list and offline page against the configured origin.
    pub fn from_app(config: &AppConfig) -> Result<Self, Error> {
        let origin = url::Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let resolve_asset = |asset: &str| resolve(&origin, asset).map_err(|e| Error::InvalidUrl(format!("{asset}: {e}")));

        let precache = config
            .precache
            .iter()
            .map(|asset| resolve_asset(asset))
            .collect::<Result<Vec<_>, _>>()?;
        let offline_url = resolve_asset(&config.offline_path)?;

        Ok(Self {
            generation: CacheGeneration::new(config.cache_name.clone()),
            precache,
            offline_url,
            notification: NotificationDefaults {
                title: config.notification_title.clone(),
                icon: config.notification_icon.clone(),
                badge: config.notification_badge.clone(),
            },
            skip_waiting: true,
            origin,
        })
    }
}

/// Everything a handler may touch.
///
/// Cheap to clone: handlers clone it into the futures they register.
#[derive(Clone)]
pub struct WorkerContext {
    pub config: Arc<WorkerConfig>,
    pub cache: CacheDb,
    pub network: Arc<dyn Network>,
    pub notifier: Arc<dyn Notifier>,
    pub clients: Arc<dyn Clients>,
}

impl WorkerContext {
    pub fn new(
        config: WorkerConfig, cache: CacheDb, network: Arc<dyn Network>, notifier: Arc<dyn Notifier>,
        clients: Arc<dyn Clients>,
    ) -> Self {
        Self { config: Arc::new(config), cache, network, notifier, clients }
    }
}
