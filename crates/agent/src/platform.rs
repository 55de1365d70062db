//! Capabilities the hosting page exposes to the agent.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use aquajal_core::PushSubscription;

/// Notification permission state for the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Not decided yet; a prompt is possible.
    Default,
    Granted,
    Denied,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Permission::Default => "default",
            Permission::Granted => "granted",
            Permission::Denied => "denied",
        })
    }
}

#[async_trait]
pub trait NotificationPermissions: Send + Sync {
    fn is_supported(&self) -> bool;

    fn permission(&self) -> Permission;

    /// Show the native prompt. Only meaningful from a user gesture.
    async fn request_permission(&self) -> Permission;
}

/// Options passed to [`PushManager::subscribe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeOptions {
    /// Decoded VAPID public key.
    pub application_server_key: Vec<u8>,
    /// Every push must produce a visible notification.
    pub user_visible_only: bool,
}

/// Push subscription management on a ready worker registration.
#[async_trait]
pub trait PushManager: Send + Sync {
    async fn get_subscription(&self) -> Result<Option<PushSubscription>, AgentError>;

    async fn subscribe(&self, options: SubscribeOptions) -> Result<PushSubscription, AgentError>;
}

#[async_trait]
pub trait ServiceWorkerContainer: Send + Sync {
    /// Whether both a worker container and push messaging exist.
    fn supports_push(&self) -> bool;

    /// Resolves once the worker registration is active.
    async fn ready(&self) -> Result<Arc<dyn PushManager>, AgentError>;
}

/// Visible messages to the user.
pub trait UserNotice: Send + Sync {
    fn alert(&self, message: &str);
}

/// Everything the agent needs from the page.
#[derive(Clone)]
pub struct Platform {
    pub notifications: Arc<dyn NotificationPermissions>,
    pub workers: Arc<dyn ServiceWorkerContainer>,
    pub notice: Arc<dyn UserNotice>,
}
