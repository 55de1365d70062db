//! The page agent: permission negotiation and subscription registration.

use std::sync::Arc;

use crate::error::AgentError;
use crate::platform::{Permission, Platform, SubscribeOptions};
use aquajal_core::{PushSubscription, Relay, VapidPublicKey};
use aquajal_core::push::VapidKeyError;

pub(crate) const NOTIFICATIONS_UNSUPPORTED: &str = "Sorry, your browser does not support notifications.";
pub(crate) const PUSH_UNSUPPORTED: &str = "Sorry, push notifications are not supported by your browser.";
pub(crate) const BLOCKED: &str =
    "You have blocked notifications. To enable them, you must change the settings for this site in your browser.";
pub(crate) const REFUSED: &str =
    "You have denied notification permissions. To enable them, please go to your browser settings.";
pub(crate) const SUBSCRIBED: &str = "You have been successfully subscribed to notifications!";
pub(crate) const SUBSCRIBE_FAILED: &str =
    "Failed to subscribe to notifications. You may have blocked them for this site.";

/// Result of a completed [`PageAgent::ensure_subscribed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeOutcome {
    pub subscription: PushSubscription,
    /// A new subscription was created rather than found.
    pub created: bool,
    /// The remote collaborator accepted the descriptor.
    pub relayed: bool,
}

/// What [`PageAgent::initialize`] did on page load.
#[derive(Debug)]
pub enum Startup {
    /// Permission was already granted and the subscription is in place.
    Subscribed(SubscribeOutcome),
    /// Permission was already granted but subscribing failed.
    Failed(AgentError),
    /// Permission is undecided; waiting for a user gesture.
    AwaitingGesture,
    Denied,
    /// The platform has no notifications; the feature stays off.
    Unsupported,
}

pub struct PageAgent {
    platform: Platform,
    relay: Arc<dyn Relay>,
    /// base64url text as supplied; decoded only when a subscription is created.
    vapid_key: String,
}

impl PageAgent {
    /// Set up the agent on page load.
    ///
    /// A missing key is a misconfiguration: it is logged and returned, and no
    /// subscription is ever attempted. Otherwise the agent subscribes right
    /// away only when permission was granted on an earlier visit; it never
    /// prompts on its own.
    pub async fn initialize(
        platform: Platform, relay: Arc<dyn Relay>, vapid_key: Option<&str>,
    ) -> Result<(Self, Startup), AgentError> {
        let Some(vapid_key) = vapid_key.map(str::trim).filter(|key| !key.is_empty()) else {
            tracing::error!("cannot initialize push notifications: {}", VapidKeyError::Missing);
            return Err(AgentError::MissingVapidKey);
        };
        let agent = Self { platform, relay, vapid_key: vapid_key.to_string() };

        if !agent.platform.notifications.is_supported() {
            tracing::info!("notifications are not supported, push stays disabled");
            return Ok((agent, Startup::Unsupported));
        }

        let startup = match agent.platform.notifications.permission() {
            Permission::Granted => {
                tracing::info!("permission already granted, subscribing");
                match agent.ensure_subscribed().await {
                    Ok(outcome) => Startup::Subscribed(outcome),
                    Err(e) => Startup::Failed(e),
                }
            }
            Permission::Default => Startup::AwaitingGesture,
            Permission::Denied => {
                tracing::debug!("notification permission denied, not subscribing");
                Startup::Denied
            }
        };
        Ok((agent, startup))
    }

    /// Ask for permission from a user gesture, then subscribe.
    ///
    /// A permission denied earlier is reported to the user without prompting
    /// again.
    pub async fn request_permission_and_subscribe(&self) -> Result<SubscribeOutcome, AgentError> {
        let notifications = &self.platform.notifications;
        if !notifications.is_supported() {
            self.platform.notice.alert(NOTIFICATIONS_UNSUPPORTED);
            return Err(AgentError::Unsupported("notifications"));
        }

        if notifications.permission() == Permission::Denied {
            self.platform.notice.alert(BLOCKED);
            return Err(AgentError::PermissionDenied);
        }

        match notifications.request_permission().await {
            Permission::Granted => {
                tracing::info!("permission was granted on request");
                self.subscribe(true).await
            }
            other => {
                tracing::info!(permission = %other, "permission was not granted on request");
                self.platform.notice.alert(REFUSED);
                Err(AgentError::PermissionDenied)
            }
        }
    }

    /// Make sure a push subscription exists and announce it to the backend.
    ///
    /// An existing descriptor is relayed again every time; the backend
    /// treats repeats as a no-op. Relay failures are logged and reported in
    /// the outcome, never undone or retried. Missing push support is only
    /// logged here; the user hears about it when they ask for notifications.
    pub async fn ensure_subscribed(&self) -> Result<SubscribeOutcome, AgentError> {
        self.subscribe(false).await
    }

    async fn subscribe(&self, on_gesture: bool) -> Result<SubscribeOutcome, AgentError> {
        if !self.platform.workers.supports_push() {
            tracing::warn!("push messaging is not supported");
            if on_gesture {
                self.platform.notice.alert(PUSH_UNSUPPORTED);
            }
            return Err(AgentError::Unsupported("push messaging"));
        }

        let registration = self.platform.workers.ready().await.map_err(|e| {
            tracing::error!("worker is not ready: {e}");
            AgentError::WorkerNotReady(e.to_string())
        })?;

        let (subscription, created) = match registration.get_subscription().await? {
            Some(existing) => {
                tracing::info!(endpoint = %existing.endpoint, "existing subscription detected");
                (existing, false)
            }
            None => {
                tracing::info!("no subscription detected, creating a new one");
                let key = VapidPublicKey::parse(&self.vapid_key).map_err(|e| {
                    tracing::error!("cannot create a push subscription: {e}");
                    self.platform.notice.alert(SUBSCRIBE_FAILED);
                    AgentError::from(e)
                })?;
                let options = SubscribeOptions { application_server_key: key.as_bytes().to_vec(), user_visible_only: true };
                match registration.subscribe(options).await {
                    Ok(created) => {
                        tracing::info!(endpoint = %created.endpoint, "new push subscription created");
                        (created, true)
                    }
                    Err(e) => {
                        tracing::error!("failed to subscribe the user: {e}");
                        self.platform.notice.alert(SUBSCRIBE_FAILED);
                        return Err(AgentError::SubscribeFailed(e.to_string()));
                    }
                }
            }
        };

        let relayed = self.announce(&subscription).await;
        if created {
            self.platform.notice.alert(SUBSCRIBED);
        }
        Ok(SubscribeOutcome { subscription, created, relayed })
    }

    async fn announce(&self, subscription: &PushSubscription) -> bool {
        match self.relay.relay(subscription).await {
            Ok(ack) => {
                let message = ack.and_then(|ack| ack.message);
                tracing::info!(message = message.as_deref().unwrap_or(""), "sent subscription to backend");
                true
            }
            Err(e) => {
                tracing::error!("error sending subscription to backend: {e}");
                false
            }
        }
    }
}
