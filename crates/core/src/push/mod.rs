//! Web push data types shared by the worker and the page agent.
//!
//! The subscription descriptor is owned by the platform's push service: this
//! crate only reads it, serialises it, and relays it.

pub mod vapid;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use vapid::{VapidKeyError, VapidPublicKey, url_base64_to_bytes};

use crate::Error;

/// A push subscription descriptor, shaped like `PushSubscription.toJSON()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
    pub endpoint: String,
    #[serde(default)]
    pub expiration_time: Option<i64>,
    pub keys: SubscriptionKeys,
}

/// Client keys used by the sender to encrypt payloads for this subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// Body of an inbound push message.
///
/// Both fields are optional on the wire; defaults are applied at display time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

impl NotificationPayload {
    /// Parse a push message body. Anything but a JSON object is rejected.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Title to display, falling back to `default` when missing or empty.
    pub fn title_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.title.as_deref().filter(|t| !t.is_empty()).unwrap_or(default)
    }
}

/// Acknowledgement returned by the subscription endpoint.
///
/// Carries no contract beyond being logged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayAck {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Transmits a subscription descriptor to the remote collaborator.
///
/// The collaborator upserts, so relaying the same descriptor again is a no-op
/// on its side. `Ok(None)` means success with no parsable acknowledgement.
#[async_trait]
pub trait Relay: Send + Sync {
    async fn relay(&self, subscription: &PushSubscription) -> Result<Option<RelayAck>, Error>;
}
