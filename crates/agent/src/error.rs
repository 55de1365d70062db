//! Errors from the page agent's permission and subscription flows.

use aquajal_core::push::VapidKeyError;

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// No VAPID public key was supplied by the hosting page.
    #[error("MISSING_VAPID_KEY: VAPID public key is missing")]
    MissingVapidKey,

    #[error("INVALID_VAPID_KEY: {0}")]
    InvalidVapidKey(String),

    /// The platform lacks a capability (notifications, push messaging).
    #[error("UNSUPPORTED: {0} not supported")]
    Unsupported(&'static str),

    /// Permission was refused; terminal for the session.
    #[error("PERMISSION_DENIED: notification permission was denied")]
    PermissionDenied,

    /// The worker registration never became ready.
    #[error("WORKER_NOT_READY: {0}")]
    WorkerNotReady(String),

    /// The push service refused to create a subscription.
    #[error("SUBSCRIBE_FAILED: {0}")]
    SubscribeFailed(String),

    /// Any other failure reported by the platform.
    #[error("PLATFORM_ERROR: {0}")]
    Platform(String),
}

impl From<VapidKeyError> for AgentError {
    fn from(err: VapidKeyError) -> Self {
        match err {
            VapidKeyError::Missing => AgentError::MissingVapidKey,
            VapidKeyError::InvalidEncoding(reason) => AgentError::InvalidVapidKey(reason),
        }
    }
}
