//! Page agent for the Aquajal PWA shell.
//!
//! Runs inside a loaded page: negotiates notification permission, makes sure
//! a push subscription exists, and relays its descriptor to the backend.
//! The page's capabilities arrive as a [`Platform`]; the relay is any
//! [`aquajal_core::Relay`].

pub mod agent;
pub mod error;
pub mod platform;

#[cfg(test)]
mod testing;

pub use agent::{PageAgent, Startup, SubscribeOutcome};
pub use error::AgentError;
pub use platform::{
    NotificationPermissions, Permission, Platform, PushManager, ServiceWorkerContainer, SubscribeOptions, UserNotice,
};
