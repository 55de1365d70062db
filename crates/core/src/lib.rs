//! Core types and shared functionality for the Aquajal PWA shell.
//!
//! This crate provides:
//! - Cache Storage implementation with SQLite backend
//! - Unified error types
//! - Configuration structures
//! - Request/response, push subscription and notification payload types
//! - The platform seams (`Network`, `Relay`) shared by the worker and page agent

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod push;

pub use cache::{CacheDb, CacheGeneration};
pub use config::AppConfig;
pub use error::Error;
pub use http::{Network, Request, RequestMode, Response};
pub use push::{NotificationPayload, PushSubscription, Relay, RelayAck, VapidPublicKey};
