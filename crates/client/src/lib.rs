//! HTTP client code for the Aquajal PWA shell.
//!
//! This crate provides the reqwest-backed network layer used by the worker
//! and the relay that hands push subscriptions to the backend.

pub mod fetch;
pub mod relay;

pub use fetch::{FetchClient, FetchConfig};
pub use relay::SubscriptionRelay;
