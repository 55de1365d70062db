//! Background worker for the Aquajal PWA shell.
//!
//! The worker precaches the application shell on install, drops stale cache
//! generations on activate, answers requests cache-first with an offline
//! fallback for navigations, and turns push messages into notifications.
//!
//! Platform capabilities (network, cache storage, notifications, client
//! control) are injected through [`WorkerContext`]; events are delivered
//! through [`ServiceWorker::dispatch`].

pub mod context;
pub mod error;
pub mod event;
pub mod events;
pub mod fetch;
pub mod lifecycle;
pub mod push;

#[cfg(test)]
mod testing;

pub use context::{Clients, Notification, NotificationDefaults, Notifier, WorkerConfig, WorkerContext};
pub use error::WorkerError;
pub use event::{ExtendableEvent, FetchEvent, PushEvent};
pub use events::{EventKind, EventOutcome, Handlers, ServiceWorker, WorkerEvent};
pub use lifecycle::WorkerState;
