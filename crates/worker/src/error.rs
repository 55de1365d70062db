//! Structured errors for the background worker.

use crate::lifecycle::WorkerState;
use crate::events::EventKind;

/// Errors from dispatching an event to the worker.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// The event is not valid in the worker's current state.
    #[error("INVALID_STATE: {event} event while {state}")]
    InvalidState { event: EventKind, state: WorkerState },

    /// A handler or the work it registered failed.
    #[error(transparent)]
    Core(#[from] aquajal_core::Error),
}
