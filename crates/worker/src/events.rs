//! Event dispatch and the worker state machine.
//!
//! Every event kind maps to exactly one handler in [`Handlers`]. Handlers
//! are plain functions over a [`WorkerContext`] and the event object; the
//! dispatcher owns the lifecycle state and only moves it when the work a
//! handler registered has settled.

use std::fmt;

use bytes::Bytes;

use crate::context::WorkerContext;
use crate::error::WorkerError;
use crate::event::{ExtendableEvent, FetchEvent, PushEvent};
use crate::lifecycle::{self, WorkerState};
use crate::{fetch, push};
use aquajal_core::{CacheGeneration, Request, Response};

/// Events the platform delivers to the worker.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(Request),
    Push(Option<Bytes>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Install,
    Activate,
    Fetch,
    Push,
}

impl WorkerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            WorkerEvent::Install => EventKind::Install,
            WorkerEvent::Activate => EventKind::Activate,
            WorkerEvent::Fetch(_) => EventKind::Fetch,
            WorkerEvent::Push(_) => EventKind::Push,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EventKind::Install => "install",
            EventKind::Activate => "activate",
            EventKind::Fetch => "fetch",
            EventKind::Push => "push",
        })
    }
}

/// What a dispatched event produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// Install succeeded; the worker waits for activation.
    Installed,
    /// The worker now serves this generation.
    Activated(CacheGeneration),
    Responded(Response),
    PushHandled,
}

/// The dispatch table.
#[derive(Debug, Clone, Copy)]
pub struct Handlers {
    pub install: fn(&WorkerContext, &mut ExtendableEvent),
    pub activate: fn(&WorkerContext, &mut ExtendableEvent),
    pub fetch: fn(&WorkerContext, &mut FetchEvent),
    pub push: fn(&WorkerContext, &mut PushEvent),
}

impl Default for Handlers {
    fn default() -> Self {
        Self {
            install: lifecycle::on_install,
            activate: lifecycle::on_activate,
            fetch: fetch::on_fetch,
            push: push::on_push,
        }
    }
}

/// A worker instance: one generation, one lifecycle.
pub struct ServiceWorker {
    ctx: WorkerContext,
    handlers: Handlers,
    state: WorkerState,
}

impl ServiceWorker {
    pub fn new(ctx: WorkerContext) -> Self {
        Self::with_handlers(ctx, Handlers::default())
    }

    pub fn with_handlers(ctx: WorkerContext, handlers: Handlers) -> Self {
        Self { ctx, handlers, state: WorkerState::Parsed }
    }

    /// Pick up a worker whose generation was installed by an earlier run.
    ///
    /// The worker starts out activated when the current generation's store
    /// exists, and parsed otherwise.
    pub async fn restore(ctx: WorkerContext) -> Result<Self, WorkerError> {
        let generation = ctx.config.generation.clone();
        let installed = ctx.cache.has(generation.name()).await?;
        let mut worker = Self::new(ctx);
        if installed {
            tracing::debug!(cache = %generation, "restored active worker");
            worker.state = WorkerState::Activated(generation);
        }
        Ok(worker)
    }

    pub fn state(&self) -> &WorkerState {
        &self.state
    }

    pub fn context(&self) -> &WorkerContext {
        &self.ctx
    }

    /// Install, then activate right away when the worker skips waiting.
    pub async fn start(&mut self) -> Result<EventOutcome, WorkerError> {
        self.dispatch(WorkerEvent::Install).await
    }

    /// Deliver one event to its handler.
    pub async fn dispatch(&mut self, event: WorkerEvent) -> Result<EventOutcome, WorkerError> {
        let kind = event.kind();
        match event {
            WorkerEvent::Install => {
                self.expect_state(kind, |s| matches!(s, WorkerState::Parsed))?;
                self.install().await?;
                if self.ctx.config.skip_waiting {
                    return self.activate().await;
                }
                Ok(EventOutcome::Installed)
            }
            WorkerEvent::Activate => {
                self.expect_state(kind, |s| matches!(s, WorkerState::Installed))?;
                self.activate().await
            }
            WorkerEvent::Fetch(request) => {
                self.expect_state(kind, |s| matches!(s, WorkerState::Activated(_)))?;
                let mut event = FetchEvent::new(request);
                (self.handlers.fetch)(&self.ctx, &mut event);
                let request = event.request.clone();
                let response = match event.into_response() {
                    Some(response) => response.await?,
                    None => self.ctx.network.fetch(&request).await?,
                };
                Ok(EventOutcome::Responded(response))
            }
            WorkerEvent::Push(data) => {
                self.expect_state(kind, |s| matches!(s, WorkerState::Activated(_)))?;
                let mut event = PushEvent::new(data);
                (self.handlers.push)(&self.ctx, &mut event);
                event.lifetime.settle().await?;
                Ok(EventOutcome::PushHandled)
            }
        }
    }

    async fn install(&mut self) -> Result<(), WorkerError> {
        self.state = WorkerState::Installing;
        tracing::info!(cache = %self.ctx.config.generation, "installing worker");

        let mut event = ExtendableEvent::new();
        (self.handlers.install)(&self.ctx, &mut event);
        match event.settle().await {
            Ok(()) => {
                self.state = WorkerState::Installed;
                Ok(())
            }
            Err(e) => {
                self.state = WorkerState::Redundant;
                Err(e.into())
            }
        }
    }

    async fn activate(&mut self) -> Result<EventOutcome, WorkerError> {
        self.state = WorkerState::Activating;

        let mut event = ExtendableEvent::new();
        (self.handlers.activate)(&self.ctx, &mut event);
        match event.settle().await {
            Ok(()) => {
                let generation = self.ctx.config.generation.clone();
                tracing::info!(cache = %generation, "worker activated");
                self.state = WorkerState::Activated(generation.clone());
                Ok(EventOutcome::Activated(generation))
            }
            Err(e) => {
                tracing::error!("activation failed: {e}");
                self.state = WorkerState::Redundant;
                Err(e.into())
            }
        }
    }

    fn expect_state(&self, event: EventKind, allowed: impl Fn(&WorkerState) -> bool) -> Result<(), WorkerError> {
        if allowed(&self.state) {
            Ok(())
        } else {
            Err(WorkerError::InvalidState { event, state: self.state.clone() })
        }
    }
}
