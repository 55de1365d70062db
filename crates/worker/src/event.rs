//! Event objects with scoped lifetime extension.
//!
//! A handler runs synchronously and registers the asynchronous work it
//! starts with [`ExtendableEvent::wait_until`]. The dispatcher keeps the
//! event alive until [`ExtendableEvent::settle`] has driven every registered
//! future to completion; the event fails if any of them failed.

use std::future::Future;

use bytes::Bytes;
use futures_util::future::{BoxFuture, FutureExt, try_join_all};

use aquajal_core::{Error, Request, Response};

/// Lifetime guard for install, activate and push events.
#[derive(Default)]
pub struct ExtendableEvent {
    pending: Vec<BoxFuture<'static, Result<(), Error>>>,
}

impl ExtendableEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the event alive until `work` completes.
    pub fn wait_until<F>(&mut self, work: F)
    where
        F: Future<Output = Result<(), Error>> + Send + 'static,
    {
        self.pending.push(work.boxed());
    }

    /// Number of futures still extending the event.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Drive all registered work to completion.
    pub async fn settle(self) -> Result<(), Error> {
        try_join_all(self.pending).await.map(|_| ())
    }
}

/// An intercepted request awaiting a response.
pub struct FetchEvent {
    pub request: Request,
    response: Option<BoxFuture<'static, Result<Response, Error>>>,
}

impl FetchEvent {
    pub fn new(request: Request) -> Self {
        Self { request, response: None }
    }

    /// Answer the request with the outcome of `response`.
    pub fn respond_with<F>(&mut self, response: F)
    where
        F: Future<Output = Result<Response, Error>> + Send + 'static,
    {
        self.response = Some(response.boxed());
    }

    /// Whether a handler claimed the request.
    pub fn handled(&self) -> bool {
        self.response.is_some()
    }

    /// Take the registered response, if a handler claimed the request.
    pub fn into_response(self) -> Option<BoxFuture<'static, Result<Response, Error>>> {
        self.response
    }
}

/// An inbound push message. `data` is `None` when the push carried no payload.
pub struct PushEvent {
    pub data: Option<Bytes>,
    pub lifetime: ExtendableEvent,
}

impl PushEvent {
    pub fn new(data: Option<Bytes>) -> Self {
        Self { data, lifetime: ExtendableEvent::new() }
    }

    pub fn wait_until<F>(&mut self, work: F)
    where
        F: Future<Output = Result<(), Error>> + Send + 'static,
    {
        self.lifetime.wait_until(work);
    }
}
