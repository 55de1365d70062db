//! Install and activate: cache generation rollover.
//!
//! Install precaches the asset list into the current generation, all or
//! nothing. Activate deletes every other generation and claims open pages.

use std::fmt;

use futures_util::future::try_join_all;

use crate::context::WorkerContext;
use crate::event::ExtendableEvent;
use aquajal_core::{CacheGeneration, Error, Request, Response};

/// Where the worker is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerState {
    Parsed,
    Installing,
    /// Installed and waiting to activate.
    Installed,
    Activating,
    Activated(CacheGeneration),
    /// Install or activation failed; this worker will never serve.
    Redundant,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerState::Parsed => f.write_str("parsed"),
            WorkerState::Installing => f.write_str("installing"),
            WorkerState::Installed => f.write_str("installed"),
            WorkerState::Activating => f.write_str("activating"),
            WorkerState::Activated(generation) => write!(f, "activated ({generation})"),
            WorkerState::Redundant => f.write_str("redundant"),
        }
    }
}

/// Install handler: precache the asset list under the current generation.
pub fn on_install(ctx: &WorkerContext, event: &mut ExtendableEvent) {
    let ctx = ctx.clone();
    event.wait_until(async move { precache(&ctx).await });
}

/// Activate handler: drop stale generations, then claim open pages.
pub fn on_activate(ctx: &WorkerContext, event: &mut ExtendableEvent) {
    let ctx = ctx.clone();
    event.wait_until(async move {
        purge_stale(&ctx).await?;
        if let Err(e) = ctx.clients.claim().await {
            tracing::warn!("failed to claim clients, pages stay uncontrolled until reload: {e}");
        }
        Ok(())
    });
}

/// Fetch every asset, then store them all in one write.
///
/// Any network failure or non-ok status aborts before the store is created,
/// so a failed install leaves no trace and older generations keep serving.
pub async fn precache(ctx: &WorkerContext) -> Result<(), Error> {
    let generation = &ctx.config.generation;

    let fetches = ctx.config.precache.iter().map(|url| {
        let request = Request::get(url.clone());
        async move {
            let response = ctx
                .network
                .fetch(&request)
                .await
                .map_err(|e| Error::InstallFailed(format!("{}: {e}", request.url)))?;
            if !response.ok() {
                return Err(Error::InstallFailed(format!("{}: status {}", request.url, response.status)));
            }
            Ok::<(Request, Response), Error>((request, response))
        }
    });

    let pairs = try_join_all(fetches).await.inspect_err(|e| {
        tracing::error!(cache = %generation, "precache failed, keeping previous generation: {e}");
    })?;

    let count = pairs.len();
    ctx.cache
        .put_all(generation.name(), pairs)
        .await
        .map_err(|e| Error::InstallFailed(format!("failed to store assets: {e}")))?;

    tracing::info!(cache = %generation, assets = count, "opened cache and cached core assets");
    Ok(())
}

/// Delete every cache store except the current generation.
///
/// Returns the names that were deleted.
pub async fn purge_stale(ctx: &WorkerContext) -> Result<Vec<String>, Error> {
    let current = ctx.config.generation.name();
    let stale: Vec<String> = ctx
        .cache
        .keys()
        .await?
        .into_iter()
        .filter(|name| name != current)
        .collect();

    try_join_all(stale.iter().map(|name| {
        tracing::info!(cache = %name, "deleting old cache");
        ctx.cache.delete_store(name)
    }))
    .await?;

    Ok(stale)
}
