//! Subcommand implementations.
//!
//! Command output goes to the writer passed in; logs go to stderr.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use bytes::Bytes;

use aquajal_client::SubscriptionRelay;
use aquajal_core::http::resolve;
use aquajal_core::{AppConfig, CacheDb, PushSubscription, Relay, Request};
use aquajal_worker::{EventOutcome, ServiceWorker, WorkerContext, WorkerEvent, WorkerState};

/// Precache the asset list and activate the current generation.
pub async fn install(ctx: WorkerContext, out: &mut impl Write) -> Result<()> {
    let assets = ctx.config.precache.len();
    let mut worker = ServiceWorker::new(ctx);
    worker.start().await.context("install failed, previous cache generation kept")?;
    writeln!(out, "cached {assets} assets, worker {}", worker.state())?;
    Ok(())
}

/// Answer one request through the active worker.
pub async fn fetch(ctx: WorkerContext, url: &str, navigate: bool, out: &mut impl Write) -> Result<()> {
    let url = resolve(&ctx.config.origin, url).with_context(|| format!("cannot resolve {url}"))?;
    let request = if navigate { Request::navigate(url) } else { Request::get(url) };

    let mut worker = active_worker(ctx).await?;
    let EventOutcome::Responded(response) = worker.dispatch(WorkerEvent::Fetch(request)).await? else {
        bail!("worker did not respond");
    };

    writeln!(out, "{} {}", response.status, response.url)?;
    for (name, value) in &response.headers {
        writeln!(out, "{name}: {value}")?;
    }
    writeln!(out)?;
    out.write_all(&response.body)?;
    Ok(())
}

/// Deliver a push message, with or without a payload.
pub async fn push(ctx: WorkerContext, payload: Option<String>) -> Result<()> {
    let mut worker = active_worker(ctx).await?;
    worker.dispatch(WorkerEvent::Push(payload.map(Bytes::from))).await?;
    Ok(())
}

/// List cache generations; the current one is starred.
pub async fn caches(cache: &CacheDb, current: &str, out: &mut impl Write) -> Result<()> {
    let stores = cache.store_summaries().await?;
    if stores.is_empty() {
        writeln!(out, "no caches")?;
        return Ok(());
    }
    for store in stores {
        let marker = if store.name == current { '*' } else { ' ' };
        writeln!(out, "{marker} {}\t{} entries\tcreated {}", store.name, store.entries, store.created_at)?;
    }
    Ok(())
}

/// Find which cache generation, if any, answers a URL. Never touches the network.
pub async fn lookup(cache: &CacheDb, config: &AppConfig, url: &str, out: &mut impl Write) -> Result<()> {
    let origin = url::Url::parse(&config.origin).with_context(|| format!("invalid origin {}", config.origin))?;
    let url = resolve(&origin, url).with_context(|| format!("cannot resolve {url}"))?;
    let request = Request::get(url);

    for store in cache.keys().await? {
        if let Some(response) = cache.match_in(&store, &request).await? {
            writeln!(out, "{store}\t{} {}", response.status, response.url)?;
            return Ok(());
        }
    }
    writeln!(out, "miss {}", request.url)?;
    Ok(())
}

/// Post a subscription descriptor read from a JSON file.
pub async fn relay(config: &AppConfig, descriptor: &Path, out: &mut impl Write) -> Result<()> {
    let json = std::fs::read_to_string(descriptor).with_context(|| format!("cannot read {}", descriptor.display()))?;
    let subscription: PushSubscription =
        serde_json::from_str(&json).with_context(|| format!("{} is not a push subscription", descriptor.display()))?;

    let relay = SubscriptionRelay::from_config(config)?;
    let ack = relay.relay(&subscription).await?;

    match ack.and_then(|ack| ack.message.or(ack.error)) {
        Some(message) => writeln!(out, "relayed to {}: {message}", relay.endpoint())?,
        None => writeln!(out, "relayed to {}", relay.endpoint())?,
    }
    Ok(())
}

async fn active_worker(ctx: WorkerContext) -> Result<ServiceWorker> {
    let worker = ServiceWorker::restore(ctx).await?;
    if !matches!(worker.state(), WorkerState::Activated(_)) {
        bail!("no active cache generation, run `aquajal install` first");
    }
    Ok(worker)
}
