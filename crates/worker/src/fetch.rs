//! Fetch interception: cache first, network second, offline page last.

use crate::context::WorkerContext;
use crate::event::FetchEvent;
use aquajal_core::{Error, Request, Response};

/// Fetch handler: answer every request from [`cache_first`].
pub fn on_fetch(ctx: &WorkerContext, event: &mut FetchEvent) {
    let ctx = ctx.clone();
    let request = event.request.clone();
    event.respond_with(async move { cache_first(&ctx, &request).await });
}

/// Serve from the cache when possible, otherwise from the network.
///
/// A cache hit never touches the network. When the network gives no
/// response at all, navigations get the cached offline page; everything
/// else fails the way the network did.
pub async fn cache_first(ctx: &WorkerContext, request: &Request) -> Result<Response, Error> {
    if let Some(cached) = ctx.cache.match_request(request).await? {
        tracing::debug!(url = %request.url, "served from cache");
        return Ok(cached);
    }

    match ctx.network.fetch(request).await {
        Ok(response) => Ok(response),
        Err(err) if err.is_network_failure() && request.is_navigation() => {
            tracing::warn!(url = %request.url, "navigation failed, serving offline page: {err}");
            let offline = Request::get(ctx.config.offline_url.clone());
            match ctx.cache.match_request(&offline).await? {
                Some(page) => Ok(page),
                None => {
                    tracing::error!(url = %offline.url, "offline page is not cached");
                    Err(err)
                }
            }
        }
        Err(err) => {
            tracing::debug!(url = %request.url, "request failed with no fallback: {err}");
            Err(err)
        }
    }
}
