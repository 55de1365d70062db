//! Platform capabilities for running the worker from a terminal.
//!
//! There is no notification tray and there are no pages to control:
//! notifications are written as JSON lines, claims are logged.

use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use aquajal_client::{FetchClient, FetchConfig};
use aquajal_core::{AppConfig, CacheDb, Error};
use aquajal_worker::{Clients, Notification, Notifier, WorkerConfig, WorkerContext};

/// Writes each notification as one JSON line.
pub struct JsonLinesNotifier<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonLinesNotifier<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }
}

#[cfg(test)]
impl JsonLinesNotifier<Vec<u8>> {
    pub fn lines(&self) -> Vec<String> {
        let out = self.out.lock().unwrap();
        String::from_utf8_lossy(&out).lines().map(str::to_string).collect()
    }
}

#[async_trait]
impl<W: Write + Send> Notifier for JsonLinesNotifier<W> {
    async fn show_notification(&self, notification: Notification) -> Result<(), Error> {
        let line = serde_json::to_string(&notification).map_err(|e| Error::NotificationFailed(e.to_string()))?;
        tracing::info!(title = %notification.title, "showing notification");

        let mut out = self
            .out
            .lock()
            .map_err(|_| Error::NotificationFailed("notification output poisoned".into()))?;
        writeln!(out, "{line}")
            .and_then(|()| out.flush())
            .map_err(|e| Error::NotificationFailed(e.to_string()))
    }
}

pub struct DetachedClients;

#[async_trait]
impl Clients for DetachedClients {
    async fn claim(&self) -> Result<(), Error> {
        tracing::debug!("no open pages to claim");
        Ok(())
    }
}

/// Wire the worker to the real network, the given cache and notifier.
pub fn context(config: &AppConfig, cache: CacheDb, notifier: Arc<dyn Notifier>) -> Result<WorkerContext, Error> {
    let worker_config = WorkerConfig::from_app(config)?;
    let network = FetchClient::new(FetchConfig::from(config))?;
    Ok(WorkerContext::new(worker_config, cache, Arc::new(network), notifier, Arc::new(DetachedClients)))
}
