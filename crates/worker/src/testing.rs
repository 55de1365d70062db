//! In-memory platform fakes for handler tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use crate::context::{Clients, Notification, Notifier, WorkerConfig, WorkerContext};
use aquajal_core::{AppConfig, CacheDb, Error, Network, Request, Response};

const ORIGIN: &str = "https://aquajal.example";

pub fn asset_url(path: &str) -> url::Url {
    url::Url::parse(ORIGIN).and_then(|origin| origin.join(path)).unwrap()
}

/// Serves `asset {path}` for every precached asset until told otherwise.
#[derive(Default)]
pub struct FakeNetwork {
    routes: Mutex<HashMap<String, (u16, Bytes)>>,
    failing: Mutex<HashSet<String>>,
    offline: AtomicBool,
    calls: AtomicUsize,
}

impl FakeNetwork {
    fn serving(urls: &[url::Url]) -> Self {
        let network = Self::default();
        for url in urls {
            network.respond(url, 200, format!("asset {}", url.path()));
        }
        network
    }

    pub fn respond(&self, url: &url::Url, status: u16, body: impl Into<Bytes>) {
        self.routes.lock().unwrap().insert(url.to_string(), (status, body.into()));
    }

    pub fn fail(&self, url: &url::Url) {
        self.failing.lock().unwrap().insert(url.to_string());
    }

    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Network for FakeNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let url = request.url.to_string();

        if self.offline.load(Ordering::SeqCst) || self.failing.lock().unwrap().contains(&url) {
            return Err(Error::Network(format!("connection refused: {url}")));
        }
        match self.routes.lock().unwrap().get(&url) {
            Some((status, body)) => Ok(Response::new(url.clone(), *status, body.clone())),
            None => Err(Error::Network(format!("no route to {url}"))),
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    shown: Mutex<Vec<Notification>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn shown(&self) -> Vec<Notification> {
        self.shown.lock().unwrap().clone()
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn show_notification(&self, notification: Notification) -> Result<(), Error> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::NotificationFailed("permission revoked".into()));
        }
        self.shown.lock().unwrap().push(notification);
        Ok(())
    }
}

#[derive(Default)]
pub struct CountingClients {
    claims: AtomicUsize,
    failing: AtomicBool,
}

impl CountingClients {
    /// Successful claims so far.
    pub fn claims(&self) -> usize {
        self.claims.load(Ordering::SeqCst)
    }

    pub fn fail_claims(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Clients for CountingClients {
    async fn claim(&self) -> Result<(), Error> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::InvalidInput("no controllable clients".into()));
        }
        self.claims.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct Harness {
    pub ctx: WorkerContext,
    pub network: Arc<FakeNetwork>,
    pub notifier: Arc<RecordingNotifier>,
    pub clients: Arc<CountingClients>,
}

impl Harness {
    /// A worker context over an empty in-memory cache and a reachable origin.
    pub async fn online() -> Self {
        Self::build(true).await
    }

    /// Like [`Harness::online`], but install leaves the worker waiting.
    pub async fn waiting() -> Self {
        Self::build(false).await
    }

    async fn build(skip_waiting: bool) -> Self {
        let app = AppConfig { origin: ORIGIN.into(), ..Default::default() };
        let mut config = WorkerConfig::from_app(&app).unwrap();
        config.skip_waiting = skip_waiting;

        let network = Arc::new(FakeNetwork::serving(&config.precache));
        let notifier = Arc::new(RecordingNotifier::default());
        let clients = Arc::new(CountingClients::default());
        let cache = CacheDb::open_in_memory().await.unwrap();

        let ctx = WorkerContext::new(config, cache, network.clone(), notifier.clone(), clients.clone());
        Self { ctx, network, notifier, clients }
    }
}
