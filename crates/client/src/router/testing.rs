//! Scripted network and router harness for router tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use url::Url;
use windhelm_core::{AppConfig, CacheDb, CacheNames, CachedResponse, Error};

use super::{CacheRouter, ClientMessage, Clients, Notification, RecordingClients, RouterConfig};
use crate::fetch::{Network, Request, resolve};

/// 200 response with `body`.
pub(crate) fn ok(body: &str) -> CachedResponse {
    CachedResponse::new("", 200, body)
}

/// 200 response declaring `length` bytes in `content-length`.
pub(crate) fn ok_with_length(body: &str, length: u64) -> CachedResponse {
    CachedResponse::new("", 200, body).with_header("content-length", length.to_string())
}

#[derive(Clone)]
struct Script {
    response: CachedResponse,
    delay: Option<Duration>,
}

/// In-memory network answering from a per-URL script.
///
/// Unscripted URLs get a 404; `go_offline` makes every fetch fail.
pub(crate) struct ScriptedNetwork {
    origin: Url,
    scripts: Mutex<HashMap<String, Script>>,
    requests: Mutex<Vec<Request>>,
    offline: AtomicBool,
}

impl ScriptedNetwork {
    fn new(origin: Url) -> Self {
        Self {
            origin,
            scripts: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            offline: AtomicBool::new(false),
        }
    }

    fn key(&self, path: &str) -> String {
        resolve(&self.origin, path).expect("test path resolves").to_string()
    }

    pub(crate) async fn respond(&self, path: &str, response: CachedResponse) {
        let key = self.key(path);
        self.scripts.lock().await.insert(key, Script { response, delay: None });
    }

    pub(crate) async fn respond_after(&self, path: &str, response: CachedResponse, delay: Duration) {
        let key = self.key(path);
        self.scripts.lock().await.insert(key, Script { response, delay: Some(delay) });
    }

    pub(crate) fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub(crate) fn go_online(&self) {
        self.offline.store(false, Ordering::SeqCst);
    }

    pub(crate) async fn calls(&self) -> usize {
        self.requests.lock().await.len()
    }

    pub(crate) async fn requests(&self) -> Vec<Request> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &Request) -> Result<CachedResponse, Error> {
        self.requests.lock().await.push(request.clone());

        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::FetchFailed(format!("{}: network unreachable", request.url)));
        }

        let script = self.scripts.lock().await.get(request.url.as_str()).cloned();
        let Some(script) = script else {
            return Ok(CachedResponse::new(request.url.as_str(), 404, "not found"));
        };

        if let Some(delay) = script.delay {
            tokio::time::sleep(delay).await;
        }

        Ok(CachedResponse { url: request.url.to_string(), ..script.response })
    }
}

/// Clients that refuse every notification and window, as when permission is denied.
pub(crate) struct DeniedClients;

#[async_trait]
impl Clients for DeniedClients {
    async fn post_message(&self, _message: &ClientMessage) {}

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error> {
        Err(Error::NotifyFailed(format!("permission denied for {:?}", notification.title)))
    }

    async fn close_notification(&self, _notification: &Notification) {}

    async fn focus_or_open(&self, url: &Url) -> Result<(), Error> {
        Err(Error::NotifyFailed(format!("cannot open {url}")))
    }
}

/// A router wired to an in-memory database, scripted network and recording clients.
pub(crate) struct Harness {
    pub router: CacheRouter,
    pub db: CacheDb,
    pub network: Arc<ScriptedNetwork>,
    pub clients: Arc<RecordingClients>,
}

impl Harness {
    pub(crate) async fn new() -> Self {
        Self::with_app(AppConfig::default()).await
    }

    pub(crate) async fn with_app(app: AppConfig) -> Self {
        let db = CacheDb::open_in_memory().await.unwrap();
        Self::build(app, db)
    }

    pub(crate) async fn with_quota(app: AppConfig, quota_bytes: u64) -> Self {
        let db = CacheDb::open_in_memory().await.unwrap().with_quota(quota_bytes);
        Self::build(app, db)
    }

    /// A router for a different version tag sharing this harness's stores.
    pub(crate) fn upgraded(&self, version_tag: &str) -> CacheRouter {
        let app = AppConfig { version_tag: version_tag.into(), ..Default::default() };
        CacheRouter::new(
            RouterConfig::from_app(&app).unwrap(),
            self.db.clone(),
            self.network.clone(),
            self.clients.clone(),
        )
    }

    /// A router sharing this harness's stores and network but reporting to `clients`.
    pub(crate) fn with_clients(&self, clients: Arc<dyn Clients>) -> CacheRouter {
        CacheRouter::new(self.router.config().clone(), self.db.clone(), self.network.clone(), clients)
    }

    fn build(app: AppConfig, db: CacheDb) -> Self {
        let config = RouterConfig::from_app(&app).unwrap();
        let network = Arc::new(ScriptedNetwork::new(config.origin.clone()));
        let clients = Arc::new(RecordingClients::new());
        let router = CacheRouter::new(config, db.clone(), network.clone(), clients.clone());
        Self { router, db, network, clients }
    }

    pub(crate) fn url(&self, path: &str) -> Url {
        resolve(&self.router.config().origin, path).unwrap()
    }

    pub(crate) fn names(&self) -> CacheNames {
        self.router.config().names.clone()
    }
}
