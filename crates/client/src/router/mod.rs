//! The offline cache router.
//!
//! ### Events
//! - `CacheRouter::dispatch` routes each lifecycle event (install, activate,
//!   fetch, sync, push, notification click) to its handler.
//! - Handlers never fail outward: errors are logged and folded into the
//!   returned `EventOutcome`.
//!
//! ### Fetch pipeline
//! - classify → lookup → fetch → store → respond.
//! - One strategy per request, at most one network fetch and at most one
//!   cache write; `Handled` reports both so callers can check.
//!
//! ### Stores
//! - Two stores are current per version tag: static and dynamic.
//! - Activation deletes every other store.

pub mod classify;
pub mod clients;
pub mod config;
pub mod lifecycle;
pub mod push;
pub mod strategy;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use windhelm_core::{CacheDb, CachedResponse};

use crate::fetch::{Network, Request, is_interceptable};

pub use classify::{AssetClass, classify};
pub use clients::{ClientLog, ClientMessage, Clients, FORM_SUBMITTED, Notification, RecordingClients};
pub use config::RouterConfig;
pub use lifecycle::{ActivateReport, AssetFailure, InstallReport};
pub use strategy::{Handled, ResponseSource};
pub use sync::SyncReport;

/// Lifecycle state of the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
}

/// An event delivered to the router.
#[derive(Debug, Clone)]
pub enum Event {
    Install,
    Activate,
    Fetch(Request),
    Sync { tag: String },
    Push { payload: Option<Vec<u8>> },
    NotificationClick { notification: Notification },
}

/// Discriminant of `Event`, used as the dispatch key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Install,
    Activate,
    Fetch,
    Sync,
    Push,
    NotificationClick,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Install => EventKind::Install,
            Event::Activate => EventKind::Activate,
            Event::Fetch(_) => EventKind::Fetch,
            Event::Sync { .. } => EventKind::Sync,
            Event::Push { .. } => EventKind::Push,
            Event::NotificationClick { .. } => EventKind::NotificationClick,
        }
    }
}

/// Result of a fetch event.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// Not intercepted: the page's default network handling applies.
    PassThrough,
    Handled(Handled),
}

impl FetchOutcome {
    /// The response served by the router, if it intercepted the request.
    pub fn response(&self) -> Option<&CachedResponse> {
        match self {
            FetchOutcome::PassThrough => None,
            FetchOutcome::Handled(handled) => Some(&handled.response),
        }
    }
}

/// What handling an event produced.
#[derive(Debug, Clone)]
pub enum EventOutcome {
    Installed(InstallReport),
    Activated(ActivateReport),
    Fetched(FetchOutcome),
    /// `None` when the sync tag is not ours.
    Synced(Option<SyncReport>),
    /// `None` when the push carried no usable payload.
    Pushed(Option<Notification>),
    /// The window focused or opened, if the notification carried a URL.
    Clicked(Option<url::Url>),
    /// The handler hit an error it could not fold into a report.
    Failed { kind: EventKind, reason: String },
}

/// Routes page requests and lifecycle events through the cache stores.
///
/// Cheap to clone; clones share the stores, network and clients.
#[derive(Clone)]
pub struct CacheRouter {
    config: Arc<RouterConfig>,
    db: CacheDb,
    network: Arc<dyn Network>,
    clients: Arc<dyn Clients>,
    state: Arc<RwLock<WorkerState>>,
}

impl CacheRouter {
    pub fn new(config: RouterConfig, db: CacheDb, network: Arc<dyn Network>, clients: Arc<dyn Clients>) -> Self {
        Self { config: Arc::new(config), db, network, clients, state: Arc::new(RwLock::new(WorkerState::Parsed)) }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    async fn set_state(&self, state: WorkerState) {
        *self.state.write().await = state;
        tracing::info!(?state, version = %self.config.names.static_name, "worker state changed");
    }

    /// Handle one event to completion.
    pub async fn dispatch(&self, event: Event) -> EventOutcome {
        let kind = event.kind();
        tracing::debug!(?kind, "dispatching event");

        match event {
            Event::Install => EventOutcome::Installed(self.install().await),
            Event::Activate => match self.activate().await {
                Ok(report) => EventOutcome::Activated(report),
                Err(e) => {
                    tracing::warn!("activation failed: {}", e);
                    EventOutcome::Failed { kind, reason: e.to_string() }
                }
            },
            Event::Fetch(request) => EventOutcome::Fetched(self.respond_with(request).await),
            Event::Sync { tag } => EventOutcome::Synced(self.background_sync(&tag).await),
            Event::Push { payload } => EventOutcome::Pushed(self.push(payload.as_deref()).await),
            Event::NotificationClick { notification } => {
                EventOutcome::Clicked(self.notification_click(&notification).await)
            }
        }
    }

    /// Serve a request on its own task.
    ///
    /// The handler keeps running if the caller stops waiting, so a page that
    /// goes away mid-request still leaves the cache write in place.
    pub async fn respond_with(&self, request: Request) -> FetchOutcome {
        let router = self.clone();
        let url = request.url.to_string();
        match tokio::spawn(async move { router.handle_fetch(request).await }).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("fetch handler for {} aborted: {}", url, e);
                FetchOutcome::Handled(Handled::synthetic(
                    AssetClass::Dynamic,
                    CachedResponse::unavailable(url, "Offline"),
                    0,
                ))
            }
        }
    }

    /// Classify a request and run its strategy.
    pub async fn handle_fetch(&self, request: Request) -> FetchOutcome {
        if !request.is_get() || !is_interceptable(&request.url) {
            tracing::debug!(method = %request.method, url = %request.url, "not intercepted");
            return FetchOutcome::PassThrough;
        }

        let class = classify(&request.url, &self.config);
        tracing::debug!(url = %request.url, class = class.as_str(), "classified request");

        let handled = match class {
            AssetClass::StaticListed => self.cache_first(&request, class, "Offline").await,
            AssetClass::Font => self.cache_first(&request, class, "Font unavailable").await,
            AssetClass::Image => self.cache_first_image(&request).await,
            AssetClass::Dynamic => self.network_first(&request).await,
        };

        FetchOutcome::Handled(handled)
    }
}
