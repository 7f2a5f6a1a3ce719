//! Install and activate.
//!
//! Install precaches the static manifest; a failed asset is reported and
//! left to the network at request time. Activate drops every store that is
//! not current for this version tag.

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use windhelm_core::Error;

use super::{CacheRouter, WorkerState};
use crate::fetch::Request;

/// A manifest asset that could not be precached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetFailure {
    pub url: String,
    pub reason: String,
}

/// Outcome of precaching the static manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallReport {
    pub store: String,
    pub cached: Vec<String>,
    pub failed: Vec<AssetFailure>,
}

/// Stores removed and kept on activation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivateReport {
    pub deleted: Vec<String>,
    pub kept: Vec<String>,
}

impl CacheRouter {
    /// Open the static store and precache every manifest asset.
    ///
    /// Never fails: errors land in `InstallReport::failed` and the worker
    /// moves on to `Installed` regardless.
    pub async fn install(&self) -> InstallReport {
        self.set_state(WorkerState::Installing).await;
        let store = &self.config.names.static_name;
        let mut report = InstallReport { store: store.clone(), ..Default::default() };

        if let Err(e) = self.db.open_store(store).await {
            tracing::warn!("could not open {}: {}", store, e);
        }

        tracing::info!(count = self.config.static_assets.len(), "caching static assets");
        let store_name = store.as_str();
        let results = join_all(self.config.static_assets.iter().map(|url| async move {
            let request = Request::get(url.clone());
            let outcome = self.precache(store_name, &request).await;
            (url.to_string(), outcome)
        }))
        .await;

        for (url, outcome) in results {
            match outcome {
                Ok(()) => report.cached.push(url),
                Err(e) => {
                    tracing::warn!("error caching static asset {}: {}", url, e);
                    report.failed.push(AssetFailure { url, reason: e.to_string() });
                }
            }
        }

        self.set_state(WorkerState::Installed).await;
        report
    }

    async fn precache(&self, store: &str, request: &Request) -> Result<(), Error> {
        let response = self.network.fetch(request).await?;
        if !response.is_ok() {
            return Err(Error::HttpError(format!("status {}", response.status)));
        }
        self.db.put(store, &request.method, request.url.as_str(), &response).await
    }

    /// Delete every store that is not one of the two current names.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store names cannot be listed; a store
    /// that fails to delete is logged and kept in the report.
    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        self.set_state(WorkerState::Activating).await;
        let mut report = ActivateReport::default();

        for name in self.db.store_names().await? {
            if self.config.names.is_current(&name) {
                report.kept.push(name);
                continue;
            }

            tracing::info!("deleting old cache {}", name);
            match self.db.delete_store(&name).await {
                Ok(_) => report.deleted.push(name),
                Err(e) => {
                    tracing::warn!("could not delete cache {}: {}", name, e);
                    report.kept.push(name);
                }
            }
        }

        self.set_state(WorkerState::Activated).await;
        Ok(report)
    }
}
