//! sw_install, sw_activate and sw_status tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use serde::{Deserialize, Serialize};
use windhelm_client::{CacheRouter, WorkerState};
use windhelm_core::CacheNames;
use windhelm_core::cache::StoreStats;

use super::json_result;

/// Output from the sw_status tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwStatusOutput {
    /// Current lifecycle state.
    pub state: WorkerState,
    /// The two store names current for this version.
    pub current: CacheNames,
    /// Every store on disk, oldest first.
    pub stores: Vec<StoreStats>,
    /// Number of queued form submissions.
    pub pending_submissions: usize,
}

/// Implementation of the sw_install tool.
pub async fn install_impl(router: &CacheRouter) -> Result<CallToolResult, McpError> {
    let report = router.install().await;
    json_result(&report)
}

/// Implementation of the sw_activate tool.
pub async fn activate_impl(router: &CacheRouter) -> Result<CallToolResult, McpError> {
    let report = router.activate().await?;
    json_result(&report)
}

/// Implementation of the sw_status tool.
pub async fn status_impl(router: &CacheRouter) -> Result<CallToolResult, McpError> {
    let output = SwStatusOutput {
        state: router.state().await,
        current: router.config().names.clone(),
        stores: router.db().store_stats().await?,
        pending_submissions: router.db().pending_submissions().await?.len(),
    };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::super::testing::{offline_router, output};
    use super::*;
    use windhelm_client::{ActivateReport, InstallReport};

    #[tokio::test]
    async fn test_install_offline_reports_failures() {
        let (router, _) = offline_router().await;

        let result = install_impl(&router).await.unwrap();
        let report: InstallReport = output(&result);
        assert_eq!(report.store, "windhelm-static-v1.3");
        assert!(report.cached.is_empty());
        assert_eq!(report.failed.len(), 3);
    }

    #[tokio::test]
    async fn test_activate_then_status() {
        let (router, _) = offline_router().await;
        router.db().open_store("windhelm-static-v1.2").await.unwrap();
        install_impl(&router).await.unwrap();

        let result = activate_impl(&router).await.unwrap();
        let report: ActivateReport = output(&result);
        assert_eq!(report.deleted, vec!["windhelm-static-v1.2".to_string()]);

        let status: SwStatusOutput = output(&status_impl(&router).await.unwrap());
        assert_eq!(status.state, WorkerState::Activated);
        assert_eq!(status.current.dynamic_name, "windhelm-dynamic-v1.3");
        assert_eq!(status.stores.len(), 1);
        assert_eq!(status.pending_submissions, 0);
    }

    #[tokio::test]
    async fn test_status_before_install() {
        let (router, _) = offline_router().await;
        let status: SwStatusOutput = output(&status_impl(&router).await.unwrap());
        assert_eq!(status.state, WorkerState::Parsed);
        assert!(status.stores.is_empty());
    }
}
