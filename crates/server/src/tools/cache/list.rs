//! cache_list tool implementation.
//!
//! Lists every cache store with its entry count and size.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use serde::{Deserialize, Serialize};
use windhelm_client::CacheRouter;
use windhelm_core::cache::StoreStats;

use crate::tools::json_result;

/// One store as reported by cache_list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreEntry {
    #[serde(flatten)]
    pub stats: StoreStats,
    /// Whether activation would keep this store.
    pub current: bool,
}

/// Output from the cache_list tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheListOutput {
    pub stores: Vec<StoreEntry>,
    /// Total bytes across all stores.
    pub total_bytes: u64,
}

/// Implementation of the cache_list tool.
pub async fn list_impl(router: &CacheRouter) -> Result<CallToolResult, McpError> {
    let names = &router.config().names;
    let stores: Vec<StoreEntry> = router
        .db()
        .store_stats()
        .await?
        .into_iter()
        .map(|stats| StoreEntry { current: names.is_current(&stats.name), stats })
        .collect();
    let total_bytes = stores.iter().map(|s| s.stats.bytes).sum();

    json_result(&CacheListOutput { stores, total_bytes })
}
