//! sw_sync and sync_enqueue tool implementations.
//!
//! `sync_enqueue` plays the page that queued a form POST while offline;
//! `sw_sync` fires the background-sync trigger and reports what it delivered.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use windhelm_client::{CacheRouter, SyncReport};
use windhelm_core::Error;

use super::{json_result, resolve_param};

/// Parameters for the sw_sync tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwSyncParams {
    /// The sync tag that fired. Only the configured tag drains the queue.
    pub tag: String,
}

/// Output from the sw_sync tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwSyncOutput {
    pub tag: String,
    /// `None` when the tag is not the router's.
    pub report: Option<SyncReport>,
}

/// Parameters for the sync_enqueue tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SyncEnqueueParams {
    /// URL or origin-relative path the form posts to.
    pub url: String,

    /// Request body to replay.
    pub body: String,

    /// Content-Type of the body.
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Output from the sync_enqueue tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncEnqueueOutput {
    /// Id of the queued submission.
    pub id: i64,
    pub url: String,
}

/// Implementation of the sw_sync tool.
pub async fn sync_impl(router: &CacheRouter, params: SwSyncParams) -> Result<CallToolResult, McpError> {
    if params.tag.trim().is_empty() {
        return Err(Error::InvalidInput("tag cannot be empty".into()).into());
    }

    let report = router.background_sync(&params.tag).await;
    json_result(&SwSyncOutput { tag: params.tag, report })
}

/// Implementation of the sync_enqueue tool.
pub async fn enqueue_impl(router: &CacheRouter, params: SyncEnqueueParams) -> Result<CallToolResult, McpError> {
    let url = resolve_param(router, "url", &params.url)?;
    let id = router
        .db()
        .enqueue_submission(url.as_str(), params.body.as_bytes(), params.content_type.as_deref())
        .await?;

    tracing::info!(id, url = %url, "queued submission for background sync");
    json_result(&SyncEnqueueOutput { id, url: url.to_string() })
}
