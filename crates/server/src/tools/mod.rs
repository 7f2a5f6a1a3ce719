//! MCP tool implementations.
//!
//! This module contains all tools exposed by the windhelm-sw server. Each
//! tool drives one router event or inspects the stores, and answers with a
//! pretty-printed JSON document.

pub mod cache;
pub mod sw_fetch;
pub mod sw_lifecycle;
pub mod sw_push;
pub mod sw_sync;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;
use url::Url;
use windhelm_client::CacheRouter;
use windhelm_client::fetch::resolve;
use windhelm_core::Error;

/// Serialize a tool output as the single text content of a successful result.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json =
        serde_json::to_string_pretty(output).map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Resolve a tool-supplied URL or path against the router's origin.
pub(crate) fn resolve_param(router: &CacheRouter, field: &str, input: &str) -> Result<Url, Error> {
    if input.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{field} cannot be empty")));
    }
    resolve(&router.config().origin, input).map_err(|e| Error::InvalidUrl(format!("{field}: {e}")))
}
