//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use crate::tools::cache::list_impl;
use crate::tools::sw_fetch::{SwFetchParams, fetch_impl};
use crate::tools::sw_lifecycle::{activate_impl, install_impl, status_impl};
use crate::tools::sw_push::{SwNotificationClickParams, SwPushParams, click_impl, push_impl};
use crate::tools::sw_sync::{SwSyncParams, SyncEnqueueParams, enqueue_impl, sync_impl};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use windhelm_client::CacheRouter;

/// The main MCP server handler for windhelm-sw.
#[derive(Clone)]
pub struct WindhelmServer {
    router: CacheRouter,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl WindhelmServer {
    /// Create a new server handler around a router.
    pub fn new(router: CacheRouter) -> Self {
        Self { router, tool_router: Self::tool_router() }
    }

    #[tool(description = "Run the install event: open the static store and precache the asset manifest.")]
    async fn sw_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.router).await
    }

    #[tool(description = "Run the activate event: delete every cache store not current for this version.")]
    async fn sw_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.router).await
    }

    /// Send a page request through the fetch handler.
    ///
    /// Reports the asset class, the strategy's response source and whether
    /// the cache was written.
    #[tool(description = "Send a request through the cache router as a page would. Returns the served response.")]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.router, params.0).await
    }

    #[tool(description = "Fire a background-sync trigger. The configured tag replays queued form submissions.")]
    async fn sw_sync(&self, params: Parameters<SwSyncParams>) -> Result<CallToolResult, McpError> {
        sync_impl(&self.router, params.0).await
    }

    #[tool(description = "Queue a form submission for the next background sync.")]
    async fn sync_enqueue(&self, params: Parameters<SyncEnqueueParams>) -> Result<CallToolResult, McpError> {
        enqueue_impl(&self.router, params.0).await
    }

    #[tool(description = "Deliver a push message. A JSON payload {title, body?, url?} shows a notification.")]
    async fn sw_push(&self, params: Parameters<SwPushParams>) -> Result<CallToolResult, McpError> {
        push_impl(&self.router, params.0).await
    }

    #[tool(description = "Click a notification: close it and focus or open the window for its URL.")]
    async fn sw_notification_click(
        &self, params: Parameters<SwNotificationClickParams>,
    ) -> Result<CallToolResult, McpError> {
        click_impl(&self.router, params.0).await
    }

    #[tool(description = "Report the worker lifecycle state, current store names and queued submissions.")]
    async fn sw_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.router).await
    }

    #[tool(description = "List cache stores with entry counts and sizes.")]
    async fn cache_list(&self) -> Result<CallToolResult, McpError> {
        list_impl(&self.router).await
    }
}

impl ServerHandler for WindhelmServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "windhelm-sw".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
