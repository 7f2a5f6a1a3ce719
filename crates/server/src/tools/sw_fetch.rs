//! sw_fetch tool implementation.
//!
//! Sends one request through the router's fetch handler, as a page would,
//! and reports which strategy served it.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;
use windhelm_client::{AssetClass, CacheRouter, FetchOutcome, Request, ResponseSource};
use windhelm_core::Error;

use super::{json_result, resolve_param};

/// Input parameters for sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// Absolute URL, or a path relative to the site origin.
    pub url: String,

    /// HTTP method (default: GET). Only GET requests are intercepted.
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwFetchOutput {
    /// The resolved request URL.
    pub url: String,
    /// False when the router left the request to the page.
    pub intercepted: bool,
    pub class: Option<AssetClass>,
    pub source: Option<ResponseSource>,
    pub status: Option<u16>,
    pub status_text: Option<String>,
    pub content_type: Option<String>,
    /// Response body, lossily decoded as UTF-8.
    pub body: Option<String>,
    pub network_fetches: u8,
    /// Store written by this request, if any.
    pub cache_write: Option<String>,
}

/// Implementation of the sw_fetch tool.
pub async fn fetch_impl(router: &CacheRouter, params: SwFetchParams) -> Result<CallToolResult, McpError> {
    let method = params.method.trim().to_ascii_uppercase();
    if method.is_empty() {
        return Err(Error::InvalidInput("method cannot be empty".into()).into());
    }

    // Absolute URLs go to the router untouched so it can decline foreign schemes.
    let url = match Url::parse(params.url.trim()) {
        Ok(url) => url,
        Err(_) => resolve_param(router, "url", &params.url)?,
    };
    let request = Request { method, url: url.clone(), body: None, content_type: None };

    let output = match router.respond_with(request).await {
        FetchOutcome::PassThrough => SwFetchOutput {
            url: url.to_string(),
            intercepted: false,
            class: None,
            source: None,
            status: None,
            status_text: None,
            content_type: None,
            body: None,
            network_fetches: 0,
            cache_write: None,
        },
        FetchOutcome::Handled(handled) => SwFetchOutput {
            url: url.to_string(),
            intercepted: true,
            class: Some(handled.class),
            source: Some(handled.source),
            status: Some(handled.response.status),
            content_type: handled.response.header("content-type").map(String::from),
            body: Some(handled.response.text()),
            status_text: Some(handled.response.status_text),
            network_fetches: handled.network_fetches,
            cache_write: handled.cache_write,
        },
    };

    json_result(&output)
}
