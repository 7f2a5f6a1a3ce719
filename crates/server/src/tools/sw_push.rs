//! sw_push and sw_notification_click tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use windhelm_client::{CacheRouter, Notification};
use windhelm_core::Error;

use super::json_result;

/// Parameters for the sw_push tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwPushParams {
    /// JSON payload `{"title", "body"?, "url"?}`. Omit for an empty push.
    #[serde(default)]
    pub payload: Option<String>,
}

/// Output from the sw_push tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwPushOutput {
    /// The notification shown, if the payload produced one.
    pub notification: Option<Notification>,
}

/// Parameters for the sw_notification_click tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwNotificationClickParams {
    /// Title of the clicked notification.
    pub title: String,

    /// URL the notification carries, if any.
    #[serde(default)]
    pub url: Option<String>,
}

/// Output from the sw_notification_click tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwNotificationClickOutput {
    /// The window focused or opened.
    pub opened: Option<String>,
}

/// Implementation of the sw_push tool.
pub async fn push_impl(router: &CacheRouter, params: SwPushParams) -> Result<CallToolResult, McpError> {
    let notification = router.push(params.payload.as_deref().map(str::as_bytes)).await;
    json_result(&SwPushOutput { notification })
}

/// Implementation of the sw_notification_click tool.
pub async fn click_impl(router: &CacheRouter, params: SwNotificationClickParams) -> Result<CallToolResult, McpError> {
    if params.title.trim().is_empty() {
        return Err(Error::InvalidInput("title cannot be empty".into()).into());
    }

    let icon = router.config().notification_icon.to_string();
    let notification = Notification { title: params.title, body: None, icon: icon.clone(), badge: icon, data: params.url };

    let opened = router.notification_click(&notification).await.map(|url| url.to_string());
    json_result(&SwNotificationClickOutput { opened })
}
