//! Push messages and notification clicks.

use serde::Deserialize;
use url::Url;

use super::CacheRouter;
use super::clients::Notification;
use crate::fetch::resolve;

#[derive(Debug, Deserialize)]
struct PushPayload {
    title: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl CacheRouter {
    /// Show a notification built from a JSON push payload `{title, body?, url?}`.
    ///
    /// Returns the notification shown, or `None` for an empty or unreadable payload.
    pub async fn push(&self, payload: Option<&[u8]>) -> Option<Notification> {
        let payload = payload.filter(|p| !p.is_empty())?;

        let data: PushPayload = match serde_json::from_slice(payload) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("dropping push with unreadable payload: {}", e);
                return None;
            }
        };

        let icon = self.config.notification_icon.to_string();
        let notification =
            Notification { title: data.title, body: data.body, icon: icon.clone(), badge: icon, data: data.url };

        match self.clients.show_notification(&notification).await {
            Ok(()) => Some(notification),
            Err(e) => {
                tracing::warn!("could not show notification: {}", e);
                None
            }
        }
    }

    /// Close the notification and focus or open the window it points at.
    pub async fn notification_click(&self, notification: &Notification) -> Option<Url> {
        self.clients.close_notification(notification).await;

        let target = notification.data.as_deref()?;
        let url = match resolve(&self.config.origin, target) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("notification carries unusable url {:?}: {}", target, e);
                return None;
            }
        };

        match self.clients.focus_or_open(&url).await {
            Ok(()) => Some(url),
            Err(e) => {
                tracing::warn!("could not open {}: {}", url, e);
                None
            }
        }
    }
}
