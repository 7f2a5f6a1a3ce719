//! Connected pages as the router sees them.
//!
//! The router posts background-sync outcomes to pages, shows push
//! notifications and focuses or opens windows. `RecordingClients` keeps
//! everything in memory so a host can relay it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use url::Url;
use windhelm_core::Error;

/// Message type posted after a queued form submission is retried.
pub const FORM_SUBMITTED: &str = "FORM_SUBMITTED";

/// Message posted to every connected page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub success: bool,
    pub id: i64,
}

impl ClientMessage {
    pub fn form_submitted(id: i64, success: bool) -> Self {
        Self { kind: FORM_SUBMITTED.to_string(), success, id }
    }
}

/// A notification shown in response to a push message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: Option<String>,
    pub icon: String,
    pub badge: String,
    /// URL to focus or open when the notification is clicked.
    pub data: Option<String>,
}

/// Pages, notifications and windows controlled by the router.
#[async_trait]
pub trait Clients: Send + Sync {
    /// Post a message to every connected page.
    async fn post_message(&self, message: &ClientMessage);

    /// Display a notification.
    async fn show_notification(&self, notification: &Notification) -> Result<(), Error>;

    /// Dismiss a notification.
    async fn close_notification(&self, notification: &Notification);

    /// Focus a window already showing `url`, or open a new one.
    async fn focus_or_open(&self, url: &Url) -> Result<(), Error>;
}

/// Entries kept per list by `RecordingClients::new`.
pub const DEFAULT_LOG_CAPACITY: usize = 256;

/// The most recent things the router asked the pages to do, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientLog {
    pub messages: Vec<ClientMessage>,
    pub notifications: Vec<Notification>,
    pub closed: Vec<Notification>,
    /// Open windows in the order they were opened.
    pub windows: Vec<String>,
    /// Every focus-or-open target, including ones that focused an existing window.
    pub focused: Vec<String>,
}

/// In-memory `Clients` that records every interaction.
///
/// Each list keeps at most `capacity` entries; older ones are dropped.
#[derive(Debug)]
pub struct RecordingClients {
    log: Mutex<ClientLog>,
    capacity: usize,
}

impl Default for RecordingClients {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingClients {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { log: Mutex::new(ClientLog::default()), capacity: capacity.max(1) }
    }

    /// Copy of everything recorded so far.
    pub async fn snapshot(&self) -> ClientLog {
        self.log.lock().await.clone()
    }
}

fn keep_last<T>(list: &mut Vec<T>, item: T, capacity: usize) {
    if list.len() >= capacity {
        list.drain(..=list.len() - capacity);
    }
    list.push(item);
}

#[async_trait]
impl Clients for RecordingClients {
    async fn post_message(&self, message: &ClientMessage) {
        tracing::debug!(kind = %message.kind, id = message.id, success = message.success, "posting message to clients");
        keep_last(&mut self.log.lock().await.messages, message.clone(), self.capacity);
    }

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error> {
        tracing::info!(title = %notification.title, "showing notification");
        keep_last(&mut self.log.lock().await.notifications, notification.clone(), self.capacity);
        Ok(())
    }

    async fn close_notification(&self, notification: &Notification) {
        keep_last(&mut self.log.lock().await.closed, notification.clone(), self.capacity);
    }

    async fn focus_or_open(&self, url: &Url) -> Result<(), Error> {
        let mut log = self.log.lock().await;
        let target = url.to_string();
        if !log.windows.contains(&target) {
            tracing::info!(url = %target, "opening window");
            keep_last(&mut log.windows, target.clone(), self.capacity);
        }
        keep_last(&mut log.focused, target, self.capacity);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_shape() {
        let message = ClientMessage::form_submitted(7, true);
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json, serde_json::json!({"type": "FORM_SUBMITTED", "success": true, "id": 7}));
    }

    #[tokio::test]
    async fn test_focus_existing_window_does_not_reopen() {
        let clients = RecordingClients::new();
        let url = Url::parse("http://localhost:3000/news").unwrap();
        clients.focus_or_open(&url).await.unwrap();
        clients.focus_or_open(&url).await.unwrap();

        let log = clients.snapshot().await;
        assert_eq!(log.windows, vec!["http://localhost:3000/news".to_string()]);
        assert_eq!(log.focused.len(), 2);
    }

    #[tokio::test]
    async fn test_log_keeps_only_recent_entries() {
        let clients = RecordingClients::with_capacity(2);
        for title in ["a", "b", "c"] {
            let notification = Notification {
                title: title.into(),
                body: None,
                icon: String::new(),
                badge: String::new(),
                data: None,
            };
            clients.show_notification(&notification).await.unwrap();
            clients.close_notification(&notification).await;
        }
        for id in 0..5 {
            clients.post_message(&ClientMessage::form_submitted(id, true)).await;
        }

        let log = clients.snapshot().await;
        let titles: Vec<_> = log.notifications.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "c"]);
        assert_eq!(log.closed.len(), 2);
        assert_eq!(log.messages.iter().map(|m| m.id).collect::<Vec<_>>(), vec![3, 4]);
    }

    #[tokio::test]
    async fn test_windows_are_bounded() {
        let clients = RecordingClients::with_capacity(1);
        for path in ["/a", "/b"] {
            let url = Url::parse("http://localhost:3000").unwrap().join(path).unwrap();
            clients.focus_or_open(&url).await.unwrap();
        }

        let log = clients.snapshot().await;
        assert_eq!(log.windows, vec!["http://localhost:3000/b".to_string()]);
        assert_eq!(log.focused.len(), 1);
    }
}
