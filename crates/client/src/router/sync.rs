//! Background sync of queued form submissions.

use serde::{Deserialize, Serialize};
use windhelm_core::{Error, PendingSubmission};

use super::CacheRouter;
use super::clients::ClientMessage;
use crate::fetch::{Request, resolve};

/// Submission ids delivered and still queued after one sync pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub delivered: Vec<i64>,
    pub retained: Vec<i64>,
    /// Messages this pass posted to the pages, in order.
    pub messages: Vec<ClientMessage>,
}

impl CacheRouter {
    /// Drain the submission queue if `tag` is the configured sync tag.
    ///
    /// Each submission is POSTed once. Delivered ones leave the queue; failed
    /// ones stay for the next trigger. Every outcome is posted to the pages.
    /// Returns `None` for any other tag.
    pub async fn background_sync(&self, tag: &str) -> Option<SyncReport> {
        if tag != self.config.sync_tag {
            tracing::debug!(tag, "ignoring sync for unknown tag");
            return None;
        }

        let mut report = SyncReport::default();
        let pending = match self.db.pending_submissions().await {
            Ok(pending) => pending,
            Err(e) => {
                tracing::warn!("background sync error: {}", e);
                return Some(report);
            }
        };

        tracing::info!(tag, count = pending.len(), "replaying queued submissions");
        for submission in pending {
            let id = submission.id;
            let delivered = match self.deliver(&submission).await {
                Ok(()) => {
                    report.delivered.push(id);
                    true
                }
                Err(e) => {
                    tracing::warn!(id, "background sync failed for submission: {}", e);
                    if let Err(e) = self.db.record_submission_failure(id, &e.to_string()).await {
                        tracing::warn!(id, "could not record sync failure: {}", e);
                    }
                    report.retained.push(id);
                    false
                }
            };

            let message = ClientMessage::form_submitted(id, delivered);
            self.clients.post_message(&message).await;
            report.messages.push(message);
        }

        Some(report)
    }

    async fn deliver(&self, submission: &PendingSubmission) -> Result<(), Error> {
        let url = resolve(&self.config.origin, &submission.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let request = Request::post(url, submission.body.clone(), submission.content_type.clone());

        let response = self.network.fetch(&request).await?;
        if !response.is_ok() {
            return Err(Error::HttpError(format!("status {}", response.status)));
        }

        // Delivered; a failed delete only means a duplicate POST on the next sync.
        if let Err(e) = self.db.remove_submission(submission.id).await {
            tracing::warn!(id = submission.id, "could not dequeue delivered submission: {}", e);
        }
        Ok(())
    }
}
