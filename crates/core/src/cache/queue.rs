//! Queue of form submissions awaiting background sync.
//!
//! The page enqueues a submission when its POST fails offline; the router
//! drains the queue when the sync trigger fires. Entries stay queued until a
//! retry succeeds.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;

/// A queued form POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PendingSubmission {
    pub id: i64,
    pub url: String,
    pub body: Vec<u8>,
    pub content_type: Option<String>,
    pub queued_at: String,
    pub attempts: u32,
    pub last_error: Option<String>,
}

impl CacheDb {
    /// Queue a submission and return its id.
    pub async fn enqueue_submission(&self, url: &str, body: &[u8], content_type: Option<&str>) -> Result<i64, Error> {
        let url = url.to_string();
        let body = body.to_vec();
        let content_type = content_type.map(str::to_string);
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<i64, Error> {
                conn.execute(
                    "INSERT INTO pending_submissions (url, body, content_type, queued_at) VALUES (?1, ?2, ?3, ?4)",
                    params![url, body, content_type, now],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(Error::from)
    }

    /// All queued submissions, oldest first.
    pub async fn pending_submissions(&self) -> Result<Vec<PendingSubmission>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<PendingSubmission>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT id, url, body, content_type, queued_at, attempts, last_error
                     FROM pending_submissions ORDER BY id",
                )?;
                let pending = stmt
                    .query_map([], |row| {
                        Ok(PendingSubmission {
                            id: row.get(0)?,
                            url: row.get(1)?,
                            body: row.get(2)?,
                            content_type: row.get(3)?,
                            queued_at: row.get(4)?,
                            attempts: row.get(5)?,
                            last_error: row.get(6)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(pending)
            })
            .await
            .map_err(Error::from)
    }

    /// Remove a submission after it was delivered.
    ///
    /// Returns false if the id was not queued.
    pub async fn remove_submission(&self, id: i64) -> Result<bool, Error> {
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let removed = conn.execute("DELETE FROM pending_submissions WHERE id = ?1", params![id])?;
                Ok(removed > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Record a failed delivery attempt, keeping the submission queued.
    pub async fn record_submission_failure(&self, id: i64, reason: &str) -> Result<(), Error> {
        let reason = reason.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "UPDATE pending_submissions SET attempts = attempts + 1, last_error = ?2 WHERE id = ?1",
                    params![id, reason],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}
