//! Named cache store operations.
//!
//! Mirrors the browser cache-storage surface the router needs: open a store
//! by name, list and delete stores, put a response, and match a request
//! either within one store or across all of them.

use super::connection::CacheDb;
use super::hash::compute_cache_key;
use super::response::CachedResponse;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::OptionalExtension;

/// Entry count and stored bytes for one cache store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct StoreStats {
    pub name: String,
    pub entries: u64,
    pub bytes: u64,
    pub created_at: String,
}

type EntryRow = (String, u16, String, String, Vec<u8>);

fn into_response(row: EntryRow) -> Result<CachedResponse, Error> {
    let (url, status, status_text, headers_json, body) = row;
    let headers: Vec<(String, String)> = serde_json::from_str(&headers_json)?;
    Ok(CachedResponse { url, status, status_text, headers, body })
}

impl CacheDb {
    /// Create the named store if it doesn't exist yet.
    pub async fn open_store(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO cache_stores (name, created_at) VALUES (?1, ?2)",
                    params![name, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Names of all stores, oldest first.
    pub async fn store_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM cache_stores ORDER BY id")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a store and every entry in it.
    ///
    /// Returns false if no store had that name.
    pub async fn delete_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM cache_stores WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Store a response for `method url` in the named store.
    ///
    /// Opens the store if needed and replaces any previous entry for the same
    /// request (last write wins).
    ///
    /// # Errors
    ///
    /// Returns `Error::QuotaExceeded` if the write would push the store past
    /// its byte quota; the store is left unchanged.
    pub async fn put(&self, store: &str, method: &str, url: &str, response: &CachedResponse) -> Result<(), Error> {
        let store = store.to_string();
        let key_hash = compute_cache_key(method, url);
        let method = method.to_ascii_uppercase();
        let url = url.to_string();
        let headers_json = serde_json::to_string(&response.headers)?;
        let response = response.clone();
        let quota = self.quota_bytes;
        let now = chrono::Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT OR IGNORE INTO cache_stores (name, created_at) VALUES (?1, ?2)",
                    params![store, now],
                )?;

                if let Some(quota) = quota {
                    let used: i64 = tx.query_row(
                        "SELECT COALESCE(SUM(LENGTH(body)), 0) FROM cache_entries
                         WHERE store = ?1 AND key_hash != ?2",
                        params![store, key_hash],
                        |row| row.get(0),
                    )?;
                    let needed = used as u64 + response.body.len() as u64;
                    if needed > quota {
                        return Err(Error::QuotaExceeded(format!("{store}: {needed} bytes exceeds {quota}")));
                    }
                }

                tx.execute(
                    "INSERT INTO cache_entries (
                        store, key_hash, method, url, status, status_text, headers_json, body, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    ON CONFLICT(store, key_hash) DO UPDATE SET
                        method = excluded.method,
                        url = excluded.url,
                        status = excluded.status,
                        status_text = excluded.status_text,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![
                        store,
                        key_hash,
                        method,
                        url,
                        response.status,
                        response.status_text,
                        headers_json,
                        response.body,
                        now,
                    ],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up `method url` in one store.
    pub async fn match_in(&self, store: &str, method: &str, url: &str) -> Result<Option<CachedResponse>, Error> {
        let store = store.to_string();
        let key_hash = compute_cache_key(method, url);
        self.conn
            .call(move |conn| -> Result<Option<CachedResponse>, Error> {
                let row: Option<EntryRow> = conn
                    .query_row(
                        "SELECT url, status, status_text, headers_json, body
                         FROM cache_entries WHERE store = ?1 AND key_hash = ?2",
                        params![store, key_hash],
                        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
                    )
                    .optional()?;
                row.map(into_response).transpose()
            })
            .await
            .map_err(Error::from)
    }

    /// Look up `method url` across every store, oldest store first.
    pub async fn match_any(&self, method: &str, url: &str) -> Result<Option<CachedResponse>, Error> {
        let key_hash = compute_cache_key(method, url);
        self.conn
            .call(move |conn| -> Result<Option<CachedResponse>, Error> {
                let row: Option<EntryRow> = conn
                    .query_row(
                        "SELECT e.url, e.status, e.status_text, e.headers_json, e.body
                         FROM cache_entries e
                         JOIN cache_stores s ON s.name = e.store
                         WHERE e.key_hash = ?1
                         ORDER BY s.id
                         LIMIT 1",
                        params![key_hash],
                        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
                    )
                    .optional()?;
                row.map(into_response).transpose()
            })
            .await
            .map_err(Error::from)
    }

    /// Entry counts and sizes for every store, oldest first.
    pub async fn store_stats(&self) -> Result<Vec<StoreStats>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<StoreStats>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT s.name, COUNT(e.key_hash), COALESCE(SUM(LENGTH(e.body)), 0), s.created_at
                     FROM cache_stores s
                     LEFT JOIN cache_entries e ON e.store = s.name
                     GROUP BY s.id
                     ORDER BY s.id",
                )?;
                let stats = stmt
                    .query_map([], |row| {
                        Ok(StoreStats {
                            name: row.get(0)?,
                            entries: row.get::<_, i64>(1)? as u64,
                            bytes: row.get::<_, i64>(2)? as u64,
                            created_at: row.get(3)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(stats)
            })
            .await
            .map_err(Error::from)
    }
}
