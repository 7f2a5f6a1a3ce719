//! SQLite-backed cache stores for the offline router.
//!
//! This module provides the persistent key/response storage the router
//! consults, using SQLite with async access via tokio-rusqlite. It supports:
//!
//! - Named stores that can be listed and dropped as a whole
//! - Entries keyed by a SHA-256 of request method and URL
//! - A per-store byte quota
//! - The queue of form submissions awaiting background sync

pub mod connection;
pub mod hash;
pub mod migrations;
pub mod queue;
pub mod response;
pub mod stores;

pub use crate::Error;

pub use connection::CacheDb;
pub use queue::PendingSubmission;
pub use response::CachedResponse;
pub use stores::StoreStats;
