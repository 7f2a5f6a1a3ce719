//! Core types and shared functionality for the Windhelm offline cache router.
//!
//! This crate provides:
//! - Named cache stores and the pending-submission queue on a SQLite backend
//! - Unified error types
//! - Layered configuration

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheDb, CachedResponse, PendingSubmission};
pub use config::{AppConfig, CacheNames, ConfigError};
pub use error::Error;
