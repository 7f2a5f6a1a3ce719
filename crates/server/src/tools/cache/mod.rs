//! Cache-related MCP tools.
//!
//! This module provides tools for inspecting the SQLite cache stores.

pub mod list;

pub use list::{CacheListOutput, list_impl};
