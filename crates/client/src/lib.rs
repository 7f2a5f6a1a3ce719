//! Client code for windhelm.
//!
//! This crate provides the network seam and the offline cache router that
//! the server drives.

pub mod fetch;
pub mod router;

pub use fetch::{FetchClient, FetchConfig, Network, Request};
pub use router::{
    ActivateReport, AssetClass, CacheRouter, ClientMessage, Clients, Event, EventKind, EventOutcome, FetchOutcome,
    Handled, InstallReport, Notification, RecordingClients, ResponseSource, RouterConfig, SyncReport, WorkerState,
};
