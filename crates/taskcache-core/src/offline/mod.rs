//! Offline cache controller.
//!
//! This module fronts all network traffic for the application's own origin
//! with a cache-first strategy:
//!
//! - `CacheStorage` / `Generation`: named, versioned sets of stored
//!   responses on disk
//! - `Fetcher` / `HttpFetcher`: the network boundary, with a bounded
//!   request timeout
//! - `CacheController`: the lifecycle state machine (install, activate,
//!   fetch interception) plus sync, push, and control-message handling
//!
//! Install is all-or-nothing; activation purges every generation that is
//! not the current static/dynamic pair; interception falls back to the
//! offline page or a placeholder image when the network is gone.

pub mod controller;
pub mod fetch;
pub mod storage;

pub use controller::{
    default_manifest, CacheController, ClickOutcome, LifecycleState, Message,
    NotificationAction, PushNotification, Reply,
};
pub use fetch::{Destination, FetchError, Fetcher, HttpFetcher, Request, ResponseKind, StoredResponse};
pub use storage::{CacheError, CacheStorage, Generation};
