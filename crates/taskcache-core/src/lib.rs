//! taskcache core library.
//!
//! A local-first, multi-user todo system: client-side authentication over a
//! JSON-file store, deadline urgency notifications, and an offline cache
//! controller that fronts all same-origin network traffic with a
//! cache-first strategy and versioned generation lifecycle.
//!
//! All persistence is local to one machine; there is no server and no sync.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod offline;
pub mod store;
pub mod todos;

pub use app::App;
pub use auth::{AuthError, AuthManager};
pub use config::Config;
pub use error::ValidationError;
pub use models::{FilterMode, Todo, User};
pub use notify::{DeadlineAlert, DeadlineNotifier, NotificationSink, Urgency};
pub use offline::{CacheController, CacheError, CacheStorage, FetchError, Fetcher, HttpFetcher};
pub use store::{Store, StoreError};
pub use todos::{TodoError, TodoManager};
