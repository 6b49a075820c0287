//! Lifecycle state machine and fetch interception.
//!
//! The controller owns two live cache generations (static and dynamic) tagged
//! with the current version. Install populates the static generation from a
//! fixed asset manifest, all-or-nothing. Activation purges every generation
//! that is not the live pair. Interception is cache-first with a network
//! fallback and, when the network is gone too, an offline page for documents
//! and a placeholder for images.

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::fetch::{Destination, FetchError, Fetcher, Request, StoredResponse};
use super::storage::{CacheError, CacheStorage};

// ============================================================================
// Constants
// ============================================================================

/// Name prefix for static cache generations.
const STATIC_CACHE_PREFIX: &str = "todo-static-";

/// Name prefix for dynamic cache generations.
const DYNAMIC_CACHE_PREFIX: &str = "todo-dynamic-";

/// Origin-relative path of the pre-cached offline fallback page.
const OFFLINE_PAGE_PATH: &str = "/offline.html";

/// Origin-relative path of the controller's own defining resource, refetched
/// by the update check.
const CONTROLLER_SCRIPT_PATH: &str = "/sw.js";

/// Background sync tag for todo reconciliation.
const SYNC_TODOS_TAG: &str = "background-sync-todos";

/// Periodic sync tag for deadline reminders.
const REMINDERS_TAG: &str = "todo-reminders";

/// Concurrent fetches while populating the static generation.
/// Keeps install fast without opening one connection per asset.
const INSTALL_CONCURRENCY: usize = 4;

/// Notification defaults when a push payload is absent or malformed.
const DEFAULT_PUSH_TITLE: &str = "Todo Reminder";
const DEFAULT_PUSH_BODY: &str = "You have a todo reminder!";

/// Static assets required for offline operation, including the offline
/// fallback page itself.
pub fn default_manifest() -> Vec<String> {
    [
        "/",
        "/index.html",
        "/css/style.css",
        "/js/script.js",
        "/images/profile.jpg",
        "/manifest.json",
        OFFLINE_PAGE_PATH,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

// ============================================================================
// Lifecycle and message types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Installing,
    Waiting,
    Active,
}

/// Control messages from the page to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    #[serde(rename = "SKIP_WAITING")]
    SkipWaiting,
    #[serde(rename = "CHECK_UPDATE")]
    CheckUpdate,
}

/// Replies posted back over the message reply channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Reply {
    #[serde(rename = "ACK")]
    Ack { message: String },
    #[serde(rename = "UPDATE_AVAILABLE", rename_all = "camelCase")]
    UpdateAvailable { has_update: bool },
}

/// Optional fields of a push payload; anything missing falls back to the
/// documented defaults.
#[derive(Debug, Default, Deserialize)]
struct PushPayload {
    title: Option<String>,
    body: Option<String>,
}

/// A notification the host should display for a push event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushNotification {
    pub title: String,
    pub body: String,
    pub actions: Vec<NotificationAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationAction {
    View,
    Dismiss,
}

/// What the host should do after a notification click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    OpenApp { path: String },
    Dismissed,
}

// ============================================================================
// Controller
// ============================================================================

/// The offline cache controller.
///
/// Lifecycle: `Installing -> Waiting -> Active`. A newer version starts its
/// own controller at Installing; its activation purges this one's
/// generations. Install and activate take `&mut self`, so the transitions
/// cannot interleave; fetch interception takes `&self` and may run
/// concurrently across requests (dynamic writes are last-write-wins).
pub struct CacheController<F: Fetcher> {
    origin: String,
    version: String,
    manifest: Vec<String>,
    storage: CacheStorage,
    fetcher: F,
    state: LifecycleState,
    skip_requested: bool,
}

impl<F: Fetcher> CacheController<F> {
    pub fn new(
        origin: impl Into<String>,
        version: impl Into<String>,
        manifest: Vec<String>,
        storage: CacheStorage,
        fetcher: F,
    ) -> Self {
        Self {
            origin: origin.into().trim_end_matches('/').to_string(),
            version: version.into(),
            manifest,
            storage,
            fetcher,
            state: LifecycleState::Installing,
            skip_requested: false,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Whether a skip-waiting request has been received; the host uses this
    /// to activate without waiting for open clients to close.
    pub fn skip_requested(&self) -> bool {
        self.skip_requested
    }

    pub fn static_cache_name(&self) -> String {
        format!("{}{}", STATIC_CACHE_PREFIX, self.version)
    }

    pub fn dynamic_cache_name(&self) -> String {
        format!("{}{}", DYNAMIC_CACHE_PREFIX, self.version)
    }

    fn absolute_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.origin, path)
        }
    }

    /// Populate a fresh static generation from the asset manifest.
    ///
    /// All-or-nothing: every manifest entry is fetched before anything is
    /// written, so a single failure leaves no partial generation behind and
    /// any previously active generation keeps serving. On success the
    /// controller signals skip-waiting and becomes eligible for activation.
    pub async fn install(&mut self) -> Result<(), CacheError> {
        info!(version = %self.version, "installing");

        let urls: Vec<String> = self.manifest.iter().map(|p| self.absolute_url(p)).collect();
        let fetcher = &self.fetcher;
        let fetches = stream::iter(urls)
            .map(move |url| async move {
                let result = fetcher.fetch(&url).await;
                (url, result)
            })
            .buffer_unordered(INSTALL_CONCURRENCY)
            .collect::<Vec<_>>()
            .await;

        let mut entries = Vec::with_capacity(fetches.len());
        for (url, result) in fetches {
            match result {
                Ok(response) => entries.push((url, response)),
                Err(source) => {
                    warn!(url = %url, error = %source, "install aborted");
                    return Err(CacheError::Install { url, source });
                }
            }
        }

        let name = self.static_cache_name();
        let generation = self.storage.open(&name)?;
        for (url, response) in &entries {
            if let Err(e) = generation.put(url, response) {
                // A half-written generation must not survive a failed install
                if let Err(rollback) = self.storage.delete(&name) {
                    warn!(generation = %name, error = %rollback, "rollback of partial install failed");
                }
                return Err(e);
            }
        }

        info!(assets = entries.len(), "installation complete");
        self.state = LifecycleState::Waiting;
        self.skip_waiting();
        Ok(())
    }

    /// Skip any waiting period unconditionally.
    pub fn skip_waiting(&mut self) {
        self.skip_requested = true;
        debug!(state = ?self.state, "skip waiting requested");
    }

    /// Promote to active: purge every generation that is not the current
    /// static/dynamic pair, then take over all open clients.
    ///
    /// The purge is best-effort per entry; a delete failure is logged and
    /// the remaining generations are still processed.
    pub async fn activate(&mut self) -> Result<(), CacheError> {
        info!(version = %self.version, "activating");

        let keep_static = self.static_cache_name();
        let keep_dynamic = self.dynamic_cache_name();
        for name in self.storage.list()? {
            if name != keep_static && name != keep_dynamic {
                info!(generation = %name, "deleting old cache");
                if let Err(e) = self.storage.delete(&name) {
                    warn!(generation = %name, error = %e, "failed to delete old cache");
                }
            }
        }

        // The live pair exists from here on, even before any dynamic traffic
        self.storage.open(&keep_static)?;
        self.storage.open(&keep_dynamic)?;

        self.state = LifecycleState::Active;
        info!("activation complete, claimed all clients");
        Ok(())
    }

    fn lookup_cached(&self, url: &str) -> Option<StoredResponse> {
        for name in [self.static_cache_name(), self.dynamic_cache_name()] {
            match self
                .storage
                .open(&name)
                .and_then(|generation| generation.lookup(url))
            {
                Ok(Some(response)) => return Some(response),
                Ok(None) => {}
                Err(e) => warn!(generation = %name, url, error = %e, "cache lookup failed"),
            }
        }
        None
    }

    /// Intercept one request: cache-first, then network, then the offline
    /// fallback ladder.
    pub async fn handle_fetch(&self, request: &Request) -> Result<StoredResponse, FetchError> {
        // Cross-origin traffic passes through untouched and is never cached
        if !request.url.starts_with(&self.origin) {
            return self.fetcher.fetch(&request.url).await;
        }

        if let Some(cached) = self.lookup_cached(&request.url) {
            debug!(url = %request.url, "cache hit");
            return Ok(cached);
        }

        match self.fetcher.fetch(&request.url).await {
            Ok(response) => {
                if response.is_cacheable() {
                    self.cache_dynamic(&request.url, &response);
                }
                Ok(response)
            }
            Err(error) => self.offline_fallback(request, error),
        }
    }

    fn cache_dynamic(&self, url: &str, response: &StoredResponse) {
        let name = self.dynamic_cache_name();
        if let Err(e) = self
            .storage
            .open(&name)
            .and_then(|generation| generation.put(url, response))
        {
            warn!(url, error = %e, "failed to cache dynamic response");
        }
    }

    /// Total network failure with no cached entry: documents get the
    /// pre-cached offline page, images get a synthesized placeholder, and
    /// everything else surfaces the failure.
    fn offline_fallback(
        &self,
        request: &Request,
        error: FetchError,
    ) -> Result<StoredResponse, FetchError> {
        match request.destination {
            Destination::Document => {
                let offline_url = self.absolute_url(OFFLINE_PAGE_PATH);
                if let Some(page) = self.lookup_cached(&offline_url) {
                    info!(url = %request.url, "serving offline page");
                    return Ok(page);
                }
                warn!(url = %request.url, "offline page missing from cache");
                Err(error)
            }
            Destination::Image => {
                info!(url = %request.url, "serving placeholder image");
                Ok(StoredResponse::placeholder_image())
            }
            _ => {
                warn!(url = %request.url, error = %error, "fetch failed with no fallback");
                Err(error)
            }
        }
    }

    /// Background sync entry point. Always resolves, even with nothing to
    /// do, so the platform does not reschedule with backoff.
    pub async fn handle_sync(&self, tag: &str) {
        match tag {
            SYNC_TODOS_TAG => self.sync_todos().await,
            other => debug!(tag = other, "ignoring unknown sync tag"),
        }
    }

    /// Reconciliation stub: there is no backend to sync against in this
    /// system, so the task resolves immediately.
    async fn sync_todos(&self) {
        debug!("todo sync requested, nothing to reconcile");
    }

    /// Periodic sync entry point; the deadline scan itself lives in the
    /// in-app notifier, so the hook only acknowledges the tag.
    pub async fn handle_periodic_sync(&self, tag: &str) {
        match tag {
            REMINDERS_TAG => debug!("periodic deadline check requested"),
            other => debug!(tag = other, "ignoring unknown periodic sync tag"),
        }
    }

    /// Build the notification for a push event. A malformed or absent
    /// payload never fails the handler; defaults are used instead.
    pub fn handle_push(&self, payload: Option<&str>) -> PushNotification {
        let parsed: PushPayload = payload
            .and_then(|raw| match serde_json::from_str(raw) {
                Ok(payload) => Some(payload),
                Err(e) => {
                    warn!(error = %e, "malformed push payload, using defaults");
                    None
                }
            })
            .unwrap_or_default();

        PushNotification {
            title: parsed.title.unwrap_or_else(|| DEFAULT_PUSH_TITLE.to_string()),
            body: parsed.body.unwrap_or_else(|| DEFAULT_PUSH_BODY.to_string()),
            actions: vec![NotificationAction::View, NotificationAction::Dismiss],
        }
    }

    /// Route a notification click. View and the default click open the app
    /// root; dismiss only closes.
    pub fn handle_notification_click(&self, action: Option<NotificationAction>) -> ClickOutcome {
        match action {
            Some(NotificationAction::Dismiss) => ClickOutcome::Dismissed,
            _ => ClickOutcome::OpenApp {
                path: "/".to_string(),
            },
        }
    }

    /// Handle a control message. Every message with a reply channel gets
    /// exactly one reply; a dropped receiver is logged, never a panic.
    pub async fn handle_message(&mut self, message: Message, reply: oneshot::Sender<Reply>) {
        let response = match message {
            Message::SkipWaiting => {
                self.skip_waiting();
                Reply::Ack {
                    message: "controller is active".to_string(),
                }
            }
            Message::CheckUpdate => Reply::UpdateAvailable {
                has_update: self.check_for_update().await,
            },
        };
        if reply.send(response).is_err() {
            warn!("message reply channel closed before reply");
        }
    }

    /// Refetch the controller's own defining resource and compare it to the
    /// running version marker. A failed refetch reports no update.
    pub async fn check_for_update(&self) -> bool {
        let url = self.absolute_url(CONTROLLER_SCRIPT_PATH);
        match self.fetcher.fetch(&url).await {
            Ok(response) => !response.body_text().contains(&self.version),
            Err(e) => {
                debug!(error = %e, "update check fetch failed");
                false
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
