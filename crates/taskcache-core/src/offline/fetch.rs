//! The network boundary for the offline cache controller.
//!
//! `Fetcher` is the seam between interception logic and the transport;
//! `HttpFetcher` is the production implementation over reqwest. Tests use
//! in-memory fakes so interception behavior is checked without a network.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// HTTP request timeout in seconds.
/// The source had no timeout at all; a slow fetch would hang interception
/// indefinitely. 30s fails fast enough without breaking slow links.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Placeholder served in place of images when the network is gone and the
/// cache is empty. Fixed inline vector graphic.
const PLACEHOLDER_IMAGE_SVG: &str = "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"200\" height=\"200\" viewBox=\"0 0 200 200\"><rect width=\"200\" height=\"200\" fill=\"#f0f0f0\"/><text x=\"100\" y=\"100\" text-anchor=\"middle\" dy=\"0.3em\" font-family=\"Arial\" font-size=\"14\" fill=\"#666\">Image unavailable</text></svg>";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Transport-level failure (offline, DNS, refused connection).
    #[error("network unreachable: {0}")]
    Unreachable(String),
}

/// Response type as seen at the interception boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseKind {
    /// Direct same-origin response.
    Basic,
    /// Cross-origin response with an unreadable body.
    Opaque,
    /// Error-typed response.
    Error,
}

/// Expected content class of a request, used to pick an offline fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Document,
    Image,
    Style,
    Script,
    Other,
}

/// A request as seen by the interception path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub destination: Destination,
}

impl Request {
    pub fn new(url: impl Into<String>, destination: Destination) -> Self {
        Self {
            url: url.into(),
            destination,
        }
    }

    pub fn document(url: impl Into<String>) -> Self {
        Self::new(url, Destination::Document)
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self::new(url, Destination::Image)
    }
}

/// A response in the shape the cache stores and re-serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    pub status: u16,
    pub content_type: String,
    pub kind: ResponseKind,
    pub redirected: bool,
    pub body: Vec<u8>,
}

impl StoredResponse {
    /// Only direct, non-redirected 200 basic responses may populate the
    /// dynamic generation; everything else is served but never stored.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.kind == ResponseKind::Basic && !self.redirected
    }

    /// Synthesized stand-in for an unreachable image.
    pub fn placeholder_image() -> Self {
        Self {
            status: 200,
            content_type: "image/svg+xml".to_string(),
            kind: ResponseKind::Basic,
            redirected: false,
            body: PLACEHOLDER_IMAGE_SVG.as_bytes().to_vec(),
        }
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The transport seam. Interception logic depends only on this trait.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<StoredResponse, FetchError>;
}

#[async_trait]
impl<T: Fetcher + ?Sized> Fetcher for std::sync::Arc<T> {
    async fn fetch(&self, url: &str) -> Result<StoredResponse, FetchError> {
        (**self).fetch(url).await
    }
}

/// Production fetcher over reqwest.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<StoredResponse, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status().as_u16();
        // reqwest follows redirects transparently; a changed final URL means
        // the response must not be cached
        let redirected = response.url().as_str() != url;
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let body = response.bytes().await?.to_vec();

        Ok(StoredResponse {
            status,
            content_type,
            kind: ResponseKind::Basic,
            redirected,
            body,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
