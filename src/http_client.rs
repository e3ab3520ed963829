//! Outbound page fetcher
//!
//! Features:
//! - Single request-level deadline plus a connect deadline
//! - Bounded redirect following (`TOO_MANY_REDIRECTS` past the cap)
//! - Realistic browser fingerprint headers, overridable per request
//! - HTTP/2, TLS 1.3, Brotli/Gzip decoding, connection pooling
//!
//! No retries happen here; a failed fetch is reported once with its
//! [`FetchErrorKind`] and the resolver decides what to do with it.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::ResolverConfig;
use crate::fingerprint::BrowserProfile;

/// Why a fetch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    Timeout,
    Connection,
    HttpStatus,
    TooManyRedirects,
}

impl FetchErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FetchErrorKind::Timeout => "TIMEOUT",
            FetchErrorKind::Connection => "CONNECTION",
            FetchErrorKind::HttpStatus => "HTTP_STATUS",
            FetchErrorKind::TooManyRedirects => "TOO_MANY_REDIRECTS",
        }
    }
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed outbound fetch.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    /// Upstream status code, when the server answered at all.
    pub status: Option<u16>,
    pub message: String,
}

impl FetchError {
    fn from_reqwest(err: &reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        let kind = if err.is_timeout() {
            FetchErrorKind::Timeout
        } else if err.is_redirect() {
            FetchErrorKind::TooManyRedirects
        } else if status.is_some() {
            FetchErrorKind::HttpStatus
        } else {
            FetchErrorKind::Connection
        };

        Self {
            kind,
            status,
            message: error_chain(err),
        }
    }

    fn http_status(status: reqwest::StatusCode, url: &str) -> Self {
        Self {
            kind: FetchErrorKind::HttpStatus,
            status: Some(status.as_u16()),
            message: format!("upstream returned {status} for {url}"),
        }
    }
}

/// Flatten an error and its sources into one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }
    message
}

/// A single outbound request.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub method: Method,
    /// Extra headers; these replace the fingerprint defaults of the same name.
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::GET,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::POST,
            headers: BTreeMap::new(),
            body: Some(body.into()),
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    fn header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in &self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    map.insert(name, value);
                }
                _ => warn!(header = %name, "Skipping invalid request header"),
            }
        }
        map
    }
}

/// Raw result of a successful fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchResponse {
    pub status: u16,
    /// Page text. Left empty when the response is itself media.
    pub body: String,
    /// URL after redirects.
    pub final_url: String,
    pub content_type: Option<String>,
}

impl FetchResponse {
    /// True when the server answered with audio/video or a playlist
    /// instead of a page.
    pub fn is_media(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| crate::resolve::media::container_for_content_type(ct).is_some())
    }
}

/// Anything that can fetch an embed page.
///
/// [`HttpFetcher`] is the real implementation; tests substitute fixtures.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError>;
}

/// reqwest-backed fetcher with browser fingerprint and bounded limits.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher from resolver limits and the configured User-Agent.
    pub fn new(config: &ResolverConfig) -> Result<Self, reqwest::Error> {
        Self::with_profile(config, &BrowserProfile::with_user_agent(&config.user_agent))
    }

    /// Create a fetcher with a specific browser profile.
    pub fn with_profile(
        config: &ResolverConfig,
        profile: &BrowserProfile,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            // ═══════════════════════════════════════════════════════════════
            // CONNECTIONS
            // ═══════════════════════════════════════════════════════════════
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .use_rustls_tls()
            // ═══════════════════════════════════════════════════════════════
            // COMPRESSION (auto-negotiated via Accept-Encoding)
            // ═══════════════════════════════════════════════════════════════
            .brotli(true)
            .gzip(true)
            .deflate(true)
            // ═══════════════════════════════════════════════════════════════
            // BROWSER FINGERPRINTING
            // ═══════════════════════════════════════════════════════════════
            .default_headers(profile.to_headers())
            // ═══════════════════════════════════════════════════════════════
            // TIMEOUTS
            // ═══════════════════════════════════════════════════════════════
            .connect_timeout(config.connect_timeout())
            .timeout(config.timeout())
            // ═══════════════════════════════════════════════════════════════
            // REDIRECTS
            // ═══════════════════════════════════════════════════════════════
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[instrument(skip(self, request), fields(url = %request.url, method = %request.method))]
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        debug!("Fetching embed page");

        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.header_map());
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&e))?;

        let status = response.status();
        let final_url = response.url().to_string();
        debug!(status = %status, final_url = %final_url, "Response received");

        if !status.is_success() {
            return Err(FetchError::http_status(status, &final_url));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut fetched = FetchResponse {
            status: status.as_u16(),
            body: String::new(),
            final_url,
            content_type,
        };

        // Media bodies can be gigabytes; the URL is all we need.
        if fetched.is_media() {
            debug!(content_type = ?fetched.content_type, "Skipping media body");
            return Ok(fetched);
        }

        fetched.body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(&e))?;

        Ok(fetched)
    }
}
