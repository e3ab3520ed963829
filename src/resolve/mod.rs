//! Embed-link resolution.
//!
//! Turns a third-party embed URL into a directly playable media URL plus
//! the headers a player must send to fetch it.
//!
//! # Architecture
//!
//! - [`classify`]: pure URL → [`SourceKind`] decision (direct, known host, generic)
//! - [`strategies`]: per-family page parsers behind [`ExtractionStrategy`]
//! - [`Resolver`]: drives normalize → classify → fetch → extract → select
//! - [`ResolutionResult`]: the serializable outcome handed back to callers
//!
//! # Example
//!
//! ```rust,no_run
//! use vidresolve::{Resolver, ResolverConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let resolver = Resolver::new(ResolverConfig::default())?;
//! let result = resolver.resolve_url("https://ok.ru/videoembed/123456").await;
//!
//! if let Some(url) = &result.playable_url {
//!     println!("{url} ({:?})", result.headers);
//! }
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod embedded;
pub mod family;
pub mod media;
pub mod quality;
pub mod resolver;
pub mod source_url;
pub mod strategies;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http_client::FetchError;

pub use classify::classify;
pub use resolver::{Resolved, Resolver};
pub use strategies::ExtractionStrategy;

/// Header name → value a player must send when fetching the media.
pub type PlaybackHeaders = BTreeMap<String, String>;

/// Which extraction path a URL takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// Already a playable media URL; nothing to fetch.
    #[serde(rename = "direct")]
    Direct,
    #[serde(rename = "ok.ru")]
    OkRu,
    #[serde(rename = "fast4speed")]
    Fast4Speed,
    /// Unknown host; permissive last-resort scan.
    #[serde(rename = "generic")]
    Generic,
}

impl SourceKind {
    pub const ALL: [SourceKind; 4] = [
        SourceKind::Direct,
        SourceKind::OkRu,
        SourceKind::Fast4Speed,
        SourceKind::Generic,
    ];

    /// Label reported as `source_type`.
    pub fn label(self) -> &'static str {
        match self {
            SourceKind::Direct => "direct",
            SourceKind::OkRu => "ok.ru",
            SourceKind::Fast4Speed => "fast4speed",
            SourceKind::Generic => "generic",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        SourceKind::ALL
            .into_iter()
            .find(|k| k.label() == lower || (lower == "okru" && *k == SourceKind::OkRu))
            .ok_or_else(|| format!("unknown source type: {s}"))
    }
}

/// One extracted media URL, before final selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaCandidate {
    pub url: String,
    /// Normalized label such as `"1080p"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    /// `"mp4"` or `"m3u8"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    /// Which part of the page produced this candidate.
    pub source_label: String,
}

impl MediaCandidate {
    pub fn new(url: impl Into<String>, source_label: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            quality: None,
            container: None,
            source_label: source_label.into(),
        }
    }

    #[must_use]
    pub fn with_quality(mut self, quality: Option<String>) -> Self {
        self.quality = quality;
        self
    }

    #[must_use]
    pub fn with_container(mut self, container: Option<&str>) -> Self {
        self.container = container.map(str::to_string);
        self
    }
}

/// Input from the outer API layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionRequest {
    pub source_url: String,
}

impl ResolutionRequest {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
        }
    }
}

/// Why a resolution failed.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// Missing or malformed input; nothing was fetched.
    #[error("invalid source_url: {0}")]
    Validation(String),

    /// The embed page could not be fetched.
    #[error("fetch failed: {error}")]
    Fetch {
        source_type: SourceKind,
        #[source]
        error: FetchError,
    },

    /// The page was fetched but held nothing playable.
    #[error("no candidates found on {source_type} page {url}")]
    ExtractionEmpty { source_type: SourceKind, url: String },
}

impl ResolveError {
    /// Classification of the failed request, if it got that far.
    pub fn source_type(&self) -> Option<SourceKind> {
        match self {
            ResolveError::Validation(_) => None,
            ResolveError::Fetch { source_type, .. }
            | ResolveError::ExtractionEmpty { source_type, .. } => Some(*source_type),
        }
    }
}

/// Outcome of one resolution, serialized as the response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playable_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<SourceKind>,
    #[serde(default)]
    pub headers: PlaybackHeaders,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResolutionResult {
    pub fn resolved(
        playable_url: impl Into<String>,
        source_type: SourceKind,
        headers: PlaybackHeaders,
    ) -> Self {
        Self {
            success: true,
            playable_url: Some(playable_url.into()),
            source_type: Some(source_type),
            headers,
            error: None,
        }
    }

    pub fn failed(error: &ResolveError) -> Self {
        Self {
            success: false,
            playable_url: None,
            source_type: error.source_type(),
            headers: PlaybackHeaders::new(),
            error: Some(error.to_string()),
        }
    }
}
