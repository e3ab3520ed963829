//! `vidresolve` - embed-link resolution for video players
//!
//! # Features
//!
//! - **Classification**: direct media, known embed hosts (ok.ru, fast4speed), generic fallback
//! - **Fetching**: bounded timeouts and redirects, browser fingerprint headers
//! - **Extraction**: per-host strategies that fail soft on layout changes
//! - **Playback headers**: the Referer/Origin/User-Agent a player must send
//!
//! # Example
//!
//! ```rust,no_run
//! use vidresolve::{ResolutionRequest, Resolver, ResolverConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let resolver = Resolver::new(ResolverConfig::default())?;
//!     let result = resolver
//!         .resolve(&ResolutionRequest::new("https://ok.ru/videoembed/123456"))
//!         .await;
//!     println!("{}", serde_json::to_string(&result)?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod fingerprint;
pub mod http_client;
pub mod resolve;

pub use config::{ConfigError, ResolverConfig};
pub use fingerprint::{chrome_profile, firefox_profile, random_profile, BrowserProfile};
pub use http_client::{
    FetchError, FetchErrorKind, FetchRequest, FetchResponse, HttpFetcher, PageFetcher,
};
pub use resolve::{
    classify, ExtractionStrategy, MediaCandidate, PlaybackHeaders, ResolutionRequest,
    ResolutionResult, ResolveError, Resolved, Resolver, SourceKind,
};

/// Version of vidresolve
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
