//! Resolution driver.
//!
//! One call walks a single request through
//! `Start → Classified → Fetched → Extracted → {Resolved | Failed}`.
//! There is no retry and no state kept between calls; concurrent calls share
//! only the fetcher's connection pool and the immutable configuration.
//! Dropping the returned future cancels the in-flight fetch.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use url::Url;

use super::strategies::{extract_guarded, strategy_for};
use super::{
    classify, family, media, quality, source_url, MediaCandidate, PlaybackHeaders,
    ResolutionRequest, ResolutionResult, ResolveError, SourceKind,
};
use crate::config::ResolverConfig;
use crate::http_client::{FetchRequest, HttpFetcher, PageFetcher};

/// Pipeline stage, for log context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Classified,
    Fetched,
    Extracted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Classified => "classified",
            Stage::Fetched => "fetched",
            Stage::Extracted => "extracted",
        })
    }
}

/// A successful resolution with everything the selection saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub source_type: SourceKind,
    /// The chosen candidate.
    pub candidate: MediaCandidate,
    pub headers: PlaybackHeaders,
    /// How many candidates extraction produced.
    pub candidates_found: usize,
}

impl From<Resolved> for ResolutionResult {
    fn from(resolved: Resolved) -> Self {
        ResolutionResult::resolved(
            resolved.candidate.url,
            resolved.source_type,
            resolved.headers,
        )
    }
}

/// Resolves embed URLs into playable media URLs.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct Resolver {
    fetcher: Arc<dyn PageFetcher>,
    config: Arc<ResolverConfig>,
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Resolver {
    /// Create a resolver backed by [`HttpFetcher`].
    pub fn new(config: ResolverConfig) -> Result<Self, reqwest::Error> {
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self::with_fetcher(Arc::new(config), Arc::new(fetcher)))
    }

    /// Create a resolver with a custom fetcher.
    pub fn with_fetcher(config: Arc<ResolverConfig>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve a request. Never fails; failures are reported in the result.
    pub async fn resolve(&self, request: &ResolutionRequest) -> ResolutionResult {
        self.resolve_url(&request.source_url).await
    }

    /// Resolve a raw source URL.
    pub async fn resolve_url(&self, source_url: &str) -> ResolutionResult {
        match self.try_resolve(source_url).await {
            Ok(resolved) => resolved.into(),
            Err(err) => ResolutionResult::failed(&err),
        }
    }

    /// Resolve a raw source URL, keeping the typed error.
    #[instrument(skip(self), fields(source_type))]
    pub async fn try_resolve(&self, source_url: &str) -> Result<Resolved, ResolveError> {
        let normalized = source_url::normalize(source_url).inspect_err(|e| {
            warn!(error = %e, "Rejected source URL");
        })?;
        let url = normalized.url;

        let kind = classify(&url);
        tracing::Span::current().record("source_type", kind.label());
        debug!(stage = %Stage::Classified, url = %url, "Classified");

        // Direct media goes back exactly as given.
        if kind == SourceKind::Direct {
            let container = media::container_for_url(&normalized.source);
            let candidate =
                MediaCandidate::new(normalized.source, "direct").with_container(container);
            return Ok(self.finish(kind, vec![candidate], &url));
        }

        let request = FetchRequest::get(url.as_str())
            .headers(family::request_headers(kind, &self.config));
        let response = self.fetcher.fetch(request).await.map_err(|error| {
            warn!(error = %error, status = ?error.status, "Fetch failed");
            ResolveError::Fetch {
                source_type: kind,
                error,
            }
        })?;
        debug!(
            stage = %Stage::Fetched,
            status = response.status,
            final_url = %response.final_url,
            bytes = response.body.len(),
            "Fetched"
        );

        let base_url = if response.final_url.is_empty() {
            url.to_string()
        } else {
            response.final_url.clone()
        };

        let candidates = if let Some(container) = response
            .content_type
            .as_deref()
            .and_then(media::container_for_content_type)
        {
            // The embed URL served media itself.
            vec![MediaCandidate::new(base_url.clone(), "content-type").with_container(Some(container))]
        } else {
            strategy_for(kind)
                .map(|strategy| extract_guarded(strategy, &response.body, &base_url))
                .unwrap_or_default()
        };
        debug!(stage = %Stage::Extracted, count = candidates.len(), "Extracted");

        if candidates.is_empty() {
            warn!(url = %base_url, "No candidates found");
            return Err(ResolveError::ExtractionEmpty {
                source_type: kind,
                url: base_url,
            });
        }

        Ok(self.finish(kind, candidates, &url))
    }

    fn finish(&self, kind: SourceKind, candidates: Vec<MediaCandidate>, url: &Url) -> Resolved {
        let candidates_found = candidates.len();
        let candidate = quality::select_best(&candidates)
            .cloned()
            .unwrap_or_else(|| candidates[0].clone());

        info!(
            source_type = %kind,
            playable_url = %candidate.url,
            quality = candidate.quality.as_deref().unwrap_or("unspecified"),
            candidates_found,
            embed = %url,
            "Resolved"
        );

        Resolved {
            source_type: kind,
            headers: family::playback_headers(kind, &self.config),
            candidate,
            candidates_found,
        }
    }
}
