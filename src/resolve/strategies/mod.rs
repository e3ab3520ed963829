//! Extraction strategies, one per source family.
//!
//! A strategy turns a fetched page body into candidate media URLs. It
//! never fails: malformed or missing data yields an empty vector, which the
//! resolver reports as "no candidates found". Strategies are registered in
//! [`STRATEGIES`]; adding a family means adding an entry there.

pub mod fast4speed;
pub mod generic;
pub mod okru;

use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::warn;
use url::Url;

use super::{MediaCandidate, SourceKind};

pub use fast4speed::Fast4SpeedStrategy;
pub use generic::GenericStrategy;
pub use okru::OkRuStrategy;

/// Parser for one source family's pages.
pub trait ExtractionStrategy: Send + Sync {
    /// Family this strategy handles.
    fn kind(&self) -> SourceKind;

    /// Candidates found in `body`, in page order. `base_url` is the URL the
    /// body was fetched from (after redirects), for resolving relative links.
    fn extract(&self, body: &str, base_url: &str) -> Vec<MediaCandidate>;
}

/// Dispatch table keyed by [`SourceKind`].
pub static STRATEGIES: &[&dyn ExtractionStrategy] =
    &[&OkRuStrategy, &Fast4SpeedStrategy, &GenericStrategy];

/// Strategy registered for `kind`. Direct URLs have none.
pub fn strategy_for(kind: SourceKind) -> Option<&'static dyn ExtractionStrategy> {
    STRATEGIES.iter().copied().find(|s| s.kind() == kind)
}

/// Run a strategy, converting a panic inside it into "no candidates".
///
/// One malformed page must never take down the resolver or unrelated
/// requests running alongside it.
pub fn extract_guarded(
    strategy: &dyn ExtractionStrategy,
    body: &str,
    base_url: &str,
) -> Vec<MediaCandidate> {
    match catch_unwind(AssertUnwindSafe(|| strategy.extract(body, base_url))) {
        Ok(candidates) => candidates,
        Err(panic) => {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            warn!(strategy = %strategy.kind(), base_url, reason = %reason, "Strategy panicked; treating as empty");
            Vec::new()
        }
    }
}

/// Resolve `link` against `base`, accepting absolute and protocol-relative
/// forms. Returns `None` for non-http(s) results.
pub(crate) fn absolutize(link: &str, base: Option<&Url>) -> Option<String> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }

    let resolved = match Url::parse(link) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            if let Some(rest) = link.strip_prefix("//") {
                Url::parse(&format!("https://{rest}")).ok()?
            } else {
                base?.join(link).ok()?
            }
        }
        Err(_) => return None,
    };

    matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
}

/// Drop candidates whose URL was already seen, keeping first occurrences.
pub(crate) fn dedupe(candidates: Vec<MediaCandidate>) -> Vec<MediaCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.url.clone()))
        .collect()
}
