//! Per-family header templates.
//!
//! Two header sets exist per family: the headers sent when fetching the
//! embed page, and the headers a player must send when fetching the
//! resolved media. Both are constant for a family; nothing is derived from
//! upstream responses.

use crate::config::ResolverConfig;

use super::{PlaybackHeaders, SourceKind};

const OK_RU_ORIGIN: &str = "https://ok.ru";

fn headers<const N: usize>(pairs: [(&str, &str); N]) -> PlaybackHeaders {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Headers for the embed page request itself.
pub fn request_headers(kind: SourceKind, config: &ResolverConfig) -> PlaybackHeaders {
    match kind {
        SourceKind::Direct => PlaybackHeaders::new(),
        SourceKind::OkRu | SourceKind::Fast4Speed | SourceKind::Generic => {
            headers([("Referer", config.referer.as_str())])
        }
    }
}

/// Headers a player must send for media resolved from this family.
pub fn playback_headers(kind: SourceKind, config: &ResolverConfig) -> PlaybackHeaders {
    let user_agent = config.user_agent.as_str();
    match kind {
        SourceKind::Direct => PlaybackHeaders::new(),
        SourceKind::OkRu => headers([
            ("Origin", OK_RU_ORIGIN),
            ("Referer", "https://ok.ru/"),
            ("User-Agent", user_agent),
        ]),
        SourceKind::Fast4Speed => headers([
            ("Referer", config.referer.as_str()),
            ("User-Agent", user_agent),
        ]),
        SourceKind::Generic => headers([("User-Agent", user_agent)]),
    }
}
