//! URL classification.
//!
//! Decides which extraction path a URL takes without touching the network:
//!
//! 1. Direct media (path ends in `.mp4`/`.m3u8`, or the query declares a
//!    raw stream) short-circuits.
//! 2. The host is matched against [`HOST_TABLE`], most specific entry first.
//! 3. Everything else is [`SourceKind::Generic`].

use url::Url;

use super::media;
use super::SourceKind;

/// A registered embed host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostEntry {
    /// Registered domain; subdomains match too.
    pub domain: &'static str,
    pub kind: SourceKind,
}

/// Known embed hosts, ordered by specificity (more labels first).
pub const HOST_TABLE: &[HostEntry] = &[
    HostEntry {
        domain: "tools.fast4speed.rsvp",
        kind: SourceKind::Fast4Speed,
    },
    HostEntry {
        domain: "fast4speed.rsvp",
        kind: SourceKind::Fast4Speed,
    },
    HostEntry {
        domain: "odnoklassniki.ru",
        kind: SourceKind::OkRu,
    },
    HostEntry {
        domain: "ok.ru",
        kind: SourceKind::OkRu,
    },
];

/// Query keys whose value may declare a raw stream.
const STREAM_QUERY_KEYS: &[&str] = &["type", "format", "ext", "mime"];

/// Query values that declare a raw stream.
const STREAM_QUERY_VALUES: &[&str] = &[
    "mp4",
    "m3u8",
    "hls",
    "video/mp4",
    "application/x-mpegurl",
    "application/vnd.apple.mpegurl",
];

/// Classify a parsed URL.
pub fn classify(url: &Url) -> SourceKind {
    if is_direct_media(url) {
        return SourceKind::Direct;
    }

    url.host_str()
        .and_then(lookup_host)
        .map_or(SourceKind::Generic, |entry| entry.kind)
}

/// Classify a raw string; unparseable input is [`SourceKind::Generic`].
pub fn classify_str(raw: &str) -> SourceKind {
    Url::parse(raw.trim()).map_or(SourceKind::Generic, |url| classify(&url))
}

/// First host-table entry matching `host`.
pub fn lookup_host(host: &str) -> Option<&'static HostEntry> {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    HOST_TABLE
        .iter()
        .find(|entry| host_matches(&host, entry.domain))
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// True if the URL already points at playable media.
pub fn is_direct_media(url: &Url) -> bool {
    if media::container_for_path(url.path()).is_some() {
        return true;
    }

    url.query_pairs().any(|(key, value)| {
        STREAM_QUERY_KEYS.contains(&key.to_ascii_lowercase().as_str())
            && STREAM_QUERY_VALUES.contains(&value.to_ascii_lowercase().as_str())
    })
}
