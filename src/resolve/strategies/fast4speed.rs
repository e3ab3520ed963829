//! fast4speed tooling pages.
//!
//! The tooling endpoint usually answers with JSON, either a single link
//! field or a `links` array annotated with resolution and container flags.
//! Older pages are plain HTML with a `<video>` element or a download link.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{absolutize, dedupe, ExtractionStrategy};
use crate::resolve::embedded::{parse_json_soft, unescape_html, unescape_js};
use crate::resolve::{media, quality, MediaCandidate, SourceKind};

/// Top-level JSON fields holding a single playable link.
const LINK_FIELDS: &[&str] = &["url", "link", "src", "file"];

static MEDIA_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:https?:)?//[^\s"'<>\\]+?\.(?:mp4|m3u8)(?:\?[^\s"'<>\\]*)?"#)
        .expect("valid regex")
});

/// One `links[]` entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkEntry {
    #[serde(default)]
    link: String,
    #[serde(default)]
    resolution_str: Option<String>,
    #[serde(default)]
    hls: bool,
    #[serde(default)]
    mp4: bool,
}

/// JSON-first extraction with an HTML fallback.
#[derive(Debug, Default, Clone, Copy)]
pub struct Fast4SpeedStrategy;

impl ExtractionStrategy for Fast4SpeedStrategy {
    fn kind(&self) -> SourceKind {
        SourceKind::Fast4Speed
    }

    fn extract(&self, body: &str, base_url: &str) -> Vec<MediaCandidate> {
        let base = Url::parse(base_url).ok();

        let candidates = match parse_json_soft(body) {
            Some(value) => from_json(&value, base.as_ref()),
            None => {
                debug!(base_url, "fast4speed body is not JSON; scanning HTML");
                from_html(body, base.as_ref())
            }
        };

        dedupe(candidates)
    }
}

fn from_json(value: &Value, base: Option<&Url>) -> Vec<MediaCandidate> {
    let mut candidates = Vec::new();

    if let Value::Object(map) = value {
        for field in LINK_FIELDS {
            if let Some(url) = map
                .get(*field)
                .and_then(Value::as_str)
                .and_then(|raw| absolutize(raw, base))
            {
                candidates.push(link_candidate(url, *field));
            }
        }
    }

    let links = match value {
        Value::Array(items) => Some(items),
        _ => value.get("links").and_then(Value::as_array),
    };

    candidates.extend(
        links
            .into_iter()
            .flatten()
            .filter_map(|entry| serde_json::from_value::<LinkEntry>(entry.clone()).ok())
            .filter_map(|entry| {
                let url = absolutize(&entry.link, base)?;
                let container = if entry.hls {
                    Some(media::M3U8)
                } else if entry.mp4 {
                    Some(media::MP4)
                } else {
                    media::container_for_url(&url)
                };
                let quality = entry
                    .resolution_str
                    .as_deref()
                    .and_then(quality::normalize_label)
                    .or_else(|| quality::label_from_url(&url));
                Some(
                    MediaCandidate::new(url, "links")
                        .with_quality(quality)
                        .with_container(container),
                )
            }),
    );

    candidates
}

fn link_candidate(url: String, label: &str) -> MediaCandidate {
    let container = media::container_for_url(&url);
    let quality = quality::label_from_url(&url);
    MediaCandidate::new(url, label)
        .with_quality(quality)
        .with_container(container)
}

fn from_html(body: &str, base: Option<&Url>) -> Vec<MediaCandidate> {
    let document = Html::parse_document(body);
    let mut candidates = Vec::new();

    for (css, attr, label) in [
        ("video[src]", "src", "video"),
        ("source[src]", "src", "source"),
    ] {
        if let Ok(selector) = Selector::parse(css) {
            candidates.extend(
                document
                    .select(&selector)
                    .filter_map(|el| el.value().attr(attr))
                    .filter_map(|raw| absolutize(&unescape_html(raw), base))
                    .map(|url| link_candidate(url, label)),
            );
        }
    }

    if let Ok(selector) = Selector::parse("a[href]") {
        candidates.extend(
            document
                .select(&selector)
                .filter_map(|el| el.value().attr("href"))
                .filter(|href| media::mentions_media(href))
                .filter_map(|raw| absolutize(&unescape_html(raw), base))
                .map(|url| link_candidate(url, "anchor")),
        );
    }

    if candidates.is_empty() {
        let unescaped = unescape_js(body);
        if let Some(url) = MEDIA_LINK
            .find(&unescaped)
            .and_then(|m| absolutize(&unescape_html(m.as_str()), base))
        {
            candidates.push(link_candidate(url, "pattern"));
        }
    }

    candidates
}
