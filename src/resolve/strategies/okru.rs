//! ok.ru embed pages.
//!
//! The player element carries its whole configuration in a `data-options`
//! attribute: HTML-escaped JSON whose `flashvars.metadata` field is either
//! an object or a JSON-encoded string. The metadata lists one entry per
//! quality tier under `videos`, and optionally an HLS manifest.
//!
//! ```text
//! <div data-module="OKVideo" data-options="{&quot;flashvars&quot;:{&quot;metadata&quot;:&quot;{...}&quot;}}">
//! ```

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{absolutize, dedupe, ExtractionStrategy};
use crate::resolve::embedded::{nested_json, parse_json_soft, slices_between, unescape_html};
use crate::resolve::{media, quality, MediaCandidate, SourceKind};

const OPTION_MARKERS: &[(&str, &str)] = &[("data-options=\"", "\""), ("data-options='", "'")];

/// Keys that may hold the HLS manifest.
const HLS_KEYS: &[&str] = &["hlsManifestUrl", "hlsMasterPlaylistUrl"];

/// One `videos[]` entry.
#[derive(Debug, Deserialize)]
struct VideoEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    url: String,
    #[serde(default, rename = "type")]
    declared: Option<String>,
    #[serde(default)]
    disallowed: bool,
}

/// Extracts per-tier MP4 links and the HLS manifest from ok.ru player data.
#[derive(Debug, Default, Clone, Copy)]
pub struct OkRuStrategy;

impl ExtractionStrategy for OkRuStrategy {
    fn kind(&self) -> SourceKind {
        SourceKind::OkRu
    }

    fn extract(&self, body: &str, base_url: &str) -> Vec<MediaCandidate> {
        let base = Url::parse(base_url).ok();

        let Some(metadata) = find_metadata(body) else {
            debug!(base_url, "No ok.ru player metadata found");
            return Vec::new();
        };

        dedupe(candidates_from_metadata(&metadata, base.as_ref()))
    }
}

/// Locate the metadata object, either in a player attribute or as a bare
/// JSON body (the metadata endpoint).
fn find_metadata(body: &str) -> Option<Value> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('{') {
        if let Some(metadata) = parse_json_soft(trimmed).and_then(|v| metadata_in(&v)) {
            return Some(metadata);
        }
    }

    OPTION_MARKERS
        .iter()
        .flat_map(|&(start, end)| slices_between(body, start, end))
        .filter_map(|raw| parse_json_soft(&unescape_html(raw)))
        .find_map(|options| metadata_in(&options))
}

/// Metadata inside a parsed options blob, or the blob itself when it
/// already is metadata.
fn metadata_in(value: &Value) -> Option<Value> {
    if value.get("videos").is_some() {
        return Some(value.clone());
    }
    let metadata = nested_json(value.get("flashvars")?.get("metadata")?)?;
    metadata.get("videos").is_some().then_some(metadata)
}

fn candidates_from_metadata(metadata: &Value, base: Option<&Url>) -> Vec<MediaCandidate> {
    let mut candidates: Vec<MediaCandidate> = metadata
        .get("videos")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|entry| serde_json::from_value::<VideoEntry>(entry.clone()).ok())
        .filter(|entry| !entry.disallowed)
        .filter_map(|entry| {
            let url = absolutize(&entry.url, base)?;
            let container = media::container_for_url(&url)
                .or_else(|| entry.declared.as_deref().and_then(media::container_for_declared))
                .unwrap_or(media::MP4);
            Some(
                MediaCandidate::new(url, format!("videos.{}", entry.name))
                    .with_quality(quality::normalize_label(&entry.name))
                    .with_container(Some(container)),
            )
        })
        .collect();

    for key in HLS_KEYS {
        if let Some(url) = metadata
            .get(*key)
            .and_then(Value::as_str)
            .and_then(|raw| absolutize(raw, base))
        {
            candidates.push(MediaCandidate::new(url, *key).with_container(Some(media::M3U8)));
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BASE: &str = "https://ok.ru/videoembed/123456";

    fn page_with(metadata: &Value) -> String {
        let options = json!({
            "flashvars": { "metadata": metadata.to_string() }
        });
        let escaped = options
            .to_string()
            .replace('&', "&amp;")
            .replace('"', "&quot;");
        format!(
            r#"<html><body><div data-module="OKVideo" data-options="{escaped}"></div></body></html>"#
        )
    }

    #[test]
    fn extracts_each_tier() {
        let page = page_with(&json!({
            "videos": [
                { "name": "full", "url": "https://vd1.mycdn.me/?expires=1&id=1&type=3" },
                { "name": "sd", "url": "https://vd1.mycdn.me/?expires=1&id=1&type=2" }
            ]
        }));

        let candidates = OkRuStrategy.extract(&page, BASE);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].quality.as_deref(), Some("1080p"));
        assert_eq!(candidates[0].url, "https://vd1.mycdn.me/?expires=1&id=1&type=3");
        assert_eq!(candidates[0].container.as_deref(), Some("mp4"));
        assert_eq!(candidates[1].quality.as_deref(), Some("480p"));
    }

    #[test]
    fn hls_manifest_is_an_extra_candidate() {
        let page = page_with(&json!({
            "videos": [{ "name": "hd", "url": "https://vd1.mycdn.me/v?id=7" }],
            "hlsManifestUrl": "https://vd1.mycdn.me/video.m3u8?id=7"
        }));

        let candidates = OkRuStrategy.extract(&page, BASE);
        assert_eq!(candidates.len(), 2);
        let hls = &candidates[1];
        assert_eq!(hls.container.as_deref(), Some("m3u8"));
        assert_eq!(hls.quality, None);
        assert_eq!(hls.source_label, "hlsManifestUrl");
    }

    #[test]
    fn metadata_as_object_is_accepted() {
        let options = json!({
            "flashvars": { "metadata": { "videos": [{ "name": "low", "url": "//vd2.mycdn.me/v?id=2" }] } }
        });
        let page = format!(
            "<div data-options='{}'></div>",
            options.to_string().replace('\'', "&#39;")
        );

        let candidates = OkRuStrategy.extract(&page, BASE);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].url, "https://vd2.mycdn.me/v?id=2");
        assert_eq!(candidates[0].quality.as_deref(), Some("360p"));
    }

    #[test]
    fn bare_metadata_body_is_accepted() {
        let body = json!({
            "videos": [{ "name": "ultra", "url": "https://vd3.mycdn.me/v?id=3" }]
        })
        .to_string();

        let candidates = OkRuStrategy.extract(&body, "https://ok.ru/dk?cmd=videoPlayerMetadata");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].quality.as_deref(), Some("2160p"));
    }

    #[test]
    fn disallowed_and_broken_entries_are_skipped() {
        let page = page_with(&json!({
            "videos": [
                { "name": "full", "url": "https://vd1.mycdn.me/full", "disallowed": true },
                { "name": "hd", "url": "" },
                { "name": 5, "url": 7 },
                "garbage",
                { "name": "sd", "url": "https://vd1.mycdn.me/sd" }
            ]
        }));

        let candidates = OkRuStrategy.extract(&page, BASE);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].quality.as_deref(), Some("480p"));
    }

    #[test]
    fn unknown_tier_keeps_candidate_without_quality() {
        let page = page_with(&json!({
            "videos": [{ "name": "mystery", "url": "https://vd1.mycdn.me/m" }]
        }));

        let candidates = OkRuStrategy.extract(&page, BASE);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].quality, None);
    }

    #[test]
    fn malformed_pages_yield_nothing() {
        assert!(OkRuStrategy.extract("", BASE).is_empty());
        assert!(OkRuStrategy.extract("<div data-options=\"{broken\"></div>", BASE).is_empty());
        assert!(OkRuStrategy.extract("<div data-options=\"{}\"></div>", BASE).is_empty());
        assert!(OkRuStrategy.extract("{\"videos\": 3}", BASE).is_empty());
    }

    #[test]
    fn skips_unrelated_option_blobs() {
        let page = format!(
            r#"<div data-options="{{&quot;player&quot;:1}}"></div>{}"#,
            page_with(&json!({ "videos": [{ "name": "hd", "url": "https://vd1.mycdn.me/hd" }] }))
        );

        let candidates = OkRuStrategy.extract(&page, BASE);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].quality.as_deref(), Some("720p"));
    }
}
