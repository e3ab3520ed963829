//! Last-resort extraction for hosts without a dedicated strategy.
//!
//! Page structure is ignored entirely: the body is unescaped and scanned for
//! anything URL-shaped that mentions `.mp4` or `.m3u8`. HLS playlists are
//! recognized first, since they are media already.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use super::{absolutize, dedupe, ExtractionStrategy};
use crate::resolve::embedded::{unescape_html, unescape_js};
use crate::resolve::{media, quality, MediaCandidate, SourceKind};

static URL_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:https?:)?//[^\s"'<>\\`]+"#).expect("valid regex")
});

/// Quoted relative media paths in `src=`/`file:`-style assignments.
static RELATIVE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\b(?:src|file|href|source|url)\s*[=:]\s*["']([^"'\s:]+\.(?:mp4|m3u8)(?:\?[^"'\s]*)?)["']"#,
    )
    .expect("valid regex")
});

const TRAILING_PUNCTUATION: &[char] = &[')', ']', '}', ',', ';', '.', '!'];

/// Permissive scan for media URLs anywhere in the body.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericStrategy;

impl ExtractionStrategy for GenericStrategy {
    fn kind(&self) -> SourceKind {
        SourceKind::Generic
    }

    fn extract(&self, body: &str, base_url: &str) -> Vec<MediaCandidate> {
        let base = Url::parse(base_url).ok();

        if body.trim_start().starts_with("#EXTM3U") {
            return dedupe(from_playlist(body, base_url, base.as_ref()));
        }

        dedupe(scan(body, base.as_ref()))
    }
}

/// Variants of a master playlist, or the playlist itself when it's a
/// media playlist.
fn from_playlist(body: &str, base_url: &str, base: Option<&Url>) -> Vec<MediaCandidate> {
    if !body.contains("#EXT-X-STREAM-INF") {
        return absolutize(base_url, None)
            .map(|url| {
                vec![MediaCandidate::new(url, "playlist").with_container(Some(media::M3U8))]
            })
            .unwrap_or_default();
    }

    let mut variants = Vec::new();
    let mut lines = body.lines().map(str::trim);

    while let Some(line) = lines.next() {
        let Some(rest) = line.strip_prefix("#EXT-X-STREAM-INF:") else {
            continue;
        };
        let attrs = parse_attributes(rest);

        let Some(uri) = lines.by_ref().find(|l| !l.is_empty()) else {
            break;
        };
        if uri.starts_with('#') {
            continue;
        }
        let Some(url) = absolutize(uri, base) else {
            continue;
        };

        let quality = attrs
            .get("RESOLUTION")
            .and_then(|r| r.split(['x', 'X']).nth(1))
            .and_then(|h| h.parse::<u32>().ok())
            .map(|h| format!("{h}p"))
            .or_else(|| quality::label_from_url(&url));

        variants.push(
            MediaCandidate::new(url, "variant")
                .with_quality(quality)
                .with_container(Some(media::M3U8)),
        );
    }

    variants
}

/// Attribute list of an `#EXT-X-STREAM-INF` tag; quoted values may hold commas.
fn parse_attributes(attr_str: &str) -> HashMap<String, String> {
    let mut attrs = HashMap::new();
    let mut chars = attr_str.chars().peekable();

    while chars.peek().is_some() {
        let key: String = chars.by_ref().take_while(|&c| c != '=').collect();
        if key.trim().is_empty() {
            break;
        }

        let value: String = if chars.peek() == Some(&'"') {
            chars.next();
            let v = chars.by_ref().take_while(|&c| c != '"').collect();
            chars.next();
            v
        } else {
            chars.by_ref().take_while(|&c| c != ',').collect()
        };

        attrs.insert(key.trim().to_string(), value.trim().to_string());
    }

    attrs
}

/// URL-shaped tokens mentioning media, in body order.
fn scan(body: &str, base: Option<&Url>) -> Vec<MediaCandidate> {
    let html = unescape_html(body);
    let text = unescape_js(&html);

    let absolute = URL_TOKEN
        .find_iter(&text)
        .map(|m| (m.start(), m.as_str()));
    let relative = RELATIVE_ATTR
        .captures_iter(&text)
        .filter_map(|c| c.get(1))
        .filter(|m| !m.as_str().starts_with("//"))
        .map(|m| (m.start(), m.as_str()));

    let mut hits: Vec<(usize, &str)> = absolute.chain(relative).collect();
    hits.sort_by_key(|&(pos, _)| pos);

    hits.into_iter()
        .map(|(_, token)| token.trim_end_matches(TRAILING_PUNCTUATION))
        .filter(|token| media::mentions_media(token))
        .filter_map(|token| absolutize(token, base))
        .map(|url| {
            let container = media::container_for_url(&url).or_else(|| {
                let lower = url.to_ascii_lowercase();
                if lower.contains(".m3u8") {
                    Some(media::M3U8)
                } else {
                    Some(media::MP4)
                }
            });
            let quality = quality::label_from_url(&url);
            MediaCandidate::new(url, "scan")
                .with_quality(quality)
                .with_container(container)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://player.example/embed/42";

    fn urls(candidates: &[MediaCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.url.as_str()).collect()
    }

    #[test]
    fn finds_media_anywhere() {
        let body = r#"
            <div data-x='{"u":"https:\/\/cdn.example\/a\/720p\/ep.mp4"}'></div>
            <script>var hls = "//cdn.example/live/index.m3u8?sig=abc";</script>
            <p>See https://cdn.example/trailer.mp4.</p>
            <a href="https://example.com/page">not media</a>
        "#;

        let candidates = GenericStrategy.extract(body, BASE);
        assert_eq!(
            urls(&candidates),
            vec![
                "https://cdn.example/a/720p/ep.mp4",
                "https://cdn.example/live/index.m3u8?sig=abc",
                "https://cdn.example/trailer.mp4",
            ]
        );
        assert_eq!(candidates[0].quality.as_deref(), Some("720p"));
        assert_eq!(candidates[1].container.as_deref(), Some("m3u8"));
    }

    #[test]
    fn entity_escaped_urls() {
        let body = r#"<video data-src="https://cdn.example/v.mp4?a=1&amp;b=2"></video>"#;
        let candidates = GenericStrategy.extract(body, BASE);
        assert_eq!(urls(&candidates), vec!["https://cdn.example/v.mp4?a=1&b=2"]);
    }

    #[test]
    fn relative_sources_resolve_against_base() {
        let body = r#"<source src="/files/ep9.mp4" type="video/mp4">"#;
        let candidates = GenericStrategy.extract(body, BASE);
        assert_eq!(urls(&candidates), vec!["https://player.example/files/ep9.mp4"]);
    }

    #[test]
    fn duplicates_keep_first_position() {
        let body = "https://b.example/2.mp4 https://a.example/1.mp4 https://b.example/2.mp4";
        let candidates = GenericStrategy.extract(body, BASE);
        assert_eq!(
            urls(&candidates),
            vec!["https://b.example/2.mp4", "https://a.example/1.mp4"]
        );
    }

    #[test]
    fn no_media_reference_is_empty() {
        let body = "<html><body><a href=\"https://example.com\">home</a></body></html>";
        assert!(GenericStrategy.extract(body, BASE).is_empty());
        assert!(GenericStrategy.extract("", BASE).is_empty());
    }

    #[test]
    fn master_playlist_variants() {
        let body = "#EXTM3U\n\
            #EXT-X-STREAM-INF:BANDWIDTH=800000,RESOLUTION=640x360,CODECS=\"avc1.4d401e,mp4a.40.2\"\n\
            360/index.m3u8\n\
            #EXT-X-STREAM-INF:BANDWIDTH=5000000,RESOLUTION=1920x1080\n\
            https://cdn.example/hls/1080/index.m3u8\n";

        let candidates = GenericStrategy.extract(body, "https://cdn.example/hls/master.txt");
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].url, "https://cdn.example/hls/360/index.m3u8");
        assert_eq!(candidates[0].quality.as_deref(), Some("360p"));
        assert_eq!(candidates[1].quality.as_deref(), Some("1080p"));
        assert!(candidates.iter().all(|c| c.container.as_deref() == Some("m3u8")));
    }

    #[test]
    fn media_playlist_is_its_own_candidate() {
        let body = "#EXTM3U\n#EXT-X-TARGETDURATION:10\n#EXTINF:10,\nseg0.ts\n";
        let candidates = GenericStrategy.extract(body, "https://cdn.example/stream");
        assert_eq!(urls(&candidates), vec!["https://cdn.example/stream"]);
        assert_eq!(candidates[0].container.as_deref(), Some("m3u8"));
    }

    #[test]
    fn attributes_with_quoted_commas() {
        let attrs = parse_attributes("BANDWIDTH=1,CODECS=\"a,b\",RESOLUTION=1280x720");
        assert_eq!(attrs["CODECS"], "a,b");
        assert_eq!(attrs["RESOLUTION"], "1280x720");
    }
}
