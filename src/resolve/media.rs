//! Media container detection from paths, URLs and content types.

use url::Url;

/// Containers the resolver can hand to a player.
pub const MP4: &str = "mp4";
pub const M3U8: &str = "m3u8";

/// Container for a URL path by its extension (`.mp4`, `.m3u8`).
pub fn container_for_path(path: &str) -> Option<&'static str> {
    let lower = path.to_ascii_lowercase();
    if lower.ends_with(".mp4") {
        Some(MP4)
    } else if lower.ends_with(".m3u8") {
        Some(M3U8)
    } else {
        None
    }
}

/// Container for an absolute or protocol-relative URL, by path extension.
///
/// Falls back to a plain substring check for strings `url` cannot parse.
pub fn container_for_url(raw: &str) -> Option<&'static str> {
    let parsed = if raw.starts_with("//") {
        Url::parse(&format!("https:{raw}"))
    } else {
        Url::parse(raw)
    };

    match parsed {
        Ok(url) => container_for_path(url.path()),
        Err(_) => {
            let path = raw.split(['?', '#']).next().unwrap_or(raw);
            container_for_path(path)
        }
    }
}

/// True if the string mentions a streaming extension anywhere.
pub fn mentions_media(raw: &str) -> bool {
    let lower = raw.to_ascii_lowercase();
    lower.contains(".mp4") || lower.contains(".m3u8")
}

/// Container for a `Content-Type` header value.
pub fn container_for_content_type(content_type: &str) -> Option<&'static str> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match mime.as_str() {
        "application/vnd.apple.mpegurl" | "application/x-mpegurl" | "audio/mpegurl" => Some(M3U8),
        m if m.starts_with("video/") => Some(MP4),
        _ => None,
    }
}

/// Normalize a declared type (`"video/mp4"`, `"hls"`, `"MP4"`) to a container.
pub fn container_for_declared(declared: &str) -> Option<&'static str> {
    let lower = declared.trim().to_ascii_lowercase();
    match lower.as_str() {
        "mp4" | "video/mp4" => Some(MP4),
        "m3u8" | "hls" | "application/x-mpegurl" | "application/vnd.apple.mpegurl" => Some(M3U8),
        _ => None,
    }
}
