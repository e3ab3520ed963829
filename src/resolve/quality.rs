//! Quality labels and best-candidate selection.
//!
//! Labels normalize to `"{height}p"`. ok.ru publishes named tiers instead
//! of heights, so those names map onto the same scale. Candidates without
//! a recognizable quality rank below every labelled one.

use std::sync::LazyLock;

use regex::Regex;

use super::MediaCandidate;

static HEIGHT_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d{3,4})p?$").expect("valid regex"));

static HEIGHT_IN_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^0-9a-z])(2160|1440|1080|720|480|360|240|144)p(?:[^0-9a-z]|$)")
        .expect("valid regex")
});

/// ok.ru tier names, lowest first.
const NAMED_TIERS: &[(&str, u32)] = &[
    ("mobile", 144),
    ("lowest", 240),
    ("low", 360),
    ("sd", 480),
    ("hd", 720),
    ("full", 1080),
    ("quad", 1440),
    ("ultra", 2160),
];

/// Pixel height for a quality label (`"1080p"`, `"720"`, `"hd"`).
pub fn height_for_label(label: &str) -> Option<u32> {
    let label = label.trim().to_ascii_lowercase();
    if let Some(&(_, height)) = NAMED_TIERS.iter().find(|(name, _)| *name == label) {
        return Some(height);
    }
    HEIGHT_LABEL
        .captures(&label)
        .and_then(|c| c[1].parse().ok())
        .filter(|h| *h > 0)
}

/// Normalize a label to `"{height}p"`, or `None` if it carries no height.
pub fn normalize_label(label: &str) -> Option<String> {
    height_for_label(label).map(|h| format!("{h}p"))
}

/// Guess a quality from a resolution marker inside a URL (`.../720p/...`).
pub fn label_from_url(url: &str) -> Option<String> {
    HEIGHT_IN_URL
        .captures(url)
        .map(|c| format!("{}p", &c[1]))
}

/// Ranking key for a candidate; unlabelled candidates rank 0.
pub fn rank(candidate: &MediaCandidate) -> u32 {
    candidate
        .quality
        .as_deref()
        .and_then(height_for_label)
        .unwrap_or(0)
}

/// Highest-quality candidate; ties go to the first one seen.
pub fn select_best(candidates: &[MediaCandidate]) -> Option<&MediaCandidate> {
    let mut best: Option<(&MediaCandidate, u32)> = None;
    for candidate in candidates {
        let score = rank(candidate);
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((candidate, score)),
        }
    }
    best.map(|(c, _)| c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(url: &str, quality: Option<&str>) -> MediaCandidate {
        let mut c = MediaCandidate::new(url, "test");
        c.quality = quality.map(str::to_string);
        c
    }

    #[test]
    fn named_tiers_map_to_heights() {
        assert_eq!(height_for_label("full"), Some(1080));
        assert_eq!(height_for_label("HD"), Some(720));
        assert_eq!(height_for_label("mobile"), Some(144));
        assert_eq!(height_for_label("embed"), None);
    }

    #[test]
    fn numeric_labels_normalize() {
        assert_eq!(normalize_label("1080p"), Some("1080p".to_string()));
        assert_eq!(normalize_label("720"), Some("720p".to_string()));
        assert_eq!(normalize_label("sd"), Some("480p".to_string()));
        assert_eq!(normalize_label("Unknown"), None);
    }

    #[test]
    fn url_resolution_markers() {
        assert_eq!(
            label_from_url("https://cdn.example/show/ep1_720p.mp4"),
            Some("720p".to_string())
        );
        assert_eq!(
            label_from_url("https://cdn.example/1080p/index.m3u8"),
            Some("1080p".to_string())
        );
        assert_eq!(label_from_url("https://cdn.example/v1720p0.mp4"), None);
    }

    #[test]
    fn best_prefers_highest_quality() {
        let candidates = vec![
            candidate("a", Some("480p")),
            candidate("b", Some("1080p")),
            candidate("c", None),
            candidate("d", Some("720p")),
        ];
        assert_eq!(select_best(&candidates).unwrap().url, "b");
    }

    #[test]
    fn ties_go_to_first_seen() {
        let candidates = vec![
            candidate("first", Some("720p")),
            candidate("second", Some("hd")),
        ];
        assert_eq!(select_best(&candidates).unwrap().url, "first");

        let unlabelled = vec![candidate("x", None), candidate("y", None)];
        assert_eq!(select_best(&unlabelled).unwrap().url, "x");
    }

    #[test]
    fn empty_has_no_best() {
        assert!(select_best(&[]).is_none());
    }
}
