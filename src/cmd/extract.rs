use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use vidresolve::resolve::quality::select_best;
use vidresolve::resolve::strategies::{extract_guarded, strategy_for};
use vidresolve::{MediaCandidate, SourceKind};

#[derive(Serialize)]
struct ExtractReport<'a> {
    source_type: SourceKind,
    base_url: &'a str,
    candidates: &'a [MediaCandidate],
    #[serde(skip_serializing_if = "Option::is_none")]
    best: Option<&'a MediaCandidate>,
}

fn default_base_url(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::OkRu => "https://ok.ru/",
        SourceKind::Fast4Speed => "https://tools.fast4speed.rsvp/",
        SourceKind::Direct | SourceKind::Generic => "http://localhost/",
    }
}

pub fn cmd_extract(file: &Path, source: SourceKind, base_url: Option<&str>) -> Result<bool> {
    let strategy = strategy_for(source)
        .with_context(|| format!("No extraction strategy for source type {source}"))?;
    let body = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let base_url = base_url.unwrap_or_else(|| default_base_url(source));

    let candidates = extract_guarded(strategy, &body, base_url);
    let report = ExtractReport {
        source_type: source,
        base_url,
        candidates: &candidates,
        best: select_best(&candidates),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(!candidates.is_empty())
}
