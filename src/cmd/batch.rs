use std::path::Path;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use serde::Serialize;

use vidresolve::ResolutionResult;

use super::{build_resolver, Overrides};

#[derive(Serialize)]
struct BatchLine {
    source_url: String,
    #[serde(flatten)]
    result: ResolutionResult,
}

pub async fn cmd_batch(file: &Path, parallel: usize, overrides: &Overrides) -> Result<bool> {
    anyhow::ensure!(parallel > 0, "--parallel must be at least 1");

    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let urls: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();

    let resolver = build_resolver(overrides)?;

    let mut results = stream::iter(urls)
        .map(|source_url| {
            let resolver = resolver.clone();
            async move {
                let result = resolver.resolve_url(&source_url).await;
                BatchLine { source_url, result }
            }
        })
        .buffer_unordered(parallel);

    let mut all_ok = true;
    while let Some(line) = results.next().await {
        all_ok &= line.result.success;
        println!("{}", serde_json::to_string(&line)?);
    }

    Ok(all_ok)
}
