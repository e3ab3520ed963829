use anyhow::Result;

use super::{build_resolver, Overrides};

pub async fn cmd_resolve(url: &str, pretty: bool, overrides: &Overrides) -> Result<bool> {
    let resolver = build_resolver(overrides)?;
    let result = resolver.resolve_url(url).await;

    let json = if pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{json}");

    Ok(result.success)
}
