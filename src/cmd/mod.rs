pub mod batch;
pub mod classify;
pub mod extract;
pub mod resolve;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use vidresolve::{random_profile, BrowserProfile, HttpFetcher, Resolver, ResolverConfig};

/// Global flags layered over the config file.
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub timeout: Option<u64>,
    pub max_redirects: Option<usize>,
    pub random_ua: bool,
}

impl Overrides {
    pub fn load_config(&self) -> Result<ResolverConfig> {
        let mut config = ResolverConfig::load(self.config.as_deref())
            .context("Failed to load resolver config")?;

        if let Some(timeout) = self.timeout {
            anyhow::ensure!(timeout > 0, "--timeout must be at least 1 second");
            config.timeout_secs = timeout;
        }
        if let Some(max_redirects) = self.max_redirects {
            config.max_redirects = max_redirects;
        }
        config.validate().context("Invalid resolver limits")?;
        Ok(config)
    }
}

pub fn build_resolver(overrides: &Overrides) -> Result<Resolver> {
    let mut config = overrides.load_config()?;

    let profile = if overrides.random_ua {
        let profile = random_profile();
        config.user_agent.clone_from(&profile.user_agent);
        profile
    } else {
        BrowserProfile::with_user_agent(&config.user_agent)
    };

    let fetcher = HttpFetcher::with_profile(&config, &profile).context("Failed to build HTTP client")?;
    Ok(Resolver::with_fetcher(Arc::new(config), Arc::new(fetcher)))
}
