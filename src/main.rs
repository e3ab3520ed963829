//! `vidresolve` CLI - resolve embed links into playable media URLs

mod cmd;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vidresolve::SourceKind;

#[derive(Parser)]
#[command(name = "vidresolve")]
#[command(about = "Resolve video embed links into directly playable media URLs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ~/.config/vidresolve/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Request deadline in seconds (overrides config)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Redirects to follow before failing (overrides config)
    #[arg(long, global = true)]
    max_redirects: Option<usize>,

    /// Use a random realistic browser fingerprint
    #[arg(long, global = true)]
    random_ua: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one embed URL and print the result as JSON
    Resolve {
        /// Embed or media URL
        url: String,

        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,
    },

    /// Print the source type of a URL (no network)
    Classify {
        /// URL to classify
        url: String,
    },

    /// Run an extraction strategy on a saved page
    Extract {
        /// Saved page body
        file: PathBuf,

        /// Strategy to run (ok.ru, fast4speed, generic)
        #[arg(short, long)]
        source: SourceKind,

        /// URL the page was fetched from, for relative links
        #[arg(short, long)]
        base_url: Option<String>,
    },

    /// Resolve one URL per line of a file, concurrently
    Batch {
        /// File with one URL per line (`#` starts a comment)
        file: PathBuf,

        /// Maximum concurrent resolutions
        #[arg(short = 'j', long, default_value = "4")]
        parallel: usize,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // stdout carries JSON; logs go to stderr
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let overrides = cmd::Overrides {
        config: cli.config,
        timeout: cli.timeout,
        max_redirects: cli.max_redirects,
        random_ua: cli.random_ua,
    };

    let ok = match cli.command {
        Commands::Resolve { url, pretty } => cmd::resolve::cmd_resolve(&url, pretty, &overrides).await?,
        Commands::Classify { url } => cmd::classify::cmd_classify(&url),
        Commands::Extract {
            file,
            source,
            base_url,
        } => cmd::extract::cmd_extract(&file, source, base_url.as_deref())?,
        Commands::Batch { file, parallel } => {
            cmd::batch::cmd_batch(&file, parallel, &overrides).await?
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
