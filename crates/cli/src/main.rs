//! aquajal entry point.
//!
//! Hosts the background worker against the real network and an on-disk
//! cache. Logging goes to stderr so stdout carries only command output.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use aquajal_core::{AppConfig, CacheDb};
use aquajal_worker::WorkerContext;
use host::JsonLinesNotifier;

mod commands;
mod host;

#[derive(Parser)]
#[command(name = "aquajal", version, about = "Offline cache and push notifications for the Aquajal PWA shell")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Precache the asset list and activate the current cache generation
    Install,

    /// Answer a request the way the worker would
    Fetch {
        /// Absolute URL or path on the configured origin
        url: String,

        /// Treat the request as a page navigation (enables the offline page)
        #[arg(long)]
        navigate: bool,
    },

    /// Deliver a push message to the worker
    Push {
        /// Message body, usually `{"title": ..., "body": ...}`
        payload: Option<String>,
    },

    /// List cache generations, or look up a URL in them
    Caches {
        /// Report which generation answers this URL instead of listing
        #[arg(long = "match", value_name = "URL")]
        lookup: Option<String>,
    },

    /// Relay a push subscription descriptor to the backend
    Relay {
        /// JSON file holding the descriptor
        descriptor: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    let mut out = std::io::stdout();

    match cli.command {
        Command::Install => commands::install(worker_context(&config).await?, &mut out).await,
        Command::Fetch { url, navigate } => {
            commands::fetch(worker_context(&config).await?, &url, navigate, &mut out).await
        }
        Command::Push { payload } => commands::push(worker_context(&config).await?, payload).await,
        Command::Caches { lookup: None } => {
            commands::caches(&open_cache(&config).await?, &config.cache_name, &mut out).await
        }
        Command::Caches { lookup: Some(url) } => {
            commands::lookup(&open_cache(&config).await?, &config, &url, &mut out).await
        }
        Command::Relay { descriptor } => commands::relay(&config, &descriptor, &mut out).await,
    }
}

async fn open_cache(config: &AppConfig) -> Result<CacheDb> {
    let cache = CacheDb::open(&config.db_path).await?;
    tracing::debug!(db = %config.db_path.display(), "opened cache storage");
    Ok(cache)
}

async fn worker_context(config: &AppConfig) -> Result<WorkerContext> {
    let cache = open_cache(config).await?;
    let notifier = Arc::new(JsonLinesNotifier::new(std::io::stdout()));
    Ok(host::context(config, cache, notifier)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fetch() {
        let cli = Cli::try_parse_from(["aquajal", "fetch", "/orders", "--navigate"]).unwrap();
        assert!(matches!(cli.command, Command::Fetch { ref url, navigate: true } if url == "/orders"));
    }

    #[test]
    fn test_parse_push_without_payload() {
        let cli = Cli::try_parse_from(["aquajal", "push"]).unwrap();
        assert!(matches!(cli.command, Command::Push { payload: None }));
    }

    #[test]
    fn test_parse_caches_match() {
        let cli = Cli::try_parse_from(["aquajal", "caches", "--match", "/index"]).unwrap();
        assert!(matches!(cli.command, Command::Caches { lookup: Some(ref url) } if url == "/index"));

        let cli = Cli::try_parse_from(["aquajal", "caches"]).unwrap();
        assert!(matches!(cli.command, Command::Caches { lookup: None }));
    }

    #[test]
    fn test_unknown_command_fails() {
        assert!(Cli::try_parse_from(["aquajal", "activate"]).is_err());
    }
}
