//! Web watcher CLI
//!
//! Local execution entry point. For FaaS deployments, use `webwatch-runtime`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use webwatch::{
    config,
    error::Result,
    models::{Config, WatchTarget},
    pipeline::Checker,
    services::ContentFetcher,
};

/// webwatch - Web Page Change Watcher
#[derive(Parser, Debug)]
#[command(
    name = "webwatch",
    version,
    about = "Watch a web page and email when it changes"
)]
struct Cli {
    /// Path to a TOML config file (default: read environment variables)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a URL once: diff, notify and persist like a triggered invocation
    Check {
        /// URL to watch
        url: String,
    },

    /// Print the current content digest of a URL without touching storage
    Digest {
        /// URL to fetch
        url: String,
    },

    /// Validate the configuration
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn load(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => {
            log::info!("Loading configuration from {}", path.display());
            config::load_config(path)
        }
        None => config::from_env(),
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load(&cli)?;

    match &cli.command {
        Command::Check { url } => {
            let target = WatchTarget::parse(url)?;
            let checker = Checker::from_config(&config).await?;
            let change = checker.check(&target).await?;
            println!("{}: {}", target, change.as_str());
        }

        Command::Digest { url } => {
            let target = WatchTarget::parse(url)?;
            let digest = ContentFetcher::new(&config.fetch)?.fetch(target.url()).await?;
            println!("{}  {}", digest, target);
            log::debug!("Storage key: {}", target.storage_key());
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            // Loading already validated; report what was resolved
            match &config.runtime {
                Some(runtime) => log::info!(
                    "✓ Runtime: {:?} at {}",
                    runtime.platform,
                    runtime.address
                ),
                None => log::info!("✓ Runtime: none (local only)"),
            }
            log::info!("✓ Store: {}", config.store.backend_name());
            log::info!(
                "✓ Email: {} recipient(s)",
                config.email.recipients().len()
            );
            log::info!("All validations passed!");
        }
    }

    Ok(())
}
