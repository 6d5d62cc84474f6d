use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use repoconform::{github, Config, GitHubClient, ReconcileEngine};

#[derive(Parser)]
#[command(name = "repoconform")]
#[command(about = "Keeps GitHub repository settings and branch protection consistent")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path (defaults to XDG config location)
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile every repository against the configured policy
    Reconcile {
        /// Enumerate and probe, but write nothing
        #[arg(long)]
        dry_run: bool,
    },

    /// List repositories and whether they would be reconciled
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;
    info!("Starting repoconform v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = load_config(cli.config)?;
    config.validate()?;

    match cli.command {
        None | Some(Commands::Reconcile { dry_run: false }) => cmd_reconcile(&config, false).await,
        Some(Commands::Reconcile { dry_run: true }) => cmd_reconcile(&config, true).await,
        Some(Commands::List) => cmd_list(&config).await,
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // Logs go to stderr; stdout is reserved for the report table
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

/// Load configuration from specified path or default location
fn load_config(config_path: Option<std::path::PathBuf>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load(&path),
        None => Config::load_or_default(),
    }
}

/// Reconcile all non-archived repositories against the policy.
///
/// The engine reports errors; deciding to terminate the process happens
/// here, and only here.
async fn cmd_reconcile(config: &Config, dry_run: bool) -> Result<()> {
    // Credential check comes first: no API call is made without it
    let token = github::token_from_env()?;
    let client = GitHubClient::new(config, &token)?;

    let engine = ReconcileEngine::new(config.clone(), client);
    let summary = engine.run(dry_run).await?;

    print!("{}", summary.table());

    println!();
    if dry_run {
        println!("Dry run complete - nothing was written");
    }
    println!(
        "Reconciled {} of {} repositories ({} archived skipped) in {:.2}s",
        summary.reconciled,
        summary.total_repositories,
        summary.archived_skipped,
        summary.duration.as_secs_f64()
    );

    Ok(())
}

/// List repositories and whether they would be reconciled
async fn cmd_list(config: &Config) -> Result<()> {
    let token = github::token_from_env()?;
    let client = GitHubClient::new(config, &token)?;

    let repositories = client.list_repositories().await?;

    println!("Repositories for {} ({}):", client.account(), repositories.len());
    for repo in &repositories {
        if repo.archived {
            println!("  {} (archived, skipped)", repo.name);
        } else {
            println!("  {}", repo.name);
        }
    }

    Ok(())
}
