//! Tycoon-Autopilot main entry point
//!
//! This is the command-line interface for the Airlines Manager Tycoon account steward.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tycoon_autopilot::agent::Coordinator;
use tycoon_autopilot::config::{load_config_with_hash, Config};

/// Tycoon-Autopilot: an unattended Airlines Manager Tycoon account steward
///
/// Keeps line records in sync with the game, requests audits for unreliable
/// lines, pushes ideal ticket prices and collects the daily bonuses.
#[derive(Parser, Debug)]
#[command(name = "tycoon-autopilot")]
#[command(version = "1.0.0")]
#[command(about = "An unattended Airlines Manager Tycoon account steward", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Run a single pass and exit
    #[arg(long, conflicts_with = "dry_run")]
    once: bool,

    /// Validate config and show what would be done without contacting the game
    #[arg(long, conflicts_with = "once")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let mut coordinator = Coordinator::new(config).context("failed to set up the agent")?;

    if cli.once {
        let report = coordinator.run_once().await.context("pass failed")?;
        tracing::info!("Single pass finished: {:?}", report);
    } else {
        coordinator
            .run_forever()
            .await
            .context("agent stopped on a fatal error")?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tycoon_autopilot=info,warn"),
            1 => EnvFilter::new("tycoon_autopilot=debug,info"),
            2 => EnvFilter::new("tycoon_autopilot=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: prints the validated configuration
fn handle_dry_run(config: &Config) {
    println!("=== Tycoon-Autopilot Dry Run ===\n");

    println!("Remote:");
    println!("  Base URL: {}", config.remote.base_url);
    println!("  User agent: {}", config.remote.user_agent);
    println!("  Card holder path: {}", config.remote.card_holder_path);

    println!("\nAccount:");
    match config.account.resolve() {
        Ok(credentials) => println!("  Email: {}", credentials.email),
        Err(e) => println!("  Not resolvable yet ({})", e),
    }

    println!("\nStorage:");
    println!("  Cookies: {}", config.storage.cookies_path.display());
    println!("  Lines: {}", config.storage.lines_dir.display());
    println!("  Airports: {}", config.storage.airports_dir.display());
    println!("  Error dumps: {}", config.storage.dump_dir.display());
    println!("  Lines summary: {}", config.storage.lines_summary_path.display());
    println!(
        "  Airplanes summary: {}",
        config.storage.airplanes_summary_path.display()
    );
    println!("  Bonus results: {}", config.storage.bonus_results_dir.display());

    let schedule = &config.schedule;
    println!("\nSchedule:");
    println!(
        "  Line refresh interval: {} days",
        schedule.line_update_interval_days
    );
    println!(
        "  Request pacing: {}-{}s",
        schedule.request_interval_min, schedule.request_interval_max
    );
    println!(
        "  Pass interval: {}-{}s",
        schedule.pass_interval_min, schedule.pass_interval_max
    );
    println!("  Retry delay: {}s", schedule.retry_delay);
    println!("  Max pages per listing: {}", schedule.max_pages);

    println!(
        "\nBonuses: {}",
        if config.bonuses.enabled { "enabled" } else { "disabled" }
    );

    println!("\n✓ Configuration is valid");
}
