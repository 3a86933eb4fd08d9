//! Stay-Scout main entry point
//!
//! This is the command-line interface for the Stay-Scout accommodation search.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use stay_scout::config::{load_config_with_hash, Config};
use stay_scout::extract::{bind_sources, build_http_client};
use stay_scout::output::{
    print_history, print_summary, ExportSink, MarkdownExporter, SessionReport,
};
use stay_scout::session::{Orchestrator, SearchTerms};
use stay_scout::storage::{SqliteStorage, SummaryStore};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

/// Stay-Scout: concurrent accommodation search
///
/// Stay-Scout searches every configured booking site at once for one
/// destination and night, and stores summary statistics of each search.
/// While a search runs, type `p` to pause, `r` to resume and `s` to stop.
#[derive(Parser, Debug)]
#[command(name = "stay-scout")]
#[command(version = "1.0.0")]
#[command(about = "Concurrent accommodation search", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Destination to search
    #[arg(long, required_unless_present = "dry_run")]
    destination: Option<String>,

    /// Check-in date (dd/mm/yyyy)
    #[arg(long, required_unless_present = "dry_run")]
    date: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the sites that would be searched
    #[arg(long, conflicts_with_all = ["history", "export_history"])]
    dry_run: bool,

    /// Print stored searches for the destination and date, then exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_history"])]
    history: bool,

    /// Export stored searches for the destination and date, then exit
    #[arg(long, conflicts_with_all = ["dry_run", "history"])]
    export_history: bool,

    /// Do not write a markdown export after a search
    #[arg(long)]
    no_export: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        return handle_dry_run(&config);
    }

    let terms = search_terms(&cli)?;

    if cli.history {
        handle_history(&config, &terms)
    } else if cli.export_history {
        handle_export_history(&config, &terms)
    } else {
        // A pending stdin read would otherwise keep the runtime alive on exit
        let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
        let result = runtime.block_on(handle_search(config, terms, !cli.no_export));
        runtime.shutdown_timeout(Duration::from_millis(100));
        result
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("stay_scout=info,warn"),
            1 => EnvFilter::new("stay_scout=debug,info"),
            2 => EnvFilter::new("stay_scout=trace,debug"),
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

fn search_terms(cli: &Cli) -> anyhow::Result<SearchTerms> {
    let (Some(destination), Some(date)) = (&cli.destination, &cli.date) else {
        bail!("--destination and --date are required");
    };
    let today = chrono::Local::now().date_naive();
    Ok(SearchTerms::parse(destination, date, today)?)
}

/// Handles the --dry-run mode: validates config and shows what would be searched
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Stay-Scout Dry Run ===\n");

    println!("Session:");
    println!("  Poll interval: {}ms", config.session.poll_interval_ms);
    println!("  Join timeout: {}s", config.session.join_timeout_secs);
    println!("  Pause notice every: {}s", config.session.pause_notice_secs);
    println!("  Max empty pages: {}", config.session.max_empty_pages);
    println!("  Request timeout: {}s", config.session.request_timeout_secs);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Exports: {}", config.output.export_dir);

    let client = build_http_client(&config.user_agent, config.session.request_timeout())?;
    let bindings = bind_sources(config, &client)?;

    println!("\nSites ({}):", bindings.len());
    for binding in &bindings {
        let origin = config
            .base_url_for(binding.site)
            .unwrap_or(binding.site.default_origin());
        println!("  - {} ({})", binding.site, origin);
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the --history mode: prints stored summaries for the terms
fn handle_history(config: &Config, terms: &SearchTerms) -> anyhow::Result<()> {
    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let history = storage.list_history(&terms.destination, terms.checkin)?;
    print_history(&history);
    Ok(())
}

/// Handles the --export-history mode: writes stored summaries to markdown
fn handle_export_history(config: &Config, terms: &SearchTerms) -> anyhow::Result<()> {
    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let history = storage.list_history(&terms.destination, terms.checkin)?;

    let exporter = MarkdownExporter::new(&config.output.export_dir);
    let path = exporter.export_history(&terms.destination, terms.checkin, &history)?;

    println!("✓ History exported to: {}", path.display());
    Ok(())
}

/// Handles the main search operation
async fn handle_search(config: Config, terms: SearchTerms, export: bool) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::from_config(&config, terms)?;
    if orchestrator.site_count() == 0 {
        bail!("No sites enabled");
    }

    let report = orchestrator
        .run(BufReader::new(tokio::io::stdin()))
        .await
        .context("Search session failed")?;

    // Storage failures are reported, but the summary is still printed and exported
    let stored = SqliteStorage::new(Path::new(&config.output.database_path))
        .and_then(|mut storage| storage.store(&report.summary));
    let report = match stored {
        Ok(id) => {
            tracing::info!("Search stored with id {}", id);
            SessionReport {
                summary: report.summary.with_id(id),
                ..report
            }
        }
        Err(e) => {
            tracing::error!("Failed to store search summary: {}", e);
            report
        }
    };

    print_summary(&report.summary);

    if export {
        let exporter = MarkdownExporter::new(&config.output.export_dir);
        let path = exporter.export_session(&report)?;
        println!("\n✓ Results exported to: {}", path.display());
    }

    Ok(())
}
