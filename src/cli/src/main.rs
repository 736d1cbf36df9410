//! CLI for the PR compliance crawler.
//!
//! `crawl` saves one record per pull request of an organization; `aggregate`
//! later turns the saved records into a per-repository compliance summary.

use clap::{Parser, Subcommand};
use pr_compliance::{
    AggregateReport, RunSummary, Runner, RunnerError, Settings, WriteOutcome,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// PR Compliance - Crawl GitHub pull requests and report merge compliance per repository.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a settings TOML file.
    #[arg(long, global = true, env = "PR_COMPLIANCE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch every pull request of an organization and save one record per PR.
    Crawl {
        /// GitHub organization name.
        organization: String,
    },

    /// Aggregate saved records into the compliance summary file.
    Aggregate,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Octocrab compiles in ring next to aws-lc-rs, so rustls needs an
    // explicit process default before any client is built.
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .ok();

    // Initialize tracing
    init_tracing();

    // Parse arguments
    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Main execution logic.
async fn run(args: Args) -> Result<ExitCode, RunnerError> {
    let settings = Settings::load_or_default(args.config.as_deref())?;
    let runner = Runner::new(settings);

    match args.command {
        Command::Crawl { organization } => {
            let summary = runner.crawl(&organization).await?;
            print_crawl_summary(&summary);
            Ok(if summary.all_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
        Command::Aggregate => {
            let report = runner.aggregate()?;
            print_aggregate_report(&report);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Prints the final crawl summary.
fn print_crawl_summary(summary: &RunSummary) {
    println!("\nSummary:");
    println!("  Organization: {}", summary.organization);
    println!(
        "  Repository listing: {}",
        if summary.listing_complete {
            "complete"
        } else {
            "incomplete"
        }
    );
    println!(
        "  Repositories discovered: {}",
        summary.repositories_discovered
    );
    println!("  Repositories crawled: {}", summary.repositories_crawled);
    println!("  Repositories failed: {}", summary.repositories_failed);
    println!(
        "  Pull requests collected: {}",
        summary.pull_requests_collected
    );
    println!("  Records saved: {}", summary.records_saved);
    println!("  Records failed: {}", summary.records_failed);
}

/// Prints the compliance table and where it was written.
fn print_aggregate_report(report: &AggregateReport) {
    println!(
        "\n{:<24} {:>12} {:<28} {:<20} {:>7} {:>10} {:<19} {}",
        "organization",
        "repo_id",
        "repository",
        "owner",
        "num_prs",
        "num_merged",
        "merged_at",
        "compliant"
    );
    for s in &report.summaries {
        println!(
            "{:<24} {:>12} {:<28} {:<20} {:>7} {:>10} {:<19} {}",
            s.organization_name,
            s.repository_id,
            s.repository_name,
            s.repository_owner,
            s.num_prs,
            s.num_prs_merged,
            s.merged_at
                .map(|ts| ts.to_string())
                .unwrap_or_else(|| "null".to_string()),
            s.is_compliant
        );
    }

    println!("\nRecords loaded: {}", report.records_loaded);
    match &report.outcome {
        WriteOutcome::Written { path, rows } => {
            println!("Wrote {rows} rows to {}", path.display())
        }
        WriteOutcome::Overwritten { path, rows } => {
            println!("Overwrote {} with {rows} rows", path.display())
        }
        WriteOutcome::Skipped { path } => {
            println!("Output {} already exists, left untouched", path.display())
        }
    }
}
