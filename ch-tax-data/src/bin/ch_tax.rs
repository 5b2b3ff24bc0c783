use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use ch_tax_core::{FilingOrchestrator, FilingRepository, InMemoryFilingRepository, TaxSummaryAggregator};
use ch_tax_data::{Household, RuleDataLoader};
use clap::Parser;
use rust_decimal::Decimal;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Swiss tax estimate for one household.
///
/// Loads the cantonal rule data, opens the household's primary filing plus a
/// secondary filing for every other canton in which it owns property, and
/// prints the liability of each filing.
#[derive(Parser, Debug)]
#[command(name = "ch-tax")]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory holding the rule data (rule_sets.csv, brackets.csv, years/, ...)
    #[arg(short, long)]
    data: PathBuf,

    /// Household declaration in TOML
    #[arg(long)]
    household: PathBuf,

    /// Tax year to assess instead of the one in the household file
    #[arg(short, long)]
    year: Option<i32>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

// ─── tracing ─────────────────────────────────────────────────────────────────

/// Initialise the tracing subscriber.
///
/// * Honours `RUST_LOG` when set.
/// * Falls back to `level` otherwise.
/// * Strips timestamps and target names to keep CLI output clean.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .init();
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let registry = RuleDataLoader::load_dir(&args.data)
        .with_context(|| format!("Failed to load rule data from: {}", args.data.display()))?;

    let mut household = Household::load(&args.household)
        .with_context(|| format!("Failed to read household: {}", args.household.display()))?;
    if let Some(year) = args.year {
        household.tax_year = year;
    }
    let (taxpayer_id, tax_year) = (household.taxpayer_id, household.tax_year);

    let repo: Arc<dyn FilingRepository> = Arc::new(InMemoryFilingRepository::new());
    let orchestrator = FilingOrchestrator::new(Arc::clone(&repo));

    let primary = orchestrator
        .create_primary(household.into_request())
        .await
        .context("Failed to create primary filing")?;
    let secondaries = orchestrator
        .declare_property_filings(primary.id)
        .await
        .context("Failed to create property filings")?;
    debug!(primary = primary.id, secondaries = secondaries.len(), "filings prepared");

    let filings = repo
        .list_filings(taxpayer_id, tax_year)
        .await
        .context("Failed to list filings")?;

    let aggregator = TaxSummaryAggregator::new(&registry);
    let mut failed = 0;
    let mut total = Decimal::ZERO;

    for (filing_id, result) in aggregator.calculate_batch(&filings) {
        match result {
            Ok(result) => {
                total += result.total_liability;
                println!("{result}");
                println!();
            }
            Err(err) => {
                error!(filing_id, error = %err, "calculation failed");
                failed += 1;
            }
        }
    }

    println!("Total liability for {tax_year}: {total}");
    info!(filings = filings.len(), failed, "done");

    if failed > 0 {
        anyhow::bail!("{failed} of {} filings could not be calculated", filings.len());
    }
    Ok(())
}
