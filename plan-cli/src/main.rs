use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use plan_cli::config::PlanConfig;
use plan_cli::logging::init_logging;
use plan_cli::report::{self, OutputFormat};
use plan_core::{CalculationInputs, RawInputs, compute_plan};
use plan_data::SnapshotLoader;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Financial plan calculator for a small business.
///
/// Derives daily revenue targets, sales scenarios and tax projections from a
/// monthly profit goal, using a cached regulatory snapshot when one is given
/// and the built-in catalog otherwise.
#[derive(Debug, Parser)]
#[command(name = "business-plan")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Desired net profit per month (e.g. `150000`, `150 000`, `1,5e5`).
    #[arg(long, allow_hyphen_values = true)]
    monthly_profit: Option<String>,

    /// Working days per month.
    #[arg(long, allow_hyphen_values = true)]
    days_in_month: Option<String>,

    /// Margin as a percentage of revenue.
    #[arg(long, allow_hyphen_values = true)]
    margin_percent: Option<String>,

    /// Legal entity form code (e.g. `IP`, `OOO`).
    #[arg(long = "opf")]
    entity_form: Option<String>,

    /// Tax regime code (e.g. `USN_6`, `PSN`).
    #[arg(long = "tax-system")]
    tax_regime: Option<String>,

    /// Cached regulatory snapshot (JSON).
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// TOML configuration file with defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Log filter directive (overrides `RUST_LOG`).
    #[arg(long)]
    log_level: Option<String>,

    /// Also append log records to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PlanConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => PlanConfig::default(),
    };

    let log_level = cli.log_level.as_deref().or(config.log_level.as_deref());
    let log_file = cli.log_file.as_deref().or(config.log_file.as_deref());
    init_logging(log_level, log_file)?;

    if let Some(path) = &cli.config {
        debug!(path = %path.display(), "loaded config");
    }

    let raw = config.merge_inputs(RawInputs {
        monthly_profit: cli.monthly_profit,
        days_in_month: cli.days_in_month,
        margin_percent: cli.margin_percent,
        entity_form_code: cli.entity_form,
        tax_regime_code: cli.tax_regime,
    });
    let inputs = CalculationInputs::from_raw(raw);

    let snapshot_path = cli.snapshot.or(config.snapshot_path);
    let snapshot = SnapshotLoader::load_or_default(snapshot_path.as_deref());
    info!(
        regimes = snapshot.tax_regimes().len(),
        forms = snapshot.legal_entity_forms().len(),
        "regulatory catalog ready"
    );

    let result = compute_plan(&inputs, &snapshot);

    let format = cli.format.or(config.format).unwrap_or_default();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    report::render(format, &result, &mut out).context("Failed to write report")?;
    out.flush()?;

    Ok(())
}
