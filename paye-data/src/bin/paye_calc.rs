use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use clap::Parser;
use paye_core::{AdditionalDeductions, EngineInput, PayCycle, SalaryComponents, compute_paye};
use paye_data::{BracketLoader, SettingsBackend, parse_amount};
use rust_decimal::Decimal;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// PAYE income tax and statutory deduction calculator.
///
/// Salary components are monthly amounts; commas are accepted as
/// thousands separators (e.g. `--basic 450,000`).
#[derive(Debug, Parser)]
#[command(name = "paye-calc")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Tax year whose settings apply. Defaults to the current year.
    #[arg(long)]
    year: Option<i32>,

    /// Settings backend (`file` or `memory`).
    /// Defaults to `file` when --settings-dir is given, else `memory`.
    /// `file` requires --settings-dir; `memory` refuses it.
    #[arg(long)]
    backend: Option<String>,

    /// Directory of per-year settings files (`<year>.toml`).
    #[arg(long)]
    settings_dir: Option<PathBuf>,

    /// CSV file whose brackets replace the configured schedule.
    #[arg(long)]
    brackets: Option<PathBuf>,

    #[arg(long, default_value = "0", value_parser = parse_amount)]
    basic: Decimal,

    #[arg(long, default_value = "0", value_parser = parse_amount)]
    housing: Decimal,

    #[arg(long, default_value = "0", value_parser = parse_amount)]
    transport: Decimal,

    #[arg(long, default_value = "0", value_parser = parse_amount)]
    entertainment: Decimal,

    #[arg(long, default_value = "0", value_parser = parse_amount)]
    meal_subsidy: Decimal,

    #[arg(long, default_value = "0", value_parser = parse_amount)]
    medical: Decimal,

    #[arg(long, default_value = "0", value_parser = parse_amount)]
    benefits_in_kind: Decimal,

    /// Rent paid over the whole year.
    #[arg(long, default_value = "0", value_parser = parse_amount)]
    annual_rent: Decimal,

    /// Monthly NHIS contribution.
    #[arg(long, default_value = "0", value_parser = parse_amount)]
    nhis: Decimal,

    /// Monthly life assurance premium.
    #[arg(long, default_value = "0", value_parser = parse_amount)]
    life_assurance: Decimal,

    /// Monthly gratuity contribution.
    #[arg(long, default_value = "0", value_parser = parse_amount)]
    gratuities: Decimal,

    /// Employer headcount; ITF applies from 5 employees.
    #[arg(long, default_value_t = 1)]
    employees: u32,

    /// Pay cycle used for per-period figures (monthly, weekly, annual).
    #[arg(long, default_value = "monthly", value_parser = parse_cycle)]
    cycle: PayCycle,

    /// Periods of the cycle worked so far; adds a year-to-date projection.
    #[arg(long)]
    periods_worked: Option<u32>,

    /// Print the full result as JSON instead of a summary.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn parse_cycle(s: &str) -> Result<PayCycle, String> {
    PayCycle::parse(s).ok_or_else(|| format!("unknown pay cycle '{s}' (monthly, weekly, annual)"))
}

// ─── tracing ─────────────────────────────────────────────────────────────────

/// Initialise the tracing subscriber.
///
/// * Honours `RUST_LOG` when set.
/// * Falls back to `info` so normal runs are quiet.
/// * Writes to stderr so JSON output on stdout stays clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let tax_year = cli.year.unwrap_or_else(|| Local::now().year());

    let backend = SettingsBackend::select(cli.backend.as_deref(), cli.settings_dir.as_deref())
        .context("Invalid settings backend")?;

    debug!("opening {} settings backend", backend.name());
    let mut settings = backend
        .load_settings(tax_year)
        .await
        .with_context(|| format!("Failed to load settings for tax year {tax_year}"))?;

    if let Some(path) = &cli.brackets {
        let file =
            File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
        let records = BracketLoader::parse(file)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
        let brackets = BracketLoader::into_schedule(&records, tax_year)
            .with_context(|| format!("Unusable bracket schedule in {}", path.display()))?;
        settings = settings
            .with_schedule(brackets)
            .with_context(|| format!("Unusable bracket schedule in {}", path.display()))?;
        info!(
            tax_year,
            brackets = settings.tax_brackets.len(),
            "using schedule from {}",
            path.display()
        );
    }

    let input = EngineInput {
        salary: SalaryComponents {
            basic: cli.basic,
            housing: cli.housing,
            transport: cli.transport,
            entertainment: cli.entertainment,
            meal_subsidy: cli.meal_subsidy,
            medical: cli.medical,
            benefits_in_kind: cli.benefits_in_kind,
        },
        annual_rent_paid: cli.annual_rent,
        additional: AdditionalDeductions {
            nhis: cli.nhis,
            life_assurance: cli.life_assurance,
            gratuities: cli.gratuities,
            employee_count: cli.employees,
        },
        cycle: cli.cycle,
        periods_worked: cli.periods_worked,
    };

    let result = compute_paye(&settings, &input).context("PAYE computation failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to serialize result")?
        );
    } else {
        print!("{result}");
    }

    Ok(())
}
