use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use portal_core::calculations::{
    calculate_combined_fees, calculate_milestone_bonus, calculate_monthly_bonus,
};
use portal_core::db::{DbConfig, RepositoryRegistry};
use portal_core::{NewQuote, PortalRepository, PricingInput};
use portal_data::logging::init_logging;
use portal_data::{CommissionAccrual, DealLoader};
use portal_db_sqlite::SqliteRepositoryFactory;
use rust_decimal::Decimal;
use tracing::info;

/// Pricing quotes and sales compensation for the client portal.
#[derive(Parser, Debug)]
#[command(name = "portal")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log level or filter directive; overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also append log records to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Database URL; overrides PORTAL_DATABASE_URL (e.g. sqlite:portal.db?mode=rwc)
    #[arg(short, long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a CRM closed-deal export and accrue commissions and bonuses.
    ///
    /// The CSV file should have the following columns:
    /// crm_deal_id, company_name, sales_rep_email, sales_rep_name,
    /// monthly_value, setup_fee, closed_date, first_payment_date
    LoadDeals {
        /// Path to the CSV file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Price an intake form given as JSON and print the fees.
    Quote {
        /// Path to the intake JSON, or `-` for stdin
        #[arg(short, long)]
        input: PathBuf,

        /// Store the quote in the database
        #[arg(long, requires = "contact_email")]
        save: bool,

        /// Contact the saved quote belongs to
        #[arg(long)]
        contact_email: Option<String>,
    },

    /// Show a rep's closings, bonus eligibility and milestone progress.
    RepStatus {
        /// The rep's email address
        #[arg(short, long)]
        email: String,

        /// Month to report on as YYYY-MM; defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },
}

async fn open_repository(database: Option<&str>) -> Result<Box<dyn PortalRepository>> {
    let config = DbConfig::from_env().with_connection_string(database);

    let mut registry = RepositoryRegistry::default();
    registry.register(Box::new(SqliteRepositoryFactory));

    info!(backend = %config.backend, "opening database");
    registry
        .create(&config)
        .await
        .with_context(|| format!("Failed to open database: {}", config.connection_string))
}

fn read_input(path: &Path) -> Result<String> {
    let mut json = String::new();
    if path == Path::new("-") {
        io::stdin()
            .read_to_string(&mut json)
            .context("Failed to read intake JSON from stdin")?;
    } else {
        File::open(path)
            .and_then(|mut file| file.read_to_string(&mut json))
            .with_context(|| format!("Failed to read: {}", path.display()))?;
    }
    Ok(json)
}

fn parse_month(month: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{month}', expected YYYY-MM"))
}

async fn load_deals(
    database: Option<&str>,
    file: &Path,
) -> Result<()> {
    println!("Loading deals from: {}", file.display());

    let reader =
        File::open(file).with_context(|| format!("Failed to open: {}", file.display()))?;
    let records = DealLoader::parse(reader)
        .with_context(|| format!("Failed to parse CSV: {}", file.display()))?;
    DealLoader::validate(&records).context("Deal export failed validation")?;

    println!("Parsed {} deals from CSV", records.len());

    let repo = open_repository(database).await?;
    let summary = CommissionAccrual::new(repo.as_ref())
        .sync_deals(&records)
        .await
        .context("Failed to accrue commissions")?;

    println!("Synced {} deals.", summary.deals_synced);
    println!(
        "Created {} commission records ({} year-one commission).",
        summary.commission_records_created, summary.commission_scheduled
    );
    println!(
        "Awarded {} monthly bonuses and {} milestone bonuses.",
        summary.monthly_bonuses_awarded, summary.milestone_bonuses_awarded
    );

    Ok(())
}

async fn quote(
    database: Option<&str>,
    input: &Path,
    save: bool,
    contact_email: Option<String>,
) -> Result<()> {
    let json = read_input(input)?;
    let pricing: PricingInput =
        serde_json::from_str(&json).context("Failed to parse intake JSON")?;

    let fees = calculate_combined_fees(&pricing);
    println!(
        "{}",
        serde_json::to_string_pretty(&fees).context("Failed to encode fees")?
    );

    if let (true, Some(contact_email)) = (save, contact_email) {
        let repo = open_repository(database).await?;
        let saved = repo
            .create_quote(NewQuote::price(contact_email, pricing))
            .await
            .context("Failed to save quote")?;
        println!("Saved quote {} for {}.", saved.id, saved.contact_email);
    }

    Ok(())
}

async fn rep_status(
    database: Option<&str>,
    email: &str,
    month: Option<&str>,
) -> Result<()> {
    let month = match month {
        Some(month) => parse_month(month)?,
        None => {
            let today = Local::now().date_naive();
            today.with_day(1).unwrap_or(today)
        }
    };

    let repo = open_repository(database).await?;
    let rep = repo
        .get_sales_rep_by_email(&email.trim().to_lowercase())
        .await
        .with_context(|| format!("Unknown sales rep: {email}"))?;

    let closed_this_month = repo.count_clients_closed_in_month(rep.id, month).await?;
    let closed_total = repo.count_clients_closed_total(rep.id).await?;

    println!("{} <{}>", rep.name, rep.email);
    println!(
        "Clients closed in {}: {}",
        month.format("%Y-%m"),
        closed_this_month
    );
    match calculate_monthly_bonus(closed_this_month) {
        Some(award) => println!(
            "Monthly bonus tier: {} (${}, {})",
            award.tier.as_str(),
            award.amount,
            award.reward_description
        ),
        None => println!("Monthly bonus tier: none (5 clients needed)"),
    }

    let progress = calculate_milestone_bonus(closed_total);
    println!("Clients closed all-time: {closed_total}");
    for award in &progress.achieved {
        let equity = if award.equity_offer { " + equity offer" } else { "" };
        println!("  reached {} (${}{})", award.tier.as_str(), award.amount, equity);
    }
    if let (Some(next), Some(gap)) = (progress.next_milestone, progress.clients_to_next) {
        println!("Next milestone: {} ({} clients to go)", next.as_str(), gap);
    }

    let commissions = repo.list_commissions_for_rep(rep.id).await?;
    let due_this_month: Decimal = commissions
        .iter()
        .filter(|record| record.payment_month == month)
        .map(|record| record.amount)
        .sum();
    println!(
        "Commission payable in {}: ${}",
        month.format("%Y-%m"),
        due_this_month
    );

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref(), cli.log_file.as_deref())?;

    let database = cli.database.as_deref();
    match cli.command {
        Command::LoadDeals { file } => load_deals(database, &file).await,
        Command::Quote {
            input,
            save,
            contact_email,
        } => quote(database, &input, save, contact_email).await,
        Command::RepStatus { email, month } => {
            rep_status(database, &email, month.as_deref()).await
        }
    }
}
