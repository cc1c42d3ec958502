use aggregation::{aggregate, default_week_anchor};
use api_client::{AccountDataSource, BinanceClient};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use core_types::{Granularity, NormalizedRecord};
use indicatif::{ProgressBar, ProgressStyle};
use prices::PriceIndex;
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// The main entry point for the Meridian analytics application.
#[tokio::main]
async fn main() {
    // Load environment variables from a .env file, if present.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Parse command-line arguments.
    let cli = Cli::parse();

    // Execute the appropriate command.
    match cli.command {
        Commands::Report(args) => {
            if let Err(e) = handle_report(args).await {
                eprintln!("Error generating report: {e:#}");
                std::process::exit(1);
            }
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// BTC-denominated performance analytics for a Binance futures account.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the account performance report.
    Report(ReportArgs),
}

#[derive(Parser)]
struct ReportArgs {
    /// How many days of ledger history to analyze (defaults to config).
    #[arg(long)]
    days: Option<u32>,

    /// Forecast horizon in months (defaults to config).
    #[arg(long)]
    months: Option<u32>,

    /// Use the production API instead of the testnet.
    #[arg(long)]
    live: bool,
}

// ==============================================================================
// Report Command Logic
// ==============================================================================

/// Retrieves all account data, runs the analytics pipeline and prints the
/// rendered report.
async fn handle_report(args: ReportArgs) -> anyhow::Result<()> {
    let config = configuration::load_config()?;
    let lookback_days = args.days.unwrap_or(config.report.lookback_days);
    let forecast_months = args.months.unwrap_or(config.report.forecast_months);

    let end = Utc::now();
    let start = end - Duration::days(lookback_days as i64);
    info!(%start, %end, "building report window");

    let client = BinanceClient::new(args.live, &config.api);

    // --- Retrieval (everything blocking happens here, before the core runs) ---
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner());

    spinner.set_message("Fetching spot prices...");
    let spot = client.fetch_spot_prices().await?;

    spinner.set_message(format!("Fetching {} daily klines...", config.report.symbol));
    let samples = client
        .fetch_daily_prices(&config.report.symbol, start, end)
        .await?;

    spinner.set_message("Fetching income history...");
    let mut events = client.fetch_income(start, end).await?;

    spinner.set_message("Fetching capital flows...");
    events.extend(client.fetch_deposits(start, end).await?);
    events.extend(client.fetch_withdrawals(start, end).await?);

    spinner.set_message("Fetching balances...");
    let balances = client.fetch_balances().await?;
    spinner.finish_with_message("Account data retrieved");

    // --- Analytics pipeline (pure and synchronous from here on) ---
    let index = PriceIndex::new(samples, spot)?;

    let current_balance: Decimal = balances
        .iter()
        .map(|b| index.convert(&b.asset, b.balance))
        .sum();
    info!(%current_balance, events = events.len(), "normalizing ledger");

    let records = ledger::normalize(&events, &index);
    let (pnl, flows): (Vec<NormalizedRecord>, Vec<NormalizedRecord>) =
        records.into_iter().partition(|r| r.category.is_pnl());

    let anchor = default_week_anchor(pnl.first().map(|r| r.timestamp).unwrap_or(start));
    let daily = aggregate(&pnl, Granularity::Daily, anchor);
    let weekly = aggregate(&pnl, Granularity::Weekly, anchor);
    let monthly = aggregate(&pnl, Granularity::Monthly, anchor);
    let monthly_flows = aggregate(&flows, Granularity::Monthly, anchor);

    let equity_curve = equity::reconstruct(&daily, current_balance);
    let metrics = risk::analyze(&equity_curve, &daily);
    let model = forecast::fit(&monthly, current_balance, forecast_months);

    // --- Rendering ---
    println!("{}", reporter::render_summary(current_balance, &metrics));
    println!("{}", reporter::render_equity(&equity_curve));
    println!("{}", reporter::render_buckets("Day", &daily));
    println!("{}", reporter::render_buckets("Week", &weekly));
    println!("{}", reporter::render_buckets("Month", &monthly));
    println!("{}", reporter::render_buckets("Capital flows (month)", &monthly_flows));
    println!("{}", reporter::render_forecast(&model));

    Ok(())
}
