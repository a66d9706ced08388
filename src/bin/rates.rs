//! rates CLI - query and maintain the exchange-rate store
//!
//! ## Example Usage
//!
//! ```bash
//! # Record a rate (value of 1 EUR in the reference currency)
//! rates set EUR 1.5 --date 2008-01-01
//!
//! # 1 EUR in USD on a date
//! rates get EUR USD --date 2008-02-01
//!
//! # Bulk load
//! rates import rates.csv
//! ```

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use colored::Colorize;
use currency_rates::config::RatesConfig;
use currency_rates::currency::CurrencyRegistry;
use currency_rates::dates::parse_date;
use currency_rates::source::RateSource;
use currency_rates::store::{RatesDB, StoreLocation};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration;

/// rates: daily exchange-rate store
#[derive(Parser, Debug)]
#[command(name = "rates")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Daily exchange-rate store with nearest-date lookup", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database path, or ":memory:" (overrides the config file)
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show how many units of TO one unit of FROM is worth
    Get {
        #[arg(value_name = "FROM")]
        from: String,

        #[arg(value_name = "TO")]
        to: String,

        /// Date (YYYY-MM-DD or YYYYMMDD, default: today)
        #[arg(short = 'd', long)]
        date: Option<String>,

        /// Convert this amount instead of printing the rate
        #[arg(short = 'a', long)]
        amount: Option<f64>,
    },

    /// Store the value of one unit of CURRENCY in the reference currency
    Set {
        #[arg(value_name = "CURRENCY")]
        currency: String,

        #[arg(value_name = "VALUE")]
        value: f64,

        /// Date (YYYY-MM-DD or YYYYMMDD, default: today)
        #[arg(short = 'd', long)]
        date: Option<String>,
    },

    /// Show the first and last stored dates of a currency
    Range {
        #[arg(value_name = "CURRENCY")]
        currency: String,
    },

    /// List stored rates of a currency
    History {
        #[arg(value_name = "CURRENCY")]
        currency: String,
    },

    /// Import rates from a CSV file (date,currency,rate)
    Import {
        #[arg(value_name = "CSV_FILE")]
        file: PathBuf,
    },

    /// List registered currencies
    Currencies {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show store information
    Info,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let registry = Arc::new(CurrencyRegistry::builtin());
    let config = RatesConfig::load(cli.config.as_deref());

    if let Commands::Currencies { json } = cli.command {
        return list_currencies(&registry, json);
    }

    let db = match &cli.db {
        Some(location) => RatesDB::open(StoreLocation::parse(location), Arc::clone(&registry)),
        None => config.open_store(Arc::clone(&registry)),
    }
    .context("Failed to open rate store")?;

    if cli.verbose {
        println!(
            "{} v{} ({})",
            "rates".cyan().bold(),
            env!("CARGO_PKG_VERSION"),
            db.location().to_string().dimmed()
        );
    }

    match cli.command {
        Commands::Get {
            from,
            to,
            date,
            amount,
        } => get_rate(&db, &from, &to, date.as_deref(), amount),
        Commands::Set {
            currency,
            value,
            date,
        } => set_value(&db, &currency, value, date.as_deref()),
        Commands::Range { currency } => show_range(&db, &currency),
        Commands::History { currency } => show_history(&db, &currency),
        Commands::Import { file } => import(&db, &file),
        Commands::Info => show_info(&db),
        Commands::Currencies { .. } => Ok(()),
    }
}

fn resolve_date(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(s) => Ok(parse_date(s)?),
        None => Ok(Local::now().date_naive()),
    }
}

/// Normalise a user-supplied code and check it is registered
fn currency_code(db: &RatesDB, code: &str) -> Result<String> {
    let code = code.trim().to_uppercase();
    db.registry().lookup_by_code(&code)?;
    Ok(code)
}

fn get_rate(
    db: &RatesDB,
    from: &str,
    to: &str,
    date: Option<&str>,
    amount: Option<f64>,
) -> Result<()> {
    let date = resolve_date(date)?;
    let from = currency_code(db, from)?;
    let to = currency_code(db, to)?;

    match amount {
        Some(amount) => {
            let converted = db.convert_amount(amount, &from, &to, date)?;
            println!(
                "{} {} = {} {} on {}",
                amount,
                from,
                format!("{:.6}", converted).green().bold(),
                to,
                date
            );
        }
        None => {
            let rate = db.get_rate(date, &from, &to)?;
            println!(
                "1 {} = {} {} on {}",
                from,
                format!("{:.6}", rate).green().bold(),
                to,
                date
            );
        }
    }
    Ok(())
}

fn set_value(db: &RatesDB, currency: &str, value: f64, date: Option<&str>) -> Result<()> {
    let date = resolve_date(date)?;
    let code = currency_code(db, currency)?;
    db.set_value(date, &code, value)?;
    println!(
        "{} 1 {} = {} {} on {}",
        "Stored".green().bold(),
        code,
        value,
        db.reference_code(),
        date
    );
    Ok(())
}

fn show_range(db: &RatesDB, currency: &str) -> Result<()> {
    let code = currency_code(db, currency)?;
    match db.date_range(&code)? {
        Some((start, end)) => println!("{}: {} to {}", code.bold(), start, end),
        None => println!("{}: {}", code.bold(), "no stored rates".yellow()),
    }
    Ok(())
}

fn show_history(db: &RatesDB, currency: &str) -> Result<()> {
    let code = currency_code(db, currency)?;
    let history = db.history(&code)?;
    if history.is_empty() {
        println!("{}: {}", code.bold(), "no stored rates".yellow());
        return Ok(());
    }

    println!("{:<12} {:>14}", "Date".bold(), db.reference_code().bold());
    for record in history {
        println!("{:<12} {:>14.6}", record.date.to_string(), record.rate);
    }
    Ok(())
}

fn import(db: &RatesDB, file: &Path) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .context("Invalid progress template")?,
    );
    spinner.set_message(format!("Importing {}", file.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = db
        .import_csv(file)
        .with_context(|| format!("Failed to import {}", file.display()));
    spinner.finish_and_clear();

    let count = result?;
    println!("{} {} rate(s)", "Imported".green().bold(), count);
    Ok(())
}

fn list_currencies(registry: &CurrencyRegistry, json: bool) -> Result<()> {
    if json {
        let currencies: Vec<_> = registry.all().iter().map(|c| c.as_ref()).collect();
        println!("{}", serde_json::to_string_pretty(&currencies)?);
        return Ok(());
    }

    for currency in registry.all() {
        let marker = if currency.code == registry.reference_code() {
            "*".cyan().bold().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "{} {} {:<28} exp={} default={}",
            marker,
            currency.code.bold(),
            currency.name,
            currency.exponent,
            currency.default_rate()
        );
    }
    Ok(())
}

fn show_info(db: &RatesDB) -> Result<()> {
    let stats = db.cache_stats();
    println!("{}", "Rate store".cyan().bold());
    println!("  Location:    {}", db.location());
    println!(
        "  Persistent:  {}",
        if db.is_persistent() {
            "yes".green()
        } else {
            "no (memory)".yellow()
        }
    );
    println!("  Reference:   {}", db.reference_code());
    println!("  Currencies:  {}", db.registry().len());
    println!("  Stored rows: {}", db.row_count()?);
    println!("  Cache:       {} entries", stats.entries);
    Ok(())
}
