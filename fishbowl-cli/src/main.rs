//! Fishbowl CLI — daily trend ETL and store management.
//!
//! Commands:
//! - `run` — fetch, classify, and upsert the latest record per instrument
//! - `recalculate` — re-derive all stored history from closes
//! - `rank` — recompute deviation ranks for a date
//! - `config init` — write a starter instrument config
//! - `store status` — report stored symbols, date ranges, row counts

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use fishbowl_core::data::{
    CsvProvider, DataProvider, MonitorConfig, StdoutProgress, TushareProvider,
};
use fishbowl_runner::{
    recalculate_history, run_daily_batch, update_ranks_for, JsonStore, RecordStore, RunSummary,
};

#[derive(Parser)]
#[command(name = "fishbowl", about = "Fishbowl trend radar — daily ETL")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the daily batch over all active instruments.
    Run {
        /// Instrument config file.
        #[arg(long, default_value = "monitor.toml")]
        config: PathBuf,

        /// Record store directory.
        #[arg(long, default_value = "data")]
        store_dir: PathBuf,

        /// Read series from CSV files in this directory instead of Tushare.
        #[arg(long)]
        csv_dir: Option<PathBuf>,

        /// Tushare Pro API token. Defaults to the TUSHARE_TOKEN env var.
        #[arg(long)]
        token: Option<String>,
    },
    /// Re-derive every stored row from its close series.
    Recalculate {
        /// Record store directory.
        #[arg(long, default_value = "data")]
        store_dir: PathBuf,

        /// Symbols to recompute. Defaults to every stored symbol.
        symbols: Vec<String>,

        /// Actually overwrite (without this flag, only previews the scope).
        #[arg(long, default_value_t = false)]
        confirm: bool,
    },
    /// Recompute deviation ranks for a date.
    Rank {
        /// Record store directory.
        #[arg(long, default_value = "data")]
        store_dir: PathBuf,

        /// Date (YYYY-MM-DD). Defaults to the newest stored date.
        #[arg(long)]
        date: Option<String>,
    },
    /// Config management commands.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Store management commands.
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a starter instrument config.
    Init {
        /// Destination path.
        #[arg(long, default_value = "monitor.toml")]
        path: PathBuf,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum StoreAction {
    /// Report stored symbols, date ranges, and row counts.
    Status {
        /// Record store directory.
        #[arg(long, default_value = "data")]
        store_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            store_dir,
            csv_dir,
            token,
        } => run_batch(&config, store_dir, csv_dir, token),
        Commands::Recalculate {
            store_dir,
            symbols,
            confirm,
        } => run_recalculate(store_dir, symbols, confirm),
        Commands::Rank { store_dir, date } => run_rank(store_dir, date),
        Commands::Config { action } => match action {
            ConfigAction::Init { path, force } => run_config_init(&path, force),
        },
        Commands::Store { action } => match action {
            StoreAction::Status { store_dir } => run_store_status(&store_dir),
        },
    }
}

fn run_batch(
    config_path: &Path,
    store_dir: PathBuf,
    csv_dir: Option<PathBuf>,
    token: Option<String>,
) -> Result<()> {
    let config = MonitorConfig::from_file(config_path)
        .with_context(|| format!("load config {}", config_path.display()))?;

    let provider: Box<dyn DataProvider> = if let Some(dir) = csv_dir {
        Box::new(CsvProvider::new(dir))
    } else {
        let token = token
            .or_else(|| std::env::var("TUSHARE_TOKEN").ok())
            .filter(|t| !t.is_empty());
        match token {
            Some(t) => Box::new(TushareProvider::new(t)),
            None => bail!("no data source: pass --csv-dir, --token, or set TUSHARE_TOKEN"),
        }
    };

    let store = JsonStore::new(store_dir);

    match run_daily_batch(&config, provider.as_ref(), &store, &StdoutProgress) {
        Ok(summary) => {
            print_run_summary(&summary);
            Ok(())
        }
        Err(e) => {
            eprintln!("Batch failed: {e}");
            std::process::exit(1);
        }
    }
}

fn print_run_summary(summary: &RunSummary) {
    println!();
    println!("=== Run Summary ===");
    println!("Processed: {}", summary.processed);
    println!("Succeeded: {}", summary.succeeded);
    println!("Failed:    {}", summary.failed);
    if let Some(date) = summary.run_date {
        println!("Run date:  {date}");
    }
    for failure in &summary.failures {
        println!("  {} [{}]: {}", failure.symbol, failure.kind, failure.message);
    }
}

fn run_recalculate(store_dir: PathBuf, symbols: Vec<String>, confirm: bool) -> Result<()> {
    let store = JsonStore::new(store_dir);

    let symbols = if symbols.is_empty() {
        store.symbols()?
    } else {
        symbols
    };

    if symbols.is_empty() {
        println!("Store is empty; nothing to recalculate.");
        return Ok(());
    }

    println!(
        "Recalculating derived fields for {} symbol(s): {}",
        symbols.len(),
        symbols.join(", ")
    );

    if !confirm {
        println!();
        println!("Dry run — pass --confirm to actually overwrite history.");
        return Ok(());
    }

    let summary = recalculate_history(&store, &symbols);
    println!();
    println!("Recalculate complete:");
    println!("  Symbols:      {}/{}", summary.succeeded, summary.symbols);
    println!("  Rows updated: {}", summary.rows_updated);
    for (symbol, message) in &summary.failures {
        println!("  FAIL {symbol}: {message}");
    }

    Ok(())
}

fn run_rank(store_dir: PathBuf, date: Option<String>) -> Result<()> {
    let store = JsonStore::new(store_dir);

    let date = match date {
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .with_context(|| format!("invalid date '{s}'"))?,
        None => {
            let newest = store
                .symbols()?
                .iter()
                .filter_map(|s| store.get_meta(s))
                .map(|m| m.end_date)
                .max();
            match newest {
                Some(d) => d,
                None => bail!("store is empty; pass --date explicitly"),
            }
        }
    };

    let ranked = update_ranks_for(&store, date)?;
    println!("Ranked {ranked} instrument(s) for {date}");
    Ok(())
}

fn run_config_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists — pass --force to overwrite",
            path.display()
        );
    }

    let config = MonitorConfig::default_cn();
    std::fs::write(path, config.to_toml()?)?;
    println!("Wrote starter config to {}", path.display());
    Ok(())
}

fn run_store_status(store_dir: &Path) -> Result<()> {
    let store = JsonStore::new(store_dir);
    let statuses = store.status()?;

    if statuses.is_empty() {
        println!("Store is empty: {}", store_dir.display());
        return Ok(());
    }

    println!("Store: {}", store_dir.display());
    println!("Symbols: {}", statuses.len());
    println!();
    println!("{:<12} {:<25} {:>8}", "Symbol", "Date Range", "Rows");
    println!("{}", "-".repeat(47));
    for status in &statuses {
        let range = match (status.start_date, status.end_date) {
            (Some(start), Some(end)) => format!("{start} to {end}"),
            _ => "(no meta)".into(),
        };
        let rows = status
            .row_count
            .map(|n| n.to_string())
            .unwrap_or_else(|| "?".into());
        println!("{:<12} {:<25} {:>8}", status.symbol, range, rows);
    }

    Ok(())
}
