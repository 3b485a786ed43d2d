use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use mileage::{
    codec,
    config::StoreConfig,
    entry::EntryDraft,
    persist::file::LogStore,
    report::{EntryView, Report},
};

#[derive(Parser, Debug)]
#[command(name = "mileage", version, about = "Record fuel fill-ups and show economy")]
struct Cli {
    /// Log directory (defaults to $MILEAGE_DIR or ~/.mileage)
    #[arg(long, global = true, value_name = "DIR")]
    dir: Option<PathBuf>,
    /// Log level (trace, debug, info, warn, error, off). Overrides RUST_LOG if set.
    #[arg(long = "log-level", global = true, value_name = "LEVEL")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Record a fill-up
    Add {
        /// Miles since the last fill-up
        distance: String,
        /// Litres added
        volume: String,
        /// Amount paid in pounds
        cost: String,
        /// Fill-up date (yyyy-MM-dd or yyyy-MM-dd-HH-mm-ss); defaults to now
        #[arg(long)]
        date: Option<String>,
    },
    /// Show recent fill-ups, newest first
    List {
        /// Maximum rows to show
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },
    /// Print the full report as JSON
    Report,
    /// Archive the log and start a fresh one
    Clear {
        /// Confirm the clear
        #[arg(long)]
        yes: bool,
    },
    /// Print the log file path
    Path,
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let config = match &cli.dir {
        Some(dir) => StoreConfig::in_dir(dir),
        None => StoreConfig::from_env(),
    };

    if let Commands::Path = cli.command {
        println!("{}", config.log_path().display());
        return Ok(());
    }

    let mut store = LogStore::open(&config)
        .with_context(|| format!("opening {}", config.log_path().display()))?;

    match cli.command {
        Commands::Add {
            distance,
            volume,
            cost,
            date,
        } => {
            let mut draft = EntryDraft::new(distance, volume, cost);
            if let Some(date) = date {
                let (at, _) = codec::decode_date(&date)
                    .with_context(|| format!("unrecognised date {date:?}"))?;
                draft = draft.at(at);
            }
            let entry = draft.parse().context("invalid fill-up")?;
            let idx = store.append(entry).context("appending fill-up")?;
            if let Some(entry) = store.history().get(idx) {
                println!("{}", EntryView::new(idx, entry).label);
            }
        }
        Commands::List { limit } => {
            let report = Report::build(store.history(), store.skipped_count());
            for label in report.labels().into_iter().take(limit) {
                println!("{label}");
            }
            if report.skipped > 0 {
                eprintln!("{} malformed line(s) skipped", report.skipped);
            }
        }
        Commands::Report => {
            let report = Report::build(store.history(), store.skipped_count());
            println!("{}", report.to_json()?);
        }
        Commands::Clear { yes } => {
            if !yes {
                bail!("refusing to clear without --yes");
            }
            let archive = store.archive_and_clear().context("clearing log")?;
            println!("archived to {}", archive.display());
        }
        Commands::Path => {}
    }

    store.close().context("closing log")?;
    Ok(())
}
