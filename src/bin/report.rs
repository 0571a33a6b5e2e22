//! Batch report - list recorded batches and their failed sequences
//!
//! Reads the SQLite log written by `antshots run --db <FILE>`.
//!
//! Usage:
//!   cargo run --bin report -- batches.db
//!   cargo run --bin report -- batches.db --batch <ID>

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use antshots::{BatchDatabase, Error, Result, logging};

#[derive(Parser, Debug)]
#[command(name = "report")]
#[command(about = "Summarize batches recorded in a SQLite batch log")]
struct Cli {
    /// SQLite batch log
    #[arg(default_value = "batches.db")]
    db: PathBuf,

    /// Batch to list failures for (default: most recent; unknown IDs are an error)
    #[arg(long, value_name = "ID")]
    batch: Option<String>,
}

fn main() -> ExitCode {
    logging::init_logging(false);
    let cli = Cli::parse();

    if !cli.db.exists() {
        error!("No database at {}", cli.db.display());
        println!("\nTo record batches, run with --db:");
        println!("  cargo run --release -- run --db {}", cli.db.display());
        return ExitCode::FAILURE;
    }

    match report(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn report(cli: &Cli) -> Result<()> {
    let db = BatchDatabase::open(&cli.db)?;
    let Some(batch_id) = choose_batch(&db, cli.batch.as_deref())? else {
        println!("No batches recorded in {}", cli.db.display());
        return Ok(());
    };

    let batches = db.list_batches()?;
    println!("{:<38} {:<27} {:>7} {:>7} {:>7}", "BATCH", "STARTED", "ITEMS", "FAILED", "SKIPPED");
    for batch in &batches {
        let marker = if batch.finished_at.is_some() { "" } else { " (unfinished)" };
        println!(
            "{:<38} {:<27} {:>7} {:>7} {:>7}{}",
            batch.id,
            truncate(&batch.created_at, 27),
            batch.items,
            batch.failed,
            batch.skipped,
            marker
        );
    }

    let failed = db.failed_items(&batch_id)?;
    println!();
    if failed.is_empty() {
        println!("Batch {}: no failed sequences", batch_id);
        return Ok(());
    }

    println!("Batch {}: {} failed sequences", batch_id, failed.len());
    for item in &failed {
        println!(
            "  #{:<5} {:<8} simulation: {:<16} capture: {}",
            item.position + 1,
            item.sequence,
            item.simulation_status,
            item.capture_status
        );
    }

    Ok(())
}

/// The requested batch, or the most recent one when none was asked for
fn choose_batch(db: &BatchDatabase, requested: Option<&str>) -> Result<Option<String>> {
    match requested {
        Some(id) if db.has_batch(id)? => Ok(Some(id.to_string())),
        Some(id) => Err(Error::UnknownBatch(id.to_string())),
        None => Ok(db.latest_batch_id()?),
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
