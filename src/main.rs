//! Batch screenshot runner
//!
//! Usage:
//!   cargo run --release -- run                      # Full batch (lengths 2..=6)
//!   cargo run --release -- run --max-length 3       # Shorter batch
//!   cargo run --release -- run --db batches.db --summary runs/latest.json
//!   cargo run --release -- plan                     # Print every command, run nothing
//!   cargo run --release -- plan --count             # Just the number of sequences

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use antshots::cli::BatchArgs;
use antshots::{BatchConfig, BatchDatabase, BatchRunner, SystemRunner, logging, plan_commands};

#[derive(Parser, Debug)]
#[command(name = "antshots", version)]
#[command(about = "Run the simulator for every move sequence and screenshot each result")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    args: BatchArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the batch (default)
    Run,
    /// Print the commands a batch would run without running them
    Plan {
        /// Only print how many sequences the batch covers
        #[arg(long)]
        count: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let loaded = cli.args.load_config();
    logging::init_logging(cli.args.log_quiet(&loaded));

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(&config),
        Command::Plan { count } => {
            plan(&config, count);
            ExitCode::SUCCESS
        }
    }
}

fn run(config: &BatchConfig) -> ExitCode {
    if let Err(e) = std::fs::create_dir_all(&config.destination) {
        error!(
            "Cannot create destination {}: {}",
            config.destination.display(),
            e
        );
        return ExitCode::FAILURE;
    }

    let db = match &config.db_path {
        Some(path) => match BatchDatabase::open(path) {
            Ok(db) => Some(db),
            Err(e) => {
                error!("Failed to open database {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    let batch_id = match &db {
        Some(db) => {
            let config_json = serde_json::to_string(config).ok();
            match db.create_batch(config_json.as_deref()) {
                Ok(id) => Some(id),
                Err(e) => {
                    error!("Failed to record batch: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
        None => None,
    };

    info!("Simulator: {}", config.executable.display());
    info!("Screenshots: {}", config.destination.display());

    let mut batch = BatchRunner::new(config, SystemRunner::with_timeout(config.timeout()));
    let summary = batch.run_all_with(|position, outcome| {
        if let (Some(db), Some(id)) = (&db, &batch_id) {
            if let Err(e) = db.insert_item(id, position, outcome) {
                warn!("Failed to record {} in database: {}", outcome.sequence, e);
            }
        }
    });

    let summary = match (&db, batch_id) {
        (Some(db), Some(id)) => {
            if let Err(e) = db.finish_batch(&id) {
                warn!("Failed to finish batch in database: {}", e);
            }
            summary.with_batch_id(id)
        }
        _ => summary,
    };

    if let Some(path) = &config.summary_path {
        match summary.write_to_file(path) {
            Ok(()) => info!("Summary written to {}", path.display()),
            Err(e) => warn!("Failed to write summary {}: {}", path.display(), e),
        }
    }

    println!("\n{}", summary.format_report());

    // Per-item failures are reported above, never through the exit code
    ExitCode::SUCCESS
}

fn plan(config: &BatchConfig, count_only: bool) {
    if count_only {
        println!("{}", config.expected_count());
        return;
    }

    for command in plan_commands(config) {
        println!("{}", command);
    }
}
