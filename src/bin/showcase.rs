//! Showcase generator
//!
//! Combines the captured screenshots into one grid PNG, in the order the
//! batch ran them. Takes the same settings and overrides as `antshots`.
//!
//! Usage:
//!   cargo run --bin showcase -- --max-length 3
//!   cargo run --bin showcase -- --font /path/to/DejaVuSans.ttf --cols 16 --output showcase/all.png

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use antshots::cli::BatchArgs;
use antshots::showcase::load_font;
use antshots::{ShowcaseLayout, build_showcase, collect_entries, logging};

#[derive(Parser, Debug)]
#[command(name = "showcase")]
#[command(about = "Assemble captured screenshots into a labelled grid")]
struct Cli {
    #[command(flatten)]
    args: BatchArgs,

    /// Output PNG (relative paths resolve against the install root)
    #[arg(long, default_value = "showcase/sequences.png")]
    output: PathBuf,

    /// Thumbnails per row
    #[arg(long, default_value_t = 8)]
    cols: u32,

    /// Thumbnail size relative to the screenshots
    #[arg(long, default_value_t = 0.1)]
    scale: f32,

    /// Font file for sequence labels (no labels without one)
    #[arg(long, value_name = "TTF")]
    font: Option<PathBuf>,
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

    let entries = collect_entries(&config);
    if entries.is_empty() {
        error!("No screenshots found in {}/", config.destination.display());
        println!("Run `cargo run --release -- run` first to capture screenshots");
        return ExitCode::FAILURE;
    }
    info!("Found {} screenshots", entries.len());

    let font = match &cli.font {
        Some(path) => match load_font(path) {
            Ok(font) => Some(font),
            Err(e) => {
                warn!("{}, drawing without labels", e);
                None
            }
        },
        None => None,
    };

    let layout = ShowcaseLayout {
        cols: cli.cols,
        scale: cli.scale,
        ..ShowcaseLayout::default()
    };

    let sheet = match build_showcase(&entries, &layout, font.as_ref()) {
        Ok(Some(sheet)) => sheet,
        Ok(None) => {
            error!("None of the screenshots could be read");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let output = if cli.output.is_absolute() {
        cli.output.clone()
    } else {
        cli.args.root().join(&cli.output)
    };
    if let Some(parent) = output.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            error!("Cannot create {}: {}", parent.display(), e);
            return ExitCode::FAILURE;
        }
    }

    match sheet.save(&output) {
        Ok(()) => {
            println!("\nShowcase saved to: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to save {}: {}", output.display(), e);
            ExitCode::FAILURE
        }
    }
}
