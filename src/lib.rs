//! antshots - batch screenshots of a turmite simulator
//!
//! Enumerates every move sequence over a small alphabet, runs the external
//! simulator once per sequence, and has an external capture tool save the
//! screen as `<destination>/<sequence>.png`.

pub mod batch;
pub mod cli;
pub mod command;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod runner;
pub mod sequence;
pub mod showcase;
pub mod summary;

// Re-export commonly used types for convenience
pub use batch::{BatchRunner, ItemOutcome, ItemResult, plan_commands};
pub use command::{CaptureSettings, CommandSpec, SimulationFlags, capture_command, simulation_command};
pub use config::{BATCH_SETTINGS_FILE, BATCH_SETTINGS_TEMPLATE, BatchConfig, install_root};
pub use db::{BatchDatabase, BatchRecord, FailedItem};
pub use error::{Error, Result};
pub use runner::{InvocationStatus, ProcessRunner, RecordingRunner, SystemRunner};
pub use sequence::{Alphabet, Sequence, Sequences, enumerate, expected_count};
pub use showcase::{ShowcaseEntry, ShowcaseLayout, build_showcase, collect_entries};
pub use summary::BatchSummary;
