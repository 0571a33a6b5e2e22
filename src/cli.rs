//! Command-line options shared by the binaries
//!
//! Settings layer as: built-in defaults, then the settings files under the
//! install root (or an explicit `--settings` file), then these flags.

use std::path::PathBuf;

use clap::Args;

use crate::config::{self, BatchConfig};
use crate::error::Result;
use crate::sequence::Alphabet;

#[derive(Args, Debug, Clone, Default)]
pub struct BatchArgs {
    /// Load settings from FILE (.json or .toml) instead of config/batch_settings*.json
    #[arg(long, value_name = "FILE", global = true)]
    pub settings: Option<PathBuf>,

    /// Resolve relative paths against DIR (default: where the tool is installed)
    #[arg(long, value_name = "DIR", global = true)]
    pub root: Option<PathBuf>,

    /// Symbols to build sequences from, in order (e.g. "LRUN")
    #[arg(long, global = true)]
    pub alphabet: Option<Alphabet>,

    /// Shortest sequence length
    #[arg(long, value_name = "N", global = true)]
    pub min_length: Option<usize>,

    /// Longest sequence length
    #[arg(long, value_name = "N", global = true)]
    pub max_length: Option<usize>,

    /// Simulation executable
    #[arg(long, value_name = "PATH", global = true)]
    pub executable: Option<PathBuf>,

    /// Directory screenshots are written to
    #[arg(long, value_name = "DIR", global = true)]
    pub destination: Option<PathBuf>,

    /// Iteration budget per simulation
    #[arg(long, value_name = "N", global = true)]
    pub steps: Option<u64>,

    /// Kill an invocation after SECS seconds
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Leave sequences that already have a screenshot alone
    #[arg(long, global = true)]
    pub skip_existing: bool,

    /// Record outcomes in a SQLite database
    #[arg(long, value_name = "FILE", global = true)]
    pub db: Option<PathBuf>,

    /// Write a JSON summary when the batch ends
    #[arg(long, value_name = "FILE", global = true)]
    pub summary: Option<PathBuf>,

    /// Only log warnings (failed invocations still show)
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

impl BatchArgs {
    /// Install root these options resolve against
    pub fn root(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(config::install_root)
    }

    /// Build, override, validate and resolve the configuration
    pub fn load_config(&self) -> Result<BatchConfig> {
        let root = self.root();
        let mut config = match &self.settings {
            Some(path) => BatchConfig::from_file(path)?,
            None => BatchConfig::from_config_files(&root),
        };
        self.apply(&mut config);
        config.validate()?;
        config.resolve_paths(&root);
        Ok(config)
    }

    /// Whether logging should be quiet, preferring the loaded settings.
    ///
    /// Falls back to the flag when loading failed, so the error still gets logged.
    pub fn log_quiet(&self, loaded: &Result<BatchConfig>) -> bool {
        loaded.as_ref().map_or(self.quiet, |config| config.quiet)
    }

    fn apply(&self, config: &mut BatchConfig) {
        if let Some(alphabet) = &self.alphabet {
            config.alphabet = alphabet.clone();
        }
        if let Some(n) = self.min_length {
            config.min_length = n;
        }
        if let Some(n) = self.max_length {
            config.max_length = n;
        }
        if let Some(path) = &self.executable {
            config.executable = path.clone();
        }
        if let Some(path) = &self.destination {
            config.destination = path.clone();
        }
        if let Some(steps) = self.steps {
            config.steps = steps;
        }
        if self.timeout.is_some() {
            config.timeout_secs = self.timeout;
        }
        if self.skip_existing {
            config.skip_existing = true;
        }
        if self.db.is_some() {
            config.db_path = self.db.clone();
        }
        if self.summary.is_some() {
            config.summary_path = self.summary.clone();
        }
        if self.quiet {
            config.quiet = true;
        }
    }
}
