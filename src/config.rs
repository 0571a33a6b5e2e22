//! Batch configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::command::{CaptureSettings, SimulationFlags};
use crate::error::{Error, Result};
use crate::sequence::{self, Alphabet, Sequences};

/// Template batch settings (checked into git)
pub const BATCH_SETTINGS_TEMPLATE: &str = "config/batch_settings.template.json";
/// Local batch settings (gitignored, user's custom settings)
pub const BATCH_SETTINGS_FILE: &str = "config/batch_settings.json";

/// Everything one batch needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Symbols sequences are built from, in enumeration order
    pub alphabet: Alphabet,
    /// Shortest sequence length (inclusive)
    pub min_length: usize,
    /// Longest sequence length (inclusive)
    pub max_length: usize,
    /// Simulation executable (relative paths resolve against the install root)
    pub executable: PathBuf,
    /// Directory screenshots are written to
    pub destination: PathBuf,
    /// Iteration budget handed to every simulation
    pub steps: u64,
    pub simulation: SimulationFlags,
    pub capture: CaptureSettings,
    /// Kill an invocation after this many seconds (None = wait forever)
    pub timeout_secs: Option<u64>,
    /// Leave sequences whose screenshot already exists untouched
    pub skip_existing: bool,
    /// SQLite batch log
    pub db_path: Option<PathBuf>,
    /// JSON summary written when the batch ends
    pub summary_path: Option<PathBuf>,
    /// Suppress per-item progress output
    pub quiet: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            alphabet: Alphabet::default(),
            min_length: 2,
            max_length: 6,
            executable: PathBuf::from("target/release/langtonsant"),
            destination: PathBuf::from("screenshots"),
            steps: 20000,
            simulation: SimulationFlags::default(),
            capture: CaptureSettings::default(),
            timeout_secs: None,
            skip_existing: false,
            db_path: None,
            summary_path: None,
            quiet: false,
        }
    }
}

impl BatchConfig {
    /// Load configuration from a settings file (`.toml` or JSON)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| Error::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;

        let is_toml = path.extension().is_some_and(|ext| ext == "toml");
        let parsed = if is_toml {
            toml::from_str(&contents).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(&contents).map_err(|e| e.to_string())
        };

        parsed.map_err(|message| Error::ParseFile {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Load configuration from the default settings files under `root`
    /// Priority: local settings > template settings > built-in defaults
    pub fn from_config_files(root: &Path) -> Self {
        for candidate in [BATCH_SETTINGS_FILE, BATCH_SETTINGS_TEMPLATE] {
            let path = root.join(candidate);
            if !path.exists() {
                continue;
            }
            match Self::from_file(&path) {
                Ok(config) => {
                    info!("Loaded settings from {}", path.display());
                    return config;
                }
                Err(e) => warn!("{}, ignoring", e),
            }
        }
        Self::default()
    }

    /// Reject configurations that cannot produce a meaningful batch
    pub fn validate(&self) -> Result<()> {
        if self.min_length == 0 {
            return Err(Error::Config("min_length must be at least 1".to_string()));
        }
        if self.min_length > self.max_length {
            return Err(Error::Config(format!(
                "min_length {} is greater than max_length {}",
                self.min_length, self.max_length
            )));
        }
        if self.executable.as_os_str().is_empty() {
            return Err(Error::Config("executable path is empty".to_string()));
        }
        if self.capture.program.as_os_str().is_empty() {
            return Err(Error::Config("capture program is empty".to_string()));
        }
        if self.capture.extension.is_empty() || self.capture.extension.contains('/') {
            return Err(Error::Config(format!(
                "invalid image extension '{}'",
                self.capture.extension
            )));
        }
        Ok(())
    }

    /// Make every relative path absolute against `root`.
    ///
    /// Done once at startup so nothing downstream depends on the working
    /// directory. A bare program name (no separator) is left for PATH lookup.
    pub fn resolve_paths(&mut self, root: &Path) {
        self.executable = resolve_program(root, &self.executable);
        self.capture.program = resolve_program(root, &self.capture.program);
        self.destination = resolve(root, &self.destination);
        self.db_path = self.db_path.as_deref().map(|p| resolve(root, p));
        self.summary_path = self.summary_path.as_deref().map(|p| resolve(root, p));
    }

    /// Sequences this configuration covers
    pub fn sequences(&self) -> Sequences {
        sequence::enumerate(&self.alphabet, self.min_length, self.max_length)
    }

    pub fn expected_count(&self) -> u64 {
        sequence::expected_count(self.alphabet.len(), self.min_length, self.max_length)
    }

    pub fn timeout(&self) -> Option<std::time::Duration> {
        self.timeout_secs.map(std::time::Duration::from_secs)
    }
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

fn resolve_program(root: &Path, program: &Path) -> PathBuf {
    if program.components().count() <= 1 && !program.is_absolute() {
        program.to_path_buf()
    } else {
        resolve(root, program)
    }
}

/// Directory the tool is installed in.
///
/// The directory holding the running binary, stepping out of a cargo
/// `target/<profile>` directory so a `cargo run` build resolves paths
/// against the checkout.
pub fn install_root() -> PathBuf {
    let exe = std::env::current_exe().ok();
    let dir = exe.as_deref().and_then(Path::parent);
    match dir {
        Some(dir) => root_from_binary_dir(dir),
        None => PathBuf::from("."),
    }
}

fn root_from_binary_dir(dir: &Path) -> PathBuf {
    let mut current = dir;
    // target/<profile>, target/<profile>/deps, target/<triple>/<profile>
    for _ in 0..3 {
        if current.file_name().is_some_and(|n| n == "target") {
            if let Some(parent) = current.parent() {
                return parent.to_path_buf();
            }
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
    dir.to_path_buf()
}
