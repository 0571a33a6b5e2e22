//! Command lines for the two external tools
//!
//! Flag spellings are data so a differently built simulator or capture
//! tool only needs a settings change.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::sequence::Sequence;

/// A launchable process: program plus ordered arguments
///
/// Arguments stay OS strings so a non-UTF-8 destination reaches the
/// capture tool byte for byte; only `Display` is lossy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Flags understood by the simulation executable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationFlags {
    /// Headless / no-delay mode
    pub fast_flag: String,
    /// Introduces the step budget value
    pub steps_flag: String,
    /// Introduces the move sequence value
    pub moves_flag: String,
}

impl Default for SimulationFlags {
    fn default() -> Self {
        Self {
            fast_flag: "-f".to_string(),
            steps_flag: "-m".to_string(),
            moves_flag: "-r".to_string(),
        }
    }
}

/// How to invoke the screen-capture utility
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    pub program: PathBuf,
    /// Flags placed before the output path (full screen, no sound)
    pub flags: Vec<String>,
    /// Image file extension, without the dot
    pub extension: String,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            program: PathBuf::from("screencapture"),
            flags: vec!["-x".to_string()],
            extension: "png".to_string(),
        }
    }
}

/// `<executable> -f -m <steps> -r <sequence>`
pub fn simulation_command(
    executable: &Path,
    flags: &SimulationFlags,
    steps: u64,
    sequence: &Sequence,
) -> CommandSpec {
    CommandSpec::new(executable)
        .arg(flags.fast_flag.as_str())
        .arg(flags.steps_flag.as_str())
        .arg(steps.to_string())
        .arg(flags.moves_flag.as_str())
        .arg(sequence.as_str())
}

/// Where the screenshot for `sequence` lands
pub fn output_path(destination: &Path, sequence: &Sequence, extension: &str) -> PathBuf {
    destination.join(format!("{}.{}", sequence, extension))
}

/// `<capture-program> -x <destination>/<sequence>.png`
pub fn capture_command(
    capture: &CaptureSettings,
    destination: &Path,
    sequence: &Sequence,
) -> CommandSpec {
    let path = output_path(destination, sequence, &capture.extension);
    CommandSpec::new(&capture.program)
        .args(capture.flags.iter().cloned())
        .arg(path)
}
