//! Process-launch seam
//!
//! The batch only ever needs "run this command and tell me how it ended".
//! [`SystemRunner`] does that with real child processes;
//! [`RecordingRunner`] records calls for tests.

pub mod recording;
pub mod system;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::command::CommandSpec;

pub use recording::{Invocation, RecordingRunner};
pub use system::SystemRunner;

/// How one external invocation ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InvocationStatus {
    Success,
    /// Non-zero exit, or killed by a signal (no code)
    Failed { code: Option<i32> },
    TimedOut,
    LaunchFailed { reason: String },
}

impl InvocationStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, InvocationStatus::Success)
    }

    /// Short label, without a launch failure's reason.
    ///
    /// `Display` adds the reason; that full form is what the batch log stores.
    pub fn label(&self) -> String {
        match self {
            InvocationStatus::Success => "success".to_string(),
            InvocationStatus::Failed { code: Some(code) } => format!("exit {}", code),
            InvocationStatus::Failed { code: None } => "signal".to_string(),
            InvocationStatus::TimedOut => "timeout".to_string(),
            InvocationStatus::LaunchFailed { .. } => "launch failed".to_string(),
        }
    }
}

impl fmt::Display for InvocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvocationStatus::LaunchFailed { reason } => write!(f, "launch failed: {}", reason),
            other => f.write_str(&other.label()),
        }
    }
}

/// Runs a command to completion, blocking the caller until it exits.
pub trait ProcessRunner {
    fn run(&mut self, command: &CommandSpec) -> InvocationStatus;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &mut R {
    fn run(&mut self, command: &CommandSpec) -> InvocationStatus {
        (**self).run(command)
    }
}
