//! Test double that records invocations instead of spawning them

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;

use super::{InvocationStatus, ProcessRunner};
use crate::command::CommandSpec;

/// One recorded call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Position in the overall call order, from 0
    pub order: usize,
    pub command: CommandSpec,
}

/// Records every command and answers with a canned status.
///
/// Statuses can be scripted per program, or per exact last argument
/// (the sequence for simulation calls, the output path for captures).
/// Anything unscripted succeeds.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    pub calls: Vec<Invocation>,
    by_program: HashMap<PathBuf, InvocationStatus>,
    by_last_arg: HashMap<OsString, InvocationStatus>,
    /// Files to create on each successful call to a program, named by its last argument
    touch_programs: Vec<PathBuf>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call to `program` answers `status`
    pub fn fail_program(mut self, program: impl Into<PathBuf>, status: InvocationStatus) -> Self {
        self.by_program.insert(program.into(), status);
        self
    }

    /// Calls whose last argument is `arg` answer `status`
    pub fn fail_last_arg(mut self, arg: impl Into<OsString>, status: InvocationStatus) -> Self {
        self.by_last_arg.insert(arg.into(), status);
        self
    }

    /// Successful calls to `program` create the file named by their last argument,
    /// mimicking a capture tool writing its image.
    pub fn touching(mut self, program: impl Into<PathBuf>) -> Self {
        self.touch_programs.push(program.into());
        self
    }

    /// Calls made to `program`, in order
    pub fn calls_to(&self, program: &str) -> Vec<&CommandSpec> {
        self.calls
            .iter()
            .filter(|c| c.command.program == PathBuf::from(program))
            .map(|c| &c.command)
            .collect()
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&mut self, command: &CommandSpec) -> InvocationStatus {
        self.calls.push(Invocation {
            order: self.calls.len(),
            command: command.clone(),
        });

        let last = command.args.last();
        let status = last
            .and_then(|arg| self.by_last_arg.get(arg))
            .or_else(|| self.by_program.get(&command.program))
            .cloned()
            .unwrap_or(InvocationStatus::Success);

        if status.is_success() && self.touch_programs.contains(&command.program) {
            if let Some(path) = last {
                // Best effort, like the real tool
                let _ = std::fs::write(path, b"");
            }
        }

        status
    }
}
