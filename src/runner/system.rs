//! Real child processes via `std::process`

use std::process::{Child, Command, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use super::{InvocationStatus, ProcessRunner};
use crate::command::CommandSpec;

/// How often a timed child is polled for exit
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Spawns each command with inherited stdio and waits for it.
///
/// Stdio is inherited because the simulator draws into the terminal the
/// capture tool photographs.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill any invocation still running after `timeout`
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    fn wait_with_deadline(child: &mut Child, timeout: Duration) -> std::io::Result<Option<ExitStatus>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(Some(status));
            }
            if Instant::now() >= deadline {
                child.kill()?;
                // Reap so the child does not linger as a zombie
                child.wait()?;
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

fn status_of(status: ExitStatus) -> InvocationStatus {
    if status.success() {
        InvocationStatus::Success
    } else {
        InvocationStatus::Failed {
            code: status.code(),
        }
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&mut self, command: &CommandSpec) -> InvocationStatus {
        debug!("spawning: {}", command);

        let mut child = match Command::new(&command.program).args(&command.args).spawn() {
            Ok(child) => child,
            Err(e) => {
                return InvocationStatus::LaunchFailed {
                    reason: e.to_string(),
                };
            }
        };

        let waited = match self.timeout {
            Some(timeout) => Self::wait_with_deadline(&mut child, timeout),
            None => child.wait().map(Some),
        };

        match waited {
            Ok(Some(status)) => status_of(status),
            Ok(None) => InvocationStatus::TimedOut,
            Err(e) => InvocationStatus::LaunchFailed {
                reason: format!("wait failed: {}", e),
            },
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new("sh").arg("-c").arg(script)
    }

    #[test]
    fn test_success_and_failure_codes() {
        let mut runner = SystemRunner::new();
        assert_eq!(runner.run(&sh("exit 0")), InvocationStatus::Success);
        assert_eq!(
            runner.run(&sh("exit 3")),
            InvocationStatus::Failed { code: Some(3) }
        );
    }

    #[test]
    fn test_missing_program_is_launch_failure() {
        let mut runner = SystemRunner::new();
        let status = runner.run(&CommandSpec::new("/nonexistent/antshots-missing-binary"));
        assert!(matches!(status, InvocationStatus::LaunchFailed { .. }));
    }

    #[test]
    fn test_timeout_kills_hung_child() {
        let mut runner = SystemRunner::with_timeout(Some(Duration::from_millis(200)));
        let started = Instant::now();
        let status = runner.run(&sh("sleep 10"));
        assert_eq!(status, InvocationStatus::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_timeout_leaves_fast_child_alone() {
        let mut runner = SystemRunner::with_timeout(Some(Duration::from_secs(10)));
        assert_eq!(runner.run(&sh("true")), InvocationStatus::Success);
    }

    #[test]
    fn test_blocks_until_exit() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("done");
        let mut runner = SystemRunner::new();
        let script = format!("sleep 0.2; touch '{}'", marker.display());
        assert!(runner.run(&sh(&script)).is_success());
        assert!(marker.exists());
    }
}
