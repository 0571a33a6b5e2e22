//! Batch driver: one simulation and one screenshot per sequence
//!
//! Strictly sequential. The capture must see the simulator's final frame,
//! so the simulation's exit is always observed before the capture starts,
//! and nothing from one sequence overlaps the next.
//!
//! Failures never stop the batch. Each non-success is logged and kept in
//! the returned [`ItemOutcome`], and the driver moves on.

use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::command::{CommandSpec, capture_command, output_path, simulation_command};
use crate::config::BatchConfig;
use crate::runner::{InvocationStatus, ProcessRunner};
use crate::sequence::Sequence;
use crate::summary::BatchSummary;

/// What happened for one sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ItemResult {
    Ran {
        simulation: InvocationStatus,
        capture: InvocationStatus,
    },
    /// Screenshot already present and `skip_existing` was set
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemOutcome {
    pub sequence: Sequence,
    pub output_path: PathBuf,
    #[serde(flatten)]
    pub result: ItemResult,
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        match &self.result {
            ItemResult::Ran {
                simulation,
                capture,
            } => simulation.is_success() && capture.is_success(),
            ItemResult::Skipped => false,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.result, ItemResult::Skipped)
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success() && !self.is_skipped()
    }
}

/// Drives a batch through a [`ProcessRunner`]
pub struct BatchRunner<'a, R: ProcessRunner> {
    config: &'a BatchConfig,
    runner: R,
}

impl<'a, R: ProcessRunner> BatchRunner<'a, R> {
    pub fn new(config: &'a BatchConfig, runner: R) -> Self {
        Self { config, runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn into_runner(self) -> R {
        self.runner
    }

    /// Simulate `sequence`, then capture the screen to `<destination>/<sequence>.<ext>`.
    pub fn run_one(&mut self, sequence: &Sequence) -> ItemOutcome {
        let config = self.config;
        let path = output_path(&config.destination, sequence, &config.capture.extension);

        if config.skip_existing && path.exists() {
            debug!("{} already captured, skipping", sequence);
            return ItemOutcome {
                sequence: sequence.clone(),
                output_path: path,
                result: ItemResult::Skipped,
            };
        }

        let sim = simulation_command(&config.executable, &config.simulation, config.steps, sequence);
        let simulation = self.runner.run(&sim);
        if !simulation.is_success() {
            warn!("simulation for {} ended with {}", sequence, simulation);
        }

        // Capture regardless: a failed run still leaves something on screen
        let cap = capture_command(&config.capture, &config.destination, sequence);
        let capture = self.runner.run(&cap);
        if !capture.is_success() {
            warn!("capture for {} ended with {}", sequence, capture);
        }

        ItemOutcome {
            sequence: sequence.clone(),
            output_path: path,
            result: ItemResult::Ran {
                simulation,
                capture,
            },
        }
    }

    /// Run every configured sequence in enumeration order.
    pub fn run_all(&mut self) -> BatchSummary {
        self.run_all_with(|_, _| {})
    }

    /// Like [`run_all`](Self::run_all), calling `on_item` with the
    /// 0-based position of each finished item.
    pub fn run_all_with<F>(&mut self, mut on_item: F) -> BatchSummary
    where
        F: FnMut(usize, &ItemOutcome),
    {
        let total = self.config.expected_count();
        let started_at = Utc::now();
        let mut items = Vec::new();

        info!(
            "Batch: {} sequences over {} (lengths {}..={}), {} steps each",
            total,
            self.config.alphabet,
            self.config.min_length,
            self.config.max_length,
            self.config.steps
        );

        for (position, sequence) in self.config.sequences().enumerate() {
            if !self.config.quiet {
                info!("[{}/{}] {}", position + 1, total, sequence);
            }
            let outcome = self.run_one(&sequence);
            on_item(position, &outcome);
            items.push(outcome);
        }

        BatchSummary::new(started_at, Utc::now(), items)
    }
}

/// Command lines a batch would run, simulation then capture per sequence
pub fn plan_commands(config: &BatchConfig) -> impl Iterator<Item = CommandSpec> + '_ {
    config.sequences().flat_map(move |sequence| {
        [
            simulation_command(&config.executable, &config.simulation, config.steps, &sequence),
            capture_command(&config.capture, &config.destination, &sequence),
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::RecordingRunner;
    use std::collections::BTreeSet;
    use std::path::Path;

    fn small_config(destination: &Path) -> BatchConfig {
        BatchConfig {
            min_length: 2,
            max_length: 2,
            executable: PathBuf::from("/opt/ant/langtonsant"),
            destination: destination.to_path_buf(),
            quiet: true,
            ..BatchConfig::default()
        }
    }

    fn seq(s: &str) -> Sequence {
        Sequence::parse(s, &crate::sequence::Alphabet::default()).unwrap()
    }

    fn args(cmd: &CommandSpec) -> Vec<String> {
        cmd.args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_run_one_simulates_before_capturing() {
        let config = small_config(Path::new("/tmp/shots"));
        let mut batch = BatchRunner::new(&config, RecordingRunner::new());
        let outcome = batch.run_one(&seq("LR"));
        assert!(outcome.is_success());

        let calls = &batch.runner().calls;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].command.program, PathBuf::from("/opt/ant/langtonsant"));
        assert_eq!(args(&calls[0].command), vec!["-f", "-m", "20000", "-r", "LR"]);
        assert_eq!(calls[1].command.program, PathBuf::from("screencapture"));
        assert_eq!(args(&calls[1].command), vec!["-x", "/tmp/shots/LR.png"]);
        assert!(calls[0].order < calls[1].order);
    }

    #[test]
    fn test_full_small_batch() {
        let config = small_config(Path::new("/tmp/shots"));
        let mut batch = BatchRunner::new(&config, RecordingRunner::new());
        let summary = batch.run_all();
        let runner = batch.into_runner();

        assert_eq!(summary.total, 16);
        assert_eq!(summary.succeeded, 16);

        let sims = runner.calls_to("/opt/ant/langtonsant");
        let caps = runner.calls_to("screencapture");
        assert_eq!(sims.len(), 16);
        assert_eq!(caps.len(), 16);

        // Calls strictly alternate simulation, capture per sequence
        for (i, pair) in runner.calls.chunks(2).enumerate() {
            let sequence = pair[0].command.args.last().unwrap().to_str().unwrap();
            assert_eq!(pair[0].command.program, PathBuf::from("/opt/ant/langtonsant"));
            assert_eq!(pair[1].command.program, PathBuf::from("screencapture"));

            let out = PathBuf::from(pair[1].command.args.last().unwrap());
            assert_eq!(out.file_stem().unwrap().to_str().unwrap(), sequence);
            assert_eq!(summary.items[i].sequence.as_str(), sequence);
        }
        assert_eq!(summary.items[0].sequence.as_str(), "LL");
        assert_eq!(summary.items[15].sequence.as_str(), "NN");
    }

    #[test]
    fn test_failures_do_not_stop_the_batch() {
        let config = small_config(Path::new("/tmp/shots"));
        let runner = RecordingRunner::new()
            .fail_last_arg("RU", InvocationStatus::Failed { code: Some(101) })
            .fail_last_arg(
                "/tmp/shots/NL.png",
                InvocationStatus::LaunchFailed {
                    reason: "No such file or directory".to_string(),
                },
            );
        let mut batch = BatchRunner::new(&config, runner);

        let mut seen = Vec::new();
        let summary = batch.run_all_with(|pos, outcome| seen.push((pos, outcome.is_success())));

        assert_eq!(summary.total, 16);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.succeeded, 14);
        assert_eq!(batch.runner().calls.len(), 32);
        assert_eq!(seen.len(), 16);
        assert_eq!(seen.iter().filter(|(_, ok)| !ok).count(), 2);

        let failed: Vec<&str> = summary.failures().map(|o| o.sequence.as_str()).collect();
        assert_eq!(failed, vec!["RU", "NL"]);

        // The capture still ran after the failed simulation
        let ru = &summary.items[6];
        assert_eq!(ru.sequence.as_str(), "RU");
        assert_eq!(
            ru.result,
            ItemResult::Ran {
                simulation: InvocationStatus::Failed { code: Some(101) },
                capture: InvocationStatus::Success,
            }
        );
    }

    #[test]
    fn test_repeat_runs_produce_same_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = small_config(dir.path());

        let listing = || -> BTreeSet<String> {
            std::fs::read_dir(dir.path())
                .unwrap()
                .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
                .collect()
        };

        let mut first = BatchRunner::new(&config, RecordingRunner::new().touching("screencapture"));
        first.run_all();
        let after_first = listing();

        let mut second = BatchRunner::new(&config, RecordingRunner::new().touching("screencapture"));
        second.run_all();
        let after_second = listing();

        assert_eq!(after_first.len(), 16);
        assert!(after_first.contains("LL.png"));
        assert_eq!(after_first, after_second);
        // Overwrites by default: every item ran again
        assert_eq!(second.runner().calls.len(), 32);
    }

    #[test]
    fn test_skip_existing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("LL.png"), b"").unwrap();
        std::fs::write(dir.path().join("NN.png"), b"").unwrap();

        let mut config = small_config(dir.path());
        config.skip_existing = true;

        let mut batch = BatchRunner::new(&config, RecordingRunner::new());
        let summary = batch.run_all();

        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.succeeded, 14);
        assert_eq!(batch.runner().calls.len(), 28);
        assert!(summary.items[0].is_skipped());
        assert!(!summary.items[0].is_failure());
    }

    #[test]
    fn test_plan_lists_every_command_pair() {
        let config = small_config(Path::new("/tmp/shots"));
        let lines: Vec<String> = plan_commands(&config).map(|c| c.to_string()).collect();

        assert_eq!(lines.len(), 32);
        assert_eq!(lines[0], "/opt/ant/langtonsant -f -m 20000 -r LL");
        assert_eq!(lines[1], "screencapture -x /tmp/shots/LL.png");
        assert_eq!(lines[2], "/opt/ant/langtonsant -f -m 20000 -r LR");
        assert_eq!(lines[31], "screencapture -x /tmp/shots/NN.png");
        assert_eq!(lines.len() as u64, config.expected_count() * 2);

        // Planning runs nothing, so the batch it describes is the same one run_all drives
        let mut batch = BatchRunner::new(&config, RecordingRunner::new());
        batch.run_all();
        let ran: Vec<String> = batch.runner().calls.iter().map(|c| c.command.to_string()).collect();
        assert_eq!(ran, lines);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_destination_is_captured_and_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join(OsStr::from_bytes(b"shots\xff"));
        std::fs::create_dir_all(&destination).unwrap();

        let mut config = small_config(&destination);
        config.skip_existing = true;

        let mut first = BatchRunner::new(&config, RecordingRunner::new().touching("screencapture"));
        let outcome = first.run_one(&seq("LL"));
        let capture_arg = first.runner().calls[1].command.args.last().unwrap().clone();

        assert_eq!(capture_arg.as_os_str(), outcome.output_path.as_os_str());
        assert!(outcome.output_path.exists());

        let mut second = BatchRunner::new(&config, RecordingRunner::new());
        assert!(second.run_one(&seq("LL")).is_skipped());
        assert!(second.runner().calls.is_empty());
    }
}
