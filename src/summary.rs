//! Batch summary generation

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::batch::{ItemOutcome, ItemResult};

/// Batch summary for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub batch_id: String,
    pub started_at: String,
    pub finished_at: String,
    pub duration_secs: f64,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub items: Vec<ItemOutcome>,
}

impl BatchSummary {
    pub fn new(started: DateTime<Utc>, finished: DateTime<Utc>, items: Vec<ItemOutcome>) -> Self {
        let succeeded = items.iter().filter(|i| i.is_success()).count();
        let skipped = items.iter().filter(|i| i.is_skipped()).count();
        let duration_secs = (finished - started).num_milliseconds() as f64 / 1000.0;

        Self {
            batch_id: uuid::Uuid::new_v4().to_string(),
            started_at: started.to_rfc3339(),
            finished_at: finished.to_rfc3339(),
            duration_secs,
            total: items.len(),
            succeeded,
            failed: items.len() - succeeded - skipped,
            skipped,
            items,
        }
    }

    /// Use an id assigned elsewhere (the batch database) so logs line up
    pub fn with_batch_id(mut self, id: impl Into<String>) -> Self {
        self.batch_id = id.into();
        self
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.items.iter().filter(|i| i.is_failure())
    }

    /// Write summary to JSON file
    pub fn write_to_file(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Human-readable report, failures listed individually
    pub fn format_report(&self) -> String {
        let mut out = String::new();
        out.push_str("========================================\n");
        out.push_str("            BATCH COMPLETE\n");
        out.push_str("========================================\n");
        out.push_str(&format!("  Batch:     {}\n", self.batch_id));
        out.push_str(&format!("  Sequences: {}\n", self.total));
        out.push_str(&format!("  Succeeded: {}\n", self.succeeded));
        out.push_str(&format!("  Failed:    {}\n", self.failed));
        if self.skipped > 0 {
            out.push_str(&format!("  Skipped:   {}\n", self.skipped));
        }
        out.push_str(&format!("  Duration:  {:.1}s\n", self.duration_secs));

        let failures: Vec<_> = self.failures().collect();
        if !failures.is_empty() {
            out.push_str("\n  Failures:\n");
            for item in failures {
                if let ItemResult::Ran {
                    simulation,
                    capture,
                } = &item.result
                {
                    out.push_str(&format!(
                        "    {:<8} simulation: {}, capture: {}\n",
                        item.sequence, simulation, capture
                    ));
                }
            }
        }
        out.push_str("========================================\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::InvocationStatus;
    use crate::sequence::{Alphabet, Sequence};
    use std::path::PathBuf;

    fn outcome(seq: &str, simulation: InvocationStatus) -> ItemOutcome {
        ItemOutcome {
            sequence: Sequence::parse(seq, &Alphabet::default()).unwrap(),
            output_path: PathBuf::from(format!("shots/{}.png", seq)),
            result: ItemResult::Ran {
                simulation,
                capture: InvocationStatus::Success,
            },
        }
    }

    #[test]
    fn test_counts_and_report() {
        let now = Utc::now();
        let items = vec![
            outcome("LL", InvocationStatus::Success),
            outcome("LR", InvocationStatus::TimedOut),
            ItemOutcome {
                sequence: Sequence::parse("LU", &Alphabet::default()).unwrap(),
                output_path: PathBuf::from("shots/LU.png"),
                result: ItemResult::Skipped,
            },
        ];
        let summary = BatchSummary::new(now, now + chrono::Duration::seconds(3), items);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert!((summary.duration_secs - 3.0).abs() < 1e-9);

        let report = summary.format_report();
        assert!(report.contains("LR"));
        assert!(report.contains("simulation: timeout"));
        assert!(report.contains("Skipped:   1"));
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("summary.json");
        let now = Utc::now();
        let summary = BatchSummary::new(now, now, vec![outcome("NN", InvocationStatus::Success)])
            .with_batch_id("batch-1");
        summary.write_to_file(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["batch_id"], "batch-1");
        assert_eq!(json["items"][0]["sequence"], "NN");
        assert_eq!(json["items"][0]["result"], "ran");
        assert_eq!(json["items"][0]["simulation"]["status"], "success");

        let back: BatchSummary = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back.items, summary.items);
    }
}
