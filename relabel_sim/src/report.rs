//! JSON report writer for CI runs.

use crate::runner::ScenarioResult;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// One scenario run in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    pub scenario: String,
    pub seed: u64,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    pub merge_count: usize,
    pub message_count: usize,
}

/// Complete run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Base seed of the run
    pub base_seed: u64,

    /// Totals across all entries
    pub total: usize,
    pub passed: usize,
    pub failed: usize,

    /// Per-scenario results
    pub entries: Vec<ReportEntry>,
}

impl RunReport {
    /// Creates an empty report.
    pub fn new(base_seed: u64) -> Self {
        Self {
            base_seed,
            total: 0,
            passed: 0,
            failed: 0,
            entries: Vec::new(),
        }
    }

    /// Adds one scenario result.
    pub fn add(&mut self, result: &ScenarioResult) {
        self.total += 1;
        if result.passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.entries.push(ReportEntry {
            scenario: result.scenario.name().to_string(),
            seed: result.seed,
            passed: result.passed,
            failure_reason: result.failure_reason.clone(),
            merge_count: result.merge_count,
            message_count: result.message_count,
        });
    }

    /// Writes the report as pretty-printed JSON.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())
    }
}
