//! Run report aggregating every tool's result

use super::{CheckResult, CheckStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Ordered results of one updater run
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// When the run started
    pub checked_at: DateTime<Utc>,
    /// Whether updates were suppressed for this run
    pub check_only: bool,
    /// One entry per configured tool, in processing order
    pub results: Vec<CheckResult>,
}

impl Report {
    /// Creates an empty report
    pub fn new(check_only: bool) -> Self {
        Self {
            checked_at: Utc::now(),
            check_only,
            results: Vec::new(),
        }
    }

    /// Appends a tool result
    pub fn push(&mut self, result: CheckResult) {
        self.results.push(result);
    }

    /// Number of results with the given status
    pub fn count(&self, status: CheckStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    /// Number of successful updates
    pub fn updated(&self) -> usize {
        self.count(CheckStatus::UpdatePerformed)
    }

    /// Number of failed updates
    pub fn update_failures(&self) -> usize {
        self.count(CheckStatus::UpdateFailed)
    }

    /// Returns true if any update command was run
    pub fn any_action_taken(&self) -> bool {
        self.results.iter().any(CheckResult::update_attempted)
    }

    /// Returns true if any tool could not be checked
    pub fn has_failures(&self) -> bool {
        self.results
            .iter()
            .any(|r| matches!(r.status, CheckStatus::CheckFailed | CheckStatus::UpdateFailed))
    }

    /// One-line summary of the actions taken, if any
    pub fn action_summary(&self) -> Option<String> {
        if !self.any_action_taken() {
            return None;
        }
        Some(format!(
            "Updated: {}, failed: {}",
            self.updated(),
            self.update_failures()
        ))
    }

    /// Looks up a result by tool name
    pub fn get(&self, tool: &str) -> Option<&CheckResult> {
        self.results.iter().find(|r| r.tool == tool)
    }
}

/// Shape written by `--json`
#[derive(Serialize)]
pub struct ReportSummary {
    pub checked: usize,
    pub current: usize,
    pub outdated: usize,
    pub updated: usize,
    pub update_failed: usize,
    pub check_failed: usize,
}

impl From<&Report> for ReportSummary {
    fn from(report: &Report) -> Self {
        Self {
            checked: report.results.len(),
            current: report.count(CheckStatus::Current),
            outdated: report.count(CheckStatus::Outdated),
            updated: report.count(CheckStatus::UpdatePerformed),
            update_failed: report.count(CheckStatus::UpdateFailed),
            check_failed: report.count(CheckStatus::CheckFailed),
        }
    }
}
