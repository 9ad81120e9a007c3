//! JSON output for machine processing
//!
//! Nothing is written while tools are processed; the whole report is
//! printed once the run finishes.

use crate::domain::{Report, ReportSummary};
use crate::output::{Reporter, RunEvent};
use serde::Serialize;
use std::io::{self, Write};
use tracing::warn;

/// JSON representation of a finished run
#[derive(Serialize)]
struct JsonOutput<'a> {
    /// Counts per status
    summary: ReportSummary,
    /// Per-tool results
    #[serde(flatten)]
    report: &'a Report,
}

/// JSON reporter for machine-readable output
pub struct JsonReporter<W: Write> {
    writer: W,
}

impl<W: Write> JsonReporter<W> {
    /// Create a new JSON reporter
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consume the reporter and return the writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_report(&mut self, report: &Report) -> io::Result<()> {
        let output = JsonOutput {
            summary: ReportSummary::from(report),
            report,
        };
        serde_json::to_writer_pretty(&mut self.writer, &output)?;
        writeln!(self.writer)?;
        self.writer.flush()
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn report(&mut self, event: RunEvent<'_>) {
        if let RunEvent::Finished(report) = event {
            if let Err(e) = self.write_report(report) {
                warn!("failed to write JSON report: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{default_tools, CheckResult, CheckStatus, InstalledVersion, Version};

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_only_finished_is_written() {
        let tools = default_tools();
        let mut reporter = JsonReporter::new(Vec::new());
        reporter.report(RunEvent::Started);
        reporter.report(RunEvent::ToolStarted(&tools[0]));
        reporter.report(RunEvent::UpToDate(&tools[0]));
        assert!(reporter.into_inner().is_empty());
    }

    #[test]
    fn test_report_json() {
        let mut report = Report::new(false);
        report.push(
            CheckResult::new(
                "npm",
                InstalledVersion::Installed(v("11.5.2")),
                Some(v("11.5.2")),
                CheckStatus::Current,
            )
            .with_package("npm"),
        );
        report.push(
            CheckResult::new(
                "Gemini CLI",
                InstalledVersion::Installed(v("0.1.22")),
                Some(v("0.1.22")),
                CheckStatus::UpdatePerformed,
            )
            .with_package("@google/gemini-cli"),
        );
        report.push(CheckResult::failed(
            "OpenAI Codex CLI",
            InstalledVersion::Unknown,
            None,
            "OpenAI Codex CLI: query timed out",
        ));

        let mut reporter = JsonReporter::new(Vec::new());
        reporter.report(RunEvent::Finished(&report));
        let output = String::from_utf8(reporter.into_inner()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(json["summary"]["checked"], 3);
        assert_eq!(json["summary"]["current"], 1);
        assert_eq!(json["summary"]["updated"], 1);
        assert_eq!(json["summary"]["check_failed"], 1);
        assert_eq!(json["check_only"], false);
        assert!(json["checked_at"].is_string());

        let results = json["results"].as_array().unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[1]["status"], "update-performed");
        assert_eq!(results[2]["current"]["state"], "unknown");
        assert!(results[2]["latest"].is_null());
    }
}
