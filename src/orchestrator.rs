//! Update orchestrator for coordinating the whole run
//!
//! This module provides:
//! - Workflow coordination: order → check → decide → confirm → install → re-read
//! - npm-first ordering when npm auto-update is enabled
//! - Check-only and install-missing policies
//! - Error handling with per-tool continuation
//! - Ctrl-C at a confirmation ends the run without the final block

use crate::checker::ToolChecker;
use crate::config::Settings;
use crate::domain::{CheckResult, CheckStatus, Report, ToolSpec};
use crate::error::Aborted;
use crate::npm::{Installer, VersionSource};
use crate::output::{Reporter, RunEvent};
use crate::progress::Progress;
use crate::prompt::Confirmer;
use tracing::{debug, info, warn};

/// Reason shown when `--check` suppresses an update
pub const SKIP_CHECK_ONLY: &str = "Update available (not applied).";
/// Reason shown when npm is outdated but npm auto-update is off
pub const SKIP_NPM_DISABLED: &str = "Update available (npm auto-update disabled).";
/// Reason shown when a missing tool is not installed
pub const SKIP_MISSING: &str = "Not installed; install skipped.";
/// Reason shown when the user declines the confirmation
pub const SKIP_DECLINED: &str = "Update skipped.";

/// Orchestrator for one sequential updater run
pub struct UpdateOrchestrator<'a> {
    /// Installed and registry version queries
    source: &'a dyn VersionSource,
    /// Install commands
    installer: &'a dyn Installer,
    /// Asked before each update when confirmation is enabled
    confirmer: &'a dyn Confirmer,
    /// Receives run events
    reporter: &'a mut dyn Reporter,
    /// Spinner while npm is working
    progress: Progress,
}

impl<'a> UpdateOrchestrator<'a> {
    /// Create an orchestrator without progress display
    pub fn new(
        source: &'a dyn VersionSource,
        installer: &'a dyn Installer,
        confirmer: &'a dyn Confirmer,
        reporter: &'a mut dyn Reporter,
    ) -> Self {
        Self {
            source,
            installer,
            confirmer,
            reporter,
            progress: Progress::disabled(),
        }
    }

    /// Enable or disable the spinner
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.progress = Progress::new(enabled);
        self
    }

    /// Check every tool, update the outdated ones, and report
    ///
    /// Per-tool failures never stop the run; every tool appears in the report.
    /// Only an aborted confirmation stops it early.
    pub async fn run(&mut self, tools: &[ToolSpec], settings: &Settings) -> Result<Report, Aborted> {
        let mut report = Report::new(settings.check_only);
        self.reporter.report(RunEvent::Started);

        for tool in order_tools(tools, settings.auto_update_npm) {
            let result = match self.process(tool, settings).await {
                Ok(result) => result,
                Err(aborted) => {
                    info!(tool = %tool, checked = report.results.len(), "run aborted");
                    return Err(aborted);
                }
            };
            debug!(tool = %tool, status = %result.status, "tool processed");
            report.push(result);
        }

        self.progress.finish_and_clear();
        info!(
            checked = report.results.len(),
            updated = report.updated(),
            failed = report.update_failures(),
            "run finished"
        );
        self.reporter.report(RunEvent::Finished(&report));
        Ok(report)
    }

    async fn process(&mut self, tool: &ToolSpec, settings: &Settings) -> Result<CheckResult, Aborted> {
        self.reporter.report(RunEvent::ToolStarted(tool));

        self.progress.spinner(&format!("Checking {}...", tool.name));
        let mut result = ToolChecker::new(self.source).check(tool).await;
        self.progress.finish_and_clear();

        self.reporter.report(RunEvent::VersionsResolved {
            tool,
            current: &result.current,
            latest: result.latest.as_ref(),
        });

        match result.status {
            CheckStatus::CheckFailed => {
                let message = result.message.as_deref().unwrap_or("check failed");
                self.reporter.report(RunEvent::CheckFailed { tool, message });
                return Ok(result);
            }
            CheckStatus::Current => {
                self.reporter.report(RunEvent::UpToDate(tool));
                return Ok(result);
            }
            _ => {}
        }

        if let Some(reason) = skip_reason(tool, &result, settings) {
            self.reporter.report(RunEvent::UpdateSkipped { tool, reason });
            return Ok(result.with_message(reason));
        }

        if settings.confirm_before_update && !self.confirmer.confirm(&question(&result))? {
            debug!(tool = %tool, "update declined");
            self.reporter.report(RunEvent::UpdateSkipped {
                tool,
                reason: SKIP_DECLINED,
            });
            return Ok(result.with_message(SKIP_DECLINED));
        }

        let Some(package) = result.package.clone() else {
            return Ok(result);
        };

        self.reporter.report(RunEvent::UpdateStarted(tool));
        self.progress.spinner(&format!("Updating {}...", tool.name));
        let outcome = self.installer.install(tool, &package).await;

        match outcome {
            Ok(summary) => {
                self.progress.set_message(&format!("Verifying {}...", tool.name));
                let installed = ToolChecker::new(self.source).installed(tool).await;
                self.progress.finish_and_clear();

                info!(tool = %tool, installed = %installed, changed = summary.changed, "updated");
                self.reporter.report(RunEvent::UpdateSucceeded {
                    tool,
                    summary: &summary,
                    installed: &installed,
                });
                result.current = installed;
                result.status = CheckStatus::UpdatePerformed;
                result.changed_packages = Some(summary.changed);
            }
            Err(e) => {
                self.progress.finish_and_clear();

                warn!(tool = %tool, "update failed: {}", e);
                self.reporter.report(RunEvent::UpdateFailed { tool, error: &e });
                result.status = CheckStatus::UpdateFailed;
                result.message = Some(format!("{}: {}: {}", tool.name, e.kind(), e));
            }
        }
        Ok(result)
    }
}

/// Processing order for `tools`
///
/// With `npm_first` the package manager moves to the front; the relative
/// order of everything else is kept.
pub fn order_tools(tools: &[ToolSpec], npm_first: bool) -> Vec<&ToolSpec> {
    if !npm_first {
        return tools.iter().collect();
    }
    let (mut ordered, rest): (Vec<_>, Vec<_>) =
        tools.iter().partition(|tool| tool.is_package_manager());
    ordered.extend(rest);
    ordered
}

/// Why an outdated tool will not be updated, if it won't
fn skip_reason(tool: &ToolSpec, result: &CheckResult, settings: &Settings) -> Option<&'static str> {
    if settings.check_only {
        Some(SKIP_CHECK_ONLY)
    } else if tool.is_package_manager() && !settings.auto_update_npm {
        Some(SKIP_NPM_DISABLED)
    } else if result.is_missing() && !settings.install_missing {
        Some(SKIP_MISSING)
    } else {
        None
    }
}

fn question(result: &CheckResult) -> String {
    let latest = result
        .latest
        .as_ref()
        .map_or_else(|| "latest".to_string(), |v| v.to_string());
    if result.is_missing() {
        format!("Install {} {}?", result.tool, latest)
    } else {
        format!("Update {} from {} to {}?", result.tool, result.current, latest)
    }
}
