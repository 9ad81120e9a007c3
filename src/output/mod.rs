//! Output for updater runs
//!
//! This module provides:
//! - Run events emitted by the orchestrator as it works
//! - Text output reproducing the classic console layout
//! - JSON output for machine processing

mod json;
mod text;

pub use json::JsonReporter;
pub use text::TextReporter;

use crate::domain::{InstalledVersion, Report, ToolSpec, Version};
use crate::error::UpdateError;
use crate::npm::InstallSummary;
use std::io::{self, IsTerminal};

/// Something that happened during a run, in order
#[derive(Debug)]
pub enum RunEvent<'a> {
    /// The run began
    Started,
    /// Processing of a tool began
    ToolStarted(&'a ToolSpec),
    /// Installed and latest versions are known (or known to be unknown)
    VersionsResolved {
        tool: &'a ToolSpec,
        current: &'a InstalledVersion,
        latest: Option<&'a Version>,
    },
    /// The versions could not be determined
    CheckFailed { tool: &'a ToolSpec, message: &'a str },
    /// Nothing to do
    UpToDate(&'a ToolSpec),
    /// The tool is outdated but no update will run
    UpdateSkipped { tool: &'a ToolSpec, reason: &'a str },
    /// The install command is about to run
    UpdateStarted(&'a ToolSpec),
    /// The install command succeeded
    UpdateSucceeded {
        tool: &'a ToolSpec,
        summary: &'a InstallSummary,
        installed: &'a InstalledVersion,
    },
    /// The install command failed
    UpdateFailed {
        tool: &'a ToolSpec,
        error: &'a UpdateError,
    },
    /// Every tool has been processed
    Finished(&'a Report),
}

/// Trait for consumers of run events
pub trait Reporter {
    /// Handle one event
    fn report(&mut self, event: RunEvent<'_>);
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for machine processing
    Json,
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Failures and the final summary only
    Quiet,
    /// Normal output
    #[default]
    Normal,
    /// Normal output plus debug logging
    Verbose,
}

/// Configuration for output formatting
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    /// Output format (text, json)
    pub format: OutputFormat,
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Whether to use colors
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            verbosity: Verbosity::default(),
            color: true,
        }
    }
}

impl OutputConfig {
    /// Create configuration from CLI arguments
    pub fn from_cli(json: bool, quiet: bool, verbose: bool) -> Self {
        let format = if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        };

        let verbosity = if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };

        Self {
            format,
            verbosity,
            color: io::stdout().is_terminal(),
        }
    }

    /// Whether spinners should be drawn
    pub fn show_progress(&self) -> bool {
        self.format == OutputFormat::Text
            && self.verbosity == Verbosity::Normal
            && io::stderr().is_terminal()
    }
}

/// Create a stdout reporter based on configuration
pub fn create_reporter(config: OutputConfig) -> Box<dyn Reporter> {
    match config.format {
        OutputFormat::Text => Box::new(TextReporter::with_options(
            io::stdout(),
            config.color,
            config.verbosity == Verbosity::Quiet,
        )),
        OutputFormat::Json => Box::new(JsonReporter::new(io::stdout())),
    }
}
