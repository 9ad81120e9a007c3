//! Text output for human-readable display
//!
//! This module provides:
//! - The banner and per-tool section headings
//! - Current/latest version lines and the outcome of each tool
//! - Install progress lines with the changed package count
//! - The final block that always ends with "All packages were checked."

use crate::domain::{InstalledVersion, Report, ToolSpec};
use crate::output::{Reporter, RunEvent};
use colored::Colorize;
use std::io::{self, Write};
use tracing::warn;

/// Text reporter writing status lines as events arrive
pub struct TextReporter<W: Write> {
    writer: W,
    /// Whether to use colors
    color: bool,
    /// Only failures and the final block
    quiet: bool,
    /// Heading not yet printed in quiet mode
    pending_heading: Option<String>,
}

impl<W: Write> TextReporter<W> {
    /// Create a new text reporter with color option
    pub fn with_color(writer: W, color: bool) -> Self {
        Self::with_options(writer, color, false)
    }

    /// Create a new text reporter with color and quiet options
    pub fn with_options(writer: W, color: bool, quiet: bool) -> Self {
        Self {
            writer,
            color,
            quiet,
            pending_heading: None,
        }
    }

    /// Consume the reporter and return the writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_event(&mut self, event: RunEvent<'_>) -> io::Result<()> {
        match event {
            RunEvent::Started => {
                if !self.quiet {
                    let title = if self.color {
                        "npm CLI Updater".bold().to_string()
                    } else {
                        "npm CLI Updater".to_string()
                    };
                    writeln!(self.writer, "{}", title)?;
                    writeln!(
                        self.writer,
                        "This tool checks global npm installations and updates when needed."
                    )?;
                }
            }
            RunEvent::ToolStarted(tool) => {
                let heading = self.heading(tool);
                if self.quiet {
                    self.pending_heading = Some(heading);
                } else {
                    writeln!(self.writer)?;
                    writeln!(self.writer, "{}", heading)?;
                }
            }
            RunEvent::VersionsResolved {
                tool,
                current,
                latest,
            } => {
                if !self.quiet {
                    writeln!(self.writer, "Current {} version: {}", tool.name, current)?;
                    let latest = latest.map_or_else(|| "Unknown".to_string(), |v| v.to_string());
                    writeln!(self.writer, "Latest {} version: {}", tool.name, latest)?;
                }
            }
            RunEvent::CheckFailed { message, .. } => {
                self.flush_heading()?;
                let line = format!("Warning: {}", message);
                self.line_colored(&line, Tone::Warning)?;
            }
            RunEvent::UpToDate(tool) => {
                if !self.quiet {
                    let line = if tool.is_package_manager() {
                        format!("{} is current.", tool.name)
                    } else {
                        "Already up to date.".to_string()
                    };
                    self.line_colored(&line, Tone::Success)?;
                }
            }
            RunEvent::UpdateSkipped { reason, .. } => {
                if !self.quiet {
                    self.line_colored(reason, Tone::Notice)?;
                }
            }
            RunEvent::UpdateStarted(_) => {
                if !self.quiet {
                    writeln!(self.writer, "Installing/updating …")?;
                }
            }
            RunEvent::UpdateSucceeded {
                tool,
                summary,
                installed,
            } => {
                if !self.quiet {
                    self.line_colored("Done.", Tone::Success)?;
                    match &summary.elapsed {
                        Some(elapsed) => writeln!(
                            self.writer,
                            "Changed packages: {} (in {})",
                            summary.changed, elapsed
                        )?,
                        None => writeln!(self.writer, "Changed packages: {}", summary.changed)?,
                    }
                    writeln!(self.writer, "{}", installed_line(tool, installed))?;
                }
            }
            RunEvent::UpdateFailed { error, .. } => {
                self.flush_heading()?;
                self.line_colored("Update failed:", Tone::Failure)?;
                writeln!(self.writer, "{}", error)?;
            }
            RunEvent::Finished(report) => {
                self.write_final_block(report)?;
            }
        }
        Ok(())
    }

    fn write_final_block(&mut self, report: &Report) -> io::Result<()> {
        writeln!(self.writer)?;
        writeln!(self.writer, "Done")?;
        if let Some(summary) = report.action_summary() {
            let summary = if self.color && report.update_failures() > 0 {
                summary.yellow().to_string()
            } else {
                summary
            };
            writeln!(self.writer, "{}", summary)?;
        }
        writeln!(self.writer, "All packages were checked.")?;
        self.writer.flush()
    }

    fn heading(&self, tool: &ToolSpec) -> String {
        let heading = format!("— {} —", tool.heading());
        if self.color {
            heading.bold().to_string()
        } else {
            heading
        }
    }

    /// Print the heading held back in quiet mode before its first failure
    fn flush_heading(&mut self) -> io::Result<()> {
        if let Some(heading) = self.pending_heading.take() {
            writeln!(self.writer)?;
            writeln!(self.writer, "{}", heading)?;
        }
        Ok(())
    }

    fn line_colored(&mut self, line: &str, tone: Tone) -> io::Result<()> {
        if !self.color {
            return writeln!(self.writer, "{}", line);
        }
        let painted = match tone {
            Tone::Success => line.green(),
            Tone::Notice => line.cyan(),
            Tone::Warning => line.yellow(),
            Tone::Failure => line.red().bold(),
        };
        writeln!(self.writer, "{}", painted)
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn report(&mut self, event: RunEvent<'_>) {
        if let Err(e) = self.write_event(event) {
            warn!("failed to write output: {}", e);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Tone {
    Success,
    Notice,
    Warning,
    Failure,
}

fn installed_line(tool: &ToolSpec, installed: &InstalledVersion) -> String {
    if tool.is_package_manager() {
        format!("{} updated to {}", tool.name, installed)
    } else {
        format!("Now installed: {} {}", tool.name, installed)
    }
}
