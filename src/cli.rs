//! CLI argument parsing module for npmup

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Parse a timeout in seconds: plain number, `Ns`, or `Nm`
fn parse_timeout(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty timeout".to_string());
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else {
        (s, 1)
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| format!("invalid number in timeout: {}", num_str))?;
    if num == 0 {
        return Err("timeout must be greater than zero".to_string());
    }

    let secs = num
        .checked_mul(multiplier)
        .ok_or_else(|| format!("timeout is too large: {}", s))?;
    Ok(Duration::from_secs(secs))
}

/// Checks and updates npm and globally installed AI assistant CLIs
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "npmup",
    version,
    about = "Check and update npm, Gemini CLI and Codex CLI"
)]
pub struct CliArgs {
    /// Settings file (default: ./npmup.toml when present)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Update without asking for confirmation
    #[arg(short = 'y', long, conflicts_with = "confirm")]
    pub yes: bool,

    /// Ask before every update
    #[arg(long)]
    pub confirm: bool,

    /// Do not update npm itself; report its status only
    #[arg(long)]
    pub no_npm_first: bool,

    /// Exit immediately instead of waiting for Enter
    #[arg(long)]
    pub no_pause: bool,

    /// Report versions without updating anything
    #[arg(long)]
    pub check: bool,

    /// Do not install tools that are missing
    #[arg(long)]
    pub no_install_missing: bool,

    /// Print the final report as JSON
    #[arg(long)]
    pub json: bool,

    /// Only print failures and the final summary
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Timeout for each version query (e.g. 30, 45s, 2m)
    #[arg(long, value_name = "SECS", value_parser = parse_timeout)]
    pub timeout: Option<Duration>,
}
