//! npm client
//!
//! Speaks the npm CLI:
//! - `npm -v` for the installed npm version
//! - `npm ls -g --depth=0 --json` for installed global packages
//! - `npm view <pkg> version --json` for the latest registry version
//! - `npm install -g <pkg>` to install or update

use super::command::{CommandOutput, CommandRunner, CommandSpec, RunError, SystemCommandRunner};
use super::{InstallSummary, Installer, LatestVersion, VersionSource};
use crate::domain::ToolSpec;
use crate::error::{QueryError, UpdateError};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, warn};

/// Matches "changed 3 packages" in install output
static CHANGED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bchanged\s+(\d+)\s+packages?\b").unwrap());

/// Matches "added 12 packages" in install output
static ADDED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\badded\s+(\d+)\s+packages?\b").unwrap());

/// Matches the trailing "in 4s" of the install summary line
static ELAPSED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bpackages?\b[^\n]*?\bin\s+([0-9]+(?:\.[0-9]+)?[a-z]+)").unwrap()
});

/// npm executable name for this platform
fn default_program() -> &'static str {
    if cfg!(windows) {
        "npm.cmd"
    } else {
        "npm"
    }
}

/// Builds the npm command lines used for each tool
#[derive(Debug, Clone)]
pub struct NpmCommands {
    program: String,
}

impl NpmCommands {
    /// Commands invoking the given npm executable
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Commands invoking the platform's default npm executable
    pub fn system() -> Self {
        Self::new(default_program())
    }

    /// `npm -v`
    pub fn version(&self) -> CommandSpec {
        CommandSpec::new(&self.program, ["-v"])
    }

    /// `npm ls -g --depth=0 --json`
    pub fn list_global(&self) -> CommandSpec {
        CommandSpec::new(&self.program, ["ls", "-g", "--depth=0", "--json"])
    }

    /// `npm view <package> version --json`
    pub fn view(&self, package: &str) -> CommandSpec {
        CommandSpec::new(&self.program, ["view", package, "version", "--json"])
    }

    /// `npm install -g <package>`, pinned to the `latest` tag for npm itself
    pub fn install(&self, tool: &ToolSpec, package: &str) -> CommandSpec {
        let target = if tool.is_package_manager() {
            format!("{}@latest", package)
        } else {
            package.to_string()
        };
        CommandSpec::new(&self.program, ["install".to_string(), "-g".to_string(), target])
    }
}

/// `npm ls -g --json` document
#[derive(Debug, Deserialize)]
struct GlobalList {
    #[serde(default)]
    dependencies: HashMap<String, GlobalEntry>,
}

#[derive(Debug, Deserialize)]
struct GlobalEntry {
    #[serde(default)]
    version: Option<String>,
}

/// Parse `npm ls -g --depth=0 --json` into `{package: version}`
pub fn parse_global_list(stdout: &str) -> Result<HashMap<String, String>, serde_json::Error> {
    let text = if stdout.trim().is_empty() { "{}" } else { stdout };
    let list: GlobalList = serde_json::from_str(text)?;
    Ok(list
        .dependencies
        .into_iter()
        .filter_map(|(name, entry)| entry.version.map(|v| (name, v)))
        .collect())
}

/// Extract the version from `npm view <pkg> version --json`
///
/// npm prints a JSON string for a single match and an array when a range
/// matched several versions; bare text is accepted as a fallback.
pub fn parse_view_output(stdout: &str) -> Option<String> {
    let text = stdout.trim();
    if text.is_empty() {
        return None;
    }

    let version = match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(serde_json::Value::Array(items)) => items
            .iter()
            .rev()
            .find_map(|v| v.as_str().map(str::to_string))?,
        Ok(serde_json::Value::Null) => return None,
        Ok(other) => other.to_string(),
        Err(_) => text.trim_matches('"').to_string(),
    };

    let version = version.trim().to_string();
    (!version.is_empty()).then_some(version)
}

/// Extract the change count and elapsed time from `npm install` output
pub fn parse_install_summary(stdout: &str) -> InstallSummary {
    let count = |re: &Regex| -> u32 {
        re.captures(stdout)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };

    InstallSummary {
        changed: count(&CHANGED_RE) + count(&ADDED_RE),
        elapsed: ELAPSED_RE
            .captures(stdout)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string()),
    }
}

/// npm-backed version source and installer
pub struct NpmClient<R = SystemCommandRunner> {
    runner: R,
    commands: NpmCommands,
    query_timeout: Duration,
    install_timeout: Duration,
}

impl NpmClient<SystemCommandRunner> {
    /// Client running the real npm with funding notices disabled
    pub fn system(query_timeout: Duration, install_timeout: Duration) -> Self {
        let runner = SystemCommandRunner::new()
            .with_env("NPM_CONFIG_FUND", "false")
            .with_env("npm_config_fund", "false");
        Self::new(runner, NpmCommands::system(), query_timeout, install_timeout)
    }
}

impl<R: CommandRunner> NpmClient<R> {
    /// Create a client over an arbitrary command runner
    pub fn new(
        runner: R,
        commands: NpmCommands,
        query_timeout: Duration,
        install_timeout: Duration,
    ) -> Self {
        Self {
            runner,
            commands,
            query_timeout,
            install_timeout,
        }
    }

    /// Command runner used by this client
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run `npm -v`; fails with a not-found spawn error when npm is absent
    pub async fn npm_version(&self) -> Result<String, QueryError> {
        let command = self.commands.version();
        let output = self.query(&command).await?;
        if !output.success() {
            return Err(QueryError::Failed {
                command: command.to_string(),
                status: output.status(),
                stderr: output.stderr,
            });
        }
        last_line(&output.stdout).ok_or(QueryError::Empty {
            command: command.to_string(),
        })
    }

    async fn query(&self, command: &CommandSpec) -> Result<CommandOutput, QueryError> {
        self.runner
            .run(command, self.query_timeout)
            .await
            .map_err(|e| match e {
                RunError::Spawn(source) => QueryError::Spawn {
                    command: command.to_string(),
                    source,
                },
                RunError::Timeout(timeout) => QueryError::Timeout {
                    command: command.to_string(),
                    timeout,
                },
            })
    }

    async fn global_versions(&self) -> Result<HashMap<String, String>, QueryError> {
        let command = self.commands.list_global();
        let output = self.query(&command).await?;

        // npm ls exits non-zero for peer problems yet still prints the tree
        if !output.success() && !output.stderr.is_empty() {
            return Err(QueryError::Failed {
                command: command.to_string(),
                status: output.status(),
                stderr: output.stderr,
            });
        }

        parse_global_list(&output.stdout).map_err(|e| QueryError::InvalidOutput {
            command: command.to_string(),
            message: e.to_string(),
        })
    }
}

/// Last non-empty line of command output
fn last_line(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .map(str::to_string)
}

#[async_trait]
impl<R: CommandRunner> VersionSource for NpmClient<R> {
    async fn installed_version(&self, tool: &ToolSpec) -> Result<Option<String>, QueryError> {
        if tool.is_package_manager() {
            return self.npm_version().await.map(Some);
        }

        let installed = self.global_versions().await?;
        let found = tool
            .candidates
            .iter()
            .find_map(|name| installed.get(name).cloned());
        debug!(tool = %tool, installed = ?found, "global package lookup");
        Ok(found)
    }

    async fn latest_version(&self, tool: &ToolSpec) -> Result<LatestVersion, QueryError> {
        for package in &tool.candidates {
            let command = self.commands.view(package);
            let output = self.query(&command).await?;

            if !output.success() {
                debug!(package = %package, status = %output.status(), stderr = %output.stderr, "registry lookup failed");
                continue;
            }

            match parse_view_output(&output.stdout) {
                Some(version) => return Ok(LatestVersion::new(package, version)),
                None => debug!(package = %package, "registry returned no version"),
            }
        }

        warn!(tool = %tool, "no candidate package resolved in the registry");
        Err(QueryError::Unresolved {
            tool: tool.name.clone(),
        })
    }
}

#[async_trait]
impl<R: CommandRunner> Installer for NpmClient<R> {
    async fn install(&self, tool: &ToolSpec, package: &str) -> Result<InstallSummary, UpdateError> {
        let command = self.commands.install(tool, package);
        let output = match self.runner.run(&command, self.install_timeout).await {
            Ok(output) => output,
            Err(RunError::Spawn(source)) => {
                return Err(UpdateError::Spawn {
                    command: command.to_string(),
                    source,
                })
            }
            Err(RunError::Timeout(timeout)) => {
                return Err(UpdateError::Timeout {
                    command: command.to_string(),
                    timeout,
                })
            }
        };

        if output.success() {
            return Ok(parse_install_summary(&output.stdout));
        }

        let detail = if output.stderr.is_empty() {
            output.stdout.clone()
        } else {
            output.stderr.clone()
        };
        Err(UpdateError::Failed {
            command: command.to_string(),
            status: output.status(),
            output: detail,
        })
    }
}
