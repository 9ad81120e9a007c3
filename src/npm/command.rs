//! External command execution
//!
//! Every external call goes through [`CommandRunner`] so the npm adapter can
//! be exercised against scripted output in tests. The system runner uses
//! tokio processes bounded by a timeout; a timed-out child is killed.

use async_trait::async_trait;
use std::fmt;
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// A program plus its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Executable name or path
    pub program: String,
    /// Arguments passed verbatim
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Create a new command specification
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, absent when terminated by a signal
    pub code: Option<i32>,
    /// Standard output, trimmed
    pub stdout: String,
    /// Standard error, trimmed
    pub stderr: String,
}

impl CommandOutput {
    /// Output of a command that exited with code 0
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Output of a command that exited with the given non-zero code
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Returns true if the command exited with code 0
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Human-readable exit status
    pub fn status(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {}", code),
            None => "signal".to_string(),
        }
    }
}

impl From<std::process::Output> for CommandOutput {
    fn from(output: std::process::Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

/// Reasons a command produced no output at all
#[derive(Error, Debug)]
pub enum RunError {
    /// The process could not be started
    #[error("{0}")]
    Spawn(#[source] std::io::Error),

    /// The process ran past its deadline and was killed
    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

/// Trait for running external commands
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion, or fail once `timeout` elapses
    async fn run(&self, command: &CommandSpec, timeout: Duration)
        -> Result<CommandOutput, RunError>;
}

/// Runner that executes real processes
#[derive(Debug, Default, Clone)]
pub struct SystemCommandRunner {
    /// Extra environment applied to every child
    envs: Vec<(String, String)>,
}

impl SystemCommandRunner {
    /// Create a runner that inherits the parent environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an environment variable for every spawned command
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(
        &self,
        command: &CommandSpec,
        timeout: Duration,
    ) -> Result<CommandOutput, RunError> {
        let started = Instant::now();
        debug!(command = %command, timeout_secs = timeout.as_secs(), "running command");

        let mut child = tokio::process::Command::new(&command.program);
        child
            .args(&command.args)
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(timeout, child.output()).await {
            Ok(result) => result.map_err(RunError::Spawn)?,
            Err(_) => {
                warn!(command = %command, timeout_secs = timeout.as_secs(), "command timed out");
                return Err(RunError::Timeout(timeout));
            }
        };

        let output = CommandOutput::from(output);
        debug!(
            command = %command,
            code = ?output.code,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "command finished"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_spec_display() {
        let spec = CommandSpec::new("npm", ["view", "npm", "version", "--json"]);
        assert_eq!(spec.to_string(), "npm view npm version --json");

        let bare = CommandSpec::new("npm", Vec::<String>::new());
        assert_eq!(bare.to_string(), "npm");
    }

    #[test]
    fn test_command_output_helpers() {
        let ok = CommandOutput::ok("11.5.2");
        assert!(ok.success());
        assert_eq!(ok.status(), "exit code 0");

        let failed = CommandOutput::failed(1, "E404");
        assert!(!failed.success());
        assert_eq!(failed.status(), "exit code 1");

        let signalled = CommandOutput {
            code: None,
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(!signalled.success());
        assert_eq!(signalled.status(), "signal");
    }

    #[test]
    fn test_run_error_display() {
        let err = RunError::Timeout(Duration::from_secs(5));
        assert_eq!(err.to_string(), "timed out after 5s");
    }

    #[tokio::test]
    async fn test_system_runner_missing_program() {
        let runner = SystemCommandRunner::new();
        let spec = CommandSpec::new("npmup-definitely-not-a-real-program", ["-v"]);
        let err = runner
            .run(&spec, Duration::from_secs(5))
            .await
            .unwrap_err();
        match err {
            RunError::Spawn(source) => {
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound)
            }
            other => panic!("expected spawn error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_captures_output() {
        let runner = SystemCommandRunner::new().with_env("NPMUP_TEST_VALUE", "0.1.22");
        let spec = CommandSpec::new("sh", ["-c", "echo \"$NPMUP_TEST_VALUE\"; echo oops >&2"]);
        let output = runner.run(&spec, Duration::from_secs(10)).await.unwrap();
        assert!(output.success());
        assert_eq!(output.stdout, "0.1.22");
        assert_eq!(output.stderr, "oops");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_nonzero_exit() {
        let runner = SystemCommandRunner::new();
        let spec = CommandSpec::new("sh", ["-c", "exit 3"]);
        let output = runner.run(&spec, Duration::from_secs(10)).await.unwrap();
        assert_eq!(output.code, Some(3));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_timeout() {
        let runner = SystemCommandRunner::new();
        let spec = CommandSpec::new("sleep", ["5"]);
        let err = runner
            .run(&spec, Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::Timeout(_)));
    }
}
