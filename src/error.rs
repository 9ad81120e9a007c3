//! Application error types using thiserror
//!
//! Error hierarchy:
//! - VersionError: Unparseable version strings
//! - QueryError: Version-query commands that failed or returned nothing
//! - UpdateError: Install commands that failed
//! - ConfigError: Invalid settings from file, environment or flags
//! - Aborted: Ctrl-C at an interactive prompt

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// npm itself cannot be started
    #[error("npm not found. Please install Node.js/npm or restart the shell.")]
    NpmUnavailable,

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The user pressed Ctrl-C
    #[error(transparent)]
    Aborted(#[from] Aborted),
}

/// Ctrl-C at a confirmation prompt or at the final pause
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Aborted by user.")]
pub struct Aborted;

/// Errors from parsing a version string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// The string is not a dotted numeric version
    #[error("invalid version '{input}': {message}")]
    Parse { input: String, message: String },
}

/// Errors from querying an installed or registry version
#[derive(Error, Debug)]
pub enum QueryError {
    /// The command could not be started
    #[error("failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command exited with a non-zero status
    #[error("'{command}' exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    /// The command did not finish in time
    #[error("'{command}' timed out after {}s", .timeout.as_secs())]
    Timeout { command: String, timeout: Duration },

    /// The command succeeded but printed nothing usable
    #[error("'{command}' returned no version")]
    Empty { command: String },

    /// The command output could not be interpreted
    #[error("unexpected output from '{command}': {message}")]
    InvalidOutput { command: String, message: String },

    /// No candidate package resolved in the registry
    #[error("could not resolve latest registry version for {tool}. Check package name.")]
    Unresolved { tool: String },
}

/// Errors from running an update command
#[derive(Error, Debug)]
pub enum UpdateError {
    /// The command could not be started
    #[error("failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command exited with a non-zero status
    #[error("'{command}' exited with {status}: {output}")]
    Failed {
        command: String,
        status: String,
        output: String,
    },

    /// The command did not finish in time
    #[error("'{command}' timed out after {}s", .timeout.as_secs())]
    Timeout { command: String, timeout: Duration },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Explicit config file does not exist
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for the settings schema
    #[error("failed to parse config file {path}: {message}")]
    TomlParseError { path: PathBuf, message: String },

    /// Environment variable is not a boolean
    #[error("invalid value '{value}' for {name}: expected true/false, yes/no, on/off or 1/0")]
    InvalidBool { name: String, value: String },

    /// Setting value out of range
    #[error("invalid setting {name}: {message}")]
    InvalidValue { name: String, message: String },
}

impl VersionError {
    /// Creates a new Parse error
    pub fn parse(input: impl Into<String>, message: impl Into<String>) -> Self {
        VersionError::Parse {
            input: input.into(),
            message: message.into(),
        }
    }
}

impl QueryError {
    /// Short name of the failure kind for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::Spawn { .. } => "command not found",
            QueryError::Failed { .. } => "query failed",
            QueryError::Timeout { .. } => "query timed out",
            QueryError::Empty { .. } => "no version returned",
            QueryError::InvalidOutput { .. } => "unexpected output",
            QueryError::Unresolved { .. } => "unknown package",
        }
    }

    /// Returns true if the executable itself could not be started
    pub fn is_not_found(&self) -> bool {
        matches!(self, QueryError::Spawn { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

impl UpdateError {
    /// Short name of the failure kind for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            UpdateError::Spawn { .. } => "command not found",
            UpdateError::Failed { .. } => "update failed",
            UpdateError::Timeout { .. } => "update timed out",
        }
    }
}

impl ConfigError {
    /// Creates a new TomlParseError
    pub fn toml_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ConfigError::TomlParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidBool error
    pub fn invalid_bool(name: impl Into<String>, value: impl Into<String>) -> Self {
        ConfigError::InvalidBool {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_error_parse() {
        let err = VersionError::parse("1.x", "invalid component 'x'");
        let msg = err.to_string();
        assert!(msg.contains("invalid version '1.x'"));
        assert!(msg.contains("invalid component"));
    }

    #[test]
    fn test_query_error_failed() {
        let err = QueryError::Failed {
            command: "npm view nope version --json".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "E404".to_string(),
        };
        assert!(err.to_string().contains("E404"));
        assert_eq!(err.kind(), "query failed");
    }

    #[test]
    fn test_query_error_timeout() {
        let err = QueryError::Timeout {
            command: "npm -v".to_string(),
            timeout: Duration::from_secs(60),
        };
        assert!(err.to_string().contains("timed out after 60s"));
        assert_eq!(err.kind(), "query timed out");
    }

    #[test]
    fn test_query_error_not_found() {
        let err = QueryError::Spawn {
            command: "npm -v".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.is_not_found());

        let err = QueryError::Empty {
            command: "npm -v".to_string(),
        };
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_query_error_unresolved() {
        let err = QueryError::Unresolved {
            tool: "Gemini CLI".to_string(),
        };
        assert!(err.to_string().contains("Check package name"));
    }

    #[test]
    fn test_update_error_failed() {
        let err = UpdateError::Failed {
            command: "npm install -g @openai/codex".to_string(),
            status: "exit status: 243".to_string(),
            output: "EACCES".to_string(),
        };
        assert!(err.to_string().contains("EACCES"));
        assert_eq!(err.kind(), "update failed");
    }

    #[test]
    fn test_config_error_invalid_bool() {
        let err = ConfigError::invalid_bool("PAUSE_AT_END", "maybe");
        let msg = err.to_string();
        assert!(msg.contains("PAUSE_AT_END"));
        assert!(msg.contains("maybe"));
    }

    #[test]
    fn test_app_error_from_config_error() {
        let app_err: AppError = ConfigError::NotFound {
            path: PathBuf::from("/missing.toml"),
        }
        .into();
        assert!(app_err.to_string().contains("config file not found"));
    }

    #[test]
    fn test_app_error_aborted() {
        let app_err: AppError = Aborted.into();
        assert_eq!(app_err.to_string(), "Aborted by user.");
    }

    #[test]
    fn test_app_error_npm_unavailable() {
        let msg = AppError::NpmUnavailable.to_string();
        assert!(msg.starts_with("npm not found"));
    }
}
