//! npm adapters for version queries and installs
//!
//! This module provides:
//! - Capability traits used by the checker and orchestrator
//! - Command execution with per-call timeouts
//! - The npm client that implements both capabilities

mod client;
mod command;

pub use client::{parse_global_list, parse_install_summary, parse_view_output, NpmClient, NpmCommands};
pub use command::{CommandOutput, CommandRunner, CommandSpec, RunError, SystemCommandRunner};

use crate::domain::ToolSpec;
use crate::error::{QueryError, UpdateError};
use async_trait::async_trait;

/// Latest registry version and the package name it was resolved from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestVersion {
    /// Registry package name that resolved
    pub package: String,
    /// Version string as reported by the registry
    pub version: String,
}

impl LatestVersion {
    /// Create a new LatestVersion
    pub fn new(package: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            version: version.into(),
        }
    }
}

/// What an install command reported
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallSummary {
    /// Number of packages added or changed
    pub changed: u32,
    /// Elapsed time as printed by npm (e.g. "3s")
    pub elapsed: Option<String>,
}

/// Trait for querying installed and registry versions
#[async_trait]
pub trait VersionSource: Send + Sync {
    /// Installed version string, or `None` if the tool is not installed
    async fn installed_version(&self, tool: &ToolSpec) -> Result<Option<String>, QueryError>;

    /// Latest registry version, trying the tool's candidates in order
    async fn latest_version(&self, tool: &ToolSpec) -> Result<LatestVersion, QueryError>;
}

/// Trait for installing or updating a tool
#[async_trait]
pub trait Installer: Send + Sync {
    /// Install the latest release of `package` for `tool`
    async fn install(&self, tool: &ToolSpec, package: &str) -> Result<InstallSummary, UpdateError>;
}
