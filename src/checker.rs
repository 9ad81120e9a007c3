//! Version checking for a single tool
//!
//! Combines the installed-version and registry queries of a
//! [`VersionSource`] into one classified [`CheckResult`]. Checking has no
//! side effects beyond the queries themselves.

use crate::domain::{CheckResult, CheckStatus, InstalledVersion, ToolSpec, Version};
use crate::error::QueryError;
use crate::npm::VersionSource;
use tracing::{debug, warn};

/// Checks tools against a version source
pub struct ToolChecker<'a> {
    source: &'a dyn VersionSource,
}

impl<'a> ToolChecker<'a> {
    /// Create a checker backed by the given source
    pub fn new(source: &'a dyn VersionSource) -> Self {
        Self { source }
    }

    /// Query both versions of `tool` and classify the result
    pub async fn check(&self, tool: &ToolSpec) -> CheckResult {
        let current = match self.source.installed_version(tool).await {
            Ok(Some(raw)) => match Version::parse(&raw) {
                Ok(version) => InstalledVersion::Installed(version),
                Err(e) => {
                    warn!(tool = %tool, "unparseable installed version: {}", e);
                    return CheckResult::failed(
                        &tool.name,
                        InstalledVersion::Unknown,
                        None,
                        format!("{}: unexpected output: {}", tool.name, e),
                    );
                }
            },
            Ok(None) => InstalledVersion::NotInstalled,
            Err(e) => {
                warn!(tool = %tool, "installed version query failed: {}", e);
                return CheckResult::failed(
                    &tool.name,
                    InstalledVersion::Unknown,
                    None,
                    query_message(tool, &e),
                );
            }
        };

        let latest = match self.source.latest_version(tool).await {
            Ok(latest) => latest,
            Err(e) => {
                warn!(tool = %tool, "registry query failed: {}", e);
                return CheckResult::failed(&tool.name, current, None, query_message(tool, &e));
            }
        };

        let latest_version = match Version::parse(&latest.version) {
            Ok(version) => version,
            Err(e) => {
                warn!(tool = %tool, package = %latest.package, "unparseable registry version: {}", e);
                return CheckResult::failed(
                    &tool.name,
                    current,
                    None,
                    format!("{}: unexpected output: {}", tool.name, e),
                )
                .with_package(latest.package);
            }
        };

        let status = classify(&current, &latest_version);
        debug!(
            tool = %tool,
            current = %current,
            latest = %latest_version,
            status = %status,
            "checked"
        );
        CheckResult::new(&tool.name, current, Some(latest_version), status).with_package(latest.package)
    }

    /// Installed version only; query failures map to [`InstalledVersion::Unknown`]
    pub async fn installed(&self, tool: &ToolSpec) -> InstalledVersion {
        match self.source.installed_version(tool).await {
            Ok(Some(raw)) => Version::parse(&raw)
                .map(InstalledVersion::Installed)
                .unwrap_or(InstalledVersion::Unknown),
            Ok(None) => InstalledVersion::NotInstalled,
            Err(e) => {
                warn!(tool = %tool, "re-reading installed version failed: {}", e);
                InstalledVersion::Unknown
            }
        }
    }
}

/// Classify an installed version against the registry version
///
/// A local version newer than the registry counts as current.
pub fn classify(current: &InstalledVersion, latest: &Version) -> CheckStatus {
    match current {
        InstalledVersion::Installed(version) if version < latest => CheckStatus::Outdated,
        InstalledVersion::Installed(_) => CheckStatus::Current,
        InstalledVersion::NotInstalled => CheckStatus::Outdated,
        InstalledVersion::Unknown => CheckStatus::CheckFailed,
    }
}

fn query_message(tool: &ToolSpec, error: &QueryError) -> String {
    format!("{}: {}: {}", tool.name, error.kind(), error)
}
