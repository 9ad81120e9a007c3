//! Per-tool check outcome types

use super::Version;
use serde::Serialize;
use std::fmt;

/// What the installed-version query found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "version", rename_all = "snake_case")]
pub enum InstalledVersion {
    /// The tool is installed at this version
    Installed(Version),
    /// The query succeeded but the tool is not installed
    NotInstalled,
    /// The query failed
    Unknown,
}

impl fmt::Display for InstalledVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstalledVersion::Installed(v) => write!(f, "{}", v),
            InstalledVersion::NotInstalled => write!(f, "Not installed"),
            InstalledVersion::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Classification of one tool after checking and any update attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckStatus {
    /// Installed version is at or above the registry version
    Current,
    /// Installed version is behind the registry, no update was attempted
    Outdated,
    /// An update ran and succeeded
    UpdatePerformed,
    /// An update ran and failed; the tool is still outdated
    UpdateFailed,
    /// Versions could not be determined
    CheckFailed,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CheckStatus::Current => "current",
            CheckStatus::Outdated => "outdated",
            CheckStatus::UpdatePerformed => "update-performed",
            CheckStatus::UpdateFailed => "update-failed",
            CheckStatus::CheckFailed => "check-failed",
        };
        write!(f, "{}", label)
    }
}

/// Result of checking (and possibly updating) one tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    /// Tool display name
    pub tool: String,
    /// Registry package the latest version was resolved from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Installed version
    pub current: InstalledVersion,
    /// Registry version
    pub latest: Option<Version>,
    /// Final classification
    pub status: CheckStatus,
    /// Diagnostic for failed checks, failed updates and skipped updates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Packages changed by a successful update, as reported by npm
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_packages: Option<u32>,
}

impl CheckResult {
    /// Creates a result with the given versions and status
    pub fn new(
        tool: impl Into<String>,
        current: InstalledVersion,
        latest: Option<Version>,
        status: CheckStatus,
    ) -> Self {
        Self {
            tool: tool.into(),
            package: None,
            current,
            latest,
            status,
            message: None,
            changed_packages: None,
        }
    }

    /// Creates a check-failed result carrying a diagnostic
    pub fn failed(
        tool: impl Into<String>,
        current: InstalledVersion,
        latest: Option<Version>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(tool, current, latest, CheckStatus::CheckFailed).with_message(message)
    }

    /// Sets the resolved registry package
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// Sets the diagnostic message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Returns true if an update was attempted for this tool
    pub fn update_attempted(&self) -> bool {
        matches!(
            self.status,
            CheckStatus::UpdatePerformed | CheckStatus::UpdateFailed
        )
    }

    /// Returns true if the tool is not installed
    pub fn is_missing(&self) -> bool {
        self.current == InstalledVersion::NotInstalled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_installed_version_display() {
        assert_eq!(InstalledVersion::Installed(v("0.1.22")).to_string(), "0.1.22");
        assert_eq!(InstalledVersion::NotInstalled.to_string(), "Not installed");
        assert_eq!(InstalledVersion::Unknown.to_string(), "Unknown");
    }

    #[test]
    fn test_update_attempted() {
        let base = CheckResult::new(
            "Gemini CLI",
            InstalledVersion::Installed(v("0.1.20")),
            Some(v("0.1.22")),
            CheckStatus::Outdated,
        );
        assert!(!base.update_attempted());

        let mut failed = base.clone();
        failed.status = CheckStatus::UpdateFailed;
        assert!(failed.update_attempted());
    }

    #[test]
    fn test_failed_constructor() {
        let result = CheckResult::failed("npm", InstalledVersion::Unknown, None, "exit code 1");
        assert_eq!(result.status, CheckStatus::CheckFailed);
        assert_eq!(result.message.as_deref(), Some("exit code 1"));
    }

    #[test]
    fn test_serialize() {
        let result = CheckResult::new(
            "OpenAI Codex CLI",
            InstalledVersion::Installed(v("0.23.0")),
            Some(v("0.23.0")),
            CheckStatus::Current,
        )
        .with_package("@openai/codex");

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "current");
        assert_eq!(json["package"], "@openai/codex");
        assert_eq!(json["current"]["state"], "installed");
        assert_eq!(json["current"]["version"], "0.23.0");
        assert_eq!(json["latest"], "0.23.0");
        assert!(json.get("message").is_none());
    }
}
