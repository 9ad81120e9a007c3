//! Managed tool descriptors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Registry name of the package manager itself
pub const NPM_PACKAGE: &str = "npm";

/// How a tool is installed and queried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// The package manager (npm), queried with `npm -v`
    PackageManager,
    /// A globally installed npm package
    GlobalPackage,
}

/// Static descriptor of one managed tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Display name used in console output
    pub name: String,
    /// Package manager or global package
    pub kind: ToolKind,
    /// Registry package names, most preferred first
    pub candidates: Vec<String>,
}

impl ToolSpec {
    /// Descriptor for npm itself
    pub fn package_manager() -> Self {
        Self {
            name: NPM_PACKAGE.to_string(),
            kind: ToolKind::PackageManager,
            candidates: vec![NPM_PACKAGE.to_string()],
        }
    }

    /// Descriptor for a global npm package with candidate registry names
    pub fn global_package<I, S>(name: impl Into<String>, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kind: ToolKind::GlobalPackage,
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true for the package manager
    pub fn is_package_manager(&self) -> bool {
        self.kind == ToolKind::PackageManager
    }

    /// Section heading printed before the tool's status lines
    pub fn heading(&self) -> String {
        match self.kind {
            ToolKind::PackageManager => format!("{} itself", self.name),
            ToolKind::GlobalPackage => self.name.clone(),
        }
    }
}

impl fmt::Display for ToolSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The global packages managed when no configuration overrides them
pub fn default_packages() -> Vec<ToolSpec> {
    vec![
        ToolSpec::global_package("Gemini CLI", ["@google/gemini-cli", "gemini-cli"]),
        ToolSpec::global_package("OpenAI Codex CLI", ["@openai/codex", "openai"]),
    ]
}

/// The full default tool list: npm first, then the global packages
pub fn default_tools() -> Vec<ToolSpec> {
    let mut tools = vec![ToolSpec::package_manager()];
    tools.extend(default_packages());
    tools
}
