//! Settings loading
//!
//! Settings are resolved once at startup from four layers, later layers
//! winning: built-in defaults, an optional TOML file, environment variables
//! and command-line flags.

use crate::cli::CliArgs;
use crate::domain::{default_packages, ToolSpec};
use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Settings file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "npmup.toml";

/// Environment variable for [`Settings::auto_update_npm`]
pub const ENV_AUTO_UPDATE_NPM: &str = "AUTO_UPDATE_NPM";
/// Environment variable for [`Settings::confirm_before_update`]
pub const ENV_CONFIRM_BEFORE_UPDATE: &str = "CONFIRM_BEFORE_UPDATE";
/// Environment variable for [`Settings::pause_at_end`]
pub const ENV_PAUSE_AT_END: &str = "PAUSE_AT_END";

const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_INSTALL_TIMEOUT: Duration = Duration::from_secs(600);

/// Process-wide settings, immutable after loading
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Check npm first and update it before other tools
    pub auto_update_npm: bool,
    /// Ask before each update
    pub confirm_before_update: bool,
    /// Wait for Enter before exiting
    pub pause_at_end: bool,
    /// Install tools that are not installed yet
    pub install_missing: bool,
    /// Report only, never run install commands
    pub check_only: bool,
    /// Timeout for each version query
    pub query_timeout: Duration,
    /// Timeout for each install command
    pub install_timeout: Duration,
    /// Global packages to manage besides npm
    pub packages: Vec<ToolSpec>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_update_npm: true,
            confirm_before_update: false,
            pause_at_end: true,
            install_missing: true,
            check_only: false,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            install_timeout: DEFAULT_INSTALL_TIMEOUT,
            packages: default_packages(),
        }
    }
}

/// On-disk settings; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    auto_update_npm: Option<bool>,
    confirm_before_update: Option<bool>,
    pause_at_end: Option<bool>,
    install_missing: Option<bool>,
    query_timeout_secs: Option<u64>,
    install_timeout_secs: Option<u64>,
    packages: Option<Vec<PackageEntry>>,
}

/// `[[packages]]` table
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PackageEntry {
    name: String,
    candidates: Vec<String>,
}

impl Settings {
    /// Load settings for this process: working directory and real environment
    pub fn load(args: &CliArgs) -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::resolve(args, &cwd, |name| std::env::var(name).ok())
    }

    /// Resolve settings against an explicit directory and environment lookup
    pub fn resolve<F>(args: &CliArgs, dir: &Path, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(path) = config_path(args, dir)? {
            debug!(path = %path.display(), "loading settings file");
            settings.apply_file(read_file(&path)?, &path)?;
        }

        settings.apply_env(env)?;
        settings.apply_args(args);
        Ok(settings)
    }

    /// Defaults with only the flags applied, for when loading failed
    pub fn fallback(args: &CliArgs) -> Self {
        let mut settings = Settings::default();
        settings.apply_args(args);
        settings
    }

    /// All tools in processing order: npm, then the configured packages
    pub fn tools(&self) -> Vec<ToolSpec> {
        let mut tools = vec![ToolSpec::package_manager()];
        tools.extend(self.packages.iter().cloned());
        tools
    }

    fn apply_file(&mut self, file: FileSettings, path: &Path) -> Result<(), ConfigError> {
        if let Some(v) = file.auto_update_npm {
            self.auto_update_npm = v;
        }
        if let Some(v) = file.confirm_before_update {
            self.confirm_before_update = v;
        }
        if let Some(v) = file.pause_at_end {
            self.pause_at_end = v;
        }
        if let Some(v) = file.install_missing {
            self.install_missing = v;
        }
        if let Some(secs) = file.query_timeout_secs {
            self.query_timeout = positive_secs("query_timeout_secs", secs)?;
        }
        if let Some(secs) = file.install_timeout_secs {
            self.install_timeout = positive_secs("install_timeout_secs", secs)?;
        }
        if let Some(entries) = file.packages {
            self.packages = entries
                .into_iter()
                .map(|entry| {
                    if entry.candidates.iter().all(|c| c.trim().is_empty()) {
                        return Err(ConfigError::InvalidValue {
                            name: format!("packages.{}", entry.name),
                            message: format!(
                                "at least one candidate package is required in {}",
                                path.display()
                            ),
                        });
                    }
                    Ok(ToolSpec::global_package(entry.name, entry.candidates))
                })
                .collect::<Result<_, _>>()?;
        }
        Ok(())
    }

    fn apply_env<F>(&mut self, env: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| -> Result<Option<bool>, ConfigError> {
            env(name).map(|value| parse_bool(name, &value)).transpose()
        };

        if let Some(v) = lookup(ENV_AUTO_UPDATE_NPM)? {
            self.auto_update_npm = v;
        }
        if let Some(v) = lookup(ENV_CONFIRM_BEFORE_UPDATE)? {
            self.confirm_before_update = v;
        }
        if let Some(v) = lookup(ENV_PAUSE_AT_END)? {
            self.pause_at_end = v;
        }
        Ok(())
    }

    fn apply_args(&mut self, args: &CliArgs) {
        if args.no_npm_first {
            self.auto_update_npm = false;
        }
        if args.yes {
            self.confirm_before_update = false;
        }
        if args.confirm {
            self.confirm_before_update = true;
        }
        if args.no_pause || args.json {
            self.pause_at_end = false;
        }
        if args.check {
            self.check_only = true;
        }
        if args.no_install_missing {
            self.install_missing = false;
        }
        if let Some(timeout) = args.timeout {
            self.query_timeout = timeout;
        }
    }
}

/// Which settings file applies, if any
fn config_path(args: &CliArgs, dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    match &args.config {
        Some(path) => {
            let path = if path.is_absolute() {
                path.clone()
            } else {
                dir.join(path)
            };
            if path.is_file() {
                Ok(Some(path))
            } else {
                Err(ConfigError::NotFound { path })
            }
        }
        None => {
            let path = dir.join(DEFAULT_CONFIG_FILE);
            Ok(path.is_file().then_some(path))
        }
    }
}

fn read_file(path: &Path) -> Result<FileSettings, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::toml_parse_error(path, e.to_string()))
}

fn positive_secs(name: &str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

/// Parse a boolean setting value
pub fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid_bool(name, value)),
    }
}
