//! Integration tests for npmup
//!
//! These tests verify:
//! - Full runs of the orchestrator over the real npm client
//! - npm output handling through a simulated npm command runner
//! - Settings resolution feeding the run

use async_trait::async_trait;
use npmup::config::Settings;
use npmup::domain::{CheckStatus, InstalledVersion, Version};
use npmup::error::Aborted;
use npmup::npm::{CommandOutput, CommandRunner, CommandSpec, NpmClient, NpmCommands, RunError};
use npmup::orchestrator::UpdateOrchestrator;
use npmup::output::TextReporter;
use npmup::prompt::Confirmer;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Simulated npm executable: global installs plus a registry
struct SimulatedNpm {
    npm_version: Mutex<String>,
    globals: Mutex<HashMap<String, String>>,
    registry: HashMap<String, String>,
    hang_on: Option<String>,
    commands: Mutex<Vec<String>>,
}

impl SimulatedNpm {
    fn new(npm_version: &str) -> Self {
        Self {
            npm_version: Mutex::new(npm_version.to_string()),
            globals: Mutex::new(HashMap::new()),
            registry: HashMap::from([("npm".to_string(), "11.5.2".to_string())]),
            hang_on: None,
            commands: Mutex::new(Vec::new()),
        }
    }

    fn global(self, package: &str, version: &str) -> Self {
        self.globals
            .lock()
            .unwrap()
            .insert(package.to_string(), version.to_string());
        self
    }

    fn published(mut self, package: &str, version: &str) -> Self {
        self.registry
            .insert(package.to_string(), version.to_string());
        self
    }

    fn ls_json(&self) -> String {
        let dependencies: serde_json::Map<String, serde_json::Value> = self
            .globals
            .lock()
            .unwrap()
            .iter()
            .map(|(name, version)| (name.clone(), serde_json::json!({ "version": version })))
            .collect();
        serde_json::json!({ "dependencies": dependencies }).to_string()
    }
}

#[async_trait]
impl CommandRunner for SimulatedNpm {
    async fn run(&self, command: &CommandSpec, timeout: Duration) -> Result<CommandOutput, RunError> {
        let line = command.to_string();
        self.commands.lock().unwrap().push(line.clone());
        if self.hang_on.as_deref() == Some(line.as_str()) {
            return Err(RunError::Timeout(timeout));
        }

        let args: Vec<&str> = command.args.iter().map(String::as_str).collect();
        let output = match args.as_slice() {
            ["-v"] => CommandOutput::ok(self.npm_version.lock().unwrap().clone()),
            ["ls", "-g", "--depth=0", "--json"] => CommandOutput::ok(self.ls_json()),
            ["view", package, "version", "--json"] => match self.registry.get(*package) {
                Some(version) => CommandOutput::ok(format!("\"{}\"", version)),
                None => CommandOutput::failed(1, "npm error code E404"),
            },
            ["install", "-g", "npm@latest"] => {
                *self.npm_version.lock().unwrap() = self.registry["npm"].clone();
                CommandOutput::ok("changed 1 package in 3s")
            }
            ["install", "-g", package] => {
                let version = self.registry[*package].clone();
                self.globals
                    .lock()
                    .unwrap()
                    .insert(package.to_string(), version);
                CommandOutput::ok("added 2 packages, changed 1 package in 5s")
            }
            _ => CommandOutput::failed(1, "unknown command"),
        };
        Ok(output)
    }
}

struct Always(bool);

impl Confirmer for Always {
    fn confirm(&self, _question: &str) -> Result<bool, Aborted> {
        Ok(self.0)
    }
}

fn client(npm: SimulatedNpm) -> NpmClient<SimulatedNpm> {
    NpmClient::new(
        npm,
        NpmCommands::new("npm"),
        Duration::from_secs(60),
        Duration::from_secs(600),
    )
}

fn settings() -> Settings {
    Settings {
        pause_at_end: false,
        ..Settings::default()
    }
}

async fn run(
    npm: &NpmClient<SimulatedNpm>,
    settings: &Settings,
    answer: bool,
) -> (npmup::domain::Report, String) {
    let confirmer = Always(answer);
    let mut reporter = TextReporter::with_color(Vec::new(), false);
    let report = UpdateOrchestrator::new(npm, npm, &confirmer, &mut reporter)
        .run(&settings.tools(), settings)
        .await
        .unwrap();
    (report, String::from_utf8(reporter.into_inner()).unwrap())
}

fn v(s: &str) -> Version {
    Version::parse(s).unwrap()
}

mod full_run {
    use super::*;

    #[tokio::test]
    async fn test_everything_current() {
        let npm = client(
            SimulatedNpm::new("11.5.2")
                .global("@google/gemini-cli", "0.1.22")
                .global("@openai/codex", "0.23.0")
                .published("@google/gemini-cli", "0.1.22")
                .published("@openai/codex", "0.23.0"),
        );

        let (report, output) = run(&npm, &settings(), true).await;

        assert_eq!(report.count(CheckStatus::Current), 3);
        assert!(output.contains("npm is current.\n"));
        assert_eq!(output.matches("Already up to date.\n").count(), 2);
        assert!(output.ends_with("\nDone\nAll packages were checked.\n"));
    }

    #[tokio::test]
    async fn test_gemini_update_is_reread() {
        let npm = client(
            SimulatedNpm::new("11.5.2")
                .global("@google/gemini-cli", "0.1.20")
                .global("@openai/codex", "0.23.0")
                .published("@google/gemini-cli", "0.1.22")
                .published("@openai/codex", "0.23.0"),
        );

        let (report, output) = run(&npm, &settings(), true).await;

        let gemini = report.get("Gemini CLI").unwrap();
        assert_eq!(gemini.status, CheckStatus::UpdatePerformed);
        assert_eq!(gemini.current, InstalledVersion::Installed(v("0.1.22")));
        assert_eq!(gemini.changed_packages, Some(3));
        assert!(output.contains("Changed packages: 3 (in 5s)\nNow installed: Gemini CLI 0.1.22\n"));
    }

    #[tokio::test]
    async fn test_npm_updated_before_packages() {
        let npm = client(
            SimulatedNpm::new("11.4.0")
                .global("@google/gemini-cli", "0.1.20")
                .global("@openai/codex", "0.23.0")
                .published("@google/gemini-cli", "0.1.22")
                .published("@openai/codex", "0.23.0"),
        );

        let (report, _) = run(&npm, &settings(), true).await;

        assert_eq!(report.results[0].current, InstalledVersion::Installed(v("11.5.2")));
        let commands = npm_commands(&npm);
        let npm_install = position(&commands, "npm install -g npm@latest");
        let first_ls = position(&commands, "npm ls -g --depth=0 --json");
        assert!(npm_install < first_ls, "{commands:?}");
    }

    #[tokio::test]
    async fn test_missing_tool_is_installed_from_fallback_candidate() {
        let npm = client(
            SimulatedNpm::new("11.5.2")
                .global("@google/gemini-cli", "0.1.22")
                .published("@google/gemini-cli", "0.1.22")
                .published("openai", "5.0.0"),
        );

        let (report, output) = run(&npm, &settings(), true).await;

        let codex = report.get("OpenAI Codex CLI").unwrap();
        assert_eq!(codex.package.as_deref(), Some("openai"));
        assert_eq!(codex.status, CheckStatus::UpdatePerformed);
        assert!(output.contains("Current OpenAI Codex CLI version: Not installed\n"));
        assert!(npm_commands(&npm).contains(&"npm install -g openai".to_string()));
    }

    #[tokio::test]
    async fn test_registry_timeout_does_not_block_later_tools() {
        let mut sim = SimulatedNpm::new("11.5.2")
            .global("@google/gemini-cli", "0.1.20")
            .global("@openai/codex", "0.22.0")
            .published("@google/gemini-cli", "0.1.22")
            .published("@openai/codex", "0.23.0");
        sim.hang_on = Some("npm view @google/gemini-cli version --json".to_string());
        let npm = client(sim);

        let (report, output) = run(&npm, &settings(), true).await;

        assert_eq!(report.results[1].status, CheckStatus::CheckFailed);
        assert_eq!(report.results[2].status, CheckStatus::UpdatePerformed);
        assert!(output.contains("Warning: Gemini CLI: query timed out:"));
    }

    #[tokio::test]
    async fn test_declined_confirmation() {
        let npm = client(
            SimulatedNpm::new("11.5.2")
                .global("@google/gemini-cli", "0.1.20")
                .global("@openai/codex", "0.23.0")
                .published("@google/gemini-cli", "0.1.22")
                .published("@openai/codex", "0.23.0"),
        );
        let settings = Settings {
            confirm_before_update: true,
            ..settings()
        };

        let (report, output) = run(&npm, &settings, false).await;

        assert_eq!(report.get("Gemini CLI").unwrap().status, CheckStatus::Outdated);
        assert!(output.contains("Update skipped.\n"));
        assert!(!npm_commands(&npm).iter().any(|c| c.contains("install")));
    }

    fn npm_commands(npm: &NpmClient<SimulatedNpm>) -> Vec<String> {
        npm.runner().commands.lock().unwrap().clone()
    }

    fn position(commands: &[String], command: &str) -> usize {
        commands
            .iter()
            .position(|c| c == command)
            .unwrap_or_else(|| panic!("{command} not run: {commands:?}"))
    }
}

mod settings_resolution {
    use super::*;
    use clap::Parser;
    use npmup::cli::CliArgs;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_file_packages_drive_the_tool_list() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("npmup.toml"),
            "[[packages]]\nname = \"Claude Code\"\ncandidates = [\"@anthropic-ai/claude-code\"]\n",
        )
        .unwrap();

        let args = CliArgs::parse_from(["npmup"]);
        let settings = Settings::resolve(&args, dir.path(), |_| None).unwrap();
        let names: Vec<_> = settings.tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["npm", "Claude Code"]);
    }

    #[test]
    fn test_layers_in_order() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("npmup.toml"),
            "confirm_before_update = true\nauto_update_npm = false\n",
        )
        .unwrap();

        let args = CliArgs::parse_from(["npmup", "--yes"]);
        let settings = Settings::resolve(&args, dir.path(), |name| {
            (name == "AUTO_UPDATE_NPM").then(|| "on".to_string())
        })
        .unwrap();
        assert!(settings.auto_update_npm);
        assert!(!settings.confirm_before_update);
    }
}
