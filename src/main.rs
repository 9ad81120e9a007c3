//! npmup - checks npm, Gemini CLI and Codex CLI and updates them when needed

use clap::Parser;
use npmup::cli::CliArgs;
use npmup::config::Settings;
use npmup::error::{Aborted, AppError};
use npmup::npm::NpmClient;
use npmup::orchestrator::UpdateOrchestrator;
use npmup::output::{create_reporter, OutputConfig};
use npmup::prompt::{pause_at_end, TerminalConfirmer};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit code when npm cannot be started
const EXIT_NPM_UNAVAILABLE: u8 = 2;
/// Exit code after Ctrl-C at a prompt or while running
const EXIT_ABORTED: u8 = 130;

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("npmup=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("npmup=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    tracing::debug!("npmup starting with args: {:?}", args);

    let (settings, outcome) = match Settings::load(&args) {
        Ok(settings) => {
            let outcome = tokio::select! {
                result = run(&args, &settings) => result,
                _ = tokio::signal::ctrl_c() => Err(AppError::from(Aborted).into()),
            };
            (settings, outcome)
        }
        Err(e) => (Settings::fallback(&args), Err(AppError::from(e).into())),
    };

    let aborted = matches!(
        &outcome,
        Err(e) if matches!(e.downcast_ref::<AppError>(), Some(AppError::Aborted(_)))
    );
    let code = outcome.unwrap_or_else(|e| report_error(&e));

    if settings.pause_at_end && !aborted {
        if let Err(e) = pause_at_end() {
            return report_error(&AppError::from(e).into());
        }
    }
    code
}

/// Print an error where its kind belongs and pick the exit code
fn report_error(e: &anyhow::Error) -> ExitCode {
    match e.downcast_ref::<AppError>() {
        Some(AppError::NpmUnavailable) => {
            println!("{}", e);
            ExitCode::from(EXIT_NPM_UNAVAILABLE)
        }
        Some(AppError::Aborted(_)) => {
            println!("{}", e);
            ExitCode::from(EXIT_ABORTED)
        }
        Some(AppError::Config(_)) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
        None => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(args: &CliArgs, settings: &Settings) -> anyhow::Result<ExitCode> {
    let npm = NpmClient::system(settings.query_timeout, settings.install_timeout);

    match npm.npm_version().await {
        Ok(version) => tracing::debug!("using npm {}", version),
        Err(e) if e.is_not_found() => return Err(AppError::NpmUnavailable.into()),
        Err(e) => tracing::warn!("npm version check failed: {}", e),
    }

    let output_config = OutputConfig::from_cli(args.json, args.quiet, args.verbose);
    let mut reporter = create_reporter(output_config);
    let confirmer = TerminalConfirmer::new();

    let report = UpdateOrchestrator::new(&npm, &npm, &confirmer, &mut *reporter)
        .with_progress(output_config.show_progress())
        .run(&settings.tools(), settings)
        .await
        .map_err(AppError::from)?;

    tracing::debug!(
        failures = report.has_failures(),
        "finished checking {} tools",
        report.results.len()
    );
    Ok(ExitCode::SUCCESS)
}
