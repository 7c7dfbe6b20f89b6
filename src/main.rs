//! `deskpod` application entry point.
//!
//! Launches the desktop container described by configuration, keeps it
//! running until it exits or the operator presses Ctrl-C, then stops and
//! removes it. Domain errors are converted to `eyre::Report` here and any
//! error exits with status 1.
//!
//! Configuration is loaded with layered precedence:
//! 1. Application defaults
//! 2. Configuration file (`--config`, `DESKPOD_CONFIG_PATH`, `.deskpod.toml` or
//!    `~/.config/deskpod/config.toml`)
//! 3. Environment variables (`ANTHROPIC_API_KEY`, `DOCKER_IMAGE`, ...)
//! 4. Command-line arguments

use clap::Parser;
use deskpod::api::{self, RunOutcome};
use deskpod::config::{AppConfig, Cli, RunConfig, load_config};
use deskpod::engine::{
    ConnectionDiagnostics, EngineConnector, LaunchReport, SystemHostProbe, forward_ctrl_c,
    interrupt_channel,
};
use deskpod::error::Result as DeskpodResult;
use eyre::{Report, Result as EyreResult};
use mockable::DefaultEnv;
use tracing_subscriber::EnvFilter;

/// Application entry point.
fn main() -> EyreResult<()> {
    init_tracing();
    let cli = Cli::parse();
    let env = DefaultEnv::new();

    let config = load_config(&cli, &env).map_err(Report::from)?;
    let run_config = RunConfig::from_app_config(&config, &env).map_err(Report::from)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let outcome = runtime
        .block_on(session(&config, &run_config, &env))
        .map_err(Report::from)?;

    report_outcome(outcome);
    Ok(())
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the `info` default.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Connect to the engine and run one container session.
///
/// Keeps semantic errors inside the session so the CLI boundary owns the
/// conversion to `eyre::Report`.
async fn session(
    config: &AppConfig,
    run_config: &RunConfig,
    env: &DefaultEnv,
) -> DeskpodResult<RunOutcome> {
    let probe = SystemHostProbe::new(env).with_config_socket(config.engine_socket.clone());
    let docker = match EngineConnector::resolve_and_connect_async(&probe).await {
        Ok(docker) => docker,
        Err(failure) => {
            print_diagnostics(&ConnectionDiagnostics::collect(&probe, &failure));
            return Err(failure.into());
        }
    };

    let (sender, mut interrupts) = interrupt_channel();
    let forwarder = forward_ctrl_c(sender);
    let result = api::run(&docker, run_config, &mut interrupts, print_launch_report).await;
    forwarder.abort();
    result
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn print_diagnostics(diagnostics: &ConnectionDiagnostics) {
    println!("{diagnostics}");
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn print_launch_report(report: &LaunchReport) {
    println!("Container started. ID: {}", report.handle.id());
    println!();
    println!("Ports mapped:");
    for port in &report.ports {
        println!("- {port}");
    }
    println!();
    println!("Container is running. Press Ctrl+C to stop...");
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn report_outcome(outcome: RunOutcome) {
    match outcome {
        RunOutcome::CancelledBeforeLaunch => {
            println!("Interrupted while pulling the image. No container was created.");
        }
        RunOutcome::Interrupted => {
            println!("Container stopped and removed.");
        }
        RunOutcome::ContainerExited { code } => {
            println!("Container exited with status {code} and was removed.");
        }
    }
}
