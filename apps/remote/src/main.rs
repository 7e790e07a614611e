use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{CommandOutcome, Controller, ControllerOptions, HttpTransport};
use shared::domain::Command;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod actions;
mod config;
mod console;

use actions::{parse_action, perform, status_line, Flow, HELP};
use config::{load_settings, Overrides, Settings};
use console::ConsoleDisplay;

#[derive(Parser, Debug)]
#[command(name = "window-remote", about = "Remote control for the window/thermostat controller")]
struct Cli {
    /// Settings file (defaults to ./remote.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    device_url: Option<String>,
    #[arg(long, global = true)]
    poll_interval_ms: Option<u64>,
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,
    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Interactive session (default).
    Run,
    /// Send one command (auto, open, close, stop, set-temp=<5-30>) and wait for it.
    Send { command: Command },
    /// Read both temperatures and the mode once.
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = load_settings(&Overrides {
        config_path: cli.config,
        device_url: cli.device_url,
        poll_interval_ms: cli.poll_interval_ms,
        request_timeout_ms: cli.timeout_ms,
    })?;
    let controller = build_controller(&settings)?;

    match cli.command.unwrap_or(Cmd::Run) {
        Cmd::Run => run_session(controller).await,
        Cmd::Send { command } => send_once(&controller, command).await,
        Cmd::Status => {
            controller.refresh_readings().await;
            controller.refresh_mode().await;
            println!("{}", status_line(&controller));
            Ok(())
        }
    }
}

fn build_controller(settings: &Settings) -> Result<Arc<Controller>> {
    let transport = HttpTransport::new(&settings.device_url, settings.request_timeout)
        .context("failed to set up device transport")?;
    info!(device_url = transport.base_url(), "using device");
    let display = ConsoleDisplay::new(std::io::stdout());
    Ok(Arc::new(Controller::new(
        Arc::new(transport),
        Arc::new(display),
        ControllerOptions {
            poll_interval: settings.poll_interval,
        },
    )))
}

async fn run_session(controller: Arc<Controller>) -> Result<()> {
    controller.on_start();
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => line.context("failed to read console input")?,
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_action(&line) {
            Ok(action) => {
                if perform(&controller, action).await == Flow::Quit {
                    break;
                }
            }
            Err(err) => println!("{err}"),
        }
    }

    controller.on_stop();
    info!("session ended");
    Ok(())
}

async fn send_once(controller: &Controller, command: Command) -> Result<()> {
    match controller.dispatch(command).outcome().await {
        CommandOutcome::Completed => {
            println!("{} acknowledged", command.name());
            Ok(())
        }
        CommandOutcome::Failed(err) => {
            warn!(command = command.name(), error = %err, "command failed");
            bail!("{} failed: {err}", command.name())
        }
        CommandOutcome::Cancelled => bail!("{} was cancelled", command.name()),
    }
}
