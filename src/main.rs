//! expyre - schedule paths for deletion through at(1)
//!
//! Main entry point for the expyre CLI.

mod cli;
mod cmd_list;
mod cmd_reset;
mod cmd_schedule;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::warn;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use expyre_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};
use expyre_core::JobDirectory;

use crate::cli::{Cli, Request};
use crate::cmd_list::handle_list;
use crate::cmd_reset::handle_reset;
use crate::cmd_schedule::handle_schedule;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "EXPYRE_LOG";

fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // Console layer on stderr so stdout stays parseable
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .boxed();

    let file = match logging.directory {
        Some(ref log_dir) => {
            std::fs::create_dir_all(log_dir)?;
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("expyre")
                .filename_suffix("log")
                .max_log_files(30)
                .build(log_dir)?;

            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            // Keep the worker alive until exit
            static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
                std::sync::OnceLock::new();
            let _ = GUARD.set(guard);

            Some(
                fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file)
        .init();

    Ok(())
}

/// Load and validate the configuration. Warnings are logged once tracing is up.
fn load_config(path: Option<&Path>) -> Result<(Config, Vec<String>), Box<dyn std::error::Error>> {
    let config = ConfigLoader::load_or_default(path)?;

    let validation = ConfigValidator::validate(&config);
    let warnings = validation
        .warnings
        .iter()
        .map(|w| format!("{}: {}", w.path, w.message))
        .collect();
    if let Some(err) = validation.into_error() {
        return Err(err.into());
    }
    Ok((config, warnings))
}

async fn run(request: Request, directory: &JobDirectory, format: &str) -> Result<bool, Box<dyn std::error::Error>> {
    match request {
        Request::Schedule { path, timespec, guards } => {
            handle_schedule(directory, &path, &timespec, guards, format).await?;
            Ok(true)
        }
        Request::List { under } => {
            handle_list(directory, under.as_deref(), format).await?;
            Ok(true)
        }
        Request::Reset { paths } => handle_reset(directory, &paths, format).await,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli.config.clone();
    let format = cli.format.clone();
    let request = cli.into_request().unwrap_or_else(|e| e.exit());

    let (config, warnings) = match load_config(config_path.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_tracing(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
    }
    for warning in warnings {
        warn!("{}", warning);
    }

    let directory = JobDirectory::from_config(&config.scheduler);

    match run(request, &directory, &format).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
