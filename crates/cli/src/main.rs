//! staffdir - staff directory command-line client

mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::{Commands, Context, OutputFormat};
use config::CliConfig;
use staffdir_client::ClientError;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, debug, error};

#[derive(Parser)]
#[command(name = "staffdir")]
#[command(about = "Manage employees and departments of the staff directory")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short = 'c', long, global = true, env = "STAFFDIR_CONFIG")]
    config: Option<PathBuf>,

    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Directory holding the stored session
    #[arg(short = 'd', long, global = true, env = "STAFFDIR_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Backend base URL, overriding the configuration
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Output format
    #[arg(short = 'o', long, global = true, default_value = "table")]
    output: OutputFormat,

    /// Timeout for the whole command in seconds (0 = no timeout)
    #[arg(short = 't', long, global = true, default_value = "60")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.into(), cli.log_json)?;

    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }
    let state_dir = config.state_dir(cli.state_dir);
    debug!(base_url = %config.api.base_url, state_dir = %state_dir.display(), "Configuration loaded");

    let ctx = Context {
        config,
        state_dir,
        config_path: cli.config,
        output: cli.output,
    };

    let outcome = if cli.timeout == 0 {
        cli.command.execute(&ctx).await
    } else {
        let timeout_duration = Duration::from_secs(cli.timeout);
        match tokio::time::timeout(timeout_duration, cli.command.execute(&ctx)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                error!("Command timed out after {} seconds", cli.timeout);
                std::process::exit(1);
            }
        }
    };

    if let Err(e) = outcome {
        match e.downcast_ref::<ClientError>() {
            // The expiry hook already told the user what to do
            Some(client_error) if client_error.is_auth_expired() => {
                debug!("Session expired: {client_error}");
            }
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }

    Ok(())
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}
