//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use crate::app::{AppContext, OutputFlags};
use crate::commands;
use crate::domain::service::PREFIX_ENV;
use crate::domain::{InstallLayout, RexrayConfig, validate_log_level};
use crate::infra::config::YamlConfigStore;
use crate::infra::logging;

/// REX-Ray storage orchestration: service installation and host trust
#[derive(Parser)]
#[command(
    name = "rexray",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Log level: error, warn, info, debug or trace (overrides `rexray.logLevel`)
    #[arg(short = 'l', long, global = true)]
    pub log_level: Option<String>,

    /// Configuration file (default: `<REXRAY_HOME>/etc/rexray/config.yml`)
    #[arg(long, global = true, env = "REXRAY_CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Install REX-Ray as a service
    Install,

    /// Uninstall the REX-Ray service
    Uninstall(commands::install::UninstallArgs),

    /// Manage the REX-Ray service
    #[command(subcommand)]
    Service(commands::service::ServiceCommand),

    /// Connect to a REX-Ray control endpoint, verifying its identity
    Connect(commands::connect::ConnectArgs),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            log_level,
            config,
            quiet,
            no_color,
            command,
        } = self;

        let layout = InstallLayout::new(std::env::var(PREFIX_ENV).ok().as_deref());
        if matches!(command, Command::Version) {
            commands::version::run(&layout);
            return Ok(ExitCode::SUCCESS);
        }

        let config = load_config(config, &layout)?;
        let level = validate_log_level(log_level.as_deref().unwrap_or(&config.rexray.log_level))?;

        let cancel = CancellationToken::new();
        spawn_interrupt_handler(cancel.clone());

        let app = AppContext::new(&OutputFlags { no_color, quiet }, config, layout, cancel);
        logging::init(&level, app.output.color && console::Term::stderr().is_term());
        tracing::debug!(prefix = ?app.layout.prefix(), "starting");

        match command {
            Command::Install => commands::install::run_install(&app).await,
            Command::Uninstall(args) => commands::install::run_uninstall(&app, &args).await,
            Command::Service(cmd) => commands::service::run(&app, &cmd).await,
            Command::Connect(args) => commands::connect::run(&app, &args).await,
            Command::Version => Ok(ExitCode::SUCCESS),
        }
    }
}

fn load_config(explicit: Option<PathBuf>, layout: &InstallLayout) -> Result<RexrayConfig> {
    YamlConfigStore::new(explicit, layout).load()
}

/// Cancels `token` on the first Ctrl-C.
fn spawn_interrupt_handler(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling");
            token.cancel();
        }
    });
}
