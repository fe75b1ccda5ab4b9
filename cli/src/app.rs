//! Application context — unified state passed to every command handler.
//!
//! Replaces process-wide globals: output settings, the configuration
//! snapshot, the installation layout and the cancellation token all travel
//! here.

use std::io::IsTerminal as _;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::application::ports::TrustPrompt;
use crate::domain::{InstallLayout, PendingIdentity, RexrayConfig};
use crate::infra::command_runner::{DEFAULT_CMD_TIMEOUT, TokioCommandRunner};
use crate::infra::fs::HostFs;
use crate::infra::host::SystemHost;
use crate::infra::known_hosts::KnownHostsFile;
use crate::output::OutputContext;

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

/// Unified application context passed to every command handler.
///
/// Constructed once in `Cli::run()` and passed as `&AppContext`.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Configuration snapshot loaded at startup.
    pub config: RexrayConfig,
    /// Installation paths derived from `REXRAY_HOME`.
    pub layout: InstallLayout,
    /// Cancelled on Ctrl-C; aborts running child processes and handshakes.
    pub cancel: CancellationToken,
    /// When `true`, prompts return their default without asking.
    ///
    /// Set when stdin or stderr is not a terminal, or `CI` is present.
    pub non_interactive: bool,
    pub runner: TokioCommandRunner,
    pub fs: HostFs,
    pub host: SystemHost,
}

impl AppContext {
    #[must_use]
    pub fn new(
        flags: &OutputFlags,
        config: RexrayConfig,
        layout: InstallLayout,
        cancel: CancellationToken,
    ) -> Self {
        let non_interactive = std::env::var_os("CI").is_some()
            || !std::io::stdin().is_terminal()
            || !std::io::stderr().is_terminal();

        Self {
            output: OutputContext::new(flags.no_color, flags.quiet),
            config,
            layout,
            runner: TokioCommandRunner::new(DEFAULT_CMD_TIMEOUT, cancel.clone()),
            cancel,
            non_interactive,
            fs: HostFs,
            host: SystemHost,
        }
    }

    /// The trust store, resolved from `REXRAY_KNOWN_HOSTS`, config, or home.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn known_hosts(&self) -> Result<KnownHostsFile> {
        KnownHostsFile::resolve(self.config.rexray.known_hosts.as_deref())
    }

    /// Ask the user for confirmation.
    ///
    /// When `non_interactive` is `true`, returns `default` immediately
    /// without prompting.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails.
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.non_interactive {
            return Ok(default);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }
}

impl TrustPrompt for AppContext {
    fn confirm_new_host(&self, pending: &PendingIdentity) -> Result<bool> {
        eprintln!(
            "The authenticity of host '{}' can't be established.\n{} key fingerprint is {}.",
            pending.host_name,
            pending.algorithm.to_uppercase(),
            pending.fingerprint
        );
        if self.non_interactive {
            tracing::debug!("non-interactive session, refusing unknown host");
        }
        self.confirm("Are you sure you want to continue connecting?", false)
    }
}
