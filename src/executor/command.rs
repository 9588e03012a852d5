//! Runs declared command lists in order.

use std::sync::Arc;

use crate::config::Command;
use crate::error::{Result, StackupError};
use crate::platform::HostSystem;
use crate::report::{Event, Reporter};

use super::process::{Invocation, ProcessRunner};

/// Executes [`Command`] lists one at a time, handling elevation, ignorable
/// failures and post-command delays.
#[derive(Clone)]
pub struct CommandExecutor {
    system: HostSystem,
    runner: Arc<dyn ProcessRunner>,
    reporter: Arc<dyn Reporter>,
}

impl CommandExecutor {
    pub fn new(
        system: HostSystem,
        runner: Arc<dyn ProcessRunner>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            system,
            runner,
            reporter,
        }
    }

    pub fn system(&self) -> &HostSystem {
        &self.system
    }

    pub fn reporter(&self) -> &Arc<dyn Reporter> {
        &self.reporter
    }

    /// Run `commands` in order for the named stage.
    ///
    /// The first failing command not marked `ignore_error` aborts the list.
    pub async fn run(&self, commands: &[Command], stage: &str) -> Result<()> {
        if commands.is_empty() {
            return Ok(());
        }

        self.reporter
            .report(Event::info(format!("Running {} commands...", stage)));

        for cmd in commands {
            if !cmd.description.is_empty() {
                self.reporter
                    .report(Event::info(format!("→ {}", cmd.description)));
            }

            let invocation = self.build_invocation(cmd);
            if let Err(e) = self.execute(&invocation).await {
                if !cmd.ignore_error {
                    return Err(e);
                }
                tracing::warn!("{} (ignored): {}", stage, e);
                self.reporter.report(Event::warning(
                    None,
                    format!("{} - continuing (ignore_error=true)", e),
                ));
            }

            if let Some(wait) = cmd.wait_duration() {
                self.reporter
                    .report(Event::info(format!("Waiting {} seconds...", cmd.wait_for)));
                tokio::time::sleep(wait).await;
            }
        }

        Ok(())
    }

    /// Final invocation for a command, wrapped in `sudo` when requested and
    /// the host has such a thing.
    pub fn build_invocation(&self, cmd: &Command) -> Invocation {
        if cmd.sudo && self.system.os.supports_elevation() {
            let mut args = Vec::with_capacity(cmd.args.len() + 1);
            args.push(cmd.command.clone());
            args.extend(cmd.args.iter().cloned());
            Invocation::new("sudo", args)
        } else {
            Invocation::new(cmd.command.clone(), cmd.args.clone())
        }
    }

    /// Run a single invocation; a non-zero exit or spawn failure is an error.
    pub async fn execute(&self, invocation: &Invocation) -> Result<()> {
        tracing::debug!("Executing: {}", invocation.command_line());

        match self.runner.run(invocation).await {
            Ok(outcome) if outcome.success() => Ok(()),
            Ok(outcome) => Err(StackupError::command_failed(
                invocation.command_line(),
                outcome.describe(),
            )),
            Err(e) => Err(StackupError::command_failed(
                invocation.command_line(),
                format!("failed to start: {}", e),
            )),
        }
    }
}
