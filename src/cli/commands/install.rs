use std::path::PathBuf;
use std::sync::Arc;

use console::style;

use crate::config::{self, Config};
use crate::error::Result;
use crate::executor::{ProcessRunner, SystemRunner};
use crate::installer::{Installer, RunOptions};
use crate::platform::HostSystem;
use crate::report::{ConsoleReporter, JsonReporter, Reporter};
use crate::utils::format_duration;

pub struct InstallArgs {
    pub config: PathBuf,
    pub preset: Option<String>,
    pub dry_run: bool,
    pub skip_preflight: bool,
    pub json: bool,
}

/// Load, validate and install. Individual tool failures are reported but do
/// not make the command fail.
pub async fn execute(args: InstallArgs) -> Result<()> {
    let config = Config::load(&args.config)?;
    config::validate(&config)?;

    let system = HostSystem::detect();

    // In JSON mode stdout carries only event lines; child output goes to stderr.
    let (reporter, runner): (Arc<dyn Reporter>, Arc<dyn ProcessRunner>) = if args.json {
        (
            Arc::new(JsonReporter::stdout()),
            Arc::new(SystemRunner::stdout_to_stderr()),
        )
    } else {
        (
            Arc::new(ConsoleReporter::stdout()),
            Arc::new(SystemRunner::new()),
        )
    };

    let options = RunOptions {
        preset: args.preset,
        dry_run: args.dry_run,
        skip_preflight: args.skip_preflight,
    };

    let installer = Installer::with_runner(config, system, reporter, runner, options)?;
    let summary = installer.run().await?;

    tracing::debug!(
        "Run finished: {} installed, {} failed, {} skipped",
        summary.installed.len(),
        summary.failed.len(),
        summary.skipped.len()
    );

    if !args.json && !args.dry_run {
        println!(
            "  {}",
            style(format!(
                "Finished in {}",
                format_duration(summary.elapsed)
            ))
            .dim()
        );
    }

    Ok(())
}
