//! Installation orchestration.
//!
//! The [`Installer`] drives a run end to end: header, preflight, dependency
//! resolution, then the per-tool pipeline for each tool in order. A tool
//! that fails is reported and the run moves on; only configuration,
//! preflight and resolution errors abort the run.

mod preflight;
mod resolve;
mod strategy;
mod types;
mod verify;

pub use preflight::run_preflight;
pub use resolve::{resolve_order, resolve_selected};
pub use strategy::{select_strategy, InstallStrategy};
pub use types::{RunContext, RunSummary, ToolOutcome};
pub use verify::verify_tool;

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;

use crate::config::{Config, PlatformConfig, Tool};
use crate::error::{Result, StackupError};
use crate::executor::{
    CommandExecutor, DownloadInstaller, LauncherRegistry, PackageInstaller, ProcessRunner,
};
use crate::platform::{HostSystem, PackageManager};
use crate::report::{Event, Reporter};

/// Per-run switches from the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Restrict the run to this preset's tools and their dependencies
    pub preset: Option<String>,
    /// Resolve and print the plan without executing anything
    pub dry_run: bool,
    pub skip_preflight: bool,
}

pub struct Installer {
    config: Config,
    system: HostSystem,
    reporter: Arc<dyn Reporter>,
    executor: CommandExecutor,
    packages: PackageInstaller,
    downloads: DownloadInstaller,
    client: Client,
    options: RunOptions,
}

impl Installer {
    /// Build an installer whose commands are spawned by `runner`.
    pub fn with_runner(
        config: Config,
        system: HostSystem,
        reporter: Arc<dyn Reporter>,
        runner: Arc<dyn ProcessRunner>,
        options: RunOptions,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .user_agent(concat!("stackup/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let executor = CommandExecutor::new(system.clone(), runner, reporter.clone());
        let packages = PackageInstaller::new(executor.clone());
        let downloads = DownloadInstaller::new(
            client.clone(),
            executor.clone(),
            LauncherRegistry::with_defaults(),
        );

        Ok(Self {
            config,
            system,
            reporter,
            executor,
            packages,
            downloads,
            client,
            options,
        })
    }

    #[cfg(test)]
    fn with_temp_root(mut self, root: &std::path::Path) -> Self {
        self.downloads = self.downloads.with_temp_root(root);
        self
    }

    /// Run the whole installation.
    pub async fn run(&self) -> Result<RunSummary> {
        let started = Instant::now();

        self.reporter.report(Event::RunHeader {
            version: env!("CARGO_PKG_VERSION").to_string(),
            os: self.system.os.to_string(),
            arch: self.system.arch.clone(),
            package_manager: self.system.package_manager.map(|pm| pm.to_string()),
            profile: self.config.profile.clone(),
        });

        if !self.options.skip_preflight && !self.options.dry_run {
            run_preflight(
                &self.client,
                &self.system,
                &self.config.settings.connectivity_url,
                self.reporter.as_ref(),
            )
            .await?;
        }

        let order = match self.options.preset.as_deref() {
            None => resolve_order(&self.config.tools)?,
            Some(preset) => {
                let roots = self.config.roots(Some(preset))?;
                resolve_selected(&self.config.tools, &roots)?
            }
        };
        tracing::debug!(
            "Install order: {:?}",
            order.iter().map(|t| t.name.as_str()).collect::<Vec<_>>()
        );

        if self.options.dry_run {
            self.report_plan(&order);
            return Ok(RunSummary {
                elapsed: started.elapsed(),
                ..Default::default()
            });
        }

        let mut ctx = RunContext::new();
        let mut summary = RunSummary::default();
        let total = order.len();

        for (i, tool) in order.into_iter().enumerate() {
            let name = tool.display_name();
            self.reporter.report(Event::ToolStarted {
                index: i + 1,
                total,
                name: name.to_string(),
                description: tool.description.clone(),
            });

            match self.install_tool(&mut ctx, tool).await {
                Err(e) => {
                    self.reporter.report(Event::error(name, e.to_string()));
                    ctx.mark_failed(&tool.name, e.to_string());
                    summary.failed.push((tool.name.clone(), e.to_string()));
                }
                Ok(ToolOutcome::AlreadyInstalled) => {
                    summary.skipped.push(tool.name.clone());
                }
                Ok(ToolOutcome::Installed) => {
                    self.report_installed(tool).await;
                    summary.installed.push(tool.name.clone());
                    if tool.requires_reboot {
                        ctx.needs_reboot = true;
                    }
                }
            }
            tracing::debug!("{}: {:?}", tool.name, ctx.state(&tool.name));
        }

        summary.needs_reboot = ctx.needs_reboot;
        summary.elapsed = started.elapsed();

        self.reporter.report(Event::RunComplete {
            installed: summary.installed.len(),
            failed: summary.failed.len(),
            needs_reboot: summary.needs_reboot,
        });

        Ok(summary)
    }

    /// Per-tool pipeline: skip if done, pre-install, strategy, post-install.
    pub async fn install_tool(&self, ctx: &mut RunContext, tool: &Tool) -> Result<ToolOutcome> {
        if ctx.is_installed(&tool.name) {
            self.reporter
                .report(Event::info("Already installed, skipping..."));
            return Ok(ToolOutcome::AlreadyInstalled);
        }

        self.executor.run(&tool.pre_install, "Pre-install").await?;

        match select_strategy(tool, &self.system)? {
            InstallStrategy::ToolCustom(commands) => {
                self.executor.run(commands, "Custom install").await?
            }
            InstallStrategy::PlatformCustom(commands) => {
                self.executor.run(commands, "Platform install").await?
            }
            InstallStrategy::Native {
                platform,
                package_manager,
                installer_url,
            } => {
                self.install_native(tool, platform, package_manager, installer_url)
                    .await?
            }
        }

        self.executor.run(&tool.post_install, "Post-install").await?;

        ctx.mark_installed(&tool.name);
        Ok(ToolOutcome::Installed)
    }

    /// Package manager first; a failure falls through to the download.
    async fn install_native(
        &self,
        tool: &Tool,
        platform: &PlatformConfig,
        package_manager: Option<PackageManager>,
        installer_url: Option<&str>,
    ) -> Result<()> {
        if package_manager.is_some() {
            match self.packages.install(tool, platform).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::debug!("Package manager install of {} failed: {}", tool.name, e);
                    self.reporter
                        .report(Event::warning(Some(tool.display_name()), e.to_string()));
                }
            }
        }

        match installer_url {
            Some(url) => self.downloads.install(tool, platform, url).await,
            None => Err(StackupError::no_install_method(&tool.name)),
        }
    }

    async fn report_installed(&self, tool: &Tool) {
        let name = tool.display_name();

        if !self.config.settings.verify_installations {
            self.reporter.report(Event::success(Some(name), "installed"));
            return;
        }

        match verify_tool(&self.executor, tool).await {
            Ok(()) => self
                .reporter
                .report(Event::success(Some(name), "installed successfully")),
            Err(e) => {
                tracing::debug!("{}", e);
                self.reporter.report(Event::warning(
                    Some(name),
                    "installed but verification failed",
                ));
            }
        }
    }

    fn report_plan(&self, order: &[&Tool]) {
        self.reporter.report(Event::info("Install plan:"));

        let total = order.len();
        for (i, tool) in order.iter().enumerate() {
            let method = match select_strategy(tool, &self.system) {
                Ok(strategy) => strategy.describe(),
                Err(e) => format!("cannot install: {}", e),
            };
            self.reporter.report(Event::info(format!(
                "[{}/{}] {} - {}",
                i + 1,
                total,
                tool.display_name(),
                method
            )));
        }

        self.reporter
            .report(Event::info("Dry run: nothing was installed"));
    }
}
