//! Installs tools through the system package manager.

use crate::config::{Command, PlatformConfig, Tool};
use crate::error::{Result, StackupError};
use crate::platform::{HostSystem, PackageManager};

use super::command::CommandExecutor;

/// Manager to use for `tool`: its override, else the detected one.
pub fn effective_manager(tool: &Tool, system: &HostSystem) -> Result<PackageManager> {
    let manager = tool
        .manager
        .or(system.package_manager)
        .ok_or(StackupError::PackageManagerUnavailable)?;

    if manager.os() != system.os {
        return Err(StackupError::PackageManagerUnsupported {
            manager: manager.to_string(),
            os: system.os.to_string(),
        });
    }

    Ok(manager)
}

/// Package name for `manager`, most specific source first: the platform's
/// per-manager mapping, then the dedicated `brew` field (Homebrew only), then
/// the tool name.
pub fn package_name(tool: &Tool, platform: &PlatformConfig, manager: PackageManager) -> String {
    if let Some(name) = platform.package_names.get(&manager) {
        return name.clone();
    }

    if manager == PackageManager::Brew {
        if let Some(name) = &platform.brew {
            return name.clone();
        }
    }

    tool.name.clone()
}

/// Non-interactive install command for `package`.
pub fn install_command(manager: PackageManager, package: &str) -> Command {
    let (program, args) = manager.install_args(package);
    Command::new(program, args).with_sudo(manager.needs_elevation())
}

pub struct PackageInstaller {
    executor: CommandExecutor,
}

impl PackageInstaller {
    pub fn new(executor: CommandExecutor) -> Self {
        Self { executor }
    }

    pub async fn install(&self, tool: &Tool, platform: &PlatformConfig) -> Result<()> {
        let manager = effective_manager(tool, self.executor.system())?;
        let package = package_name(tool, platform, manager);

        tracing::debug!("Installing {} via {} as '{}'", tool.name, manager, package);

        let command = install_command(manager, &package);
        self.executor
            .run(std::slice::from_ref(&command), "Package manager install")
            .await
            .map_err(|e| StackupError::PackageInstallFailed {
                manager: manager.to_string(),
                package,
                reason: match e {
                    StackupError::CommandFailed { reason, .. } => reason,
                    other => other.to_string(),
                },
            })
    }
}
