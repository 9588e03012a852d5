use crate::config::{Command, PlatformConfig, Tool};
use crate::error::{Result, StackupError};
use crate::platform::{HostSystem, PackageManager};

/// How one tool will be installed on this host.
#[derive(Debug, Clone, Copy)]
pub enum InstallStrategy<'a> {
    /// Tool-level custom install; platform blocks are not consulted
    ToolCustom(&'a [Command]),
    /// The platform block's own command list
    PlatformCustom(&'a [Command]),
    /// Package manager first, downloaded installer as fallback
    Native {
        platform: &'a PlatformConfig,
        package_manager: Option<PackageManager>,
        installer_url: Option<&'a str>,
    },
}

impl InstallStrategy<'_> {
    /// One-line summary for plans and logs.
    pub fn describe(&self) -> String {
        match self {
            Self::ToolCustom(cmds) => format!("custom install ({} commands)", cmds.len()),
            Self::PlatformCustom(cmds) => format!("platform commands ({} commands)", cmds.len()),
            Self::Native {
                package_manager,
                installer_url,
                ..
            } => match (package_manager, installer_url) {
                (Some(pm), Some(url)) => format!("{} (fallback: download {})", pm, url),
                (Some(pm), None) => pm.to_string(),
                (None, Some(url)) => format!("download {}", url),
                (None, None) => "none".to_string(),
            },
        }
    }
}

/// Pick the strategy for `tool` on `system`.
pub fn select_strategy<'a>(tool: &'a Tool, system: &HostSystem) -> Result<InstallStrategy<'a>> {
    if !tool.custom_install.is_empty() {
        return Ok(InstallStrategy::ToolCustom(&tool.custom_install));
    }

    let platform = tool
        .platform_config(system.os)
        .ok_or_else(|| StackupError::NoPlatformConfig {
            tool: tool.name.clone(),
            os: system.os.to_string(),
        })?;

    if !platform.custom_commands.is_empty() {
        return Ok(InstallStrategy::PlatformCustom(&platform.custom_commands));
    }

    let package_manager = tool.manager.or(system.package_manager);
    let installer_url = platform.installer.as_deref().filter(|u| !u.is_empty());

    if package_manager.is_none() && installer_url.is_none() {
        return Err(StackupError::no_install_method(&tool.name));
    }

    Ok(InstallStrategy::Native {
        platform,
        package_manager,
        installer_url,
    })
}
