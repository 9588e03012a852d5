//! Installer launchers for downloaded files.
//!
//! A downloaded installer is classified into an [`InstallerKind`], and the
//! [`LauncherRegistry`] maps each kind to the launcher that knows how to run
//! that kind of file unattended. Adding a format means implementing
//! [`InstallerLauncher`] and registering it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{Command, PlatformConfig, Tool};
use crate::error::{Result, StackupError};

/// Closed set of installer formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstallerKind {
    Exe,
    Msi,
    Shell,
    Deb,
    Rpm,
    Dmg,
    Pkg,
    AppImage,
    Generic,
}

impl InstallerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exe => "exe",
            Self::Msi => "msi",
            Self::Shell => "sh",
            Self::Deb => "deb",
            Self::Rpm => "rpm",
            Self::Dmg => "dmg",
            Self::Pkg => "pkg",
            Self::AppImage => "appimage",
            Self::Generic => "generic",
        }
    }

    /// Kind for a declared `type` tag. Unrecognised tags run as generic.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim_start_matches('.').to_lowercase().as_str() {
            "exe" => Self::Exe,
            "msi" => Self::Msi,
            "sh" | "bash" => Self::Shell,
            "deb" => Self::Deb,
            "rpm" => Self::Rpm,
            "dmg" => Self::Dmg,
            "pkg" => Self::Pkg,
            "appimage" => Self::AppImage,
            _ => Self::Generic,
        }
    }

    /// Kind inferred from a file name's extension.
    pub fn from_filename(filename: &str) -> Self {
        Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_tag)
            .unwrap_or(Self::Generic)
    }

    /// Declared type wins over the file name.
    pub fn resolve(declared: Option<&str>, filename: &str) -> Self {
        match declared {
            Some(tag) if !tag.is_empty() => Self::from_tag(tag),
            _ => Self::from_filename(filename),
        }
    }
}

impl std::fmt::Display for InstallerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a launcher gets to work with.
pub struct LaunchContext<'a> {
    /// Downloaded installer, inside a temporary directory
    pub path: &'a Path,
    pub tool: &'a Tool,
    pub platform: &'a PlatformConfig,
}

impl LaunchContext<'_> {
    fn path_arg(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    /// Declared silent flags, or `defaults` when none are declared.
    fn silent_flags(&self, defaults: &[&str]) -> Vec<String> {
        if self.platform.silent_flags.is_empty() {
            defaults.iter().map(|s| s.to_string()).collect()
        } else {
            self.platform.silent_flags.clone()
        }
    }
}

/// Turns a downloaded file into the commands that install it.
pub trait InstallerLauncher: Send + Sync {
    fn kind(&self) -> InstallerKind;

    /// May touch the file (e.g. mark it executable) before returning commands.
    fn prepare(&self, ctx: &LaunchContext<'_>) -> Result<Vec<Command>>;

    /// Commands run after the install commands whether or not they
    /// succeeded, before the download directory is removed.
    fn cleanup(&self, _ctx: &LaunchContext<'_>) -> Vec<Command> {
        Vec::new()
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

pub struct ExeLauncher;

impl InstallerLauncher for ExeLauncher {
    fn kind(&self) -> InstallerKind {
        InstallerKind::Exe
    }

    fn prepare(&self, ctx: &LaunchContext<'_>) -> Result<Vec<Command>> {
        Ok(vec![Command::new(ctx.path_arg(), ctx.silent_flags(&["/S"]))])
    }
}

pub struct MsiLauncher;

impl InstallerLauncher for MsiLauncher {
    fn kind(&self) -> InstallerKind {
        InstallerKind::Msi
    }

    fn prepare(&self, ctx: &LaunchContext<'_>) -> Result<Vec<Command>> {
        let mut args = vec!["/i".to_string(), ctx.path_arg()];
        args.extend(ctx.silent_flags(&["/quiet", "/norestart"]));
        Ok(vec![Command::new("msiexec", args)])
    }
}

pub struct ShellLauncher;

impl InstallerLauncher for ShellLauncher {
    fn kind(&self) -> InstallerKind {
        InstallerKind::Shell
    }

    fn prepare(&self, ctx: &LaunchContext<'_>) -> Result<Vec<Command>> {
        make_executable(ctx.path)?;
        let mut args = vec![ctx.path_arg()];
        args.extend(ctx.platform.silent_flags.iter().cloned());
        Ok(vec![Command::new("bash", args)])
    }
}

/// `.deb` / `.rpm` through the low-level package tool.
pub struct NativePackageLauncher {
    kind: InstallerKind,
    program: &'static str,
}

impl NativePackageLauncher {
    pub fn deb() -> Self {
        Self {
            kind: InstallerKind::Deb,
            program: "dpkg",
        }
    }

    pub fn rpm() -> Self {
        Self {
            kind: InstallerKind::Rpm,
            program: "rpm",
        }
    }
}

impl InstallerLauncher for NativePackageLauncher {
    fn kind(&self) -> InstallerKind {
        self.kind
    }

    fn prepare(&self, ctx: &LaunchContext<'_>) -> Result<Vec<Command>> {
        Ok(vec![Command::new(
            self.program,
            vec!["-i".to_string(), ctx.path_arg()],
        )
        .with_sudo(true)])
    }
}

pub struct PkgLauncher;

impl InstallerLauncher for PkgLauncher {
    fn kind(&self) -> InstallerKind {
        InstallerKind::Pkg
    }

    fn prepare(&self, ctx: &LaunchContext<'_>) -> Result<Vec<Command>> {
        Ok(vec![Command::new(
            "installer",
            vec![
                "-pkg".to_string(),
                ctx.path_arg(),
                "-target".to_string(),
                "/".to_string(),
            ],
        )
        .with_sudo(true)])
    }
}

/// Mounts the image and copies its `.app` bundles to /Applications. The
/// image is detached in [`InstallerLauncher::cleanup`].
pub struct DmgLauncher;

impl DmgLauncher {
    fn mount_point(ctx: &LaunchContext<'_>) -> String {
        ctx.path
            .parent()
            .map(|dir| dir.join("mnt"))
            .unwrap_or_else(|| PathBuf::from("/tmp/stackup-mnt"))
            .to_string_lossy()
            .into_owned()
    }
}

impl InstallerLauncher for DmgLauncher {
    fn kind(&self) -> InstallerKind {
        InstallerKind::Dmg
    }

    fn prepare(&self, ctx: &LaunchContext<'_>) -> Result<Vec<Command>> {
        let mount = Self::mount_point(ctx);

        let attach = Command::new(
            "hdiutil",
            vec![
                "attach".to_string(),
                "-nobrowse".to_string(),
                "-mountpoint".to_string(),
                mount.clone(),
                ctx.path_arg(),
            ],
        )
        .with_description("Mount disk image");

        let copy = Command::new(
            "sh",
            vec![
                "-c".to_string(),
                format!("cp -R '{}'/*.app /Applications/", mount),
            ],
        )
        .with_description("Copy application bundle");

        Ok(vec![attach, copy])
    }

    fn cleanup(&self, ctx: &LaunchContext<'_>) -> Vec<Command> {
        let mut detach = Command::new(
            "hdiutil",
            vec![
                "detach".to_string(),
                "-force".to_string(),
                Self::mount_point(ctx),
            ],
        );
        detach.ignore_error = true;
        vec![detach]
    }
}

/// AppImages are self-contained; install the file itself to ~/.local/bin.
pub struct AppImageLauncher;

impl InstallerLauncher for AppImageLauncher {
    fn kind(&self) -> InstallerKind {
        InstallerKind::AppImage
    }

    fn prepare(&self, ctx: &LaunchContext<'_>) -> Result<Vec<Command>> {
        let home = dirs::home_dir().ok_or_else(|| {
            StackupError::Other(anyhow::anyhow!("Could not determine home directory"))
        })?;
        let target = home.join(".local").join("bin").join(&ctx.tool.name);

        make_executable(ctx.path)?;
        Ok(vec![Command::new(
            "install",
            vec![
                "-D".to_string(),
                "-m".to_string(),
                "755".to_string(),
                ctx.path_arg(),
                target.to_string_lossy().into_owned(),
            ],
        )
        .with_description(format!("Install to {}", target.display()))])
    }
}

/// Fallback: make the file executable and run it.
pub struct GenericLauncher;

impl InstallerLauncher for GenericLauncher {
    fn kind(&self) -> InstallerKind {
        InstallerKind::Generic
    }

    fn prepare(&self, ctx: &LaunchContext<'_>) -> Result<Vec<Command>> {
        make_executable(ctx.path)?;
        Ok(vec![Command::new(
            ctx.path_arg(),
            ctx.platform.silent_flags.clone(),
        )])
    }
}

/// Maps installer kinds to launchers.
pub struct LauncherRegistry {
    launchers: HashMap<InstallerKind, Arc<dyn InstallerLauncher>>,
}

impl Default for LauncherRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl LauncherRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            launchers: HashMap::new(),
        }
    }

    /// Create a registry with every built-in launcher registered
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ExeLauncher);
        registry.register(MsiLauncher);
        registry.register(ShellLauncher);
        registry.register(NativePackageLauncher::deb());
        registry.register(NativePackageLauncher::rpm());
        registry.register(PkgLauncher);
        registry.register(DmgLauncher);
        registry.register(AppImageLauncher);
        registry.register(GenericLauncher);
        registry
    }

    /// Register a launcher, replacing any existing one for its kind
    pub fn register<L: InstallerLauncher + 'static>(&mut self, launcher: L) {
        self.launchers.insert(launcher.kind(), Arc::new(launcher));
    }

    pub fn get(&self, kind: InstallerKind) -> Result<Arc<dyn InstallerLauncher>> {
        self.launchers
            .get(&kind)
            .cloned()
            .ok_or_else(|| StackupError::UnsupportedInstaller(kind.to_string()))
    }
}
