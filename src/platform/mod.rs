//! Host system detection.
//!
//! Produces a [`HostSystem`] descriptor once per run: operating system,
//! architecture and the first package manager found on PATH.

mod package_manager;

pub use package_manager::PackageManager;

use serde::Serialize;

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OsKind {
    Windows,
    Linux,
    #[serde(rename = "darwin")]
    MacOs,
    Other,
}

impl OsKind {
    pub fn current() -> Self {
        Self::from_target(std::env::consts::OS)
    }

    pub fn from_target(os: &str) -> Self {
        match os {
            "windows" => Self::Windows,
            "linux" => Self::Linux,
            "macos" | "darwin" => Self::MacOs,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::MacOs => "darwin",
            Self::Other => "unknown",
        }
    }

    /// Whether `sudo`-style elevation exists on this OS.
    pub fn supports_elevation(&self) -> bool {
        !matches!(self, Self::Windows)
    }
}

impl std::fmt::Display for OsKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable descriptor of the machine stackup is running on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostSystem {
    pub os: OsKind,
    pub arch: String,
    pub package_manager: Option<PackageManager>,
}

impl HostSystem {
    pub fn new(os: OsKind, arch: impl Into<String>, package_manager: Option<PackageManager>) -> Self {
        Self {
            os,
            arch: arch.into(),
            package_manager,
        }
    }

    /// Detect the current host.
    pub fn detect() -> Self {
        let os = OsKind::current();
        let package_manager = detect_package_manager(os, |bin| which::which(bin).is_ok());
        let system = Self::new(os, std::env::consts::ARCH, package_manager);
        tracing::debug!(
            "Detected host: os={} arch={} package_manager={:?}",
            system.os,
            system.arch,
            system.package_manager
        );
        system
    }

    pub fn has_package_manager(&self) -> bool {
        self.package_manager.is_some()
    }
}

/// First candidate manager for `os` whose binary `exists`.
fn detect_package_manager(os: OsKind, exists: impl Fn(&str) -> bool) -> Option<PackageManager> {
    PackageManager::candidates_for(os)
        .iter()
        .copied()
        .find(|pm| exists(pm.binary()))
}
