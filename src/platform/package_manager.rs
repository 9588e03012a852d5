//! Supported system package managers.

use serde::{Deserialize, Serialize};

use super::OsKind;

/// A system package manager stackup knows how to drive non-interactively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PackageManager {
    Apt,
    Dnf,
    Yum,
    Pacman,
    Zypper,
    Brew,
    Winget,
    Choco,
    Scoop,
}

impl PackageManager {
    pub fn all() -> &'static [PackageManager] {
        &[
            Self::Apt,
            Self::Dnf,
            Self::Yum,
            Self::Pacman,
            Self::Zypper,
            Self::Brew,
            Self::Winget,
            Self::Choco,
            Self::Scoop,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Apt => "apt",
            Self::Dnf => "dnf",
            Self::Yum => "yum",
            Self::Pacman => "pacman",
            Self::Zypper => "zypper",
            Self::Brew => "brew",
            Self::Winget => "winget",
            Self::Choco => "choco",
            Self::Scoop => "scoop",
        }
    }

    pub fn supported_names() -> Vec<String> {
        Self::all().iter().map(|p| p.as_str().to_string()).collect()
    }

    /// Parse a manager name; `apt-get` is accepted as an alias for `apt`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "apt" | "apt-get" => Some(Self::Apt),
            "dnf" => Some(Self::Dnf),
            "yum" => Some(Self::Yum),
            "pacman" => Some(Self::Pacman),
            "zypper" => Some(Self::Zypper),
            "brew" | "homebrew" => Some(Self::Brew),
            "winget" => Some(Self::Winget),
            "choco" | "chocolatey" => Some(Self::Choco),
            "scoop" => Some(Self::Scoop),
            _ => None,
        }
    }

    /// The executable probed on PATH during detection.
    pub fn binary(&self) -> &'static str {
        match self {
            Self::Apt => "apt-get",
            other => other.as_str(),
        }
    }

    /// Operating system this manager installs packages for.
    pub fn os(&self) -> OsKind {
        match self {
            Self::Apt | Self::Dnf | Self::Yum | Self::Pacman | Self::Zypper => OsKind::Linux,
            Self::Brew => OsKind::MacOs,
            Self::Winget | Self::Choco | Self::Scoop => OsKind::Windows,
        }
    }

    /// Detection order for an OS, most preferred first.
    pub fn candidates_for(os: OsKind) -> &'static [PackageManager] {
        match os {
            OsKind::Linux => &[Self::Apt, Self::Dnf, Self::Yum, Self::Pacman, Self::Zypper],
            OsKind::MacOs => &[Self::Brew],
            OsKind::Windows => &[Self::Winget, Self::Choco, Self::Scoop],
            OsKind::Other => &[],
        }
    }

    /// Whether install commands for this manager must run as root.
    pub fn needs_elevation(&self) -> bool {
        self.os() == OsKind::Linux
    }

    /// Program and arguments for a non-interactive install of `package`.
    pub fn install_args(&self, package: &str) -> (&'static str, Vec<String>) {
        let pkg = package.to_string();
        match self {
            Self::Apt => ("apt-get", vec!["install".into(), "-y".into(), pkg]),
            Self::Dnf => ("dnf", vec!["install".into(), "-y".into(), pkg]),
            Self::Yum => ("yum", vec!["install".into(), "-y".into(), pkg]),
            Self::Pacman => ("pacman", vec!["-S".into(), "--noconfirm".into(), pkg]),
            Self::Zypper => (
                "zypper",
                vec!["--non-interactive".into(), "install".into(), pkg],
            ),
            Self::Brew => ("brew", vec!["install".into(), pkg]),
            Self::Winget => (
                "winget",
                vec![
                    "install".into(),
                    "--id".into(),
                    pkg,
                    "--exact".into(),
                    "--silent".into(),
                    "--accept-package-agreements".into(),
                    "--accept-source-agreements".into(),
                ],
            ),
            Self::Choco => ("choco", vec!["install".into(), pkg, "-y".into()]),
            Self::Scoop => ("scoop", vec!["install".into(), pkg]),
        }
    }
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PackageManager {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            format!(
                "Unknown package manager '{}'. Supported: {:?}",
                s,
                Self::supported_names()
            )
        })
    }
}

impl TryFrom<String> for PackageManager {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PackageManager> for String {
    fn from(pm: PackageManager) -> Self {
        pm.as_str().to_string()
    }
}
