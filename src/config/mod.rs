//! Tool file schema and loading.
//!
//! A tool file is a YAML document listing the tools to install, their
//! dependencies and per-platform install instructions.

mod validate;

pub use validate::validate;

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StackupError};
use crate::platform::{OsKind, PackageManager};

/// Bundled example printed by `stackup example`.
pub const EXAMPLE_CONFIG: &str = include_str!("example.yaml");

/// Root of a tool file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub tools: Vec<Tool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub presets: BTreeMap<String, Preset>,
}

/// Global installation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Run each tool's verify probe after a successful install
    #[serde(default)]
    pub verify_installations: bool,

    /// URL fetched by the preflight connectivity check
    #[serde(default = "default_connectivity_url")]
    pub connectivity_url: String,
}

fn default_connectivity_url() -> String {
    "https://www.google.com".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            verify_installations: false,
            connectivity_url: default_connectivity_url(),
        }
    }
}

/// A named subset of tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Preset {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tools: Vec<String>,
}

/// A single installable tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Install through this manager instead of the detected one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<PackageManager>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windows: Option<PlatformConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linux: Option<PlatformConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macos: Option<PlatformConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_install: Vec<Command>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_install: Vec<Command>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post_install: Vec<Command>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_command: Option<String>,
    #[serde(default)]
    pub requires_reboot: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

fn default_version() -> String {
    "latest".to_string()
}

impl Tool {
    /// Display name, falling back to the tool name.
    pub fn display_name(&self) -> &str {
        if !self.display_name.is_empty() {
            &self.display_name
        } else {
            &self.name
        }
    }

    /// Platform block for the given OS, if declared.
    pub fn platform_config(&self, os: OsKind) -> Option<&PlatformConfig> {
        match os {
            OsKind::Windows => self.windows.as_ref(),
            OsKind::Linux => self.linux.as_ref(),
            OsKind::MacOs => self.macos.as_ref(),
            OsKind::Other => None,
        }
    }

    pub fn has_any_platform(&self) -> bool {
        self.windows.is_some() || self.linux.is_some() || self.macos.is_some()
    }
}

/// Install instructions for one operating system.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// URL of a downloadable installer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installer: Option<String>,

    /// Installer file type (exe, msi, sh, deb, rpm, dmg, pkg, appimage)
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub silent_flags: Vec<String>,

    /// Package name per package manager
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub package_names: BTreeMap<PackageManager, String>,

    /// Homebrew package (formula or cask) name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brew: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_commands: Vec<Command>,
}

/// A single command invocation declared in the tool file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub command: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub sudo: bool,
    /// Seconds to wait after the command finishes
    #[serde(default)]
    pub wait_for: u64,
    #[serde(default)]
    pub ignore_error: bool,
}

impl Command {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            ..Default::default()
        }
    }

    pub fn with_sudo(mut self, sudo: bool) -> Self {
        self.sudo = sudo;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn wait_duration(&self) -> Option<Duration> {
        (self.wait_for > 0).then(|| Duration::from_secs(self.wait_for))
    }

    /// Command line as typed, for messages.
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.args.join(" "))
        }
    }
}

impl Config {
    /// Load a tool file from disk. `~` is expanded.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = path.as_ref().to_string_lossy();
        let expanded = shellexpand::tilde(raw.as_ref());
        let path = Path::new(expanded.as_ref());

        let content = std::fs::read_to_string(path).map_err(|e| {
            StackupError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse a tool file and fill in display-name defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let mut config: Config = serde_yaml::from_str(content)
            .map_err(|e| StackupError::Config(format!("Failed to parse YAML: {}", e)))?;

        for tool in &mut config.tools {
            if tool.display_name.is_empty() {
                tool.display_name = tool.name.clone();
            }
        }

        Ok(config)
    }

    /// Root tool names for a run: the preset's tools, or every tool.
    pub fn roots(&self, preset: Option<&str>) -> Result<Vec<String>> {
        match preset {
            None => Ok(self.tools.iter().map(|t| t.name.clone()).collect()),
            Some(name) => self
                .presets
                .get(name)
                .map(|p| p.tools.clone())
                .ok_or_else(|| {
                    let known: Vec<&str> = self.presets.keys().map(String::as_str).collect();
                    StackupError::Config(format!(
                        "Unknown preset '{}'. Available presets: {:?}",
                        name, known
                    ))
                }),
        }
    }
}
