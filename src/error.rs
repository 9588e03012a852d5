use thiserror::Error;

#[derive(Error, Debug)]
pub enum StackupError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dependency not found: '{dependency}' for tool '{tool}'")]
    DependencyNotFound { tool: String, dependency: String },

    /// The dependency graph is not acyclic; `tool` is the node that closes the cycle.
    #[error("Circular dependency detected at tool '{tool}'")]
    CycleDetected { tool: String },

    #[error("No configuration for current platform: {tool} on {os}")]
    NoPlatformConfig { tool: String, os: String },

    #[error("No installation method available for {tool}")]
    NoInstallMethod { tool: String },

    #[error("No package manager available")]
    PackageManagerUnavailable,

    #[error("Package manager '{manager}' is not supported on {os}")]
    PackageManagerUnsupported { manager: String, os: String },

    #[error("{manager} failed to install '{package}': {reason}")]
    PackageInstallFailed {
        manager: String,
        package: String,
        reason: String,
    },

    #[error("Command '{command}' failed: {reason}")]
    CommandFailed { command: String, reason: String },

    #[error("Verification failed for {tool}: {reason}")]
    VerificationFailed { tool: String, reason: String },

    #[error("No internet connectivity: {0}")]
    NoInternet(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Unsupported installer type: {0}")]
    UnsupportedInstaller(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl StackupError {
    pub fn dependency_not_found(tool: impl Into<String>, dependency: impl Into<String>) -> Self {
        Self::DependencyNotFound {
            tool: tool.into(),
            dependency: dependency.into(),
        }
    }

    pub fn command_failed(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CommandFailed {
            command: command.into(),
            reason: reason.into(),
        }
    }

    pub fn no_install_method(tool: impl Into<String>) -> Self {
        Self::NoInstallMethod { tool: tool.into() }
    }

    /// Errors after which no valid install order exists.
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            Self::DependencyNotFound { .. } | Self::CycleDetected { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, StackupError>;
