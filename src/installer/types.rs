use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Per-tool state within one run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InstallationState {
    #[default]
    NotStarted,
    Installed,
    Failed(String),
}

/// Result of a single tool's pipeline that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolOutcome {
    Installed,
    AlreadyInstalled,
}

/// Mutable state scoped to one run.
#[derive(Debug, Default)]
pub struct RunContext {
    installed: HashSet<String>,
    states: HashMap<String, InstallationState>,
    pub needs_reboot: bool,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_installed(&self, name: &str) -> bool {
        self.installed.contains(name)
    }

    pub fn mark_installed(&mut self, name: &str) {
        self.installed.insert(name.to_string());
        self.states
            .insert(name.to_string(), InstallationState::Installed);
    }

    pub fn mark_failed(&mut self, name: &str, reason: impl Into<String>) {
        self.states
            .insert(name.to_string(), InstallationState::Failed(reason.into()));
    }

    pub fn state(&self, name: &str) -> InstallationState {
        self.states.get(name).cloned().unwrap_or_default()
    }
}

/// What a run did.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub installed: Vec<String>,
    /// Tool name and failure reason
    pub failed: Vec<(String, String)>,
    /// Tools already installed earlier in the run
    pub skipped: Vec<String>,
    pub needs_reboot: bool,
    pub elapsed: Duration,
}
