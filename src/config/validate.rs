//! Structural validation of a loaded tool file.

use std::collections::HashSet;

use crate::error::{Result, StackupError};

use super::Config;

/// Validate a configuration.
///
/// Checks that tools exist and are uniquely named, that every dependency and
/// preset entry refers to a declared tool, and that each tool has some way to
/// be installed. Dependency cycles are left to the resolver.
pub fn validate(config: &Config) -> Result<()> {
    if config.tools.is_empty() {
        return Err(StackupError::Config(
            "No tools defined in configuration".to_string(),
        ));
    }

    let mut names = HashSet::new();
    for (idx, tool) in config.tools.iter().enumerate() {
        if tool.name.trim().is_empty() {
            return Err(StackupError::Config(format!(
                "Tool at index {} missing name",
                idx
            )));
        }
        if !names.insert(tool.name.as_str()) {
            return Err(StackupError::Config(format!(
                "Duplicate tool name: {}",
                tool.name
            )));
        }
    }

    for tool in &config.tools {
        if let Some(dep) = tool.dependencies.iter().find(|d| !names.contains(d.as_str())) {
            return Err(StackupError::Config(format!(
                "Tool {} has unknown dependency: {}",
                tool.name, dep
            )));
        }

        if !tool.has_any_platform() && tool.custom_install.is_empty() {
            return Err(StackupError::Config(format!(
                "Tool {} has no platform configuration",
                tool.name
            )));
        }

        let has_empty_command = tool
            .pre_install
            .iter()
            .chain(&tool.custom_install)
            .chain(&tool.post_install)
            .any(|c| c.command.trim().is_empty());
        if has_empty_command {
            return Err(StackupError::Config(format!(
                "Tool {} has a command with an empty 'command' field",
                tool.name
            )));
        }
    }

    for (preset_name, preset) in &config.presets {
        if let Some(missing) = preset.tools.iter().find(|t| !names.contains(t.as_str())) {
            return Err(StackupError::Config(format!(
                "Preset {} references unknown tool: {}",
                preset_name, missing
            )));
        }
    }

    Ok(())
}
