use crate::config::Tool;
use crate::error::{Result, StackupError};
use crate::executor::{CommandExecutor, Invocation};

/// Probe invocation for `tool`: its `verify_command` split on whitespace, or
/// `<name> --version`.
pub fn verify_invocation(tool: &Tool) -> Invocation {
    let declared = tool
        .verify_command
        .as_deref()
        .map(str::split_whitespace)
        .and_then(|mut parts| parts.next().map(|program| (program, parts)));

    let invocation = match declared {
        Some((program, rest)) => Invocation::new(program, rest.map(str::to_string).collect()),
        None => Invocation::new(tool.name.clone(), vec!["--version".to_string()]),
    };
    invocation.quiet()
}

/// Run the probe; any failure is reported as [`StackupError::VerificationFailed`].
pub async fn verify_tool(executor: &CommandExecutor, tool: &Tool) -> Result<()> {
    let invocation = verify_invocation(tool);
    executor
        .execute(&invocation)
        .await
        .map_err(|e| StackupError::VerificationFailed {
            tool: tool.name.clone(),
            reason: e.to_string(),
        })
}
