//! Process spawning seam.
//!
//! Everything that launches an external program goes through
//! [`ProcessRunner`], so the pipeline can be exercised without touching the
//! host.

use std::process::Stdio;

use async_trait::async_trait;

/// A fully built program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Discard the child's stdout/stderr instead of inheriting them
    pub quiet: bool,
}

impl Invocation {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            quiet: false,
        }
    }

    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// How a finished process exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    /// Exit code; `None` when the process was killed by a signal
    pub code: Option<i32>,
}

impl ExitOutcome {
    #[cfg(test)]
    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn describe(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Runs one invocation to completion.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Returns `Err` only when the process could not be started.
    async fn run(&self, invocation: &Invocation) -> std::io::Result<ExitOutcome>;
}

/// Where a child's stdout ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StdoutTarget {
    Inherit,
    Stderr,
    Discard,
}

/// Spawns real processes with `tokio::process`, inheriting stdin and
/// (unless quiet) stdout/stderr.
#[derive(Debug, Default, Clone)]
pub struct SystemRunner {
    stdout_to_stderr: bool,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Child stdout goes to our stderr, leaving our stdout to the reporter.
    pub fn stdout_to_stderr() -> Self {
        Self {
            stdout_to_stderr: true,
        }
    }

    fn stdout_target(&self, invocation: &Invocation) -> StdoutTarget {
        if invocation.quiet {
            StdoutTarget::Discard
        } else if self.stdout_to_stderr {
            StdoutTarget::Stderr
        } else {
            StdoutTarget::Inherit
        }
    }
}

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> std::io::Result<ExitOutcome> {
        let mut cmd = tokio::process::Command::new(&invocation.program);
        cmd.args(&invocation.args).stdin(Stdio::inherit());

        match self.stdout_target(invocation) {
            StdoutTarget::Discard => {
                cmd.stdout(Stdio::null()).stderr(Stdio::null());
            }
            StdoutTarget::Stderr => {
                cmd.stdout(Stdio::from(std::io::stderr()))
                    .stderr(Stdio::inherit());
            }
            StdoutTarget::Inherit => {
                cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
        }

        let status = cmd.status().await?;
        Ok(ExitOutcome {
            code: status.code(),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_outcome() {
        assert!(ExitOutcome::from_code(0).success());
        assert!(!ExitOutcome::from_code(2).success());
        assert_eq!(ExitOutcome::from_code(2).describe(), "exit code 2");
        assert_eq!(ExitOutcome { code: None }.describe(), "terminated by signal");
    }

    #[test]
    fn test_command_line() {
        let inv = Invocation::new("sudo", vec!["dpkg".into(), "-i".into(), "x.deb".into()]);
        assert_eq!(inv.command_line(), "sudo dpkg -i x.deb");
        assert!(!inv.quiet);
        assert!(Invocation::new("git", vec![]).quiet().quiet);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_exit_codes() {
        let runner = SystemRunner::new();
        let ok = runner
            .run(&Invocation::new("true", vec![]).quiet())
            .await
            .unwrap();
        assert!(ok.success());

        let failed = runner
            .run(&Invocation::new("sh", vec!["-c".into(), "exit 3".into()]).quiet())
            .await
            .unwrap();
        assert_eq!(failed.code, Some(3));
    }

    #[tokio::test]
    async fn test_system_runner_missing_program() {
        let runner = SystemRunner::new();
        let result = runner
            .run(&Invocation::new("stackup-definitely-not-a-binary", vec![]).quiet())
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_stdout_target() {
        let loud = Invocation::new("brew", vec!["install".into(), "git".into()]);
        let quiet = loud.clone().quiet();

        assert_eq!(SystemRunner::new().stdout_target(&loud), StdoutTarget::Inherit);
        assert_eq!(
            SystemRunner::stdout_to_stderr().stdout_target(&loud),
            StdoutTarget::Stderr
        );
        assert_eq!(
            SystemRunner::stdout_to_stderr().stdout_target(&quiet),
            StdoutTarget::Discard
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdout_to_stderr_runs_child() {
        let runner = SystemRunner::stdout_to_stderr();
        let outcome = runner
            .run(&Invocation::new("sh", vec!["-c".into(), "echo hello".into()]))
            .await
            .unwrap();
        assert!(outcome.success());
    }
}
