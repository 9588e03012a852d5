//! Execution layer: spawning processes and the three ways of putting a tool
//! on the machine (command lists, package managers, downloaded installers).

mod command;
mod download;
mod launcher;
mod package;
mod process;

pub use command::CommandExecutor;
pub use download::DownloadInstaller;
pub use launcher::LauncherRegistry;
pub use package::PackageInstaller;
pub use process::{Invocation, ProcessRunner, SystemRunner};

#[cfg(test)]
pub(crate) use process::testing;
