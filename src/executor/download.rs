//! Download-and-run installer strategy.

use std::path::{Path, PathBuf};

use reqwest::{Client, Url};
use tokio::io::AsyncWriteExt;

use crate::config::{PlatformConfig, Tool};
use crate::error::{Result, StackupError};
use crate::report::Event;
use crate::utils::format_bytes;

use super::command::CommandExecutor;
use super::launcher::{InstallerKind, LaunchContext, LauncherRegistry};

/// File name for a downloaded installer: `<tool>.<type>` when a type is
/// declared, else the last URL path segment, else `<tool>.installer`.
pub fn determine_filename(url: &str, tool: &str, file_type: Option<&str>) -> String {
    if let Some(ext) = file_type.filter(|t| !t.is_empty()) {
        return format!("{}.{}", tool, ext.trim_start_matches('.'));
    }

    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("{}.installer", tool))
}

pub struct DownloadInstaller {
    client: Client,
    executor: CommandExecutor,
    registry: LauncherRegistry,
    temp_root: Option<PathBuf>,
}

impl DownloadInstaller {
    pub fn new(client: Client, executor: CommandExecutor, registry: LauncherRegistry) -> Self {
        Self {
            client,
            executor,
            registry,
            temp_root: None,
        }
    }

    /// Create download directories under `root` instead of the system temp dir
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    /// Download the installer at `url` and run it.
    ///
    /// The download directory is removed before this returns, whatever the
    /// outcome.
    pub async fn install(&self, tool: &Tool, platform: &PlatformConfig, url: &str) -> Result<()> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("stackup-");
        let workdir = match &self.temp_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        tracing::debug!("Download directory: {}", workdir.path().display());

        let filename = determine_filename(url, &tool.name, platform.file_type.as_deref());
        let path = workdir.path().join(&filename);

        self.fetch(url, &path).await?;

        let kind = InstallerKind::resolve(platform.file_type.as_deref(), &filename);
        let launcher = self.registry.get(kind)?;
        tracing::debug!("Launching {} as {}", filename, kind);

        let ctx = LaunchContext {
            path: &path,
            tool,
            platform,
        };
        let commands = launcher.prepare(&ctx)?;
        let result = self.executor.run(&commands, "Installer").await;

        let cleanup = launcher.cleanup(&ctx);
        if let Err(e) = self.executor.run(&cleanup, "Cleanup").await {
            tracing::warn!("Installer cleanup failed: {}", e);
        }

        result
    }

    async fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        self.executor
            .reporter()
            .report(Event::info(format!("Downloading installer from {}...", url)));

        let mut response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StackupError::Download(format!(
                "bad status from {}: {}",
                url, status
            )));
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut downloaded: u64 = 0;

        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
        }
        file.flush().await?;

        tracing::debug!("Wrote {} bytes to {}", downloaded, dest.display());
        self.executor.reporter().report(Event::info(format!(
            "Downloaded {}",
            format_bytes(downloaded)
        )));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Command;
    use crate::executor::launcher::InstallerLauncher;
    use crate::executor::process::testing::ScriptedRunner;
    use crate::platform::{HostSystem, OsKind};
    use crate::report::testing::RecordingReporter;
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn installer(runner: Arc<ScriptedRunner>, root: &Path) -> DownloadInstaller {
        let executor = CommandExecutor::new(
            HostSystem::new(OsKind::Linux, "x86_64", None),
            runner,
            Arc::new(RecordingReporter::new()),
        );
        DownloadInstaller::new(Client::new(), executor, LauncherRegistry::with_defaults())
            .with_temp_root(root)
    }

    fn tool(name: &str) -> Tool {
        Tool {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn is_empty_dir(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    #[test]
    fn test_filename_precedence() {
        assert_eq!(
            determine_filename("https://example.com/dl/setup.exe", "docker", Some("msi")),
            "docker.msi"
        );
        assert_eq!(
            determine_filename("https://example.com/dl/setup.exe?x=1", "docker", None),
            "setup.exe"
        );
        assert_eq!(
            determine_filename("https://example.com/releases/tool.deb/", "tool", None),
            "tool.deb"
        );
        assert_eq!(determine_filename("https://example.com", "tool", None), "tool.installer");
        assert_eq!(determine_filename("not a url", "tool", Some("")), "tool.installer");
    }

    #[tokio::test]
    async fn test_downloads_and_runs_script() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/install.sh"))
            .respond_with(ResponseTemplate::new(200).set_body_string("#!/bin/sh\necho hi\n"))
            .mount(&server)
            .await;

        let root = tempfile::tempdir().unwrap();
        let runner = Arc::new(ScriptedRunner::new());
        let downloads = installer(runner.clone(), root.path());

        let url = format!("{}/install.sh", server.uri());
        downloads
            .install(&tool("fnm"), &PlatformConfig::default(), &url)
            .await
            .unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "bash");
        assert!(calls[0].args[0].ends_with("install.sh"));
        assert!(is_empty_dir(root.path()), "download directory was not removed");
    }

    #[tokio::test]
    async fn test_bad_status_is_download_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let root = tempfile::tempdir().unwrap();
        let runner = Arc::new(ScriptedRunner::new());
        let downloads = installer(runner.clone(), root.path());

        let url = format!("{}/missing.exe", server.uri());
        let err = downloads
            .install(&tool("x"), &PlatformConfig::default(), &url)
            .await
            .unwrap_err();

        assert!(matches!(err, StackupError::Download(_)));
        assert!(runner.calls().is_empty());
        assert!(is_empty_dir(root.path()));
    }

    #[tokio::test]
    async fn test_failed_installer_still_cleans_up() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 2048]))
            .mount(&server)
            .await;

        let root = tempfile::tempdir().unwrap();
        let runner = Arc::new(ScriptedRunner::new().fail_on("dpkg"));
        let downloads = installer(runner.clone(), root.path());

        let platform = PlatformConfig {
            file_type: Some("deb".into()),
            ..Default::default()
        };
        let url = format!("{}/download", server.uri());
        let err = downloads
            .install(&tool("code"), &platform, &url)
            .await
            .unwrap_err();

        assert!(matches!(err, StackupError::CommandFailed { .. }));
        let lines = runner.command_lines();
        assert!(lines[0].starts_with("sudo dpkg -i "));
        assert!(lines[0].ends_with("code.deb"));
        assert!(is_empty_dir(root.path()));
    }

    #[tokio::test]
    async fn test_dmg_is_detached_when_copy_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 64]))
            .mount(&server)
            .await;

        let root = tempfile::tempdir().unwrap();
        let runner = Arc::new(ScriptedRunner::new().fail_on("cp -R"));
        let downloads = installer(runner.clone(), root.path());

        let platform = PlatformConfig {
            file_type: Some("dmg".into()),
            ..Default::default()
        };
        let url = format!("{}/app.dmg", server.uri());
        let err = downloads
            .install(&tool("iterm"), &platform, &url)
            .await
            .unwrap_err();

        assert!(matches!(err, StackupError::CommandFailed { .. }));
        let lines = runner.command_lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("hdiutil attach"));
        assert!(lines[1].contains("cp -R"));
        assert!(lines[2].starts_with("hdiutil detach -force "));
        assert!(is_empty_dir(root.path()));
    }

    /// Records the size of the file it is handed.
    struct SizeCheckLauncher {
        seen: std::sync::Mutex<Option<u64>>,
    }

    impl InstallerLauncher for Arc<SizeCheckLauncher> {
        fn kind(&self) -> InstallerKind {
            InstallerKind::Generic
        }

        fn prepare(&self, ctx: &LaunchContext<'_>) -> Result<Vec<Command>> {
            let len = std::fs::metadata(ctx.path)?.len();
            *self.seen.lock().unwrap() = Some(len);
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_large_body_written_in_full() {
        let body: Vec<u8> = (0..3 * 1024 * 1024u32).map(|i| (i % 251) as u8).collect();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
            .mount(&server)
            .await;

        let launcher = Arc::new(SizeCheckLauncher {
            seen: std::sync::Mutex::new(None),
        });
        let mut registry = LauncherRegistry::new();
        registry.register(launcher.clone());

        let reporter = Arc::new(RecordingReporter::new());
        let executor = CommandExecutor::new(
            HostSystem::new(OsKind::Linux, "x86_64", None),
            Arc::new(ScriptedRunner::new()),
            reporter.clone(),
        );
        let root = tempfile::tempdir().unwrap();
        let downloads = DownloadInstaller::new(Client::new(), executor, registry)
            .with_temp_root(root.path());

        let url = format!("{}/tool", server.uri());
        downloads
            .install(&tool("tool"), &PlatformConfig::default(), &url)
            .await
            .unwrap();

        assert_eq!(*launcher.seen.lock().unwrap(), Some(body.len() as u64));
        assert!(reporter.infos().contains(&"Downloaded 3.0 MB".to_string()));
    }
}
