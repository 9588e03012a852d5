//! Checks run before anything is installed.

use reqwest::Client;

use crate::error::{Result, StackupError};
use crate::platform::HostSystem;
use crate::report::{Event, Reporter};

#[cfg(unix)]
fn running_as_root() -> bool {
    nix::unistd::Uid::effective().is_root()
}

#[cfg(not(unix))]
fn running_as_root() -> bool {
    false
}

/// Warnings about the host that do not stop the run.
fn host_warnings(system: &HostSystem, is_root: bool) -> Vec<&'static str> {
    let mut warnings = Vec::new();
    if system.os.supports_elevation() && !is_root {
        warnings.push("Not running as root - some installations may require sudo");
    }
    if !system.has_package_manager() {
        warnings.push("No package manager detected - will use direct downloads");
    }
    warnings
}

/// GET `url`; any response at all counts as connectivity.
pub async fn check_connectivity(client: &Client, url: &str) -> Result<()> {
    match client.get(url).send().await {
        Ok(response) => {
            tracing::debug!("Connectivity probe {} -> {}", url, response.status());
            Ok(())
        }
        Err(e) => Err(StackupError::NoInternet(e.to_string())),
    }
}

pub async fn run_preflight(
    client: &Client,
    system: &HostSystem,
    connectivity_url: &str,
    reporter: &dyn Reporter,
) -> Result<()> {
    reporter.report(Event::info("Running preflight checks..."));

    for warning in host_warnings(system, running_as_root()) {
        reporter.report(Event::warning(None, warning));
    }

    check_connectivity(client, connectivity_url).await?;

    reporter.report(Event::success(None, "Preflight checks passed"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{OsKind, PackageManager};
    use crate::report::testing::RecordingReporter;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_host_warnings() {
        let linux = HostSystem::new(OsKind::Linux, "x86_64", Some(PackageManager::Apt));
        assert_eq!(host_warnings(&linux, false).len(), 1);
        assert!(host_warnings(&linux, true).is_empty());

        // no root concept on Windows
        let windows = HostSystem::new(OsKind::Windows, "x86_64", None);
        let warnings = host_warnings(&windows, false);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("No package manager"));
    }

    #[tokio::test]
    async fn test_connectivity_any_status_passes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        check_connectivity(&Client::new(), &server.uri()).await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_is_no_internet() {
        let err = check_connectivity(&Client::new(), "http://127.0.0.1:1/")
            .await
            .unwrap_err();
        assert!(matches!(err, StackupError::NoInternet(_)));
    }

    #[tokio::test]
    async fn test_preflight_reports_pass() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let reporter = RecordingReporter::new();
        let system = HostSystem::new(OsKind::Windows, "x86_64", Some(PackageManager::Winget));
        run_preflight(&Client::new(), &system, &server.uri(), &reporter)
            .await
            .unwrap();

        let events = reporter.events();
        assert_eq!(events.first(), Some(&Event::info("Running preflight checks...")));
        assert_eq!(
            events.last(),
            Some(&Event::success(None, "Preflight checks passed"))
        );
        assert!(reporter.warnings().is_empty());
    }
}
