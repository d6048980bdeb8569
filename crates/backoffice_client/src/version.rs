use crate::api::{BackofficeApiClient, RequestType, Routes};
use backoffice_error::ApiError;
use backoffice_types::VersionInfo;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionStatus {
    Current(VersionInfo),
    Stale {
        running: VersionInfo,
        latest: VersionInfo,
    },
}

/// Detects that a newer console build has been deployed.
///
/// The first version seen becomes the baseline; any later response with a
/// different build id marks the running console as stale.
#[derive(Debug, Clone)]
pub struct VersionWatcher {
    api_client: BackofficeApiClient,
    baseline: Option<VersionInfo>,
}

impl VersionWatcher {
    pub fn new(api_client: BackofficeApiClient) -> Self {
        Self {
            api_client,
            baseline: None,
        }
    }

    pub fn with_baseline(api_client: BackofficeApiClient, baseline: VersionInfo) -> Self {
        Self {
            api_client,
            baseline: Some(baseline),
        }
    }

    pub fn baseline(&self) -> Option<&VersionInfo> {
        self.baseline.as_ref()
    }

    /// The version endpoint is public, no auth header is sent
    pub async fn fetch(&self, cancel: &CancellationToken) -> Result<VersionInfo, ApiError> {
        let response = self
            .api_client
            .request(
                &Routes::Version.path(),
                RequestType::Get,
                None,
                None,
                None,
                cancel,
            )
            .await?;

        BackofficeApiClient::decode(response, cancel).await
    }

    pub async fn check(&mut self, cancel: &CancellationToken) -> Result<VersionStatus, ApiError> {
        let latest = self.fetch(cancel).await?;

        match &self.baseline {
            None => {
                debug!(build_id = %latest.build_id, "Recorded baseline version");
                self.baseline = Some(latest.clone());
                Ok(VersionStatus::Current(latest))
            }
            Some(running) if running.build_id == latest.build_id => {
                Ok(VersionStatus::Current(latest))
            }
            Some(running) => {
                info!(
                    running = %running.build_id,
                    latest = %latest.build_id,
                    "A newer console build is available"
                );
                Ok(VersionStatus::Stale {
                    running: running.clone(),
                    latest,
                })
            }
        }
    }

    /// Poll until a newer build shows up or `cancel` fires.
    /// `on_stale` is called once with the newer version before returning it.
    pub async fn watch<F: FnMut(&VersionInfo)>(
        &mut self,
        interval: Duration,
        cancel: &CancellationToken,
        mut on_stale: F,
    ) -> Option<VersionInfo> {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return None,
                _ = ticker.tick() => {}
            }

            match self.check(cancel).await {
                Ok(VersionStatus::Stale { latest, .. }) => {
                    on_stale(&latest);
                    return Some(latest);
                }
                Ok(VersionStatus::Current(_)) => {}
                Err(e) if e.is_cancelled() => return None,
                Err(e) => warn!("Version check failed: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::build_http_client;
    use backoffice_settings::ApiSettings;
    use mockito::{Server, ServerGuard};
    use serde_json::json;

    async fn setup() -> (ServerGuard, BackofficeApiClient) {
        let server = Server::new_async().await;
        let settings = ApiSettings {
            base_url: format!("{}/api", server.url()),
            timeout_secs: 5,
        };
        let client = build_http_client(&settings).unwrap();
        let api_client = BackofficeApiClient::new(&settings, &client);
        (server, api_client)
    }

    fn version(build_id: &str) -> VersionInfo {
        VersionInfo {
            version: "1.4.0".to_string(),
            build_id: build_id.to_string(),
            deployment_id: Some("dpl_1".to_string()),
            commit_sha: Some("9f2c1e7".to_string()),
            timestamp: Some("2026-10-01T12:00:00Z".to_string()),
        }
    }

    async fn mock_version(server: &mut ServerGuard, build_id: &str) -> mockito::Mock {
        server
            .mock("GET", "/api/version")
            .with_status(200)
            .with_body(json!({ "data": version(build_id) }).to_string())
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_first_check_sets_baseline() {
        let (mut server, api_client) = setup().await;
        let _mock = mock_version(&mut server, "B1").await;

        let mut watcher = VersionWatcher::new(api_client);
        let cancel = CancellationToken::new();

        assert_eq!(
            watcher.check(&cancel).await.unwrap(),
            VersionStatus::Current(version("B1"))
        );
        assert_eq!(watcher.baseline(), Some(&version("B1")));

        // same build again stays current
        assert!(matches!(
            watcher.check(&cancel).await.unwrap(),
            VersionStatus::Current(_)
        ));
    }

    #[tokio::test]
    async fn test_new_build_is_stale() {
        let (mut server, api_client) = setup().await;
        let _mock = mock_version(&mut server, "B2").await;

        let mut watcher = VersionWatcher::with_baseline(api_client, version("B1"));
        let status = watcher.check(&CancellationToken::new()).await.unwrap();

        assert_eq!(
            status,
            VersionStatus::Stale {
                running: version("B1"),
                latest: version("B2"),
            }
        );
    }

    #[tokio::test]
    async fn test_watch_reports_stale_once() {
        let (mut server, api_client) = setup().await;
        let _mock = mock_version(&mut server, "B2").await;

        let mut watcher = VersionWatcher::with_baseline(api_client, version("B1"));
        let mut seen = Vec::new();
        let latest = watcher
            .watch(Duration::from_millis(10), &CancellationToken::new(), |v| {
                seen.push(v.build_id.clone())
            })
            .await;

        assert_eq!(latest, Some(version("B2")));
        assert_eq!(seen, vec!["B2".to_string()]);
    }

    #[tokio::test]
    async fn test_watch_stops_on_cancel() {
        let (mut server, api_client) = setup().await;
        let _mock = mock_version(&mut server, "B1").await;

        let mut watcher = VersionWatcher::new(api_client);
        let cancel = CancellationToken::new();
        let stopper = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            stopper.cancel();
        });

        let latest = watcher
            .watch(Duration::from_millis(5), &cancel, |_| {})
            .await;
        assert_eq!(latest, None);
    }

    #[tokio::test]
    async fn test_watch_survives_failed_polls() {
        let (mut server, api_client) = setup().await;
        let _mock = server
            .mock("GET", "/api/version")
            .with_status(503)
            .create_async()
            .await;

        let mut watcher = VersionWatcher::new(api_client);
        let cancel = CancellationToken::new();
        let stopper = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            stopper.cancel();
        });

        assert_eq!(
            watcher.watch(Duration::from_millis(5), &cancel, |_| {}).await,
            None
        );
        assert!(watcher.baseline().is_none());
    }
}
