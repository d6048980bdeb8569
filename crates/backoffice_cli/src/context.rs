use anyhow::{Context as _, Result};
use backoffice_client::{build_http_client, BackofficeApiClient, MultipartUploader};
use backoffice_settings::BackofficeConfig;
use backoffice_state::{FileStorage, StateStorage, Stores};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Everything a command needs: the api client, the uploader and the
/// persisted stores, plus a token cancelled on ctrl-c.
pub struct Context {
    pub config: BackofficeConfig,
    pub api_client: BackofficeApiClient,
    pub uploader: MultipartUploader,
    pub stores: Stores,
    pub cancel: CancellationToken,
}

impl Context {
    pub fn new(config: BackofficeConfig) -> Result<Self> {
        let api_settings = config
            .api_settings()
            .context("Failed to resolve api settings")?;
        let client = build_http_client(&api_settings).context("Failed to build http client")?;
        let api_client = BackofficeApiClient::new(&api_settings, &client);
        let uploader = MultipartUploader::new(api_client.clone(), &config.upload_settings());

        let storage: Arc<dyn StateStorage> = Arc::new(FileStorage::new(&config.state_dir));
        let stores = Stores::new(storage);

        debug!(
            env = %config.app_env,
            base_url = %api_client.base_url(),
            state_dir = %config.state_dir.display(),
            "Console context ready"
        );

        Ok(Self {
            config,
            api_client,
            uploader,
            stores,
            cancel: CancellationToken::new(),
        })
    }

    pub fn auth_token(&self) -> &str {
        &self.config.auth_token
    }

    /// Cancel in-flight requests when the user hits ctrl-c
    pub fn cancel_on_interrupt(&self) {
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted, cancelling pending requests");
                cancel.cancel();
            }
        });
    }
}
