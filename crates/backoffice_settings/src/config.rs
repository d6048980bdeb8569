use backoffice_error::SettingsError;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_DEV_API_URL: &str = "http://localhost:8080/api";
const DEFAULT_STATE_DIR: &str = "./.backoffice_state";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_VERSION_POLL_SECS: u64 = 60;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum AppEnv {
    Development,
    Production,
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppEnv::Development => write!(f, "development"),
            AppEnv::Production => write!(f, "production"),
        }
    }
}

impl FromStr for AppEnv {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(AppEnv::Development),
            "production" | "prod" => Ok(AppEnv::Production),
            _ => Err(SettingsError::Error(format!(
                "Unsupported app environment: {}",
                s
            ))),
        }
    }
}

/// ApiSettings for use with the api client. Credentials are passed per call
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

/// Settings for the multipart upload workflow.
/// `part_size` of `None` uploads every file as a single part
#[derive(Debug, Clone, Default)]
pub struct UploadSettings {
    pub part_size: Option<usize>,
}

/// BackofficeConfig is the primary configuration struct for the console.
/// Values are read from the environment, falling back to development defaults.
#[derive(Debug, Clone)]
pub struct BackofficeConfig {
    pub app_name: String,
    pub app_env: AppEnv,
    pub app_version: String,
    pub dev_api_url: String,
    pub prod_api_url: String,
    pub api_url_override: Option<String>,
    pub auth_token: String,
    pub state_dir: PathBuf,
    pub timeout_secs: u64,
    pub upload_part_size: Option<usize>,
    pub version_poll_secs: u64,
    pub log_level: String,
}

fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Default for BackofficeConfig {
    fn default() -> Self {
        BackofficeConfig {
            app_name: "backoffice".to_string(),
            app_env: env::var("APP_ENV")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(AppEnv::Development),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            dev_api_url: env::var("BACKOFFICE_DEV_API_URL")
                .unwrap_or_else(|_| DEFAULT_DEV_API_URL.to_string()),
            prod_api_url: env::var("BACKOFFICE_PROD_API_URL").unwrap_or_default(),
            api_url_override: env::var("BACKOFFICE_API_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            auth_token: env::var("BACKOFFICE_AUTH_TOKEN").unwrap_or_default(),
            state_dir: PathBuf::from(
                env::var("BACKOFFICE_STATE_DIR").unwrap_or_else(|_| DEFAULT_STATE_DIR.to_string()),
            ),
            timeout_secs: parse_env("BACKOFFICE_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
            upload_part_size: env::var("BACKOFFICE_UPLOAD_PART_SIZE")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .filter(|size: &usize| *size > 0),
            version_poll_secs: parse_env("BACKOFFICE_VERSION_POLL_SECS", DEFAULT_VERSION_POLL_SECS),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl BackofficeConfig {
    pub fn new() -> Self {
        BackofficeConfig::default()
    }

    /// Base url of the REST api for the configured environment.
    /// An explicit override wins over the per-environment urls
    pub fn api_base_url(&self) -> Result<String, SettingsError> {
        let url = match &self.api_url_override {
            Some(url) => url.clone(),
            None => match self.app_env {
                AppEnv::Development => self.dev_api_url.clone(),
                AppEnv::Production => self.prod_api_url.clone(),
            },
        };

        let url = url.trim().trim_end_matches('/').to_string();
        if url.is_empty() {
            return Err(SettingsError::Error(format!(
                "No api url configured for the {} environment",
                self.app_env
            )));
        }

        Ok(url)
    }

    pub fn api_settings(&self) -> Result<ApiSettings, SettingsError> {
        Ok(ApiSettings {
            base_url: self.api_base_url()?,
            timeout_secs: self.timeout_secs,
        })
    }

    pub fn upload_settings(&self) -> UploadSettings {
        UploadSettings {
            part_size: self.upload_part_size,
        }
    }
}
