use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A QR code issued for a campaign. Scanning and verification happen server side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCode {
    pub id: String,
    pub code: String,
    #[serde(default)]
    pub campaign: Option<String>,
    #[serde(default)]
    pub points: Option<i64>,
    #[serde(default)]
    pub max_scans: Option<u32>,
    #[serde(default)]
    pub scan_count: u32,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQrCodeRequest {
    pub campaign: String,
    pub points: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_scans: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}
