use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnniversaryRewardPolicy {
    pub id: String,
    pub anniversary_days: u32,
    pub reward_points: i64,
    #[serde(default)]
    pub is_active: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Creates a policy when `id` is empty, otherwise replaces it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardPolicyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub anniversary_days: u32,
    pub reward_points: i64,
    pub is_active: bool,
}
