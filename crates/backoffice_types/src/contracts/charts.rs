use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of a ranking chart. Ranking itself is computed by the api
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartEntry {
    pub id: String,
    pub rank: u32,
    pub title: String,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub previous_rank: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChartEntry {
    /// Positive when the entry climbed since the previous chart
    pub fn rank_change(&self) -> Option<i64> {
        self.previous_rank
            .map(|previous| previous as i64 - self.rank as i64)
    }
}
