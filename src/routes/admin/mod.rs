pub mod routes;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Re-export the spec entry type from the aggregation module
pub use crate::aggregation::CountEntry;

// MODELS

#[derive(Debug, Deserialize)]
pub struct AdminDataRequest {
    pub entries: Vec<CountEntry>,
}

#[derive(Debug, Serialize)]
pub struct AdminDataResponse {
    pub page_stats: Vec<PageStats>,
}

#[derive(Debug, Serialize)]
pub struct PageStats {
    pub label: String,
    pub total: i64,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct FlagOverview {
    pub id: Uuid,
    pub key: String,
    pub name: String,
    pub enabled: bool,
    pub rollout_percentage: i32,
    pub updated_at: DateTime<Utc>,
}
