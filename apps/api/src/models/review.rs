use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A stored review result. Either `resume_id` (saved draft) or `file_name`
/// (uploaded document) identifies what was reviewed; at least one must be
/// present. `sections` holds the per-section scores and feedback as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReviewRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub resume_id: Option<Uuid>,
    pub file_name: Option<String>,
    pub overall_score: i32,
    pub sections: Value,
    pub keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
}
