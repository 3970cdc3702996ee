use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One registered account. Email is stored normalized (trimmed, lowercased)
/// and is unique. `verify_code`/`verify_code_expires` are set only while the
/// account awaits email verification; `reset_code`/`reset_code_expires` only
/// while a password reset is pending. `failed_attempts` counts wrong code
/// guesses since the last issued code.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_verified: bool,
    pub verify_code: Option<String>,
    pub verify_code_expires: Option<DateTime<Utc>>,
    pub reset_code: Option<String>,
    pub reset_code_expires: Option<DateTime<Utc>>,
    pub failed_attempts: i32,
    /// When the most recent code (of either kind) was issued; drives the
    /// server-side resend cooldown.
    pub code_requested_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
