//! One-time verification code generation.
//!
//! Codes are 6-digit numeric strings drawn uniformly from [100000, 999999]
//! with a 2-minute validity window. Randomness comes from the OS CSPRNG so a
//! code cannot be predicted within its window even without guess throttling.

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, Rng};

/// Validity window for an issued code.
pub const CODE_TTL_MINUTES: i64 = 2;

/// Minimum interval between two code issuances for the same account,
/// enforced server-side.
pub const RESEND_COOLDOWN_SECONDS: i64 = 60;

/// Wrong guesses allowed before the pending code is locked out.
pub const MAX_FAILED_ATTEMPTS: i32 = 5;

/// A freshly issued code and its expiry instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCode {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Generates a new 6-digit code expiring `CODE_TTL_MINUTES` from `now`.
pub fn generate(now: DateTime<Utc>) -> PendingCode {
    let code: u32 = OsRng.gen_range(100_000..=999_999);
    PendingCode {
        code: code.to_string(),
        expires_at: now + Duration::minutes(CODE_TTL_MINUTES),
    }
}
