//! Credential store: all persistence for account records.
//!
//! Mutations of the verification fields go through guarded UPDATEs whose
//! WHERE clauses re-check the transition's precondition, so two racing
//! requests cannot both commit a conflicting transition; callers inspect
//! `rows_affected` and treat a miss as losing the race.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::code::PendingCode;
use crate::auth::verification::CodeKind;
use crate::errors::AppError;
use crate::models::user::UserRow;

/// Looks up an account by (already normalized) email.
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>, AppError> {
    let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Creates a fresh unverified account.
pub async fn create(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    full_name: &str,
) -> Result<UserRow, AppError> {
    let user = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (email, full_name, password_hash)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(email)
    .bind(full_name)
    .bind(password_hash)
    .fetch_one(pool)
    .await
    .map_err(map_create_error)?;
    Ok(user)
}

/// Two concurrent registrations for the same new email both pass the
/// conflict pre-check; the loser hits the unique constraint here and gets
/// the same duplicate-account conflict instead of an internal error.
fn map_create_error(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict("User with this email already exists".to_string())
        }
        _ => AppError::Database(e),
    }
}

/// Deletes an account (re-registration of an unverified email).
pub async fn delete_by_id(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Commits a freshly issued code, replacing any prior pending code of the
/// same kind and resetting the guess counter. For email verification the
/// guard refuses to touch an account that was verified in the meantime.
/// Returns false when the guard did not match.
pub async fn commit_code(
    pool: &PgPool,
    user_id: Uuid,
    kind: CodeKind,
    pending: &PendingCode,
    now: DateTime<Utc>,
) -> Result<bool, AppError> {
    let query = match kind {
        CodeKind::EmailVerify => {
            r#"
            UPDATE users
            SET verify_code = $2, verify_code_expires = $3,
                failed_attempts = 0, code_requested_at = $4, updated_at = $4
            WHERE id = $1 AND NOT is_verified
            "#
        }
        CodeKind::PasswordReset => {
            r#"
            UPDATE users
            SET reset_code = $2, reset_code_expires = $3,
                failed_attempts = 0, code_requested_at = $4, updated_at = $4
            WHERE id = $1
            "#
        }
    };
    let result = sqlx::query(query)
        .bind(user_id)
        .bind(&pending.code)
        .bind(pending.expires_at)
        .bind(now)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Flips the account to verified and clears the pending code, guarded on the
/// submitted code still being the active one. Returns false when the guard
/// did not match (already verified, or the code was replaced concurrently).
pub async fn mark_verified(
    pool: &PgPool,
    user_id: Uuid,
    code: &str,
    now: DateTime<Utc>,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET is_verified = TRUE, verify_code = NULL, verify_code_expires = NULL,
            failed_attempts = 0, updated_at = $3
        WHERE id = $1 AND NOT is_verified AND verify_code = $2
        "#,
    )
    .bind(user_id)
    .bind(code)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Overwrites the password hash and clears the reset pair, guarded on the
/// submitted reset code still being the active one.
pub async fn commit_password_reset(
    pool: &PgPool,
    user_id: Uuid,
    new_password_hash: &str,
    code: &str,
    now: DateTime<Utc>,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET password_hash = $2, reset_code = NULL, reset_code_expires = NULL,
            failed_attempts = 0, updated_at = $3
        WHERE id = $1 AND reset_code = $4
        "#,
    )
    .bind(user_id)
    .bind(new_password_hash)
    .bind(now)
    .bind(code)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Bumps the wrong-guess counter after an `InvalidCode` outcome.
pub async fn record_failed_attempt(pool: &PgPool, user_id: Uuid) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET failed_attempts = failed_attempts + 1 WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[derive(Debug)]
    struct StubDbError {
        unique: bool,
    }

    impl std::fmt::Display for StubDbError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "stub database error")
        }
    }

    impl std::error::Error for StubDbError {}

    impl sqlx::error::DatabaseError for StubDbError {
        fn message(&self) -> &str {
            "stub database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            if self.unique {
                Some(Cow::Borrowed("23505"))
            } else {
                None
            }
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            if self.unique {
                sqlx::error::ErrorKind::UniqueViolation
            } else {
                sqlx::error::ErrorKind::Other
            }
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }
    }

    #[test]
    fn duplicate_email_insert_maps_to_conflict() {
        let e = sqlx::Error::Database(Box::new(StubDbError { unique: true }));
        assert!(matches!(map_create_error(e), AppError::Conflict(_)));
    }

    #[test]
    fn other_database_errors_stay_database_errors() {
        let e = sqlx::Error::Database(Box::new(StubDbError { unique: false }));
        assert!(matches!(map_create_error(e), AppError::Database(_)));
    }
}
