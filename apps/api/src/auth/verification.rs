//! Account verification state machine.
//!
//! An account moves Unregistered → PendingVerification → Verified; `Verified`
//! is terminal. Password recovery reuses the same machine against the reset
//! code pair, so both flows share one set of transition checks.
//!
//! All checks here are pure functions over the account row with the clock
//! passed in, so expiry boundaries and lockouts are unit-testable without a
//! database. Persistence (with its race-closing guards) lives in
//! `auth::store`; handlers wire the two together.

use std::sync::OnceLock;

use chrono::{DateTime, Duration, Utc};
use regex::Regex;

use crate::auth::code::{MAX_FAILED_ATTEMPTS, RESEND_COOLDOWN_SECONDS};
use crate::errors::AppError;
use crate::models::user::UserRow;

pub const MIN_PASSWORD_LEN: usize = 6;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"))
}

/// Which pending code pair a transition operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
    EmailVerify,
    PasswordReset,
}

impl CodeKind {
    /// The pending code and expiry for this kind on the given account.
    pub fn pending(self, user: &UserRow) -> (Option<&str>, Option<DateTime<Utc>>) {
        match self {
            CodeKind::EmailVerify => (user.verify_code.as_deref(), user.verify_code_expires),
            CodeKind::PasswordReset => (user.reset_code.as_deref(), user.reset_code_expires),
        }
    }
}

/// Normalizes an email for lookup and storage: trim, then lowercase.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// A validated, normalized registration request.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Validates raw registration input. Returns the normalized request or the
/// first validation failure.
pub fn validate_registration(
    email: &str,
    password: &str,
    full_name: &str,
) -> Result<Registration, AppError> {
    let email = normalize_email(email);
    let password = password.trim();
    let full_name = full_name.trim();

    if email.is_empty() || password.is_empty() || full_name.is_empty() {
        return Err(AppError::Validation("All fields are required".to_string()));
    }
    if !email_regex().is_match(&email) {
        return Err(AppError::Validation(
            "Please provide a valid email address".to_string(),
        ));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }

    Ok(Registration {
        email,
        password: password.to_string(),
        full_name: full_name.to_string(),
    })
}

/// Validates a bare email parameter (code request / verify endpoints).
pub fn validate_email(email: &str) -> Result<String, AppError> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }
    if !email_regex().is_match(&email) {
        return Err(AppError::Validation(
            "Please provide a valid email address".to_string(),
        ));
    }
    Ok(email)
}

/// Decides what registration does when an account already exists for the
/// (normalized) email: verified accounts block re-registration; an unverified
/// account is replaced, so its id is returned for deletion.
pub fn registration_conflict(existing: Option<&UserRow>) -> Result<Option<uuid::Uuid>, AppError> {
    match existing {
        None => Ok(None),
        Some(user) if user.is_verified => Err(AppError::Conflict(
            "User with this email already exists".to_string(),
        )),
        Some(user) => Ok(Some(user.id)),
    }
}

/// Checks whether a new code may be issued for the account.
///
/// Email-verification codes are refused once the account is verified
/// (terminal state). Both kinds honor the server-side resend cooldown.
pub fn ensure_can_issue(user: &UserRow, kind: CodeKind, now: DateTime<Utc>) -> Result<(), AppError> {
    if kind == CodeKind::EmailVerify && user.is_verified {
        return Err(AppError::AlreadyVerified);
    }
    if let Some(requested_at) = user.code_requested_at {
        if now < requested_at + Duration::seconds(RESEND_COOLDOWN_SECONDS) {
            return Err(AppError::TooManyAttempts);
        }
    }
    Ok(())
}

/// Validates a submitted code against the account's pending code of the given
/// kind. Returns `Ok(())` only when the transition may commit. Every failure
/// leaves the account state untouched; the caller records the failed attempt
/// for `InvalidCode` outcomes.
///
/// A code submitted at exactly its expiry instant is still accepted.
pub fn check_code(
    user: &UserRow,
    kind: CodeKind,
    submitted: &str,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if kind == CodeKind::EmailVerify && user.is_verified {
        return Err(AppError::AlreadyVerified);
    }
    if user.failed_attempts >= MAX_FAILED_ATTEMPTS {
        return Err(AppError::TooManyAttempts);
    }

    let (code, expires_at) = kind.pending(user);
    let (code, expires_at) = match (code, expires_at) {
        (Some(c), Some(e)) => (c, e),
        _ => return Err(AppError::Expired),
    };
    if now > expires_at {
        return Err(AppError::Expired);
    }
    if code != submitted {
        return Err(AppError::InvalidCode);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn make_user(verified: bool, code: Option<&str>, expires: Option<DateTime<Utc>>) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            full_name: "A".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            is_verified: verified,
            verify_code: code.map(str::to_string),
            verify_code_expires: expires,
            reset_code: None,
            reset_code_expires: None,
            failed_attempts: 0,
            code_requested_at: None,
            created_at: fixed_now(),
            updated_at: fixed_now(),
        }
    }

    #[test]
    fn registration_normalizes_email() {
        let reg = validate_registration("  A@X.Com ", "secret1", " A ").unwrap();
        assert_eq!(reg.email, "a@x.com");
        assert_eq!(reg.full_name, "A");
    }

    #[test]
    fn registration_rejects_blank_fields() {
        assert!(matches!(
            validate_registration("", "secret1", "A"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_registration("a@x.com", "   ", "A"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_registration("a@x.com", "secret1", ""),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn registration_rejects_malformed_email_and_short_password() {
        assert!(matches!(
            validate_registration("not-an-email", "secret1", "A"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_registration("a@x.com", "short", "A"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn reregistration_of_verified_account_is_conflict() {
        let user = make_user(true, None, None);
        assert!(matches!(
            registration_conflict(Some(&user)),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn reregistration_of_unverified_account_replaces_it() {
        let user = make_user(false, Some("123456"), Some(fixed_now()));
        let stale = registration_conflict(Some(&user)).unwrap();
        assert_eq!(stale, Some(user.id));
        assert_eq!(registration_conflict(None).unwrap(), None);
    }

    #[test]
    fn code_accepted_at_exact_expiry() {
        let now = fixed_now();
        let user = make_user(false, Some("123456"), Some(now));
        assert!(check_code(&user, CodeKind::EmailVerify, "123456", now).is_ok());
    }

    #[test]
    fn code_rejected_one_second_after_expiry() {
        let now = fixed_now();
        let user = make_user(false, Some("123456"), Some(now));
        let later = now + Duration::seconds(1);
        assert!(matches!(
            check_code(&user, CodeKind::EmailVerify, "123456", later),
            Err(AppError::Expired)
        ));
    }

    #[test]
    fn missing_code_reads_as_expired() {
        let user = make_user(false, None, None);
        assert!(matches!(
            check_code(&user, CodeKind::EmailVerify, "123456", fixed_now()),
            Err(AppError::Expired)
        ));
    }

    #[test]
    fn mismatched_code_is_invalid() {
        let now = fixed_now();
        let user = make_user(false, Some("123456"), Some(now + Duration::minutes(2)));
        assert!(matches!(
            check_code(&user, CodeKind::EmailVerify, "000000", now),
            Err(AppError::InvalidCode)
        ));
    }

    #[test]
    fn verified_account_cannot_verify_again() {
        let now = fixed_now();
        let user = make_user(true, None, None);
        assert!(matches!(
            check_code(&user, CodeKind::EmailVerify, "123456", now),
            Err(AppError::AlreadyVerified)
        ));
    }

    #[test]
    fn lockout_after_max_failed_attempts() {
        let now = fixed_now();
        let mut user = make_user(false, Some("123456"), Some(now + Duration::minutes(2)));
        user.failed_attempts = MAX_FAILED_ATTEMPTS;
        // Even the correct code is refused once locked.
        assert!(matches!(
            check_code(&user, CodeKind::EmailVerify, "123456", now),
            Err(AppError::TooManyAttempts)
        ));
    }

    #[test]
    fn reset_code_checked_against_reset_pair() {
        let now = fixed_now();
        let mut user = make_user(true, None, None);
        user.reset_code = Some("654321".to_string());
        user.reset_code_expires = Some(now + Duration::minutes(2));
        // Verified state does not block password reset.
        assert!(check_code(&user, CodeKind::PasswordReset, "654321", now).is_ok());
        assert!(matches!(
            check_code(&user, CodeKind::PasswordReset, "123456", now),
            Err(AppError::InvalidCode)
        ));
    }

    #[test]
    fn resend_cooldown_enforced() {
        let now = fixed_now();
        let mut user = make_user(false, Some("123456"), Some(now));
        user.code_requested_at = Some(now);
        assert!(matches!(
            ensure_can_issue(&user, CodeKind::EmailVerify, now + Duration::seconds(30)),
            Err(AppError::TooManyAttempts)
        ));
        assert!(ensure_can_issue(&user, CodeKind::EmailVerify, now + Duration::seconds(60)).is_ok());
    }

    #[test]
    fn verified_account_cannot_request_verification_code() {
        let user = make_user(true, None, None);
        assert!(matches!(
            ensure_can_issue(&user, CodeKind::EmailVerify, fixed_now()),
            Err(AppError::AlreadyVerified)
        ));
        // but may still request a password reset code
        assert!(ensure_can_issue(&user, CodeKind::PasswordReset, fixed_now()).is_ok());
    }
}
