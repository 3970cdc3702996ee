//! HTTP handlers for registration, verification, login, and password
//! recovery. Each handler validates input, runs the pure transition checks
//! from `verification`, and commits through the guarded store operations.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::verification::{
    check_code, ensure_can_issue, registration_conflict, validate_email, validate_registration,
    CodeKind, MIN_PASSWORD_LEN,
};
use crate::auth::{code, password, session, store};
use crate::errors::AppError;
use crate::mailer::{dispatch_code, CodePurpose};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RegisterBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, rename = "fullName")]
    pub full_name: String,
}

/// POST /api/users/register
///
/// Creates an unverified account and sends the initial verification code.
/// An existing unverified account for the same email is replaced; a verified
/// one blocks registration. The code is dispatched before it is committed,
/// so a failed send never strands a code the user never saw.
pub async fn handle_register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<(StatusCode, Json<ApiResponse<()>>), AppError> {
    let reg = validate_registration(&body.email, &body.password, &body.full_name)?;

    let existing = store::find_by_email(&state.db, &reg.email).await?;
    if let Some(stale_id) = registration_conflict(existing.as_ref())? {
        store::delete_by_id(&state.db, stale_id).await?;
    }

    let password_hash = password::hash_password(&reg.password)?;
    let user = store::create(&state.db, &reg.email, &password_hash, &reg.full_name).await?;

    let now = Utc::now();
    let pending = code::generate(now);
    dispatch_code(
        state.mailer.as_ref(),
        &user.email,
        &pending.code,
        CodePurpose::AccountVerification,
    )
    .await?;
    let committed =
        store::commit_code(&state.db, user.id, CodeKind::EmailVerify, &pending, now).await?;
    if !committed {
        return Err(code_commit_miss(CodeKind::EmailVerify));
    }

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::message("User account created successfully")),
    ))
}

#[derive(Deserialize)]
pub struct EmailBody {
    #[serde(default)]
    pub email: String,
}

/// POST /api/users/sendverification
///
/// Issues (or reissues) a verification code. A new code immediately
/// invalidates the previous one, but only once dispatch succeeded.
pub async fn handle_send_verification(
    State(state): State<AppState>,
    Json(body): Json<EmailBody>,
) -> Result<(StatusCode, Json<ApiResponse<()>>), AppError> {
    issue_code(&state, &body.email, CodeKind::EmailVerify).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::message("Verification code sent successfully")),
    ))
}

/// POST /api/users/requestRecoveryCode
///
/// Password-reset mirror of `handle_send_verification`.
pub async fn handle_request_recovery_code(
    State(state): State<AppState>,
    Json(body): Json<EmailBody>,
) -> Result<(StatusCode, Json<ApiResponse<()>>), AppError> {
    issue_code(&state, &body.email, CodeKind::PasswordReset).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::message("Recovery code sent successfully")),
    ))
}

/// Shared issue/resend path for both code kinds: check preconditions and the
/// server-side cooldown, dispatch first, commit only after a successful send.
async fn issue_code(state: &AppState, email: &str, kind: CodeKind) -> Result<(), AppError> {
    let email = validate_email(email)?;
    let user = store::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| AppError::NotFound("User with this email is not found".to_string()))?;

    let now = Utc::now();
    ensure_can_issue(&user, kind, now)?;

    let purpose = match kind {
        CodeKind::EmailVerify => CodePurpose::AccountVerification,
        CodeKind::PasswordReset => CodePurpose::PasswordReset,
    };
    let pending = code::generate(now);
    dispatch_code(state.mailer.as_ref(), &user.email, &pending.code, purpose).await?;
    let committed = store::commit_code(&state.db, user.id, kind, &pending, now).await?;
    if !committed {
        return Err(code_commit_miss(kind));
    }
    Ok(())
}

/// Error for a code commit whose guard matched no row: the account was
/// verified concurrently (email flow) or deleted concurrently (reset flow).
/// A miss must never surface as success.
fn code_commit_miss(kind: CodeKind) -> AppError {
    match kind {
        CodeKind::EmailVerify => AppError::AlreadyVerified,
        CodeKind::PasswordReset => {
            AppError::NotFound("User with this email is not found".to_string())
        }
    }
}

#[derive(Deserialize)]
pub struct VerifyEmailBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub code: String,
}

/// POST /api/users/verifyemail
///
/// PendingVerification → Verified on an exact, unexpired code match. Wrong
/// guesses bump the per-account attempt counter; all failures leave the
/// account unchanged.
pub async fn handle_verify_email(
    State(state): State<AppState>,
    Json(body): Json<VerifyEmailBody>,
) -> Result<(StatusCode, Json<ApiResponse<()>>), AppError> {
    let email = validate_email(&body.email)?;
    if body.code.is_empty() {
        return Err(AppError::Validation(
            "Email and verification code are required".to_string(),
        ));
    }

    let user = store::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| AppError::NotFound("User with this email is not found".to_string()))?;

    let now = Utc::now();
    if let Err(e) = check_code(&user, CodeKind::EmailVerify, &body.code, now) {
        if matches!(e, AppError::InvalidCode) {
            store::record_failed_attempt(&state.db, user.id).await?;
        }
        return Err(e);
    }

    // Guarded commit; a concurrent verify or resend that won the race shows
    // up as a miss here.
    let committed = store::mark_verified(&state.db, user.id, &body.code, now).await?;
    if !committed {
        return Err(AppError::AlreadyVerified);
    }

    Ok((
        StatusCode::OK,
        Json(ApiResponse::message("Email verified successfully")),
    ))
}

#[derive(Deserialize)]
pub struct ResetPasswordBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub code: String,
    #[serde(default, rename = "newPassword")]
    pub new_password: String,
}

/// POST /api/users/resetPassword
///
/// Same machine as email verification, run against the reset code pair, then
/// overwrites the password hash.
pub async fn handle_reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordBody>,
) -> Result<(StatusCode, Json<ApiResponse<()>>), AppError> {
    let email = validate_email(&body.email)?;
    if body.code.is_empty() {
        return Err(AppError::Validation(
            "Email and recovery code are required".to_string(),
        ));
    }
    let new_password = body.new_password.trim();
    if new_password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }

    let user = store::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| AppError::NotFound("User with this email is not found".to_string()))?;

    let now = Utc::now();
    if let Err(e) = check_code(&user, CodeKind::PasswordReset, &body.code, now) {
        if matches!(e, AppError::InvalidCode) {
            store::record_failed_attempt(&state.db, user.id).await?;
        }
        return Err(e);
    }

    let new_hash = password::hash_password(new_password)?;
    let committed =
        store::commit_password_reset(&state.db, user.id, &new_hash, &body.code, now).await?;
    if !committed {
        return Err(AppError::Expired);
    }

    Ok((
        StatusCode::OK,
        Json(ApiResponse::message("Password reset successfully")),
    ))
}

#[derive(Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginData {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
}

/// POST /api/users/login
///
/// Preconditions: account exists, is verified, password matches. Unverified
/// accounts get a distinct 403 so clients can route to the verification
/// screen. Success sets the refreshToken cookie.
pub async fn handle_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginBody>,
) -> Result<(CookieJar, (StatusCode, Json<ApiResponse<LoginData>>)), AppError> {
    if body.email.trim().is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }
    if body.password.is_empty() {
        return Err(AppError::Validation("Password is required".to_string()));
    }

    let email = crate::auth::verification::normalize_email(&body.email);
    let user = store::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| AppError::NotFound("User with this email does not exist".to_string()))?;

    if !user.is_verified {
        return Err(AppError::Unverified);
    }
    if !password::verify_password(&body.password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let token = session::mint_refresh_token(user.id, &state.config.refresh_token_secret, Utc::now())?;
    let jar = jar.add(session::session_cookie(token, state.config.production));

    Ok((
        jar,
        (
            StatusCode::OK,
            Json(ApiResponse::ok(
                "Login successful",
                LoginData { user_id: user.id },
            )),
        ),
    ))
}
