pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::resume::handlers as resumes;
use crate::review;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Accounts
        .route("/api/users/register", post(auth::handle_register))
        .route("/api/users/login", post(auth::handle_login))
        .route(
            "/api/users/sendverification",
            post(auth::handle_send_verification),
        )
        .route("/api/users/verifyemail", post(auth::handle_verify_email))
        .route(
            "/api/users/requestRecoveryCode",
            post(auth::handle_request_recovery_code),
        )
        .route("/api/users/resetPassword", post(auth::handle_reset_password))
        // Resume drafts
        .route(
            "/api/resumes",
            post(resumes::handle_create_resume).get(resumes::handle_list_resumes),
        )
        .route("/api/resumes/:id", get(resumes::handle_get_resume))
        .route(
            "/api/resumes/:id/updates",
            post(resumes::handle_apply_updates),
        )
        .route(
            "/api/resumes/:id/render",
            post(resumes::handle_render_resume),
        )
        // Reviews
        .route(
            "/api/reviews",
            post(review::handle_create_review).get(review::handle_list_reviews),
        )
        .with_state(state)
}
