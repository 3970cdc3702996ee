use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::mailer::CodeMailer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Pluggable code dispatcher. SMTP in production, log-only when SMTP is
    /// not configured, a recording mock in tests.
    pub mailer: Arc<dyn CodeMailer>,
}
