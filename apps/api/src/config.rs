use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Secret used to sign refresh tokens.
    pub refresh_token_secret: String,
    /// When true, session cookies are marked Secure.
    pub production: bool,
    pub smtp: Option<SmtpConfig>,
    pub port: u16,
    pub rust_log: String,
}

/// Outbound email settings. Absent in local development — the mailer
/// falls back to logging codes instead of sending them.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let smtp = match std::env::var("SMTP_HOST") {
            Ok(host) => Some(SmtpConfig {
                host,
                username: require_env("SMTP_USERNAME")?,
                password: require_env("SMTP_PASSWORD")?,
                from_address: require_env("SMTP_FROM")?,
            }),
            Err(_) => None,
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            refresh_token_secret: require_env("REFRESH_TOKEN_SECRET")?,
            production: std::env::var("APP_ENV")
                .map(|v| v == "production")
                .unwrap_or(false),
            smtp,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
