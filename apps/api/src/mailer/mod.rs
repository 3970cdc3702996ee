//! Outbound email: delivers one-time codes to registrants.
//!
//! `AppState` holds an `Arc<dyn CodeMailer>`. Production uses SMTP via
//! lettre; when SMTP is not configured (local dev) a logging no-op stands in
//! so the flows stay exercisable. Tests inject their own impl.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, Message},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};
use tracing::warn;

use crate::config::SmtpConfig;
use crate::errors::AppError;

/// What the code being delivered is for; selects subject and wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePurpose {
    AccountVerification,
    PasswordReset,
}

impl CodePurpose {
    fn subject(self) -> &'static str {
        match self {
            CodePurpose::AccountVerification => "Your Account Verification Code",
            CodePurpose::PasswordReset => "Your Password Reset Code",
        }
    }

    fn lead_in(self) -> &'static str {
        match self {
            CodePurpose::AccountVerification => {
                "Use the verification code below to complete your registration:"
            }
            CodePurpose::PasswordReset => {
                "Use the code below to reset your account password:"
            }
        }
    }
}

/// Contract of the notification dispatcher: deliver `code` to `to`.
#[async_trait]
pub trait CodeMailer: Send + Sync {
    async fn send_code(&self, to: &str, code: &str, purpose: CodePurpose) -> Result<()>;
}

/// Sends a code, retrying once on failure before surfacing `DeliveryError`.
pub async fn dispatch_code(
    mailer: &dyn CodeMailer,
    to: &str,
    code: &str,
    purpose: CodePurpose,
) -> Result<(), AppError> {
    if let Err(first) = mailer.send_code(to, code, purpose).await {
        warn!("Code delivery to {to} failed, retrying once: {first:#}");
        mailer
            .send_code(to, code, purpose)
            .await
            .map_err(|e| AppError::Delivery(format!("{e:#}")))?;
    }
    Ok(())
}

/// Builds the dispatcher from config: SMTP when configured, log-only otherwise.
pub fn build_mailer(smtp: Option<&SmtpConfig>) -> Result<Arc<dyn CodeMailer>> {
    match smtp {
        Some(config) => Ok(Arc::new(SmtpMailer::new(config)?)),
        None => {
            warn!("SMTP not configured, verification codes will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}

/// SMTP dispatcher backed by lettre.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .context("SMTP relay setup failed")?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();
        let from = config
            .from_address
            .parse()
            .context("SMTP_FROM is not a valid mailbox")?;
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl CodeMailer for SmtpMailer {
    async fn send_code(&self, to: &str, code: &str, purpose: CodePurpose) -> Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse().context("recipient is not a valid mailbox")?)
            .subject(purpose.subject())
            .header(ContentType::TEXT_HTML)
            .body(code_email_body(code, purpose))
            .context("failed to build email")?;
        self.transport
            .send(message)
            .await
            .context("SMTP send failed")?;
        Ok(())
    }
}

/// Logs the code instead of sending it. Local development only.
pub struct LogMailer;

#[async_trait]
impl CodeMailer for LogMailer {
    async fn send_code(&self, to: &str, code: &str, purpose: CodePurpose) -> Result<()> {
        tracing::info!("[dev mailer] {:?} code for {to}: {code}", purpose);
        Ok(())
    }
}

fn code_email_body(code: &str, purpose: CodePurpose) -> String {
    format!(
        r#"<div style="font-family: sans-serif; max-width: 600px; margin: auto; padding: 24px;">
  <h2>{subject}</h2>
  <p>{lead_in}</p>
  <div style="text-align: center; margin: 30px 0;">
    <span style="font-size: 24px; font-weight: 600; letter-spacing: 2px;">{code}</span>
  </div>
  <p>This code will expire in <strong>2 minutes</strong>. If you did not request it,
  please ignore this email.</p>
  <p>Never share this code with anyone, including our staff.</p>
</div>"#,
        subject = purpose.subject(),
        lead_in = purpose.lead_in(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails the first `fail_first` sends, then succeeds.
    struct FlakyMailer {
        fail_first: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CodeMailer for FlakyMailer {
        async fn send_code(&self, _to: &str, _code: &str, _purpose: CodePurpose) -> Result<()> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_first {
                anyhow::bail!("transient SMTP failure")
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn dispatch_retries_once_on_transient_failure() {
        let mailer = FlakyMailer {
            fail_first: 1,
            calls: AtomicUsize::new(0),
        };
        let result = dispatch_code(&mailer, "a@x.com", "123456", CodePurpose::AccountVerification)
            .await;
        assert!(result.is_ok());
        assert_eq!(mailer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn dispatch_surfaces_delivery_error_after_retry() {
        let mailer = FlakyMailer {
            fail_first: 2,
            calls: AtomicUsize::new(0),
        };
        let result =
            dispatch_code(&mailer, "a@x.com", "123456", CodePurpose::PasswordReset).await;
        assert!(matches!(result, Err(AppError::Delivery(_))));
        assert_eq!(mailer.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn email_body_contains_code_and_expiry_note() {
        let body = code_email_body("123456", CodePurpose::AccountVerification);
        assert!(body.contains("123456"));
        assert!(body.contains("2 minutes"));
    }
}
