/// Outbound mail boundary
///
/// The forgot-password flow hands a rendered reset-link email to this
/// boundary and otherwise ignores the outcome: callers always receive
/// the same generic success response regardless of delivery, to avoid
/// leaking account existence. Failures are logged only.
///
/// The production implementation posts to the Resend HTTP API. When no
/// mail configuration is present, [`NoopMailer`] logs the reset URL
/// instead (useful in development).

use crate::config::MailConfig;
use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

/// Error type for mail delivery
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// Transport-level failure talking to the mail provider
    #[error("Mail request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Mail provider rejected the request
    #[error("Mail provider rejected the request with status {0}")]
    Rejected(u16),
}

/// Boundary for sending reset-link emails
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends a password-reset email to one recipient
    async fn send_reset_email(&self, to: &str, name: &str, reset_url: &str)
        -> Result<(), MailError>;
}

/// Renders the reset email body
///
/// The link expires in one hour; the copy says so.
pub(crate) fn render_reset_email(name: &str, reset_url: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 480px; margin: auto;">
  <h2>Hi {name},</h2>
  <p>We received a request to reset your password.</p>
  <p>The link expires in <strong>1 hour</strong>.</p>
  <a href="{reset_url}"
     style="display:inline-block;padding:12px 24px;background:#4F46E5;color:#fff;
            border-radius:6px;text-decoration:none;font-weight:bold;">
    Reset password
  </a>
  <p style="margin-top:24px;color:#666;font-size:13px;">
    If you didn't request this, you can ignore this email.
  </p>
</div>"#
    )
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: String,
}

/// Mailer backed by the Resend HTTP API
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    from_address: String,
}

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

/// Subject line for reset emails
const RESET_SUBJECT: &str = "Password recovery - Taskboard";

impl ResendMailer {
    /// Creates a mailer from mail configuration
    pub fn new(config: MailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key,
            from_address: config.from_address,
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send_reset_email(
        &self,
        to: &str,
        name: &str,
        reset_url: &str,
    ) -> Result<(), MailError> {
        let body = SendEmailRequest {
            from: &self.from_address,
            to: [to],
            subject: RESET_SUBJECT,
            html: render_reset_email(name, reset_url),
        };

        let response = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MailError::Rejected(response.status().as_u16()));
        }

        Ok(())
    }
}

/// Mailer that logs instead of sending (development fallback)
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send_reset_email(
        &self,
        to: &str,
        _name: &str,
        reset_url: &str,
    ) -> Result<(), MailError> {
        info!(to, reset_url, "Mail delivery disabled, reset link logged");
        Ok(())
    }
}
