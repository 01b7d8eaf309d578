// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mail transports: Resend's HTTP API and plain SMTP.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use revline_config::model::EmailConfig;
use revline_core::RevlineError;
use serde::Serialize;
use tracing::debug;

use crate::message::OutgoingEmail;

/// Sends one rendered email.
#[async_trait]
pub trait MailTransport: Send + Sync + 'static {
    /// Short transport name for logs.
    fn name(&self) -> &'static str;

    async fn send(&self, email: &OutgoingEmail) -> Result<(), RevlineError>;
}

fn channel_err(
    message: String,
    source: impl std::error::Error + Send + Sync + 'static,
) -> RevlineError {
    RevlineError::Channel {
        message,
        source: Some(Box::new(source)),
    }
}

/// Resend `POST /emails`.
pub struct ResendTransport {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

impl ResendTransport {
    pub fn new(api_url: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl MailTransport for ResendTransport {
    fn name(&self) -> &'static str {
        "resend"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), RevlineError> {
        let response = self
            .client
            .post(format!("{}/emails", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&ResendRequest {
                from: &email.from,
                to: [&email.to],
                subject: &email.subject,
                html: &email.html,
                reply_to: email.reply_to.as_deref(),
            })
            .send()
            .await
            .map_err(|e| channel_err(format!("Resend request failed: {e}"), e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RevlineError::channel(format!(
                "Resend API error {status}: {body}"
            )));
        }
        debug!(to = %email.to, "email accepted by Resend");
        Ok(())
    }
}

/// SMTP relay through lettre. Port 465 uses implicit TLS, anything else STARTTLS.
pub struct SmtpTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    pub fn new(
        host: &str,
        port: u16,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self, RevlineError> {
        let builder = if port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        }
        .map_err(|e| RevlineError::Config(format!("email.smtp_host `{host}`: {e}")))?;

        let mut builder = builder.port(port);
        if let (Some(user), Some(pass)) = (username, password) {
            builder = builder.credentials(Credentials::new(user.to_string(), pass.to_string()));
        }
        Ok(Self {
            mailer: builder.build(),
        })
    }
}

fn mailbox(field: &str, value: &str) -> Result<Mailbox, RevlineError> {
    value
        .parse()
        .map_err(|e| RevlineError::Validation(format!("invalid {field} address `{value}`: {e}")))
}

#[async_trait]
impl MailTransport for SmtpTransport {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), RevlineError> {
        let mut builder = lettre::Message::builder()
            .from(mailbox("from", &email.from)?)
            .to(mailbox("to", &email.to)?)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_HTML);
        if let Some(reply_to) = email.reply_to.as_deref() {
            builder = builder.reply_to(mailbox("reply-to", reply_to)?);
        }
        let message = builder
            .body(email.html.clone())
            .map_err(|e| channel_err(format!("failed to build email: {e}"), e))?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| channel_err(format!("SMTP delivery failed: {e}"), e))?;
        debug!(to = %email.to, "email accepted by SMTP relay");
        Ok(())
    }
}

/// Builds the transport selected in config, or `None` when email is not configured.
pub fn from_config(config: &EmailConfig) -> Result<Option<Box<dyn MailTransport>>, RevlineError> {
    use revline_config::model::EmailTransport;

    if config.from.is_none() || !config.has_recipients() {
        return Ok(None);
    }
    let transport: Box<dyn MailTransport> = match config.transport {
        EmailTransport::Resend => {
            let key = config.resend_api_key.as_deref().ok_or_else(|| {
                RevlineError::Config("email.resend_api_key is required for resend".into())
            })?;
            Box::new(ResendTransport::new(&config.resend_api_url, key))
        }
        EmailTransport::Smtp => {
            let host = config.smtp_host.as_deref().ok_or_else(|| {
                RevlineError::Config("email.smtp_host is required for smtp".into())
            })?;
            Box::new(SmtpTransport::new(
                host,
                config.smtp_port,
                config.smtp_username.as_deref(),
                config.smtp_password.as_deref(),
            )?)
        }
    };
    Ok(Some(transport))
}
