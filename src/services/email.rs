use lettre::message::{header, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;

use crate::core::config::Settings;

#[derive(Debug, Error)]
pub(crate) enum EmailError {
    #[error("invalid address {0}")]
    InvalidAddress(String),
    #[error("failed to build email: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("smtp transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
    #[error("email task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Clone)]
pub(crate) struct EmailService {
    mailer: SmtpTransport,
    from: Mailbox,
}

impl EmailService {
    /// Returns `None` when SMTP delivery is disabled.
    pub(crate) fn from_settings(settings: &Settings) -> Result<Option<Self>, EmailError> {
        let config = settings.email();
        if !config.enabled {
            return Ok(None);
        }

        let from_raw = format!("{} <{}>", config.from_name, config.from_email);
        let from: Mailbox =
            from_raw.parse().map_err(|_| EmailError::InvalidAddress(from_raw.clone()))?;

        let mailer = if config.smtp_username.is_empty() {
            SmtpTransport::builder_dangerous(&config.smtp_host).port(config.smtp_port).build()
        } else {
            let creds =
                Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());
            SmtpTransport::relay(&config.smtp_host)?
                .port(config.smtp_port)
                .credentials(creds)
                .build()
        };

        Ok(Some(Self { mailer, from }))
    }

    #[tracing::instrument(skip(self, code))]
    pub(crate) async fn send_verification_code(
        &self,
        to_email: &str,
        to_name: &str,
        code: &str,
        expires_in_minutes: u64,
    ) -> Result<(), EmailError> {
        let text_body = format!(
            "Hi {to_name},\n\n\
             Your verification code is {code}.\n\n\
             The code expires in {expires_in_minutes} minutes.\n\n\
             If you didn't try to create an account, you can ignore this email."
        );
        let html_body = verification_template(to_name, code, expires_in_minutes);

        self.send(to_email, "Email Verification Code", text_body, html_body).await
    }

    async fn send(
        &self,
        to_email: &str,
        subject: &str,
        text_body: String,
        html_body: String,
    ) -> Result<(), EmailError> {
        let to: Mailbox =
            to_email.parse().map_err(|_| EmailError::InvalidAddress(to_email.to_string()))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text_body),
                    )
                    .singlepart(
                        SinglePart::builder().header(header::ContentType::TEXT_HTML).body(html_body),
                    ),
            )?;

        let mailer = self.mailer.clone();
        tokio::task::spawn_blocking(move || mailer.send(&email)).await??;

        Ok(())
    }
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn verification_template(name: &str, code: &str, expires_in_minutes: u64) -> String {
    let name = escape_html(name);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Email Verification Code</title>
</head>
<body style="font-family: Arial, sans-serif; color: #1f2933;">
    <p>Hi {name},</p>
    <p>Use the code below to finish creating your account:</p>
    <p style="font-size: 28px; font-weight: bold; letter-spacing: 6px;">{code}</p>
    <p>The code expires in {expires_in_minutes} minutes.</p>
    <p>If you didn't try to create an account, you can ignore this email.</p>
</body>
</html>"#
    )
}
