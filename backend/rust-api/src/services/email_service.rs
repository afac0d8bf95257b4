use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::EmailSettings;

/// Sends the rendered results document to the submitter. The document is
/// referenced by its storage URL; transports that want to inline the bytes
/// can fetch them from there.
#[async_trait]
pub trait ResultsNotifier: Send + Sync {
    async fn notify(
        &self,
        address: &str,
        display_name: &str,
        document_name: &str,
        document_url: &str,
    ) -> Result<()>;
}

pub struct EmailNotifier {
    settings: EmailSettings,
}

impl EmailNotifier {
    pub fn new(settings: EmailSettings) -> Self {
        Self { settings }
    }

    pub fn sending_disabled() -> bool {
        std::env::var("EMAIL_SEND_DISABLED")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    fn build_mailer(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let creds = Credentials::new(self.settings.login.clone(), self.settings.password.clone());

        let builder = if self.settings.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.settings.server)
                .context("Invalid SMTP server for TLS")?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.settings.server)
        }
        .port(self.settings.port)
        .credentials(creds);

        Ok(builder.build())
    }
}

fn results_email_body(display_name: &str, document_name: &str, document_url: &str) -> String {
    format!(
        "<div style=\"font-family: Arial, sans-serif; color: #333;\">\
         <p>Dear {display_name},</p>\
         <p>Thank you for completing the quiz. Your quiz results are available here: \
         <a href=\"{document_url}\">{document_name}</a></p>\
         <p>Best regards,<br/>Quiz Team</p>\
         <footer style=\"margin-top: 20px; font-size: 12px; color: #777;\">\
         <p>This is an automated message, please do not reply.</p>\
         </footer>\
         </div>"
    )
}

#[async_trait]
impl ResultsNotifier for EmailNotifier {
    async fn notify(
        &self,
        address: &str,
        display_name: &str,
        document_name: &str,
        document_url: &str,
    ) -> Result<()> {
        if Self::sending_disabled() {
            tracing::info!(recipient = %address, "Email sending disabled, skipping results email");
            return Ok(());
        }

        let from_address: Mailbox = format!(
            "{} <{}>",
            self.settings.from_name, self.settings.from_email
        )
        .parse()
        .context("Invalid from email address")?;
        let to_address: Mailbox = format!("{} <{}>", display_name, address)
            .parse()
            .context("Invalid recipient email address")?;

        let email = Message::builder()
            .from(from_address)
            .to(to_address)
            .subject("Your Quiz Results")
            .header(ContentType::TEXT_HTML)
            .body(results_email_body(display_name, document_name, document_url))
            .context("Failed to build results email")?;

        let mailer = self.build_mailer()?;
        mailer
            .send(email)
            .await
            .context("Failed to send results email")?;

        Ok(())
    }
}
