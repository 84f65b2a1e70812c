//! Email delivery — async SMTP via lettre. Send-only: reminders go out,
//! nothing is ever polled back.

use async_trait::async_trait;

use credtrack_core::config::EmailConfig;
use credtrack_core::error::{CredTrackError, Result};
use credtrack_core::traits::Notifier;
use credtrack_core::types::ReminderNotice;

/// SMTP reminder channel. Credentials come from the `[email]` config section.
pub struct EmailNotifier {
    config: EmailConfig,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &str {
        "email"
    }

    async fn send(&self, notice: &ReminderNotice) -> Result<()> {
        use lettre::{
            AsyncSmtpTransport, AsyncTransport, Message as LettreMessage, message::Mailbox,
            message::header::ContentType, transport::smtp::authentication::Credentials,
        };

        let from_name = self.config.display_name.as_deref().unwrap_or("CredTrack");
        let from_mailbox: Mailbox = format!("{from_name} <{}>", self.config.from_address)
            .parse()
            .map_err(|e| CredTrackError::Channel(format!("Invalid from: {e}")))?;

        let to_mailbox: Mailbox = notice
            .recipient
            .parse()
            .map_err(|e| CredTrackError::Channel(format!("Invalid to: {e}")))?;

        let email = LettreMessage::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(notice.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(notice.body.clone())
            .map_err(|e| CredTrackError::Channel(format!("Build email: {e}")))?;

        let creds = Credentials::new(
            self.config.from_address.clone(),
            self.config.password.clone(),
        );

        let mailer =
            AsyncSmtpTransport::<lettre::Tokio1Executor>::starttls_relay(&self.config.smtp_host)
                .map_err(|e| CredTrackError::Channel(format!("SMTP relay: {e}")))?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build();

        mailer
            .send(email)
            .await
            .map_err(|e| CredTrackError::Channel(format!("SMTP send: {e}")))?;

        tracing::info!("📤 Reminder email sent to {}", notice.recipient);
        Ok(())
    }
}
