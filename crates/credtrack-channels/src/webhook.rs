//! Generic HTTP webhook delivery — POST with a JSON payload carrying the
//! rendered text plus the structured notice metadata.

use async_trait::async_trait;

use credtrack_core::config::WebhookConfig;
use credtrack_core::error::{CredTrackError, Result};
use credtrack_core::traits::Notifier;
use credtrack_core::types::ReminderNotice;

pub struct WebhookNotifier {
    config: WebhookConfig,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(config: WebhookConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// JSON body shape the receiving end sees.
    fn payload(notice: &ReminderNotice) -> serde_json::Value {
        serde_json::json!({
            "recipient": notice.recipient,
            "subject": notice.subject,
            "body": notice.body,
            "metadata": {
                "employee_name": notice.metadata.employee_name,
                "license_type": notice.metadata.license_type,
                "license_number": notice.metadata.license_number,
                "expiry_date": notice.metadata.expiry_date,
                "days_until_expiry": notice.metadata.days_until_expiry,
                "threshold": notice.metadata.threshold,
            },
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn send(&self, notice: &ReminderNotice) -> Result<()> {
        let mut req = self
            .client
            .post(&self.config.url)
            .json(&Self::payload(notice))
            .timeout(std::time::Duration::from_secs(10));

        if let Some(token) = &self.config.bearer_token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let resp = req
            .send()
            .await
            .map_err(|e| CredTrackError::Channel(format!("Webhook send: {e}")))?;

        if resp.status().is_success() {
            tracing::info!("✅ Webhook reminder delivered for {}", notice.recipient);
            Ok(())
        } else {
            let status = resp.status();
            Err(CredTrackError::Channel(format!("Webhook error {status}")))
        }
    }
}
