//! Log-only delivery — the default channel when neither email nor webhook is
//! configured. Useful in development and in the test dashboard.

use async_trait::async_trait;

use credtrack_core::error::Result;
use credtrack_core::traits::Notifier;
use credtrack_core::types::ReminderNotice;

#[derive(Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, notice: &ReminderNotice) -> Result<()> {
        tracing::info!(
            "📢 [{}] {} — {}",
            notice.recipient,
            notice.subject,
            notice.body.lines().next().unwrap_or_default()
        );
        Ok(())
    }
}
