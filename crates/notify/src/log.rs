//! Log-only notifier.

use alterego_core::error::NotifyError;
use alterego_core::Notifier;
use async_trait::async_trait;
use tracing::info;

/// Writes each notification to the log at `info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        info!(notification = %text, "Owner notification");
        Ok(())
    }
}
