//! In-memory notifier that records every message.

use alterego_core::error::NotifyError;
use alterego_core::Notifier;
use async_trait::async_trait;
use std::sync::Mutex;

/// Keeps sent messages in memory. Can be switched to fail every send.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
    failing: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every send fails after recording the attempt.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    /// Messages seen so far, in send order.
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(text.to_string());
        }
        if self.failing {
            return Err(NotifyError::DeliveryFailed("recording notifier set to fail".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_in_order() {
        let notifier = RecordingNotifier::new();
        notifier.send("first").await.unwrap();
        notifier.send("second").await.unwrap();
        assert_eq!(notifier.sent(), ["first", "second"]);
    }

    #[tokio::test]
    async fn failing_still_records_attempt() {
        let notifier = RecordingNotifier::failing();
        assert!(notifier.send("lost").await.is_err());
        assert_eq!(notifier.sent(), ["lost"]);
    }
}
