//! Notification delivery for AlterEgo.
//!
//! The persona's owner is told when a visitor leaves contact details or asks
//! something the assistant could not answer.
//!
//! Available notifiers:
//! - **Pushover**: push notification via the Pushover HTTP API
//! - **Log**: writes the message to the log (used when Pushover is not configured)
//! - **Recording**: keeps messages in memory, for tests and dry runs

pub mod log;
pub mod pushover;
pub mod recording;

pub use log::LogNotifier;
pub use pushover::PushoverNotifier;
pub use recording::RecordingNotifier;

use alterego_config::NotifyConfig;
use alterego_core::Notifier;
use std::sync::Arc;
use tracing::info;

/// Pick the notifier for this configuration.
///
/// Pushover when both credentials are present, otherwise the log.
pub fn build_from_config(config: &NotifyConfig) -> Arc<dyn Notifier> {
    match (&config.pushover_token, &config.pushover_user) {
        (Some(token), Some(user)) => {
            info!("Notifications via Pushover");
            Arc::new(PushoverNotifier::new(token.clone(), user.clone()))
        }
        _ => {
            info!("Pushover not configured, notifications go to the log");
            Arc::new(LogNotifier)
        }
    }
}
