//! Notifier trait: the one-way "send a text message to the persona's owner"
//! boundary.
//!
//! Delivery is best effort. Tools log a failed send and carry on; nothing
//! here is allowed to fail a conversation turn.

use async_trait::async_trait;

use crate::error::NotifyError;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// A human-readable name for this notifier (e.g., "pushover").
    fn name(&self) -> &str;

    /// Send a plain-text message.
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}
