//! Built-in tools for AlterEgo.
//!
//! Both tools forward a one-line message to the persona's owner through a
//! [`Notifier`]:
//! - `record_user_details`: a visitor left an email address
//! - `record_unknown_question`: the assistant could not answer something
//!
//! Delivery is best effort. A failed send is logged and the tool still
//! reports success to the model.

pub mod record_unknown_question;
pub mod record_user_details;

pub use record_unknown_question::RecordUnknownQuestionTool;
pub use record_user_details::RecordUserDetailsTool;

use alterego_core::event::{DomainEvent, EventBus};
use alterego_core::tool::ToolRegistry;
use alterego_core::Notifier;
use std::sync::Arc;
use tracing::{debug, warn};

/// Registry with both built-in tools sharing one notifier.
pub fn default_registry(notifier: Arc<dyn Notifier>) -> ToolRegistry {
    build_registry(notifier, None)
}

/// Like [`default_registry`], also publishing `NotificationSent` events.
pub fn build_registry(notifier: Arc<dyn Notifier>, event_bus: Option<Arc<EventBus>>) -> ToolRegistry {
    let owner = match event_bus {
        Some(bus) => OwnerNotifier::new(notifier).with_event_bus(bus),
        None => OwnerNotifier::new(notifier),
    };
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(RecordUserDetailsTool::new(owner.clone())));
    registry.register(Box::new(RecordUnknownQuestionTool::new(owner)));
    registry
}

/// The acknowledgement both tools return.
pub(crate) fn recorded() -> serde_json::Value {
    serde_json::json!({ "recorded": "ok" })
}

/// A notifier plus the bus that hears about deliveries.
#[derive(Clone)]
pub struct OwnerNotifier {
    notifier: Arc<dyn Notifier>,
    event_bus: Option<Arc<EventBus>>,
}

impl OwnerNotifier {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Send `text`, swallowing delivery errors.
    pub async fn notify(&self, text: &str) {
        let delivered = match self.notifier.send(text).await {
            Ok(()) => {
                debug!(notifier = self.notifier.name(), "Owner notified");
                true
            }
            Err(e) => {
                warn!(notifier = self.notifier.name(), error = %e, "Owner notification failed");
                false
            }
        };

        if let Some(bus) = &self.event_bus {
            bus.publish(DomainEvent::NotificationSent {
                notifier: self.notifier.name().to_string(),
                delivered,
                timestamp: chrono::Utc::now(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alterego_core::message::MessageToolCall;
    use alterego_notify::RecordingNotifier;

    fn call(name: &str, arguments: &str) -> MessageToolCall {
        MessageToolCall {
            id: "call_7".into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    #[test]
    fn registry_lists_both_tools_by_name() {
        let registry = default_registry(Arc::new(RecordingNotifier::new()));
        assert_eq!(
            registry.names(),
            vec!["record_unknown_question", "record_user_details"]
        );
    }

    #[tokio::test]
    async fn unknown_question_notifies_once() {
        let notifier = Arc::new(RecordingNotifier::new());
        let registry = default_registry(notifier.clone());

        let result = registry
            .dispatch_call(&call("record_unknown_question", r#"{"question":"X"}"#))
            .await;

        assert!(result.success);
        assert_eq!(result.call_id, "call_7");
        assert_eq!(result.payload, serde_json::json!({ "recorded": "ok" }));
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains('X'));
    }

    #[tokio::test]
    async fn unknown_tool_is_error_shaped() {
        let notifier = Arc::new(RecordingNotifier::new());
        let registry = default_registry(notifier.clone());

        let result = registry.dispatch_call(&call("send_money", "{}")).await;
        assert!(!result.success);
        assert_eq!(result.payload, serde_json::json!({ "error": "Tool not found" }));
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn failed_delivery_still_records_ok() {
        let notifier = Arc::new(RecordingNotifier::failing());
        let bus = Arc::new(EventBus::new(8));
        let mut rx = bus.subscribe();
        let registry = build_registry(notifier.clone(), Some(bus));

        let result = registry
            .dispatch_call(&call("record_unknown_question", r#"{"question":"Why?"}"#))
            .await;

        assert!(result.success);
        assert_eq!(result.payload, serde_json::json!({ "recorded": "ok" }));
        match rx.recv().await.unwrap().as_ref() {
            DomainEvent::NotificationSent { notifier, delivered, .. } => {
                assert_eq!(notifier, "recording");
                assert!(!delivered);
            }
            other => panic!("Expected NotificationSent, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn owner_notifier_with_bus_publishes_delivery() {
        let bus = Arc::new(EventBus::new(8));
        let mut rx = bus.subscribe();
        let owner = OwnerNotifier::new(Arc::new(RecordingNotifier::new())).with_event_bus(bus);

        owner.notify("hello").await;

        match rx.recv().await.unwrap().as_ref() {
            DomainEvent::NotificationSent { delivered, .. } => assert!(*delivered),
            other => panic!("Expected NotificationSent, got {other:?}"),
        }
    }

    #[test]
    fn schemas_forbid_extra_properties() {
        let registry = default_registry(Arc::new(RecordingNotifier::new()));
        for def in registry.definitions() {
            assert_eq!(def.parameters["type"], "object");
            assert_eq!(def.parameters["additionalProperties"], false);
        }
    }
}
