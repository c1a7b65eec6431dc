//! The per-turn conversation state machine.

use alterego_core::event::{DomainEvent, EventBus};
use alterego_core::message::{Message, MessageToolCall, Role};
use alterego_core::provider::{Provider, ProviderRequest};
use alterego_core::tool::{ToolRegistry, ToolResult};
use alterego_profile::ProfileAggregator;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Reply sent when the model cannot be reached or answers nonsense.
pub const APOLOGY_REPLY: &str =
    "I apologize, but I'm experiencing some technical difficulties. Please try again in a moment.";

/// Reply sent when a turn runs out of model calls.
pub const ITERATION_LIMIT_REPLY: &str =
    "I've reached the limit of tool calls for this turn. Please try rephrasing your question.";

const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// Where a turn currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TurnState {
    Start,
    ModelCall,
    ToolPhase,
    Done,
}

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    /// The model produced a final text reply
    Completed,
    /// `max_iterations` model calls were used up
    IterationLimit,
    /// The model call failed; the reply is the apology
    ProviderFailed,
}

/// Everything a finished turn produced.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub reply: String,
    /// Full transcript sent to and received from the model, system prompt first
    pub messages: Vec<Message>,
    /// Number of tool phases executed
    pub tool_rounds: u32,
    /// Number of model calls made
    pub iterations: u32,
    pub status: TurnStatus,
}

/// Turns a user message plus history into an in-character reply.
pub struct ConversationEngine {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    tools: Arc<ToolRegistry>,
    profile: Arc<ProfileAggregator>,
    max_iterations: u32,
    event_bus: Arc<EventBus>,
}

impl ConversationEngine {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        tools: Arc<ToolRegistry>,
        profile: Arc<ProfileAggregator>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            tools,
            profile,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            event_bus,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the maximum number of model calls per turn.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn profile(&self) -> &ProfileAggregator {
        &self.profile
    }

    /// The system prompt for the next turn, built from a fresh profile.
    pub async fn system_prompt(&self) -> String {
        let profile = self.profile.get_profile(true).await;
        self.profile.persona().system_prompt(&profile)
    }

    /// Answer `message` given the prior `history`.
    pub async fn respond(&self, history: &[Message], message: &str) -> String {
        self.run_turn(history, message).await.reply
    }

    /// Run one full turn and return the transcript alongside the reply.
    ///
    /// System messages in `history` are dropped; the engine supplies its own.
    pub async fn run_turn(&self, history: &[Message], message: &str) -> TurnOutcome {
        let persona = self.profile.persona();
        info!(persona = %persona.name, history = history.len(), "Turn started");

        let tool_definitions = self.tools.definitions();
        let mut messages: Vec<Message> = Vec::with_capacity(history.len() + 2);
        let mut pending: Vec<MessageToolCall> = Vec::new();
        let mut reply = String::new();
        let mut iterations = 0;
        let mut tool_rounds = 0;
        let mut state = TurnState::Start;

        let status = loop {
            state = match state {
                TurnState::Start => {
                    messages.push(Message::system(self.system_prompt().await));
                    messages.extend(history.iter().filter(|m| m.role != Role::System).cloned());
                    messages.push(Message::user(message));
                    TurnState::ModelCall
                }

                TurnState::ModelCall => {
                    if iterations >= self.max_iterations {
                        warn!(iterations, "Max tool iterations reached, ending turn");
                        reply = ITERATION_LIMIT_REPLY.into();
                        break TurnStatus::IterationLimit;
                    }
                    iterations += 1;
                    debug!(iteration = iterations, "Model call");

                    let request = ProviderRequest {
                        model: self.model.clone(),
                        messages: messages.clone(),
                        temperature: self.temperature,
                        max_tokens: self.max_tokens,
                        tools: tool_definitions.clone(),
                    };

                    let response = match self.provider.complete(request).await {
                        Ok(response) => response,
                        Err(e) => {
                            warn!(provider = self.provider.name(), error = %e, "Model call failed");
                            self.event_bus.publish(DomainEvent::ErrorOccurred {
                                context: format!("provider:{}", self.provider.name()),
                                error_message: e.to_string(),
                                timestamp: Utc::now(),
                            });
                            reply = APOLOGY_REPLY.into();
                            break TurnStatus::ProviderFailed;
                        }
                    };

                    self.event_bus.publish(DomainEvent::ResponseGenerated {
                        model: response.model.clone(),
                        tokens_used: response.usage.as_ref().map_or(0, |u| u.total_tokens),
                        tool_calls: response.message.tool_calls.len(),
                        timestamp: Utc::now(),
                    });

                    if response.message.tool_calls.is_empty() {
                        reply = response.message.content.clone();
                        messages.push(response.message);
                        TurnState::Done
                    } else {
                        pending = response.message.tool_calls.clone();
                        messages.push(response.message);
                        TurnState::ToolPhase
                    }
                }

                TurnState::ToolPhase => {
                    tool_rounds += 1;
                    debug!(tool_count = pending.len(), "Executing tool calls");

                    let results =
                        futures::future::join_all(pending.iter().map(|call| self.dispatch(call)))
                            .await;
                    for result in results {
                        messages.push(Message::tool_result(&result.call_id, result.content()));
                    }
                    pending.clear();
                    TurnState::ModelCall
                }

                TurnState::Done => break TurnStatus::Completed,
            };
        };

        info!(?status, iterations, tool_rounds, "Turn finished");

        TurnOutcome {
            reply,
            messages,
            tool_rounds,
            iterations,
            status,
        }
    }

    async fn dispatch(&self, call: &MessageToolCall) -> ToolResult {
        info!(tool = %call.name, call_id = %call.id, "Tool called");

        let started = Instant::now();
        let result = self.tools.dispatch_call(call).await;

        self.event_bus.publish(DomainEvent::ToolExecuted {
            tool_name: call.name.clone(),
            success: result.success,
            duration_ms: started.elapsed().as_millis() as u64,
            timestamp: Utc::now(),
        });
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use alterego_core::error::ProviderError;
    use alterego_notify::RecordingNotifier;

    #[tokio::test]
    async fn simple_text_response() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok(text_response("Hi, I'm Ada."))]));
        let fixture = Fixture::new(provider.clone());

        let outcome = fixture.engine.run_turn(&[], "Hello").await;

        assert_eq!(outcome.reply, "Hi, I'm Ada.");
        assert_eq!(outcome.status, TurnStatus::Completed);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.tool_rounds, 0);
        let roles: Vec<_> = outcome.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, [Role::System, Role::User, Role::Assistant]);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn system_prompt_carries_persona_and_profile() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok(text_response("ok"))]));
        let fixture = Fixture::new(provider.clone());

        fixture.engine.respond(&[], "Who are you?").await;

        let request = provider.request(0);
        let system = &request.messages[0];
        assert_eq!(system.role, Role::System);
        assert!(system.content.starts_with("You are acting as Ada."));
        assert!(system.content.contains("## Summary\nAnalytical engine enthusiast."));
        assert!(system
            .content
            .ends_with("always staying in character as Ada."));
        assert_eq!(request.model, "test-model");
        let tool_names: Vec<_> = request.tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(tool_names, ["record_unknown_question", "record_user_details"]);
    }

    #[tokio::test]
    async fn history_sits_between_system_and_user() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok(text_response("Sure."))]));
        let fixture = Fixture::new(provider.clone());
        let history = vec![
            Message::system("stale prompt"),
            Message::user("Earlier question"),
            Message::assistant("Earlier answer"),
        ];

        fixture.engine.respond(&history, "Follow-up").await;

        let contents: Vec<_> = provider
            .request(0)
            .messages
            .iter()
            .skip(1)
            .map(|m| m.content.clone())
            .collect();
        assert_eq!(contents, ["Earlier question", "Earlier answer", "Follow-up"]);
    }

    #[tokio::test]
    async fn tool_call_then_text_is_one_round() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(tool_response(vec![make_tool_call(
                "call_q1",
                "record_unknown_question",
                r#"{"question":"What is Ada's favourite colour?"}"#,
            )])),
            Ok(text_response("I've noted that, I'm not sure!")),
        ]));
        let fixture = Fixture::new(provider.clone());

        let outcome = fixture.engine.run_turn(&[], "Favourite colour?").await;

        assert_eq!(outcome.status, TurnStatus::Completed);
        assert_eq!(outcome.tool_rounds, 1);
        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.reply, "I've noted that, I'm not sure!");

        let call_msg = &outcome.messages[2];
        assert!(call_msg.requests_tools());
        assert_eq!(call_msg.tool_calls[0].id, "call_q1");
        let result_msg = &outcome.messages[3];
        assert_eq!(result_msg.role, Role::Tool);
        assert_eq!(result_msg.tool_call_id.as_deref(), Some("call_q1"));
        assert_eq!(result_msg.content, r#"{"recorded":"ok"}"#);

        assert_eq!(
            fixture.notifier.sent(),
            ["Recording unknown question: What is Ada's favourite colour?"]
        );
        // Second request includes the tool exchange
        assert_eq!(provider.request(1).messages.len(), 4);
    }

    #[tokio::test]
    async fn parallel_calls_keep_request_order() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(tool_response(vec![
                make_tool_call("call_b", "record_user_details", r#"{"email":"b@example.com"}"#),
                make_tool_call("call_a", "record_unknown_question", r#"{"question":"A?"}"#),
                make_tool_call("call_c", "teleport", "{}"),
            ])),
            Ok(text_response("Done.")),
        ]));
        let fixture = Fixture::new(provider);

        let outcome = fixture.engine.run_turn(&[], "Hi").await;

        let tool_msgs: Vec<_> = outcome
            .messages
            .iter()
            .filter(|m| m.role == Role::Tool)
            .collect();
        let ids: Vec<_> = tool_msgs
            .iter()
            .map(|m| m.tool_call_id.as_deref().unwrap())
            .collect();
        assert_eq!(ids, ["call_b", "call_a", "call_c"]);
        assert_eq!(tool_msgs[2].content, r#"{"error":"Tool not found"}"#);
        assert_eq!(fixture.notifier.sent().len(), 2);
        assert_eq!(outcome.tool_rounds, 1);
    }

    #[tokio::test]
    async fn malformed_arguments_are_reported_to_model() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(tool_response(vec![make_tool_call(
                "call_bad",
                "record_unknown_question",
                "{not json",
            )])),
            Ok(text_response("Sorry about that.")),
        ]));
        let fixture = Fixture::new(provider);

        let outcome = fixture.engine.run_turn(&[], "Hi").await;

        assert_eq!(outcome.status, TurnStatus::Completed);
        let tool_msg = &outcome.messages[3];
        assert!(tool_msg.content.contains("error"));
        assert!(fixture.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn model_failure_yields_apology() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err(ProviderError::Network(
            "connection refused".into(),
        ))]));
        let fixture = Fixture::new(provider);

        let outcome = fixture.engine.run_turn(&[], "Hello").await;

        assert_eq!(outcome.reply, APOLOGY_REPLY);
        assert_eq!(outcome.status, TurnStatus::ProviderFailed);
        assert_eq!(outcome.iterations, 1);
    }

    #[tokio::test]
    async fn failure_after_tool_round_still_apologises() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(tool_response(vec![make_tool_call(
                "call_1",
                "record_unknown_question",
                r#"{"question":"?"}"#,
            )])),
            Err(ProviderError::RateLimited {
                retry_after_secs: 5,
            }),
        ]));
        let fixture = Fixture::new(provider);

        let reply = fixture.engine.respond(&[], "Hello").await;
        assert_eq!(reply, APOLOGY_REPLY);
    }

    #[tokio::test]
    async fn iteration_limit_ends_turn() {
        let script = (0..5)
            .map(|i| {
                Ok(tool_response(vec![make_tool_call(
                    &format!("call_{i}"),
                    "record_unknown_question",
                    r#"{"question":"loop"}"#,
                )]))
            })
            .collect();
        let provider = Arc::new(ScriptedProvider::new(script));
        let fixture = Fixture::with_engine(provider.clone(), |e| e.with_max_iterations(3));

        let outcome = fixture.engine.run_turn(&[], "Loop forever").await;

        assert_eq!(outcome.reply, ITERATION_LIMIT_REPLY);
        assert_eq!(outcome.status, TurnStatus::IterationLimit);
        assert_eq!(outcome.iterations, 3);
        assert_eq!(outcome.tool_rounds, 3);
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn events_are_published() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(tool_response(vec![make_tool_call(
                "call_1",
                "record_unknown_question",
                r#"{"question":"?"}"#,
            )])),
            Ok(text_response("ok")),
        ]));
        let fixture = Fixture::new(provider);
        let mut rx = fixture.bus.subscribe();

        fixture.engine.respond(&[], "Hello").await;

        let mut kinds = Vec::new();
        while let Ok(event) = rx.try_recv() {
            kinds.push(match event.as_ref() {
                DomainEvent::ResponseGenerated { .. } => "response",
                DomainEvent::ToolExecuted { .. } => "tool",
                _ => "other",
            });
        }
        assert_eq!(kinds, ["response", "tool", "response"]);
    }

    #[tokio::test]
    async fn notifier_failure_does_not_break_turn() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(tool_response(vec![make_tool_call(
                "call_1",
                "record_user_details",
                r#"{"email":"x@example.com"}"#,
            )])),
            Ok(text_response("Thanks!")),
        ]));
        let notifier = Arc::new(RecordingNotifier::failing());
        let fixture = Fixture::with_notifier(provider, notifier, |e| e);

        let outcome = fixture.engine.run_turn(&[], "Email me").await;
        assert_eq!(outcome.reply, "Thanks!");
        assert_eq!(outcome.messages[3].content, r#"{"recorded":"ok"}"#);
    }
}
