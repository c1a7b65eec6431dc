//! Shared test helpers for engine tests.

use alterego_core::error::ProviderError;
use alterego_core::event::EventBus;
use alterego_core::message::{Message, MessageToolCall};
use alterego_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use alterego_core::PersonaConfig;
use alterego_notify::RecordingNotifier;
use alterego_profile::{PlainTextExtractor, ProfileAggregator, ProfileSource};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::engine::ConversationEngine;

/// A provider that replays a script and records every request.
///
/// Panics if more calls are made than responses provided.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn request(&self, index: usize) -> ProviderRequest {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len()
        };
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("ScriptedProvider: no response for call #{call}"))
    }
}

/// A final text response (no tool calls).
pub fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "test-model".into(),
        finish_reason: Some("stop".into()),
    }
}

/// A response that asks for tools.
pub fn tool_response(tool_calls: Vec<MessageToolCall>) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant_tool_calls("", tool_calls),
        usage: Some(Usage {
            prompt_tokens: 20,
            completion_tokens: 10,
            total_tokens: 30,
        }),
        model: "test-model".into(),
        finish_reason: Some("tool_calls".into()),
    }
}

pub fn make_tool_call(id: &str, name: &str, arguments: &str) -> MessageToolCall {
    MessageToolCall {
        id: id.into(),
        name: name.into(),
        arguments: arguments.into(),
    }
}

/// An engine for persona "Ada" with a summary on disk and no GitHub source.
pub struct Fixture {
    pub engine: ConversationEngine,
    pub notifier: Arc<RecordingNotifier>,
    pub bus: Arc<EventBus>,
    _dir: tempfile::TempDir,
}

impl Fixture {
    pub fn new(provider: Arc<ScriptedProvider>) -> Self {
        Self::with_engine(provider, |e| e)
    }

    pub fn with_engine(
        provider: Arc<ScriptedProvider>,
        configure: impl FnOnce(ConversationEngine) -> ConversationEngine,
    ) -> Self {
        Self::with_notifier(provider, Arc::new(RecordingNotifier::new()), configure)
    }

    pub fn with_notifier(
        provider: Arc<ScriptedProvider>,
        notifier: Arc<RecordingNotifier>,
        configure: impl FnOnce(ConversationEngine) -> ConversationEngine,
    ) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let summary = dir.path().join("summary.txt");
        std::fs::write(&summary, "Analytical engine enthusiast.\n").unwrap();

        let persona = PersonaConfig {
            summary_path: Some(summary),
            ..PersonaConfig::named("Ada")
        };
        let source = ProfileSource::new(
            persona.summary_path.clone(),
            None,
            Arc::new(PlainTextExtractor),
        );
        let fetcher = Arc::new(alterego_profile::GitHubFetcher::new(Arc::new(
            alterego_profile::GitHubClient::new(None),
        )));
        let profile = Arc::new(ProfileAggregator::new(persona, source, fetcher));

        let bus = Arc::new(EventBus::new(64));
        let tools = Arc::new(alterego_tools::default_registry(notifier.clone()));
        let engine = configure(ConversationEngine::new(
            provider,
            "test-model",
            tools,
            profile,
            bus.clone(),
        ));

        Self {
            engine,
            notifier,
            bus,
            _dir: dir,
        }
    }
}
