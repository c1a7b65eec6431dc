//! Wiring a [`ConversationEngine`] from configuration.

use alterego_config::AppConfig;
use alterego_core::error::ProviderError;
use alterego_core::event::EventBus;
use alterego_core::tool::ToolRegistry;
use alterego_core::{Notifier, Provider};
use alterego_profile::ProfileAggregator;
use std::sync::Arc;
use tracing::info;

use crate::engine::ConversationEngine;

/// The shared pieces of one running assistant.
pub struct Runtime {
    pub engine: Arc<ConversationEngine>,
    pub profile: Arc<ProfileAggregator>,
    pub tools: Arc<ToolRegistry>,
    pub notifier: Arc<dyn Notifier>,
    pub event_bus: Arc<EventBus>,
}

impl Runtime {
    /// Assemble everything around an already-built provider.
    pub fn assemble(config: &AppConfig, provider: Arc<dyn Provider>) -> Self {
        let event_bus = Arc::new(EventBus::default());
        let persona = config.persona_config();

        let notifier = alterego_notify::build_from_config(&config.notify);
        let tools = Arc::new(alterego_tools::build_registry(
            notifier.clone(),
            Some(event_bus.clone()),
        ));
        let profile = Arc::new(
            alterego_profile::build_aggregator(&persona).with_event_bus(event_bus.clone()),
        );

        let engine = ConversationEngine::new(
            provider,
            &config.model,
            tools.clone(),
            profile.clone(),
            event_bus.clone(),
        )
        .with_temperature(config.temperature)
        .with_max_tokens(config.max_tokens)
        .with_max_iterations(config.agent.max_iterations);

        info!(
            persona = %persona.name,
            style = %persona.prompt_style,
            model = %config.model,
            notifier = notifier.name(),
            github = persona.has_external_source(),
            "Assistant assembled"
        );

        Self {
            engine: Arc::new(engine),
            profile,
            tools,
            notifier,
            event_bus,
        }
    }
}

/// Build the full runtime, including the model provider, from configuration.
pub fn build_runtime(config: &AppConfig) -> Result<Runtime, ProviderError> {
    let provider = alterego_providers::build_from_config(config)?;
    Ok(Runtime::assemble(config, provider))
}
