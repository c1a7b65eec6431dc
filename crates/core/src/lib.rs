//! # AlterEgo Core
//!
//! Domain types, traits, and error definitions for the AlterEgo persona
//! assistant. This crate has no HTTP or runtime dependencies of its own; it
//! defines the model every other crate implements against.
//!
//! ## Layout
//!
//! - [`message`]: the role-tagged chat transcript
//! - [`provider`]: the language-model boundary
//! - [`tool`]: callable tools, the registry and the dispatch contract
//! - [`notify`]: the one-way notification boundary used by tools
//! - [`persona`]: prompt styles and persona prompt templates
//! - [`event`]: domain events for observers (logging, diagnostics)

pub mod error;
pub mod event;
pub mod message;
pub mod notify;
pub mod persona;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{NotifyError, ProfileError, ProviderError, ToolError};
pub use event::{DomainEvent, EventBus};
pub use message::{Message, MessageToolCall, Role};
pub use notify::Notifier;
pub use persona::{PersonaConfig, PromptStyle};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition};
pub use tool::{Tool, ToolInvocation, ToolRegistry, ToolResult};
