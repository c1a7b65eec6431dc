//! Tool trait: the abstraction over side-effecting capabilities the model
//! may invoke mid-conversation.
//!
//! The registry is an explicit object built at startup and handed to the
//! conversation engine; there is no ambient lookup by name.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::error::ToolError;
use crate::message::MessageToolCall;
use crate::provider::ToolDefinition;

/// Payload returned to the model when the requested tool is not registered.
pub const TOOL_NOT_FOUND: &str = "Tool not found";

/// A parsed request to execute a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Correlation ID (matches the model's tool_call.id)
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    /// Arguments as a JSON object
    pub arguments: serde_json::Value,
}

impl ToolInvocation {
    /// Parse the raw tool call emitted by the model.
    ///
    /// An empty argument string is treated as `{}`. Anything that is not a
    /// JSON object is rejected.
    pub fn try_from_call(call: &MessageToolCall) -> Result<Self, ToolError> {
        let raw = call.arguments.trim();
        let arguments = if raw.is_empty() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_str::<serde_json::Value>(raw)
                .map_err(|e| ToolError::InvalidArguments(format!("malformed JSON: {e}")))?
        };

        if !arguments.is_object() {
            return Err(ToolError::InvalidArguments(
                "arguments must be a JSON object".into(),
            ));
        }

        Ok(Self {
            id: call.id.clone(),
            name: call.name.clone(),
            arguments,
        })
    }
}

/// The result of a tool execution, ready to be appended as a tool message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// The call ID this result is for
    pub call_id: String,

    /// Whether the tool executed successfully
    pub success: bool,

    /// Structured result payload sent back to the model
    pub payload: serde_json::Value,
}

impl ToolResult {
    pub fn ok(call_id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            call_id: call_id.into(),
            success: true,
            payload,
        }
    }

    /// An error-shaped result: `{"error": "<message>"}`.
    pub fn error(call_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            success: false,
            payload: serde_json::json!({ "error": message.into() }),
        }
    }

    /// The error-shaped result for a failed dispatch. An unknown tool gets
    /// the fixed [`TOOL_NOT_FOUND`] payload.
    pub fn from_error(call_id: impl Into<String>, err: &ToolError) -> Self {
        match err {
            ToolError::NotFound(_) => Self::error(call_id, TOOL_NOT_FOUND),
            other => Self::error(call_id, other.to_string()),
        }
    }

    /// Serialized payload used as the tool message content.
    pub fn content(&self) -> String {
        self.payload.to_string()
    }
}

/// The core Tool trait.
///
/// Each tool declares its schema and executes against already-parsed
/// arguments. Tools return their payload; the registry wraps it with the
/// correlation ID.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "record_user_details").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the model).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the model.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of available tools.
///
/// The conversation engine uses this to:
/// 1. Get tool definitions to send to the model
/// 2. Dispatch tool invocations when the model requests them
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Get all tool definitions, ordered by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.to_definition()).collect()
    }

    /// List all registered tool names, ordered.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool invocation and surface the outcome as a `ToolResult`.
    ///
    /// Never fails: an unknown tool yields `{"error": "Tool not found"}`,
    /// argument and execution errors yield `{"error": "<reason>"}`.
    pub async fn dispatch(&self, invocation: &ToolInvocation) -> ToolResult {
        let Some(tool) = self.tools.get(&invocation.name) else {
            let err = ToolError::NotFound(invocation.name.clone());
            warn!(error = %err, "Model requested an unregistered tool");
            return ToolResult::from_error(&invocation.id, &err);
        };

        debug!(tool = %invocation.name, call_id = %invocation.id, "Dispatching tool");
        match tool.execute(invocation.arguments.clone()).await {
            Ok(payload) => ToolResult::ok(&invocation.id, payload),
            Err(e) => {
                warn!(tool = %invocation.name, error = %e, "Tool execution failed");
                ToolResult::from_error(&invocation.id, &e)
            }
        }
    }

    /// Parse a raw model tool call and dispatch it.
    ///
    /// The tool is looked up before its arguments are parsed, so an unknown
    /// name always yields the not-found result.
    pub async fn dispatch_call(&self, call: &MessageToolCall) -> ToolResult {
        if !self.tools.contains_key(&call.name) {
            let err = ToolError::NotFound(call.name.clone());
            warn!(error = %err, "Model requested an unregistered tool");
            return ToolResult::from_error(&call.id, &err);
        }

        match ToolInvocation::try_from_call(call) {
            Ok(invocation) => self.dispatch(&invocation).await,
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Rejected tool call arguments");
                ToolResult::from_error(&call.id, &e)
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
