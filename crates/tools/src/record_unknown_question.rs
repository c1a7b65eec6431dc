//! Record a question the assistant could not answer.

use alterego_core::error::ToolError;
use alterego_core::tool::Tool;
use async_trait::async_trait;
use serde::Deserialize;

use crate::{recorded, OwnerNotifier};

#[derive(Debug, Deserialize)]
struct Args {
    question: String,
}

pub struct RecordUnknownQuestionTool {
    owner: OwnerNotifier,
}

impl RecordUnknownQuestionTool {
    pub fn new(owner: OwnerNotifier) -> Self {
        Self { owner }
    }
}

#[async_trait]
impl Tool for RecordUnknownQuestionTool {
    fn name(&self) -> &str {
        "record_unknown_question"
    }

    fn description(&self) -> &str {
        "Always use this tool to record any question that couldn't be answered as you didn't know the answer"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "question": {
                    "type": "string",
                    "description": "The question that couldn't be answered"
                }
            },
            "required": ["question"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let args: Args = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        self.owner
            .notify(&format!("Recording unknown question: {}", args.question))
            .await;

        Ok(recorded())
    }
}
