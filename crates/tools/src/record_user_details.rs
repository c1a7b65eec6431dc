//! Record a visitor who wants to get in touch.

use alterego_core::error::ToolError;
use alterego_core::tool::Tool;
use async_trait::async_trait;
use serde::Deserialize;

use crate::{recorded, OwnerNotifier};

const DEFAULT_NAME: &str = "Name not provided";
const DEFAULT_NOTES: &str = "not provided";

#[derive(Debug, Deserialize)]
struct Args {
    email: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

pub struct RecordUserDetailsTool {
    owner: OwnerNotifier,
}

impl RecordUserDetailsTool {
    pub fn new(owner: OwnerNotifier) -> Self {
        Self { owner }
    }
}

#[async_trait]
impl Tool for RecordUserDetailsTool {
    fn name(&self) -> &str {
        "record_user_details"
    }

    fn description(&self) -> &str {
        "Use this tool to record that a user is interested in being in touch and provided an email address"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "email": {
                    "type": "string",
                    "description": "The email address of this user"
                },
                "name": {
                    "type": "string",
                    "description": "The user's name, if they provided it"
                },
                "notes": {
                    "type": "string",
                    "description": "Any additional information about the conversation that's worth recording to give context"
                }
            },
            "required": ["email"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let args: Args = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        let name = args.name.as_deref().unwrap_or(DEFAULT_NAME);
        let notes = args.notes.as_deref().unwrap_or(DEFAULT_NOTES);
        self.owner
            .notify(&format!(
                "Recording {name} with email {} and notes {notes}",
                args.email
            ))
            .await;

        Ok(recorded())
    }
}
