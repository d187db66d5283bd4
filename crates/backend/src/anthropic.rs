//! Wire shapes and conversions for the messages style protocol.
//!
//! This protocol differs from the chat-completions one in three ways that
//! matter here: the system message is a top-level request field rather
//! than part of the message array; tool results are user-supplied content
//! blocks, not a dedicated role; and tool-call arguments are structured
//! objects that must be re-serialized to text before they reach the
//! neutral model.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use steward_model::{ChatMessage, Completion, ErrorKind, ToolCallRequest, ToolSpec};

use crate::{BackendConfig, Error};

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, Deserialize)]
pub struct MessagesResponse {
    pub content: Vec<ResponseBlock>,
    pub stop_reason: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseBlock {
    Text { text: String },
    ToolUse { id: String, name: String, input: Value },
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MessagesRequest {
    model: String,
    // Required on every call by this backend, unlike its sibling.
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolDef>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Message {
    role: &'static str,
    content: Content,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Blocks(Vec<RequestBlock>),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestBlock {
    Text { text: String },
    ToolUse { id: String, name: String, input: Value },
    ToolResult { tool_use_id: String, content: String },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToolDef {
    name: String,
    description: String,
    // Same schema semantics as the chat-completions `parameters` field;
    // only the key differs.
    input_schema: Value,
}

// -----------
// Conversions
// -----------

pub fn build_request(
    messages: &[ChatMessage],
    tools: &[ToolSpec],
    config: &BackendConfig,
) -> Result<MessagesRequest, Error> {
    let mut system = None;
    let mut wire_messages = Vec::with_capacity(messages.len());

    for msg in messages {
        match msg {
            ChatMessage::System(content) => {
                // Extracted from the array and sent as a top-level field.
                system = Some(content.clone());
            }
            ChatMessage::User(content) => wire_messages.push(Message {
                role: "user",
                content: Content::Text(content.clone()),
            }),
            ChatMessage::Assistant { text, tool_calls } => {
                if tool_calls.is_empty() {
                    wire_messages.push(Message {
                        role: "assistant",
                        content: Content::Text(text.clone()),
                    });
                    continue;
                }
                let mut blocks = Vec::with_capacity(tool_calls.len() + 1);
                if !text.is_empty() {
                    blocks.push(RequestBlock::Text { text: text.clone() });
                }
                for call in tool_calls {
                    blocks.push(RequestBlock::ToolUse {
                        id: call.id.clone(),
                        name: call.name.clone(),
                        input: parse_arguments(call)?,
                    });
                }
                wire_messages.push(Message {
                    role: "assistant",
                    content: Content::Blocks(blocks),
                });
            }
            ChatMessage::Tool(reply) => {
                // This backend models tool results as user-supplied
                // content, not a distinct role.
                wire_messages.push(Message {
                    role: "user",
                    content: Content::Blocks(vec![RequestBlock::ToolResult {
                        tool_use_id: reply.call_id.clone(),
                        content: reply.content.clone(),
                    }]),
                });
            }
        }
    }

    Ok(MessagesRequest {
        model: config.model.clone(),
        max_tokens: config.max_tokens,
        temperature: config.temperature,
        system,
        messages: wire_messages,
        tools: if tools.is_empty() {
            None
        } else {
            Some(
                tools
                    .iter()
                    .map(|tool| ToolDef {
                        name: tool.name.clone(),
                        description: tool.description.clone(),
                        input_schema: tool.parameters.clone(),
                    })
                    .collect(),
            )
        },
    })
}

fn parse_arguments(call: &ToolCallRequest) -> Result<Value, Error> {
    serde_json::from_str(&call.arguments).map_err(|err| {
        Error::new(
            format!(
                "tool call {} carries arguments that are not valid JSON: {err}",
                call.id
            ),
            ErrorKind::Protocol,
        )
    })
}

pub fn decode_response(resp: MessagesResponse) -> Result<Completion, Error> {
    let mut text = String::new();
    let mut tool_calls = Vec::new();

    for block in resp.content {
        match block {
            ResponseBlock::Text { text: part } => text.push_str(&part),
            ResponseBlock::ToolUse { id, name, input } => {
                let arguments = serde_json::to_string(&input).map_err(|err| {
                    Error::new(
                        format!("failed to serialize tool input: {err}"),
                        ErrorKind::Protocol,
                    )
                })?;
                tool_calls.push(ToolCallRequest {
                    id,
                    name,
                    arguments,
                });
            }
        }
    }

    Ok(Completion {
        text,
        tool_calls,
        stop_reason: resp.stop_reason.unwrap_or_else(|| "end_turn".to_owned()),
    })
}
