use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single turn in a conversation.
///
/// One variant per role, which makes the legal role/field combinations
/// exhaustive: only an assistant turn can carry tool-call requests, and
/// only a tool turn can answer one.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChatMessage {
    /// The system instructions. Always the first message of a conversation.
    System(String),
    /// A user input text.
    User(String),
    /// An assistant reply, possibly requesting tool calls.
    Assistant {
        /// The textual payload. May be empty when the turn exists only to
        /// carry tool-call requests.
        text: String,
        /// Tool invocations requested by this turn, in order. Empty for a
        /// plain text reply.
        tool_calls: Vec<ToolCallRequest>,
    },
    /// The result of exactly one prior tool-call request.
    Tool(ToolReply),
}

impl ChatMessage {
    /// Creates an assistant message that carries text only.
    #[inline]
    pub fn assistant<S: Into<String>>(text: S) -> Self {
        ChatMessage::Assistant {
            text: text.into(),
            tool_calls: Vec::new(),
        }
    }
}

/// Answers one prior tool-call request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolReply {
    /// The identifier of the tool-call request this reply answers.
    pub call_id: String,
    /// The tool's textual result (or a failure description).
    pub content: String,
}

/// A tool invocation requested by the model.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// The unique identifier for this request within the conversation.
    pub id: String,
    /// The name of the tool to call.
    pub name: String,
    /// The argument payload as raw serialized JSON text.
    ///
    /// Backends that produce a structured object serialize it before it
    /// reaches this type, so the round trip through text is lossless for
    /// JSON-representable arguments.
    pub arguments: String,
}

/// Describes a tool advertised to the model.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ToolSpec {
    /// Name of the tool.
    pub name: String,
    /// Description of the tool.
    pub description: String,
    /// Parameter schema of the tool, a [JSON schema](https://json-schema.org/)
    /// object with `type`, `properties` and `required`.
    pub parameters: Value,
}
