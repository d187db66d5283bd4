mod builder;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use serde_json::Value;
use steward_model::{ChatMessage, ChatProvider, ToolCallRequest, ToolReply};

use crate::tool::{Approval, Registry};
pub use builder::AgentBuilder;

/// Where a transcript line originated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TranscriptSource {
    /// Assistant narration that accompanies tool calls.
    Assistant,
    /// The outcome of a tool call.
    Tool,
}

/// Recorded as a tool's result when the user refuses a gated call.
///
/// The rest of the loop treats it like any other tool outcome; the model
/// reads it on the next turn and reacts in text.
pub const DECLINE_MARKER: &str = "User declined this operation";

pub(crate) type ApprovalFn = Box<dyn Fn(&Approval) -> bool + Send + Sync>;
pub(crate) type TranscriptFn = Box<dyn Fn(&str, TranscriptSource) + Send + Sync>;

/// An agent session: owns the conversation, drives the model, and executes
/// the tools it requests.
///
/// A session is single-writer: one logical caller drives [`Agent::chat`]
/// at a time, and nothing here is shared across sessions except the
/// read-only tool registry. Each turn runs one model call, then one batch
/// of tool executions, sequentially and in deterministic order.
pub struct Agent<P> {
    provider: P,
    registry: Arc<Registry>,
    system_prompt: String,
    history: Vec<ChatMessage>,
    max_iterations: usize,
    confirm_enabled: bool,
    on_approval: Option<ApprovalFn>,
    on_transcript: Option<TranscriptFn>,
}

impl<P: ChatProvider> Agent<P> {
    fn from_builder(builder: AgentBuilder<P>) -> Self {
        let AgentBuilder {
            provider,
            registry,
            system_prompt,
            max_iterations,
            confirm_enabled,
            on_approval,
            on_transcript,
        } = builder;

        let history = vec![ChatMessage::System(system_prompt.clone())];
        Self {
            provider,
            registry: Arc::new(registry),
            system_prompt,
            history,
            max_iterations,
            confirm_enabled,
            on_approval,
            on_transcript,
        }
    }

    /// Runs one user turn to completion and returns the visible response.
    ///
    /// The turn loops model call → tool execution until the model replies
    /// without tool calls, or the iteration ceiling is hit. A backend
    /// failure aborts the turn and becomes the returned text; the
    /// conversation then ends with the user message and the caller may
    /// simply call `chat` again.
    pub async fn chat<S: Into<String>>(&mut self, user_text: S) -> String {
        self.history.push(ChatMessage::User(user_text.into()));
        let specs = self.registry.specs();

        for iteration in 1..=self.max_iterations {
            debug!("model call {iteration}/{}", self.max_iterations);
            let completion =
                match self.provider.complete(&self.history, &specs).await {
                    Ok(completion) => completion,
                    Err(err) => {
                        error!("model call failed: {err}");
                        return format!("Model call failed: {err}");
                    }
                };

            let text = completion.text;
            let tool_calls = completion.tool_calls;

            if tool_calls.is_empty() {
                self.history.push(ChatMessage::assistant(text.clone()));
                return text;
            }

            if !text.is_empty() {
                self.emit(&text, TranscriptSource::Assistant);
            }
            self.history.push(ChatMessage::Assistant {
                text,
                tool_calls: tool_calls.clone(),
            });

            for call in tool_calls {
                let content = self.run_tool_call(&call).await;
                self.emit(&content, TranscriptSource::Tool);
                self.history.push(ChatMessage::Tool(ToolReply {
                    call_id: call.id,
                    content,
                }));
            }
        }

        format!(
            "Reached the iteration limit ({}); stopping here.",
            self.max_iterations
        )
    }

    /// Discards the conversation back to the initial system message.
    /// Idempotent.
    pub fn reset(&mut self) {
        self.history.clear();
        self.history
            .push(ChatMessage::System(self.system_prompt.clone()));
    }

    /// Enables or disables the confirmation gate.
    ///
    /// Only affects tool calls made after the toggle changes.
    #[inline]
    pub fn set_confirm_enabled(&mut self, enabled: bool) {
        self.confirm_enabled = enabled;
    }

    /// Whether gated tools currently prompt for confirmation.
    #[inline]
    pub fn confirm_enabled(&self) -> bool {
        self.confirm_enabled
    }

    /// The conversation so far. The first entry is always the system
    /// message.
    #[inline]
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// The tool registry this agent executes against.
    #[inline]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The underlying provider.
    #[inline]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    async fn run_tool_call(&self, call: &ToolCallRequest) -> String {
        if !self.approved(call) {
            info!("user declined tool call: {}", call.name);
            return DECLINE_MARKER.to_owned();
        }
        self.registry.execute(&call.name, &call.arguments).await
    }

    fn approved(&self, call: &ToolCallRequest) -> bool {
        let gated = self.confirm_enabled
            && self
                .registry
                .lookup(&call.name)
                .map(|tool| tool.requires_confirmation())
                .unwrap_or(false);
        if !gated {
            return true;
        }
        let Some(on_approval) = &self.on_approval else {
            return true;
        };

        let arguments: Value = serde_json::from_str(&call.arguments)
            .unwrap_or_else(|_| Value::String(call.arguments.clone()));
        on_approval(&Approval::new(&call.name, arguments))
    }

    fn emit(&self, text: &str, source: TranscriptSource) {
        if let Some(on_transcript) = &self.on_transcript {
            on_transcript(text, source);
        }
    }
}
