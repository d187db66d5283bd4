use std::future::ready;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::{Value, json};
use steward_model::{ChatMessage, Completion, ToolCallRequest};
use steward_test_backend::ScriptedProvider;

use crate::agent::{AgentBuilder, DECLINE_MARKER};
use crate::tool::{Tool, ToolResult};

struct EchoTool {
    schema: Value,
}

impl EchoTool {
    fn new() -> Self {
        Self {
            schema: json!({
                "type": "object",
                "properties": { "text": { "type": "string" } },
                "required": ["text"]
            }),
        }
    }
}

#[derive(serde::Deserialize)]
struct EchoInput {
    text: String,
}

impl Tool for EchoTool {
    type Input = EchoInput;

    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echoes the given text back."
    }

    fn parameter_schema(&self) -> &Value {
        &self.schema
    }

    fn execute(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        ready(Ok(input.text))
    }
}

/// A gated tool that records whether it actually ran.
struct GatedTool {
    schema: Value,
    executed: Arc<AtomicBool>,
}

impl GatedTool {
    fn new() -> (Self, Arc<AtomicBool>) {
        let executed = Arc::new(AtomicBool::new(false));
        let tool = Self {
            schema: json!({ "type": "object", "properties": {} }),
            executed: Arc::clone(&executed),
        };
        (tool, executed)
    }
}

impl Tool for GatedTool {
    type Input = Value;

    fn name(&self) -> &str {
        "wipe"
    }

    fn description(&self) -> &str {
        "A destructive operation."
    }

    fn parameter_schema(&self) -> &Value {
        &self.schema
    }

    fn requires_confirmation(&self) -> bool {
        true
    }

    fn execute(
        &self,
        _input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let executed = Arc::clone(&self.executed);
        async move {
            executed.store(true, Ordering::Relaxed);
            Ok("wiped".to_owned())
        }
    }
}

fn echo_call(id: &str, text: &str) -> ToolCallRequest {
    ToolCallRequest {
        id: id.to_owned(),
        name: "echo".to_owned(),
        arguments: format!("{{\"text\": \"{text}\"}}"),
    }
}

fn tool_completion(calls: Vec<ToolCallRequest>) -> Completion {
    Completion {
        text: String::new(),
        tool_calls: calls,
        stop_reason: "tool_calls".to_owned(),
    }
}

#[tokio::test]
async fn test_simple_answer() {
    let mut provider = ScriptedProvider::new();
    provider.push_reply(Completion::text_only("Hello!", "stop"));

    let mut agent = AgentBuilder::with_provider(provider)
        .with_system_prompt("Be terse.")
        .build();

    let reply = agent.chat("Hi").await;
    assert_eq!(reply, "Hello!");

    let history = agent.history();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0], ChatMessage::System("Be terse.".to_owned()));
    assert_eq!(history[1], ChatMessage::User("Hi".to_owned()));
    assert_eq!(history[2], ChatMessage::assistant("Hello!"));
}

#[tokio::test]
async fn test_tool_round_ordering() {
    let mut provider = ScriptedProvider::new();
    provider.push_reply(tool_completion(vec![
        echo_call("call_1", "first"),
        echo_call("call_2", "second"),
    ]));
    provider.push_reply(Completion::text_only("Done.", "stop"));

    let mut agent = AgentBuilder::with_provider(provider)
        .with_tool(EchoTool::new())
        .build();

    let reply = agent.chat("Echo twice").await;
    assert_eq!(reply, "Done.");

    // Exactly one tool reply per request, in request order.
    let history = agent.history();
    let ChatMessage::Tool(first) = &history[3] else {
        panic!("expected a tool message");
    };
    let ChatMessage::Tool(second) = &history[4] else {
        panic!("expected a tool message");
    };
    assert_eq!(first.call_id, "call_1");
    assert_eq!(first.content, "first");
    assert_eq!(second.call_id, "call_2");
    assert_eq!(second.content, "second");
}

#[tokio::test]
async fn test_iteration_ceiling() {
    let provider =
        ScriptedProvider::repeating(tool_completion(vec![echo_call("call_1", "again")]));

    let mut agent = AgentBuilder::with_provider(provider)
        .with_tool(EchoTool::new())
        .with_max_iterations(3)
        .build();

    let reply = agent.chat("Loop forever").await;
    assert!(reply.contains("iteration limit (3)"));

    // The model was called exactly at the ceiling, never beyond it.
    assert_eq!(agent.provider().requests().len(), 3);

    // The conversation is left in its partial state, not rolled back.
    assert!(matches!(
        agent.history().last(),
        Some(ChatMessage::Tool(_))
    ));
}

#[tokio::test]
async fn test_provider_error_surfaces() {
    let mut provider = ScriptedProvider::new();
    provider.push_failure("connection refused");

    let mut agent = AgentBuilder::with_provider(provider).build();

    let reply = agent.chat("Hi").await;
    assert!(reply.contains("connection refused"));

    // The user message stays, with no assistant reply after it; calling
    // `chat` again is a clean retry.
    assert_eq!(
        agent.history().last(),
        Some(&ChatMessage::User("Hi".to_owned()))
    );
}

#[tokio::test]
async fn test_reset_is_idempotent() {
    let mut provider = ScriptedProvider::new();
    provider.push_reply(Completion::text_only("Hello!", "stop"));

    let mut agent = AgentBuilder::with_provider(provider)
        .with_system_prompt("Be terse.")
        .build();
    agent.chat("Hi").await;
    assert_eq!(agent.history().len(), 3);

    agent.reset();
    let after_once = agent.history().to_vec();
    agent.reset();
    assert_eq!(agent.history(), &after_once[..]);
    assert_eq!(
        agent.history(),
        &[ChatMessage::System("Be terse.".to_owned())]
    );
}

#[tokio::test]
async fn test_confirmation_disabled_skips_prompt() {
    let mut provider = ScriptedProvider::new();
    provider.push_reply(tool_completion(vec![ToolCallRequest {
        id: "call_1".to_owned(),
        name: "wipe".to_owned(),
        arguments: "{}".to_owned(),
    }]));
    provider.push_reply(Completion::text_only("Done.", "stop"));

    let (tool, executed) = GatedTool::new();
    let prompted = Arc::new(AtomicBool::new(false));
    let mut agent = AgentBuilder::with_provider(provider)
        .with_tool(tool)
        .with_confirm_enabled(false)
        .on_approval({
            let prompted = Arc::clone(&prompted);
            move |_| {
                prompted.store(true, Ordering::Relaxed);
                false
            }
        })
        .build();

    agent.chat("Wipe it").await;

    // No prompt, and the real result was recorded.
    assert!(!prompted.load(Ordering::Relaxed));
    assert!(executed.load(Ordering::Relaxed));
    assert!(agent.history().iter().any(|msg| matches!(
        msg,
        ChatMessage::Tool(reply) if reply.content == "wiped"
    )));
}

#[tokio::test]
async fn test_decline_recorded_as_result() {
    let mut provider = ScriptedProvider::new();
    provider.push_reply(tool_completion(vec![ToolCallRequest {
        id: "call_1".to_owned(),
        name: "wipe".to_owned(),
        arguments: "{}".to_owned(),
    }]));
    provider.push_reply(Completion::text_only("Okay, skipped.", "stop"));

    let (tool, executed) = GatedTool::new();
    let mut agent = AgentBuilder::with_provider(provider)
        .with_tool(tool)
        .on_approval(|_| false)
        .build();

    let reply = agent.chat("Wipe it").await;
    assert_eq!(reply, "Okay, skipped.");
    assert!(!executed.load(Ordering::Relaxed));
    assert!(agent.history().iter().any(|msg| matches!(
        msg,
        ChatMessage::Tool(reply) if reply.content == DECLINE_MARKER
    )));
}

#[tokio::test]
async fn test_toggle_affects_later_calls_only() {
    let mut provider = ScriptedProvider::new();
    provider.push_reply(tool_completion(vec![ToolCallRequest {
        id: "call_1".to_owned(),
        name: "wipe".to_owned(),
        arguments: "{}".to_owned(),
    }]));
    provider.push_reply(Completion::text_only("First done.", "stop"));
    provider.push_reply(tool_completion(vec![ToolCallRequest {
        id: "call_2".to_owned(),
        name: "wipe".to_owned(),
        arguments: "{}".to_owned(),
    }]));
    provider.push_reply(Completion::text_only("Second done.", "stop"));

    let (tool, executed) = GatedTool::new();
    let mut agent = AgentBuilder::with_provider(provider)
        .with_tool(tool)
        .on_approval(|_| false)
        .build();

    agent.chat("Try it").await;
    assert!(!executed.load(Ordering::Relaxed));

    agent.set_confirm_enabled(false);
    agent.chat("Try again").await;
    assert!(executed.load(Ordering::Relaxed));
}

#[tokio::test]
async fn test_unknown_tool_becomes_error_reply() {
    let mut provider = ScriptedProvider::new();
    provider.push_reply(tool_completion(vec![ToolCallRequest {
        id: "call_1".to_owned(),
        name: "missing_tool".to_owned(),
        arguments: "{}".to_owned(),
    }]));
    provider.push_reply(Completion::text_only("I see.", "stop"));

    let mut agent = AgentBuilder::with_provider(provider).build();
    agent.chat("Use a tool you don't have").await;

    assert!(agent.history().iter().any(|msg| matches!(
        msg,
        ChatMessage::Tool(reply)
            if reply.content.starts_with("Error:")
                && reply.content.contains("missing_tool")
    )));
}
