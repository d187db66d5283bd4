//! Exercises the `ChatProvider` trait surface with a minimal in-crate fake.

use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::future::ready;

use steward_model::{
    ChatMessage, ChatProvider, Completion, ErrorKind, ProviderError, ToolSpec,
};

#[derive(Debug)]
struct FakeError;

impl Display for FakeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "fake error")
    }
}

impl StdError for FakeError {}

impl ProviderError for FakeError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Transport
    }
}

/// Replies with a fixed text, or fails when the conversation is empty.
struct FakeProvider;

impl ChatProvider for FakeProvider {
    type Error = FakeError;

    fn complete(
        &self,
        messages: &[ChatMessage],
        _tools: &[ToolSpec],
    ) -> impl Future<Output = Result<Completion, Self::Error>> + Send {
        let result = if messages.is_empty() {
            Err(FakeError)
        } else {
            Ok(Completion::text_only("pong", "stop"))
        };
        ready(result)
    }
}

#[tokio::test]
async fn test_complete() {
    let provider = FakeProvider;
    let messages = vec![
        ChatMessage::System("Be terse.".to_owned()),
        ChatMessage::User("ping".to_owned()),
    ];

    let completion = provider.complete(&messages, &[]).await.unwrap();
    assert_eq!(completion.text, "pong");
    assert!(completion.tool_calls.is_empty());
}

#[tokio::test]
async fn test_error_surface() {
    let provider = FakeProvider;
    let err = provider.complete(&[], &[]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}
