use std::collections::VecDeque;

use steward_model::ErrorKind;

use crate::Error;
use crate::io::{Sse, SseError};
use crate::openai::ChatCompletionChunk;

/// A single incremental event from a streaming chat-completions call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamEvent {
    /// A fragment of assistant text.
    TextDelta(String),
    /// A fragment of a tool-call request.
    ///
    /// The name and arguments of one call may arrive split across many
    /// events; fragments that share an `index` belong to the same call and
    /// the consumer reassembles them. This client deliberately does not
    /// reassemble on the caller's behalf.
    ToolCallFragment(ToolCallFragment),
}

/// One partial piece of a tool-call request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolCallFragment {
    /// Which in-progress tool call this fragment extends.
    pub index: u32,
    /// The call identifier, usually only present on the first fragment.
    pub id: Option<String>,
    /// A piece of the tool name.
    pub name: Option<String>,
    /// A piece of the serialized argument text.
    pub arguments: Option<String>,
}

/// A lazy, finite, non-restartable sequence of [`StreamEvent`]s.
///
/// Events are pulled one at a time with [`CompletionStream::next`]; the
/// caller blocks between pulls and nothing is buffered ahead beyond the
/// events of the chunk currently being decoded. After the stream reports
/// `None` once, it will keep reporting `None`.
#[derive(Debug)]
pub struct CompletionStream {
    sse: Sse,
    pending: VecDeque<StreamEvent>,
    done: bool,
}

impl CompletionStream {
    pub(crate) fn new(sse: Sse) -> Self {
        Self {
            sse,
            pending: VecDeque::new(),
            done: false,
        }
    }

    /// Pulls the next event, or `None` once the response has completed.
    pub async fn next(&mut self) -> Result<Option<StreamEvent>, Error> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(Some(event));
            }
            if self.done {
                return Ok(None);
            }

            let payload = match self.sse.next_event().await {
                Ok(Some(payload)) => payload,
                Ok(None) => {
                    self.done = true;
                    return Ok(None);
                }
                Err(SseError::Chunks) => {
                    self.done = true;
                    return Err(Error::new(
                        "connection lost while streaming",
                        ErrorKind::Transport,
                    ));
                }
                Err(SseError::InvalidPayload) => {
                    self.done = true;
                    return Err(Error::new(
                        "malformed event in stream",
                        ErrorKind::Protocol,
                    ));
                }
            };
            trace!("got sse payload: {payload}");
            if payload == "[DONE]" {
                self.done = true;
                return Ok(None);
            }

            let chunk: ChatCompletionChunk =
                serde_json::from_str(&payload).map_err(|err| {
                    Error::new(format!("{err}"), ErrorKind::Protocol)
                })?;
            for choice in chunk.choices {
                if let Some(content) = choice.delta.content {
                    if !content.is_empty() {
                        self.pending.push_back(StreamEvent::TextDelta(content));
                    }
                }
                for delta in choice.delta.tool_calls.unwrap_or_default() {
                    let function = delta.function;
                    self.pending.push_back(StreamEvent::ToolCallFragment(
                        ToolCallFragment {
                            index: delta.index.unwrap_or(0),
                            id: delta.id,
                            name: function.as_ref().and_then(|f| f.name.clone()),
                            arguments: function.and_then(|f| f.arguments),
                        },
                    ));
                }
            }
        }
    }
}
