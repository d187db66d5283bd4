use crate::ToolCallRequest;

/// The decoded result of one backend call.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Completion {
    /// The assistant text, with multi-part responses concatenated in order.
    pub text: String,
    /// Tool invocations the model requested, in order.
    pub tool_calls: Vec<ToolCallRequest>,
    /// Why generation ended, in the backend's own vocabulary (for example
    /// `stop`/`tool_calls`/`length` for one backend, `end_turn`/`tool_use`/
    /// `max_tokens` for the other).
    ///
    /// The vocabularies are deliberately not unified. The one signal that
    /// is reliable across backends is whether [`Completion::tool_calls`]
    /// is empty, so callers branch on that, never on this string.
    pub stop_reason: String,
}

impl Completion {
    /// Creates a text-only completion with the given stop reason.
    #[inline]
    pub fn text_only<S: Into<String>, R: Into<String>>(text: S, stop_reason: R) -> Self {
        Self {
            text: text.into(),
            tool_calls: Vec::new(),
            stop_reason: stop_reason.into(),
        }
    }
}
