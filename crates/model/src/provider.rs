use std::error::Error;

use crate::completion::Completion;
use crate::message::{ChatMessage, ToolSpec};

/// The kind of error a backend call can fail with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The call never produced a usable response (network, auth, HTTP).
    Transport,
    /// The backend responded with something that could not be decoded.
    Protocol,
    /// The backend does not support the requested operation.
    Unsupported,
}

/// The error type for a chat provider.
pub trait ProviderError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A chat backend the agent can drive.
///
/// Implementations translate the neutral conversation plus the tool catalog
/// into their own wire format, perform the call, and translate the response
/// back. A provider behaves like a stateless object: callers may not rely
/// on any internal state between calls, and no retry is performed inside
/// the provider — failures surface once, immediately.
pub trait ChatProvider: Send + Sync {
    /// The error type that may be returned by the provider.
    type Error: ProviderError;

    /// Sends the conversation to the model and returns its reply.
    fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> impl Future<Output = Result<Completion, Self::Error>> + Send;
}
