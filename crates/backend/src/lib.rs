//! The provider client for the two supported LLM backends.
//!
//! One backend speaks a chat-completions style protocol (system message
//! inline, tool results as a dedicated `tool` role, tool arguments as
//! serialized text), the other a messages style protocol (system message
//! as a top-level field, tool results as user-supplied content blocks,
//! tool arguments as structured objects). [`BackendClient`] translates the
//! neutral conversation to whichever wire shape its [`ProviderKind`]
//! selects and decodes the response back.
//!
//! Streaming is only available for the chat-completions backend; see
//! [`BackendClient::stream`].

#[macro_use]
extern crate tracing;

mod anthropic;
mod config;
mod io;
mod openai;
mod stream;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::Arc;

use mime::Mime;
use reqwest::{Client, RequestBuilder, Response, header};
use serde_json::Value;
use steward_model::{
    ChatMessage, ChatProvider, Completion, ErrorKind, ProviderError, ToolSpec,
};

pub use config::{BackendConfig, BackendConfigBuilder};
pub use stream::{CompletionStream, StreamEvent, ToolCallFragment};

use io::{Chunks, Sse};

/// Error type for [`BackendClient`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl ProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// The closed set of supported backends.
///
/// Each variant selects one wire protocol module. Supporting another
/// backend means adding a variant and its module here; nothing above the
/// client changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// The chat-completions style backend.
    OpenAi,
    /// The messages style backend.
    Anthropic,
}

/// Error returned when a backend identity is not recognized.
///
/// This is fatal: it is raised before any client exists, never deferred
/// to the first call.
#[derive(Clone, Debug)]
pub struct UnknownProviderError {
    name: String,
}

impl Display for UnknownProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unsupported LLM provider: {:?} (expected \"openai\" or \"anthropic\")",
            self.name
        )
    }
}

impl StdError for UnknownProviderError {}

impl FromStr for ProviderKind {
    type Err = UnknownProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" => Ok(ProviderKind::Anthropic),
            _ => Err(UnknownProviderError { name: s.to_owned() }),
        }
    }
}

/// A client for one of the supported backends.
///
/// The client is cheap to clone and stateless between calls. It performs
/// no retries: a failed call surfaces once, immediately.
#[derive(Clone, Debug)]
pub struct BackendClient {
    http: Client,
    config: Arc<BackendConfig>,
}

impl BackendClient {
    /// Creates a new `BackendClient` with the given configuration.
    #[inline]
    pub fn new(config: BackendConfig) -> Self {
        Self {
            http: Client::new(),
            config: Arc::new(config),
        }
    }

    /// The backend this client talks to.
    #[inline]
    pub fn kind(&self) -> ProviderKind {
        self.config.kind()
    }

    /// Opens a streaming call against the chat-completions backend.
    ///
    /// The returned stream is lazy, finite and non-restartable: events are
    /// pulled one at a time and the stream cannot be rewound. The messages
    /// style backend has no streaming support in this client; calling this
    /// on it returns an [`ErrorKind::Unsupported`] error.
    pub async fn stream(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<CompletionStream, Error> {
        if self.config.kind() != ProviderKind::OpenAi {
            return Err(Error::new(
                "streaming is not implemented for the anthropic backend",
                ErrorKind::Unsupported,
            ));
        }

        let request = openai::build_request(messages, tools, &self.config, true);
        let resp = self
            .request_builder()
            .header(header::ACCEPT, "text/event-stream")
            .json(&request)
            .send()
            .await
            .and_then(Response::error_for_status)
            .map_err(|err| Error::new(format!("{err}"), ErrorKind::Transport))?;

        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        let is_event_stream = content_type
            .and_then(|v| v.parse().ok())
            .map(|m: Mime| m.essence_str() == "text/event-stream")
            .unwrap_or(false);
        if !is_event_stream {
            return Err(Error::new(
                format!("unexpected content type: {content_type:?}"),
                ErrorKind::Protocol,
            ));
        }

        let sse = Sse::new(Chunks::from_response(resp));
        Ok(CompletionStream::new(sse))
    }

    fn request_builder(&self) -> RequestBuilder {
        match self.config.kind() {
            ProviderKind::OpenAi => self
                .http
                .post(format!("{}/chat/completions", self.config.base_url()))
                .header(
                    header::AUTHORIZATION,
                    format!("Bearer {}", self.config.api_key()),
                ),
            ProviderKind::Anthropic => self
                .http
                .post(format!("{}/v1/messages", self.config.base_url()))
                .header("x-api-key", self.config.api_key())
                .header("anthropic-version", "2023-06-01"),
        }
    }

    fn encode_request(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<Value, Error> {
        let body = match self.config.kind() {
            ProviderKind::OpenAi => serde_json::to_value(openai::build_request(
                messages,
                tools,
                &self.config,
                false,
            )),
            ProviderKind::Anthropic => serde_json::to_value(
                anthropic::build_request(messages, tools, &self.config)?,
            ),
        };
        body.map_err(|err| {
            Error::new(
                format!("failed to encode request body: {err}"),
                ErrorKind::Protocol,
            )
        })
    }
}

impl ChatProvider for BackendClient {
    type Error = Error;

    fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> impl Future<Output = Result<Completion, Self::Error>> + Send {
        let body = self.encode_request(messages, tools);
        let request = self.request_builder();
        let kind = self.config.kind();

        async move {
            let body = body?;
            trace!("sending request: {body}");
            let resp = request
                .header(header::CONTENT_TYPE, "application/json")
                .json(&body)
                .send()
                .await
                .and_then(Response::error_for_status)
                .map_err(|err| Error::new(format!("{err}"), ErrorKind::Transport))?;

            match kind {
                ProviderKind::OpenAi => {
                    let wire: openai::ChatCompletionResponse =
                        resp.json().await.map_err(|err| {
                            Error::new(format!("{err}"), ErrorKind::Protocol)
                        })?;
                    openai::decode_response(wire)
                }
                ProviderKind::Anthropic => {
                    let wire: anthropic::MessagesResponse =
                        resp.json().await.map_err(|err| {
                            Error::new(format!("{err}"), ErrorKind::Protocol)
                        })?;
                    anthropic::decode_response(wire)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!("openai".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!(
            "Anthropic".parse::<ProviderKind>().unwrap(),
            ProviderKind::Anthropic
        );

        let err = "gemini".parse::<ProviderKind>().unwrap_err();
        assert!(format!("{err}").contains("gemini"));
    }

    #[tokio::test]
    async fn test_stream_unsupported_for_anthropic() {
        let config = BackendConfigBuilder::new(ProviderKind::Anthropic, "xxx").build();
        let client = BackendClient::new(config);

        let err = client.stream(&[], &[]).await.unwrap_err();
        assert_eq!(ProviderError::kind(&err), ErrorKind::Unsupported);
    }
}
