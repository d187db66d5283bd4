//! A scripted in-process backend for testing purpose.
//!
//! Before use, load the provider with a script of steps; each call to the
//! provider consumes the next step. A provider built with
//! [`ScriptedProvider::repeating`] instead replays the same completion
//! forever, which is how the iteration-ceiling behavior is exercised.
//!
//! # Note
//!
//! This type is not optimized for production use, there are heavy memory
//! copies involved. You should only use it for testing.

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::future::ready;
use std::sync::Mutex;

use steward_model::{
    ChatMessage, ChatProvider, Completion, ErrorKind, ProviderError, ToolSpec,
};

/// The error the scripted provider fails with.
#[derive(Debug)]
pub struct Error {
    message: String,
}

impl Error {
    /// The scripted failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl ProviderError for Error {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Transport
    }
}

/// One scripted reply.
#[derive(Clone, Debug)]
pub enum Step {
    /// Respond with this completion.
    Reply(Completion),
    /// Fail the call with this message.
    Fail(String),
}

/// A `ChatProvider` that replays a fixed script.
///
/// Every request it receives is recorded, so tests can assert on the
/// translated conversation the agent actually sent.
#[derive(Default)]
pub struct ScriptedProvider {
    steps: Mutex<VecDeque<Step>>,
    repeat: Option<Completion>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedProvider {
    /// Creates a provider with an empty script. Calls beyond the script
    /// fail with a "script exhausted" error.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider that answers every call with a clone of
    /// `completion`, forever.
    pub fn repeating(completion: Completion) -> Self {
        Self {
            steps: Mutex::new(VecDeque::new()),
            repeat: Some(completion),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Appends a successful reply to the script.
    pub fn push_reply(&mut self, completion: Completion) {
        self.steps
            .lock()
            .expect("script mutex poisoned")
            .push_back(Step::Reply(completion));
    }

    /// Appends a failure to the script.
    pub fn push_failure<S: Into<String>>(&mut self, message: S) {
        self.steps
            .lock()
            .expect("script mutex poisoned")
            .push_back(Step::Fail(message.into()));
    }

    /// Every request the provider has seen, in order.
    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests
            .lock()
            .expect("requests mutex poisoned")
            .clone()
    }
}

impl ChatProvider for ScriptedProvider {
    type Error = Error;

    fn complete(
        &self,
        messages: &[ChatMessage],
        _tools: &[ToolSpec],
    ) -> impl Future<Output = Result<Completion, Self::Error>> + Send {
        self.requests
            .lock()
            .expect("requests mutex poisoned")
            .push(messages.to_vec());

        let step = self
            .steps
            .lock()
            .expect("script mutex poisoned")
            .pop_front();
        let result = match step {
            Some(Step::Reply(completion)) => Ok(completion),
            Some(Step::Fail(message)) => Err(Error { message }),
            None => match &self.repeat {
                Some(completion) => Ok(completion.clone()),
                None => Err(Error {
                    message: "script exhausted".to_owned(),
                }),
            },
        };
        ready(result)
    }
}
