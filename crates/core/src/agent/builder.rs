use steward_model::ChatProvider;

use super::{Agent, ApprovalFn, TranscriptFn, TranscriptSource};
use crate::tool::{Approval, Registry, Tool};

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
const DEFAULT_MAX_ITERATIONS: usize = 10;

/// [`Agent`] builder.
pub struct AgentBuilder<P> {
    pub(crate) provider: P,
    pub(crate) registry: Registry,
    pub(crate) system_prompt: String,
    pub(crate) max_iterations: usize,
    pub(crate) confirm_enabled: bool,
    pub(crate) on_approval: Option<ApprovalFn>,
    pub(crate) on_transcript: Option<TranscriptFn>,
}

impl<P: ChatProvider> AgentBuilder<P> {
    /// Creates a new builder with the specified provider.
    pub fn with_provider(provider: P) -> Self {
        Self {
            provider,
            registry: Registry::new(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_owned(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            confirm_enabled: true,
            on_approval: None,
            on_transcript: None,
        }
    }

    /// Sets the system prompt for the agent.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Registers a tool.
    #[inline]
    pub fn with_tool<T: Tool>(mut self, tool: T) -> Self {
        self.registry.register(tool);
        self
    }

    /// Sets the ceiling on model calls per user turn.
    #[inline]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the initial state of the confirmation gate.
    #[inline]
    pub fn with_confirm_enabled(mut self, enabled: bool) -> Self {
        self.confirm_enabled = enabled;
        self
    }

    /// Attaches the callback that decides gated tool calls.
    ///
    /// Without one, gated calls run as if approved.
    #[inline]
    pub fn on_approval(
        mut self,
        on_approval: impl Fn(&Approval) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.on_approval = Some(Box::new(on_approval));
        self
    }

    /// Attaches a callback invoked with intermediate transcript lines
    /// (assistant narration around tool calls, and tool outcomes).
    #[inline]
    pub fn on_transcript(
        mut self,
        on_transcript: impl Fn(&str, TranscriptSource) + Send + Sync + 'static,
    ) -> Self {
        self.on_transcript = Some(Box::new(on_transcript));
        self
    }

    /// Builds the agent.
    #[inline]
    pub fn build(self) -> Agent<P> {
        Agent::from_builder(self)
    }
}
