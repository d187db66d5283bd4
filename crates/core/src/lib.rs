//! Core logic: the bounded agent loop and tool execution.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod agent;
pub mod tool;

pub use agent::{Agent, AgentBuilder, DECLINE_MARKER, TranscriptSource};
