//! The provider-neutral conversation model.
//!
//! This crate establishes a single protocol for the agent to talk to the
//! supported LLM backends, so that the rest of the system can switch
//! between them without changes.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that backend implementors should adhere to. The actual wire
//! translation for each backend lives in its own crate.

#![deny(missing_docs)]

mod completion;
mod message;
mod provider;

pub use completion::*;
pub use message::*;
pub use provider::*;
