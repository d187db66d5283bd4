//! Byte-chunk and server-sent-event plumbing for streaming responses.

mod chunks;
mod sse;

pub(crate) use chunks::Chunks;
pub(crate) use sse::Sse;
pub(crate) use sse::Error as SseError;
