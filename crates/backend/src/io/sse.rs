use super::Chunks;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    Chunks,
    InvalidPayload,
}

/// Reads server-sent events off a chunk stream.
///
/// Only `data` fields are understood; events may arrive split across any
/// number of chunks, so decoding buffers until a blank-line terminator is
/// seen.
#[derive(Debug)]
pub struct Sse {
    buf: String,
    chunks: Chunks,
}

impl Sse {
    #[inline]
    pub fn new(chunks: Chunks) -> Self {
        Self {
            buf: String::new(),
            chunks,
        }
    }

    /// Returns the payload of the next event, or `None` at end of stream.
    pub async fn next_event(&mut self) -> Result<Option<String>, Error> {
        loop {
            if let Some(payload) = self.take_event()? {
                return Ok(Some(payload));
            }

            // Not enough buffered data for a full event; pull more.
            let Some(bytes) = self.chunks.next_chunk().await.map_err(|_| Error::Chunks)?
            else {
                return Ok(None);
            };
            let Ok(s) = str::from_utf8(&bytes) else {
                return Err(Error::InvalidPayload);
            };
            self.buf.push_str(s);
        }
    }

    /// Consumes one complete event from the buffer, if present.
    ///
    /// An event is one `data` field terminated by a blank line; only line
    /// feeds are handled as end-of-line.
    fn take_event(&mut self) -> Result<Option<String>, Error> {
        let Some(end) = self.buf.find("\n\n") else {
            return Ok(None);
        };

        let field = &self.buf[..end];
        let Some(rest) = field.strip_prefix("data:") else {
            return Err(Error::InvalidPayload);
        };
        let payload = rest.strip_prefix(' ').unwrap_or(rest).to_owned();

        self.buf.drain(..end + 2);
        Ok(Some(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_normal_events() {
        let chunks = Chunks::from_canned([
            b"data: hello\n\n" as &[u8],
            b"data: bye\n\n",
        ]);
        let mut sse = Sse::new(chunks);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "hello");
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "bye");
        assert_eq!(sse.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_event_split_across_chunks() {
        let chunks = Chunks::from_canned([
            b"data:" as &[u8],
            b" hello\n",
            b"\n",
        ]);
        let mut sse = Sse::new(chunks);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "hello");
        assert_eq!(sse.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_space_after_colon() {
        let chunks = Chunks::from_canned([b"data:hello\n\n" as &[u8]]);
        let mut sse = Sse::new(chunks);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_invalid_data() {
        let chunks = Chunks::from_canned([b"xxxxxx\n\n" as &[u8]]);
        let mut sse = Sse::new(chunks);
        assert_eq!(sse.next_event().await.unwrap_err(), Error::InvalidPayload);

        // An unterminated event is not an error, just an incomplete stream.
        let chunks = Chunks::from_canned([b"data: hello\n" as &[u8]]);
        let mut sse = Sse::new(chunks);
        assert_eq!(sse.next_event().await.unwrap(), None);
    }
}
