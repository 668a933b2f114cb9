//! Incremental decoding of SSE byte streams.
//!
//! [`StreamDecoder`] turns raw response-body chunks into [`ServerEvent`]s.
//! It owns the two pieces of state that make chunked reads safe:
//! a byte carry for UTF-8 sequences split across chunk boundaries, and a
//! line buffer for the unterminated tail of the stream. The decoded event
//! sequence is identical for every possible chunking of the same bytes.

use thiserror::Error;

use super::events::ServerEvent;

/// Records carrying a JSON payload start with this prefix.
const DATA_PREFIX: &str = "data: ";

/// How much of a bad record to keep in the error message.
const RECORD_SNIPPET_LEN: usize = 120;

/// A per-record decode failure. Never fatal to the stream; the decoder
/// keeps going with the next line.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload after `data: ` was not valid JSON.
    #[error("invalid JSON in record `{record}`: {source}")]
    Json {
        /// The offending payload, truncated for logging.
        record: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One item produced by the decoder: a decoded event or a per-record error.
pub type Decoded = Result<ServerEvent, DecodeError>;

/// Incremental SSE frame decoder.
///
/// Feed it response-body chunks as they arrive; it emits one decoded event
/// per `data: <json>` record, in arrival order. Lines that do not carry the
/// `data: ` prefix (comments, `event:` lines, blank record separators) are
/// ignored. Call [`StreamDecoder::finish`] when the byte stream ends.
///
/// ```
/// use confab::sse::StreamDecoder;
///
/// let mut decoder = StreamDecoder::new();
/// let mut events = decoder.feed(b"data: {\"mime_type\":\"text/plain\",\"data\":\"hi\"}\n\n");
/// events.extend(decoder.finish());
/// assert_eq!(events.len(), 1);
/// assert_eq!(events[0].as_ref().unwrap().text(), Some("hi"));
/// ```
#[derive(Debug, Default)]
pub struct StreamDecoder {
    /// Trailing bytes of an incomplete UTF-8 sequence from the last chunk.
    carry: Vec<u8>,
    /// Decoded text not yet terminated by a newline. Holds at most one
    /// partial line; every complete line is flushed on the feed that
    /// completes it.
    line_buf: String,
}

impl StreamDecoder {
    /// Create a decoder with empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one chunk of bytes, returning every record completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Decoded> {
        self.decode_utf8(chunk);
        self.drain_lines()
    }

    /// Signal end-of-data.
    ///
    /// An unterminated trailing line is discarded, not emitted: the backend
    /// ends every record with a newline, so a mid-line end means the record
    /// was cut off in transit. The drop is logged for observability. With
    /// the current protocol the returned vec is therefore always empty; the
    /// method exists so callers flush through one interface.
    pub fn finish(&mut self) -> Vec<Decoded> {
        if !self.line_buf.is_empty() || !self.carry.is_empty() {
            tracing::debug!(
                dropped = %self.line_buf,
                carry_bytes = self.carry.len(),
                "discarding unterminated tail at end of stream"
            );
            self.line_buf.clear();
            self.carry.clear();
        }
        Vec::new()
    }

    /// Stream-safe UTF-8 decode of `chunk` into the line buffer.
    ///
    /// An incomplete multi-byte sequence at the end of the input is carried
    /// over to the next feed; invalid sequences decode to U+FFFD and are
    /// skipped, so one corrupt byte never poisons the rest of the stream.
    fn decode_utf8(&mut self, chunk: &[u8]) {
        let joined;
        let mut bytes: &[u8] = if self.carry.is_empty() {
            chunk
        } else {
            self.carry.extend_from_slice(chunk);
            joined = std::mem::take(&mut self.carry);
            &joined
        };

        while !bytes.is_empty() {
            match std::str::from_utf8(bytes) {
                Ok(text) => {
                    self.line_buf.push_str(text);
                    break;
                }
                Err(err) => {
                    let valid_to = err.valid_up_to();
                    if let Ok(text) = std::str::from_utf8(&bytes[..valid_to]) {
                        self.line_buf.push_str(text);
                    }
                    bytes = &bytes[valid_to..];
                    match err.error_len() {
                        // A full invalid sequence: emit a replacement char
                        // and resume after it.
                        Some(bad) => {
                            self.line_buf.push(char::REPLACEMENT_CHARACTER);
                            bytes = &bytes[bad..];
                        }
                        // The chunk ends inside a multi-byte sequence; keep
                        // the tail for the next feed.
                        None => {
                            self.carry = bytes.to_vec();
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Flush every complete line out of the buffer, decoding `data: `
    /// records and ignoring everything else.
    fn drain_lines(&mut self) -> Vec<Decoded> {
        let mut out = Vec::new();
        while let Some(pos) = self.line_buf.find('\n') {
            let rest = self.line_buf.split_off(pos + 1);
            let mut line = std::mem::replace(&mut self.line_buf, rest);
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
            if let Some(payload) = line.strip_prefix(DATA_PREFIX) {
                out.push(decode_record(payload));
            }
        }
        out
    }

    /// Whether the decoder is holding a partial line or partial character.
    pub fn has_partial(&self) -> bool {
        !self.line_buf.is_empty() || !self.carry.is_empty()
    }
}

/// Parse one record payload. A failure is reported for this record only.
fn decode_record(payload: &str) -> Decoded {
    serde_json::from_str(payload).map_err(|source| DecodeError::Json {
        record: snippet(payload),
        source,
    })
}

/// Truncate a payload for inclusion in an error message.
fn snippet(payload: &str) -> String {
    if payload.len() <= RECORD_SNIPPET_LEN {
        return payload.to_string();
    }
    let mut end = RECORD_SNIPPET_LEN;
    while !payload.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &payload[..end])
}
