//! SSE (Server-Sent Events) stream decoding.
//!
//! The agent backend streams its reply as newline-delimited SSE records:
//! only `data: <json>` lines are meaningful, and each payload is a JSON
//! envelope ([`ServerEvent`]). Decoding is incremental: chunks arrive from
//! the network with arbitrary boundaries, so the decoder reassembles UTF-8
//! sequences and lines across them.
//!
//! # Module structure
//! - `events` - the decoded envelope type ([`ServerEvent`])
//! - `decoder` - the incremental framer ([`StreamDecoder`], [`DecodeError`])

mod decoder;
mod events;

pub use decoder::{DecodeError, Decoded, StreamDecoder};
pub use events::{ServerEvent, TEXT_PLAIN};
