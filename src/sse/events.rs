//! Decoded event types for the agent streaming protocol.

use serde::Deserialize;

/// Mime type the backend uses for streamed text payloads.
pub const TEXT_PLAIN: &str = "text/plain";

/// One decoded JSON envelope from the SSE stream.
///
/// Every field is optional and independently meaningful; the backend mixes
/// text chunks (`mime_type` + `data`), turn markers (`turn_complete`,
/// `interrupted`) and failure reports (`error`) in the same envelope shape.
/// Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ServerEvent {
    /// Payload mime type, `"text/plain"` for text chunks.
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Payload content for text chunks.
    #[serde(default)]
    pub data: Option<String>,
    /// Marks the end of the current turn.
    #[serde(default)]
    pub turn_complete: Option<bool>,
    /// The agent was interrupted mid-turn; carries no text.
    #[serde(default)]
    pub interrupted: Option<bool>,
    /// Error message when the agent run failed server-side.
    #[serde(default)]
    pub error: Option<String>,
}

impl ServerEvent {
    /// Whether this event ends the current turn.
    pub fn is_turn_complete(&self) -> bool {
        self.turn_complete == Some(true)
    }

    /// Whether this event reports an interruption.
    pub fn is_interrupted(&self) -> bool {
        self.interrupted == Some(true)
    }

    /// Text payload, present only for `text/plain` events with data.
    pub fn text(&self) -> Option<&str> {
        if self.mime_type.as_deref() == Some(TEXT_PLAIN) {
            self.data.as_deref()
        } else {
            None
        }
    }
}
