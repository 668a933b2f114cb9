//! Chat transcript state and the event reducer.
//!
//! The transcript owns the ordered message units and the "currently open"
//! unit that streamed text appends to. Keeping that reference here, rather
//! than in module-level state, means every receive loop goes through the
//! same explicit reducer and nothing races on a hidden global.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sse::ServerEvent;

/// Who produced a message unit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    User,
    Agent,
}

/// One displayed message unit in the transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageUnit {
    /// Who the unit belongs to.
    pub role: Role,
    /// Accumulated text. Payload-internal newlines are line breaks within
    /// this unit, never unit boundaries.
    pub content: String,
    /// When the unit was opened.
    pub created_at: DateTime<Utc>,
    /// Whether text is still being appended to this unit.
    pub is_streaming: bool,
}

impl MessageUnit {
    /// A finished user message.
    fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            created_at: Utc::now(),
            is_streaming: false,
        }
    }

    /// A new, empty agent message accepting streamed text.
    fn agent() -> Self {
        Self {
            role: Role::Agent,
            content: String::new(),
            created_at: Utc::now(),
            is_streaming: true,
        }
    }

    /// Append a streamed text chunk.
    fn append(&mut self, text: &str) {
        self.content.push_str(text);
    }

    /// Mark the unit as complete.
    fn finalize(&mut self) {
        self.is_streaming = false;
    }
}

/// What the reducer did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Text was appended to a message unit (opening one if needed).
    Appended,
    /// The current turn ended; the open unit (if any) was closed.
    TurnEnded,
    /// The event carried nothing to display.
    Ignored,
}

/// Ordered chat transcript plus the open-unit reducer state.
#[derive(Debug, Default)]
pub struct Transcript {
    units: Vec<MessageUnit>,
    /// Index of the in-progress agent unit, if one is open.
    open: Option<usize>,
    /// Most recent server-reported error, until taken for display.
    last_error: Option<String>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// All message units, in display order.
    pub fn units(&self) -> &[MessageUnit] {
        &self.units
    }

    /// Whether an agent unit is currently open for streamed text.
    pub fn has_open_unit(&self) -> bool {
        self.open.is_some()
    }

    /// Take the most recent server-reported error, if any.
    pub fn take_error(&mut self) -> Option<String> {
        self.last_error.take()
    }

    /// Record a submitted user message as its own closed unit.
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.units.push(MessageUnit::user(text));
    }

    /// Reduce one server event into the transcript.
    ///
    /// - `turn_complete` closes the open unit; later text starts a new one.
    /// - `interrupted` displays nothing and closes nothing.
    /// - `text/plain` appends to the open unit, opening one first if needed.
    /// - a reported `error` is stashed for the status line.
    /// - anything else is ignored.
    pub fn apply(&mut self, event: &ServerEvent) -> Applied {
        if let Some(error) = &event.error {
            self.last_error = Some(error.clone());
        }

        if event.is_turn_complete() {
            self.close_open_unit();
            return Applied::TurnEnded;
        }

        if event.is_interrupted() {
            return Applied::Ignored;
        }

        if let Some(text) = event.text() {
            let index = match self.open {
                Some(index) => index,
                None => {
                    self.units.push(MessageUnit::agent());
                    let index = self.units.len() - 1;
                    self.open = Some(index);
                    index
                }
            };
            self.units[index].append(text);
            return Applied::Appended;
        }

        Applied::Ignored
    }

    /// Close the open unit, if any. Called by the reducer on turn
    /// completion and by the app when a receive loop dies without one.
    pub fn close_open_unit(&mut self) {
        if let Some(index) = self.open.take() {
            self.units[index].finalize();
        }
    }
}
