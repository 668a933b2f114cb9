//! Application state and logic for the TUI.
//!
//! This module contains the core [`App`] struct and [`AppMessage`], the
//! messages receive loops send back to the UI loop. All transcript
//! mutation happens on the UI loop: receive tasks only forward stream
//! items over the channel, so concurrent streams interleave at the channel
//! instead of racing on shared state.

mod stream;

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::client::AgentClient;
use crate::sse::ServerEvent;
use crate::transcript::Transcript;

/// Messages received from async receive loops.
#[derive(Debug)]
pub enum AppMessage {
    /// One decoded event from the agent stream.
    Event(ServerEvent),
    /// The receive loop died: transport failure or bad response status.
    StreamError(String),
    /// The receive loop finished (normally or after an error).
    StreamClosed,
}

/// Top-level application state.
pub struct App {
    /// The chat transcript and reducer state.
    pub transcript: Transcript,
    /// Current contents of the input line.
    pub input: String,
    /// Status line content: the most recent stream or server error.
    pub status: Option<String>,
    /// Shared HTTP client, cloned into receive tasks.
    pub client: Arc<AgentClient>,
    /// Sender side of the app channel, cloned into receive tasks.
    pub message_tx: mpsc::UnboundedSender<AppMessage>,
    /// Receiver side; the run loop takes this once at startup.
    pub message_rx: Option<mpsc::UnboundedReceiver<AppMessage>>,
    /// Redraw needed on the next loop iteration.
    pub needs_redraw: bool,
    /// Set when the user asks to exit.
    pub should_quit: bool,
    /// Receive loops currently in flight.
    streams_in_flight: usize,
}

impl App {
    pub fn new(client: AgentClient) -> Self {
        let (message_tx, message_rx) = mpsc::unbounded_channel();
        Self {
            transcript: Transcript::new(),
            input: String::new(),
            status: None,
            client: Arc::new(client),
            message_tx,
            message_rx: Some(message_rx),
            needs_redraw: true,
            should_quit: false,
            streams_in_flight: 0,
        }
    }

    /// Whether any receive loop is still running.
    pub fn is_streaming(&self) -> bool {
        self.streams_in_flight > 0
    }

    pub fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Append a typed character to the input line.
    pub fn push_input_char(&mut self, c: char) {
        self.input.push(c);
        self.mark_dirty();
    }

    /// Delete the last character of the input line.
    pub fn backspace_input(&mut self) {
        self.input.pop();
        self.mark_dirty();
    }

    /// Handle one message from a receive loop.
    pub fn handle_message(&mut self, message: AppMessage) {
        match message {
            AppMessage::Event(event) => {
                self.transcript.apply(&event);
                if let Some(error) = self.transcript.take_error() {
                    tracing::warn!(%error, "server reported an error");
                    self.status = Some(error);
                }
            }
            AppMessage::StreamError(error) => {
                tracing::error!(%error, "receive loop failed");
                self.status = Some(error);
            }
            AppMessage::StreamClosed => {
                self.streams_in_flight = self.streams_in_flight.saturating_sub(1);
                // A loop that ended without a turn_complete (transport
                // failure) leaves its unit open; close it so the transcript
                // stops showing a live cursor. Rendered text is preserved.
                if self.streams_in_flight == 0 {
                    self.transcript.close_open_unit();
                }
            }
        }
        self.mark_dirty();
    }
}
