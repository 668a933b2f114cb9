//! Input submission and the per-message receive loop.

use std::sync::Arc;

use futures_util::StreamExt;

use crate::client::{AgentClient, ClientError, OutboundMessage};

use super::{App, AppMessage};

impl App {
    /// Submit the current input line.
    ///
    /// Echoes the text into the transcript, clears the input, and spawns
    /// one receive loop for the reply. A second submission while a reply is
    /// still streaming starts a second independent loop with its own
    /// decoder; their events interleave in channel-arrival order.
    pub fn submit_input(&mut self) {
        let content = self.input.trim().to_string();
        if content.is_empty() {
            return;
        }

        self.transcript.push_user(content.clone());
        self.input.clear();
        self.status = None;
        self.streams_in_flight += 1;
        self.mark_dirty();

        let client = Arc::clone(&self.client);
        let message_tx = self.message_tx.clone();
        tokio::spawn(async move {
            receive_loop(client, content, move |message| {
                // The UI loop may already be gone on shutdown.
                let _ = message_tx.send(message);
            })
            .await;
        });
    }
}

/// Send one message and forward every stream item to the UI loop.
///
/// Per-record decode failures are logged and skipped; transport failures
/// are reported once and end the loop. Always emits a final
/// [`AppMessage::StreamClosed`].
async fn receive_loop(
    client: Arc<AgentClient>,
    content: String,
    emit: impl Fn(AppMessage),
) {
    match client.send(&OutboundMessage::text(content)).await {
        Ok(mut events) => {
            while let Some(item) = events.next().await {
                match item {
                    Ok(event) => {
                        tracing::debug!(?event, "agent to client");
                        emit(AppMessage::Event(event));
                    }
                    Err(error) if !error.is_fatal() => {
                        tracing::warn!(%error, "skipping malformed record");
                    }
                    Err(error) => {
                        emit(AppMessage::StreamError(error.to_string()));
                        break;
                    }
                }
            }
        }
        Err(error @ ClientError::Server { .. }) => {
            emit(AppMessage::StreamError(error.to_string()));
        }
        Err(error) => {
            emit(AppMessage::StreamError(format!("failed to send: {error}")));
        }
    }
    emit(AppMessage::StreamClosed);
}
