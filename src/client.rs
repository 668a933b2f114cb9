//! HTTP client for the agent backend.
//!
//! Sends user text to the backend's send endpoint and exposes the streaming
//! SSE response as a `Stream` of decoded [`ServerEvent`]s.

use std::collections::VecDeque;
use std::pin::Pin;

use futures_util::stream::{self, Stream};
use futures_util::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::sse::{DecodeError, ServerEvent, StreamDecoder, TEXT_PLAIN};

/// Error type for client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (connect error, mid-stream network failure).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// A single record in the stream failed to decode.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    /// Server returned a non-success status.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
}

impl ClientError {
    /// Per-record decode failures are recoverable: the stream keeps going.
    /// Everything else ends the receive loop.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ClientError::Decode(_))
    }
}

/// Outbound message body for the send endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutboundMessage {
    /// Payload mime type; the backend only accepts `text/plain`.
    pub mime_type: String,
    /// Payload content.
    pub data: String,
}

impl OutboundMessage {
    /// Build a text message, the only payload kind the backend accepts.
    pub fn text(data: impl Into<String>) -> Self {
        Self {
            mime_type: TEXT_PLAIN.to_string(),
            data: data.into(),
        }
    }
}

/// A stream of decoded events from one send operation.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<ServerEvent, ClientError>> + Send>>;

/// Client for the agent backend API.
///
/// Holds the routing identity (user and session ids baked into the endpoint
/// path) and a reusable HTTP client.
#[derive(Debug, Clone)]
pub struct AgentClient {
    /// Base URL of the backend, without trailing slash.
    pub base_url: String,
    /// User id segment of the send endpoint path.
    pub user_id: String,
    /// Session id segment of the send endpoint path.
    pub session_id: String,
    http: Client,
}

impl AgentClient {
    /// Create a client from runtime configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_id: config.user_id.clone(),
            session_id: config.session_id.clone(),
            http: Client::new(),
        }
    }

    /// The send endpoint URL for this client's user and session.
    pub fn send_url(&self) -> String {
        format!(
            "{}/send/{}/{}",
            self.base_url, self.user_id, self.session_id
        )
    }

    /// Send one user message and stream the agent's reply.
    ///
    /// POSTs the message as JSON and returns a stream of decoded events.
    /// A non-success status terminates the operation before any streaming;
    /// after that, per-record decode failures surface as non-fatal `Err`
    /// items while transport errors are yielded once and end the stream.
    pub async fn send(&self, message: &OutboundMessage) -> Result<EventStream, ClientError> {
        let url = self.send_url();
        tracing::debug!(%url, data = %message.data, "client to agent");

        let response = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .json(message)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::Server { status, message });
        }

        let bytes_stream = response.bytes_stream();

        // Pull chunks, feed them through the decoder, and replay the decoded
        // records one at a time. `done` latches after end-of-data or a
        // transport error so the loop cannot resume a dead stream.
        let event_stream = stream::unfold(
            (bytes_stream, StreamDecoder::new(), VecDeque::new(), false),
            |(mut bytes_stream, mut decoder, mut pending, mut done)| async move {
                loop {
                    if let Some(item) = pending.pop_front() {
                        let item: Result<ServerEvent, DecodeError> = item;
                        return Some((
                            item.map_err(ClientError::from),
                            (bytes_stream, decoder, pending, done),
                        ));
                    }
                    if done {
                        return None;
                    }
                    match bytes_stream.next().await {
                        Some(Ok(chunk)) => {
                            pending.extend(decoder.feed(&chunk));
                        }
                        Some(Err(e)) => {
                            done = true;
                            return Some((
                                Err(ClientError::Http(e)),
                                (bytes_stream, decoder, pending, done),
                            ));
                        }
                        None => {
                            done = true;
                            pending.extend(decoder.finish());
                        }
                    }
                }
            },
        );

        Ok(Box::pin(event_stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> AgentClient {
        AgentClient::new(
            &Config::default()
                .with_base_url("http://localhost:8000")
                .with_user_id("user1")
                .with_session_id("sess-123"),
        )
    }

    #[test]
    fn test_send_url_layout() {
        let client = test_client();
        assert_eq!(client.send_url(), "http://localhost:8000/send/user1/sess-123");
    }

    #[test]
    fn test_trailing_slash_stripped_from_base_url() {
        let client = AgentClient::new(&Config::default().with_base_url("http://host:9000/"));
        assert!(client.send_url().starts_with("http://host:9000/send/"));
    }

    #[test]
    fn test_outbound_message_shape() {
        let message = OutboundMessage::text("hello");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"mime_type": "text/plain", "data": "hello"})
        );
    }

    #[test]
    fn test_decode_errors_are_not_fatal() {
        let decode_err: ClientError = serde_json::from_str::<ServerEvent>("{bad")
            .map_err(|source| DecodeError::Json {
                record: "{bad".to_string(),
                source,
            })
            .unwrap_err()
            .into();
        assert!(!decode_err.is_fatal());

        let server_err = ClientError::Server {
            status: 500,
            message: "boom".to_string(),
        };
        assert!(server_err.is_fatal());
    }

    #[tokio::test]
    async fn test_connect_error_reported_once() {
        let client = AgentClient::new(
            &Config::default().with_base_url("http://invalid-host-that-does-not-exist-52761:9"),
        );
        let result = client.send(&OutboundMessage::text("hi")).await;
        assert!(matches!(result, Err(ClientError::Http(_))));
    }
}
