//! Integration tests for the streaming client against a mock backend.

use futures_util::StreamExt;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use confab::client::{AgentClient, ClientError, OutboundMessage};
use confab::config::Config;
use confab::sse::ServerEvent;
use confab::transcript::Transcript;

fn client_for(server: &MockServer) -> AgentClient {
    AgentClient::new(
        &Config::default()
            .with_base_url(server.uri())
            .with_user_id("user1")
            .with_session_id("sess-1"),
    )
}

/// An SSE body the way the backend writes it: `data: <json>\n\n` records.
fn sse_body(records: &[serde_json::Value]) -> String {
    records
        .iter()
        .map(|record| format!("data: {record}\n\n"))
        .collect()
}

async fn collect(
    client: &AgentClient,
    message: &OutboundMessage,
) -> Vec<Result<ServerEvent, ClientError>> {
    let mut stream = client.send(message).await.expect("send should succeed");
    let mut items = Vec::new();
    while let Some(item) = stream.next().await {
        items.push(item);
    }
    items
}

#[tokio::test]
async fn test_full_reply_stream_decodes_in_order() {
    let server = MockServer::start().await;
    let body = sse_body(&[
        json!({"mime_type": "text/plain", "data": "Hi"}),
        json!({"mime_type": "text/plain", "data": " there"}),
        json!({"turn_complete": true, "interrupted": false}),
    ]);

    Mock::given(method("POST"))
        .and(path("/send/user1/sess-1"))
        .and(header("Accept", "text/event-stream"))
        .and(body_json(json!({"mime_type": "text/plain", "data": "hello"})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let items = collect(&client, &OutboundMessage::text("hello")).await;

    let events: Vec<ServerEvent> = items
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .expect("well-formed stream should decode cleanly");
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].text(), Some("Hi"));
    assert_eq!(events[1].text(), Some(" there"));
    assert!(events[2].is_turn_complete());

    // Reduced into a transcript, the reply is one closed message unit.
    let mut transcript = Transcript::new();
    for event in &events {
        transcript.apply(event);
    }
    assert_eq!(transcript.units().len(), 1);
    assert_eq!(transcript.units()[0].content, "Hi there");
    assert!(!transcript.units()[0].is_streaming);
}

#[tokio::test]
async fn test_malformed_record_surfaces_as_nonfatal_error() {
    let server = MockServer::start().await;
    let body = concat!(
        "data: {\"mime_type\":\"text/plain\",\"data\":\"one\"}\n\n",
        "data: {not json\n\n",
        "data: {\"mime_type\":\"text/plain\",\"data\":\"two\"}\n\n",
    );

    Mock::given(method("POST"))
        .and(path("/send/user1/sess-1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let items = collect(&client, &OutboundMessage::text("hi")).await;

    assert_eq!(items.len(), 3);
    assert_eq!(items[0].as_ref().unwrap().text(), Some("one"));
    match &items[1] {
        Err(error) => assert!(!error.is_fatal(), "decode errors must not be fatal"),
        Ok(event) => panic!("expected a decode error, got {event:?}"),
    }
    assert_eq!(items[2].as_ref().unwrap().text(), Some("two"));
}

#[tokio::test]
async fn test_non_success_status_fails_before_streaming() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send/user1/sess-1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.send(&OutboundMessage::text("hi")).await;

    match result {
        Err(ClientError::Server { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "backend exploded");
        }
        Ok(_) => panic!("expected server error, got a success stream"),
        Err(other) => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_envelope_reaches_the_transcript() {
    let server = MockServer::start().await;
    let body = sse_body(&[
        json!({"mime_type": "text/plain", "data": "working on i"}),
        json!({"error": "model quota exceeded", "turn_complete": true}),
    ]);

    Mock::given(method("POST"))
        .and(path("/send/user1/sess-1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let items = collect(&client, &OutboundMessage::text("hi")).await;

    let mut transcript = Transcript::new();
    for item in items {
        transcript.apply(&item.expect("stream is well-formed"));
    }
    assert_eq!(transcript.take_error().as_deref(), Some("model quota exceeded"));
    // Text rendered before the failure is preserved.
    assert_eq!(transcript.units()[0].content, "working on i");
    assert!(!transcript.has_open_unit());
}

#[tokio::test]
async fn test_empty_body_yields_no_events() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send/user1/sess-1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("", "text/event-stream"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let items = collect(&client, &OutboundMessage::text("hi")).await;
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_unterminated_final_record_is_dropped() {
    let server = MockServer::start().await;
    let body = "data: {\"mime_type\":\"text/plain\",\"data\":\"kept\"}\n\ndata: {\"mime_type\"";

    Mock::given(method("POST"))
        .and(path("/send/user1/sess-1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let items = collect(&client, &OutboundMessage::text("hi")).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].as_ref().unwrap().text(), Some("kept"));
}
