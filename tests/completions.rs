//! Integration tests for the completions client using wiremock.

use futures::StreamExt;
use sbke::options::{HttpTransport, ModelOptions, TransportOptions};
use sbke::prompt::Publication;
use sbke::stream::{pump, Termination};
use sbke::{ClientError, CompletionsClient, Conversation, Message, StreamingClient};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> CompletionsClient {
    CompletionsClient::new(
        ModelOptions::default(),
        TransportOptions::new(HttpTransport::new("test-api-key").with_base_url(server.uri())),
    )
}

fn sse_body(contents: &[&str]) -> String {
    let mut body = String::from(": OPENROUTER PROCESSING\n\n");
    body.push_str("data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n");
    for content in contents {
        body.push_str(&format!(
            "data: {}\n\n",
            serde_json::json!({ "id": "chatcmpl-1", "choices": [{ "index": 0, "delta": { "content": content } }] })
        ));
    }
    body.push_str("data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n");
    body.push_str("data: [DONE]\n\n");
    body
}

fn event_stream(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/event-stream")
}

async fn collect(client: &CompletionsClient, messages: Vec<Message>) -> Result<String, ClientError> {
    let mut deltas = client.chat_stream(messages, &[]).await?;
    let mut text = String::new();
    while let Some(delta) = deltas.next().await {
        text.push_str(&delta?);
    }
    Ok(text)
}

#[tokio::test]
async fn chat_stream_sends_streaming_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-api-key"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(serde_json::json!({
            "model": "google/gemini-2.5-flash",
            "stream": true,
        })))
        .respond_with(event_stream(sse_body(&["Micro", "gravity"])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let text = collect(&client_for(&mock_server), vec![Message::user("Hi")])
        .await
        .unwrap();
    assert_eq!(text, "Microgravity");
}

#[tokio::test]
async fn chat_stream_includes_publications_in_system_prompt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(event_stream(sse_body(&["ok"])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let publications = [Publication::new("Plant growth in orbit", "https://example.org/plants")];
    let mut deltas = client
        .chat_stream(vec![Message::user("plants?")], &publications)
        .await
        .unwrap();
    while deltas.next().await.is_some() {}

    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);

    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let system = body["messages"][0]["content"].as_str().unwrap_or_default();
    assert_eq!(body["messages"][0]["role"], "system");
    assert!(system.contains("Relevant NASA space biology publications:"));
    assert!(system.contains("1. \"Plant growth in orbit\" - https://example.org/plants"));
    assert_eq!(body["messages"][1], serde_json::json!({"role": "user", "content": "plants?"}));
}

#[tokio::test]
async fn chat_stream_maps_rate_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server).chat_stream(vec![Message::user("Hi")], &[]).await;
    assert!(matches!(result, Err(ClientError::RateLimited)));
}

#[tokio::test]
async fn chat_stream_maps_payment_required() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(402))
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server).chat_stream(vec![Message::user("Hi")], &[]).await;
    assert!(matches!(result, Err(ClientError::PaymentRequired)));
}

#[tokio::test]
async fn chat_stream_maps_gateway_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": { "type": "server_error", "message": "model overloaded" }
        })))
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server).chat_stream(vec![Message::user("Hi")], &[]).await;
    match result {
        Err(ClientError::Gateway { status, message }) => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(message, "model overloaded");
        }
        Err(other) => panic!("expected gateway error, got: {}", other),
        Ok(_) => panic!("expected gateway error, got a stream"),
    }
}

#[tokio::test]
async fn chat_stream_requires_api_key() {
    let client = CompletionsClient::new(
        ModelOptions::default(),
        TransportOptions::new(HttpTransport::default().with_base_url("http://127.0.0.1:9".to_string())),
    );

    let result = client.chat_stream(vec![Message::user("Hi")], &[]).await;
    assert!(matches!(result, Err(ClientError::Config(_))));
}

#[tokio::test]
async fn stream_without_sentinel_ends_cleanly() {
    let mock_server = MockServer::start().await;

    let body = "data: {\"choices\":[{\"delta\":{\"content\":\"cut \"}}]}\n\n\
                data: {\"choices\":[{\"delta\":{\"content\":\"short\"}}]}";
    Mock::given(method("POST"))
        .respond_with(event_stream(body.to_string()))
        .mount(&mock_server)
        .await;

    let text = collect(&client_for(&mock_server), vec![Message::user("Hi")])
        .await
        .unwrap();
    assert_eq!(text, "cut short");
}

#[tokio::test]
async fn conversation_streams_reply_from_gateway() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(event_stream(sse_body(&["🚀 Astronauts ", "lose ", "bone mass."])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let mut conversation = Conversation::new();
    assert!(conversation.push_user("Tell me about bone density loss in microgravity"));

    let deltas = client.chat_stream(conversation.history(), &[]).await.unwrap();
    let reply = conversation.stream_reply(deltas).await.unwrap();

    assert_eq!(reply, &Message::assistant("🚀 Astronauts lose bone mass."));
    assert_eq!(conversation.messages().len(), 3);
}

#[tokio::test]
async fn pump_reads_raw_response_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(event_stream(sse_body(&["A", "B", "C"])))
        .mount(&mock_server)
        .await;

    let response = reqwest::Client::new()
        .post(format!("{}/v1/chat/completions", mock_server.uri()))
        .send()
        .await
        .unwrap();

    let mut text = String::new();
    let summary = pump(response.bytes_stream(), &mut text).await.unwrap();

    assert_eq!(text, "ABC");
    assert_eq!(summary.deltas, 3);
    assert_eq!(summary.terminated_by, Termination::Sentinel);
}
