mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use langrig::error::LangrigError;
use langrig::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn openai(server: &MockServer) -> Arc<OpenAiClient> {
    Arc::new(
        OpenAiClient::new(ClientConfig::new("test-key").with_base_url(server.uri()))
            .expect("client should build"),
    )
}

fn sse(events: &[&str]) -> String {
    let mut body = String::new();
    for event in events {
        body.push_str("data: ");
        body.push_str(event);
        body.push_str("\n\n");
    }
    body.push_str("data: [DONE]\n\n");
    body
}

#[tokio::test]
async fn chat_completion_sends_bearer_auth_and_decodes_usage() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-3.5-turbo",
            "max_tokens": 1024,
            "stream": false,
            "messages": [{"role": "user", "content": "Hi"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "model": "gpt-3.5-turbo",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Hello!"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 8, "completion_tokens": 2, "total_tokens": 10}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let generations = ChatLlm::new(openai(&server))
        .with_logger(Arc::new(NoopLogger))
        .generate(
            &CallContext::new(),
            &[vec![ChatMessage::human("Hi")]],
            &CallOptions::default(),
        )
        .await
        .expect("chat should succeed");

    assert_eq!(generations[0].text, "Hello!");
    assert_eq!(generations[0].usage(), Some(&usage(8, 2)));
}

#[tokio::test]
async fn organization_header_is_sent_when_configured() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/completions"))
        .and(header("openai-organization", "org-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"text": "ok", "index": 0, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 2}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::new(
        ClientConfig::new("test-key")
            .with_base_url(server.uri())
            .with_organization("org-123"),
    )
    .unwrap();

    let text = CompletionLlm::new(Arc::new(client))
        .call(&CallContext::new(), "ping", &CallOptions::default())
        .await
        .unwrap();
    assert_eq!(text, "ok");
}

#[tokio::test]
async fn streamed_chat_is_decoded_from_sse() {
    let server = MockServer::start().await;

    let body = sse(&[
        r#"{"choices":[{"index":0,"delta":{"role":"assistant"}}]}"#,
        r#"{"choices":[{"index":0,"delta":{"content":"Hel"}}]}"#,
        r#"{"choices":[{"index":0,"delta":{"content":"lo"}}]}"#,
        r#"{"choices":[{"index":0,"delta":{},"finish_reason":"stop"}]}"#,
    ]);

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let sink = RecordingSink::new();
    let reply = ChatLlm::new(openai(&server))
        .call(
            &CallContext::new(),
            vec![ChatMessage::human("Hi")],
            &CallOptions::builder().streaming_sink(sink.clone()).build(),
        )
        .await
        .unwrap();

    assert_eq!(reply.content, "Hello");
    assert_eq!(sink.chunks(), vec!["", "Hel", "lo", ""]);
}

#[tokio::test]
async fn streamed_completion_decodes_text_deltas() {
    let server = MockServer::start().await;

    let body = sse(&[
        r#"{"choices":[{"text":"4","index":0,"finish_reason":null}]}"#,
        r#"{"choices":[{"text":"2","index":0,"finish_reason":"length"}]}"#,
    ]);

    Mock::given(method("POST"))
        .and(path("/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let sink = RecordingSink::new();
    let generations = CompletionLlm::new(openai(&server))
        .generate(
            &CallContext::new(),
            &["6 * 7 =".into()],
            &CallOptions::builder().streaming_sink(sink.clone()).build(),
        )
        .await
        .unwrap();

    assert_eq!(generations[0].text, "42");
    assert_eq!(generations[0].finish_reason(), Some(&FinishReason::Length));
    assert_eq!(generations[0].usage(), None);
}

#[tokio::test]
async fn unauthorized_maps_to_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
        })))
        .mount(&server)
        .await;

    let err = CompletionLlm::new(openai(&server))
        .call(&CallContext::new(), "hi", &CallOptions::default())
        .await
        .unwrap_err();

    assert!(
        matches!(err, LangrigError::Authentication(ref m) if m == "Incorrect API key provided")
    );
}

#[tokio::test]
async fn server_error_keeps_status_and_details() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": {"message": "overloaded", "type": "server_error", "code": "busy"}
        })))
        .mount(&server)
        .await;

    let err = ChatLlm::new(openai(&server))
        .call(
            &CallContext::new(),
            vec![ChatMessage::human("hi")],
            &CallOptions::default(),
        )
        .await
        .unwrap_err();

    match err {
        LangrigError::Api {
            status,
            message,
            details,
        } => {
            assert_eq!(status, 503);
            assert_eq!(message, "overloaded");
            let details = details.expect("details");
            assert_eq!(details.kind.as_deref(), Some("server_error"));
            assert_eq!(details.code.as_deref(), Some("busy"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn embeddings_are_posted_in_one_batch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(body_partial_json(json!({
            "model": "text-embedding-ada-002",
            "input": ["alpha", "beta"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"embedding": [0.5, 0.25], "index": 0},
                {"embedding": [0.75, 1.0], "index": 1}
            ],
            "usage": {"prompt_tokens": 2, "total_tokens": 2}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let vectors = CompletionLlm::new(openai(&server))
        .create_embedding(
            &CallContext::new(),
            "text-embedding-ada-002",
            &["alpha".to_string(), "beta".to_string()],
        )
        .await
        .unwrap();

    assert_eq!(vectors, vec![vec![0.5, 0.25], vec![0.75, 1.0]]);
}

#[tokio::test]
async fn azure_uses_deployment_url_and_api_key_header() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/deployments/gpt-35-turbo/chat/completions"))
        .and(query_param("api-version", "2023-05-15"))
        .and(header("api-key", "azure-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "from azure"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 1, "completion_tokens": 2, "total_tokens": 3}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::new(ClientConfig::azure("azure-key", server.uri())).unwrap();
    assert_eq!(client.provider_name(), "azure");

    let reply = ChatLlm::new(Arc::new(client))
        .call(
            &CallContext::new(),
            vec![ChatMessage::human("hi")],
            &CallOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(reply.content, "from azure");
}

#[tokio::test]
async fn slow_response_is_bounded_by_call_deadline() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_json(json!({
                    "choices": [{"text": "late", "index": 0, "finish_reason": "stop"}]
                })),
        )
        .mount(&server)
        .await;

    let ctx = CallContext::new().with_timeout(Duration::from_millis(100));
    let err = CompletionLlm::new(openai(&server))
        .call(&ctx, "hi", &CallOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, LangrigError::Timeout(d) if d == Duration::from_millis(100)));
}

#[tokio::test]
async fn slow_stream_without_deadline_runs_to_completion() {
    let server = MockServer::start().await;

    let body = sse(&[
        r#"{"choices":[{"text":"slow","index":0,"finish_reason":null}]}"#,
        r#"{"choices":[{"text":" reply","index":0,"finish_reason":"stop"}]}"#,
    ]);

    Mock::given(method("POST"))
        .and(path("/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(500))
                .set_body_raw(body, "text/event-stream"),
        )
        .mount(&server)
        .await;

    let sink = RecordingSink::new();
    let text = CompletionLlm::new(openai(&server))
        .call(
            &CallContext::new(),
            "hi",
            &CallOptions::builder().streaming_sink(sink.clone()).build(),
        )
        .await
        .unwrap();

    assert_eq!(text, "slow reply");
    assert_eq!(sink.joined(), "slow reply");
}

#[test]
fn missing_api_key_fails_before_network() {
    let err = OpenAiClient::new(ClientConfig::new("")).err().expect("should fail");
    assert!(matches!(err, LangrigError::MissingCredential(_)));
}
