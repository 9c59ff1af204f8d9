// E2E tests for the rewrite endpoint, backed by MockProvider
mod common;

use common::*;
use inference_providers::{CompletionError, ResponseTemplate};

// ============================================
// Buffered rewrites
// ============================================

#[tokio::test]
async fn test_rewrite_formal_returns_rewritten_text() {
    let (server, provider) = setup_test_server();

    let response = server
        .post("/api/rewrite")
        .json(&rewrite_request("Hello world", "formal", false))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(
        response.json::<serde_json::Value>(),
        serde_json::json!({"rewrittenText": "Greetings, world."})
    );

    let sent = provider.last_request().await.expect("upstream was called");
    assert_eq!(sent.stream, Some(false));
    assert!(sent.messages[1]
        .content
        .as_deref()
        .unwrap()
        .contains("formal, professional tone"));
}

#[tokio::test]
async fn test_rewrite_accepts_chinese_mode_label() {
    let (server, provider) = setup_test_server();

    let response = server
        .post("/api/rewrite")
        .json(&rewrite_request("你好世界", "学术", false))
        .await;

    assert_eq!(response.status_code(), 200);
    let sent = provider.last_request().await.unwrap();
    assert!(sent.messages[1]
        .content
        .as_deref()
        .unwrap()
        .starts_with("Rewrite this text in an academic style"));
}

#[tokio::test]
async fn test_rewrite_passes_language() {
    let (server, provider) = setup_test_server();

    let response = server
        .post("/api/rewrite")
        .json(&serde_json::json!({
            "text": "Hello world",
            "mode": "standard",
            "language": "zh-CN"
        }))
        .await;

    assert_eq!(response.status_code(), 200);
    let sent = provider.last_request().await.unwrap();
    assert!(sent.messages[1].content.as_deref().unwrap().contains("zh-CN"));
}

// ============================================
// Validation
// ============================================

#[tokio::test]
async fn test_empty_text_rejected() {
    let (server, provider) = setup_test_server();

    let response = server
        .post("/api/rewrite")
        .json(&rewrite_request("", "standard", false))
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(
        response.json::<serde_json::Value>(),
        serde_json::json!({"error": "Text is required"})
    );
    assert_eq!(provider.request_count().await, 0);
}

#[tokio::test]
async fn test_missing_mode_rejected() {
    let (server, provider) = setup_test_server();

    let response = server
        .post("/api/rewrite")
        .json(&serde_json::json!({"text": "Hello"}))
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(
        response.json::<api::models::ErrorResponse>().error,
        "Mode is required"
    );
    assert_eq!(provider.request_count().await, 0);
}

#[tokio::test]
async fn test_text_too_long_rejected() {
    let (server, provider) = setup_test_server();
    let text = "a".repeat(10_001);

    let response = server
        .post("/api/rewrite")
        .json(&rewrite_request(&text, "standard", false))
        .await;

    assert_eq!(response.status_code(), 400);
    assert!(response
        .json::<api::models::ErrorResponse>()
        .error
        .starts_with("Text is too long"));
    assert_eq!(provider.request_count().await, 0);
}

#[tokio::test]
async fn test_invalid_json_rejected() {
    let (server, provider) = setup_test_server();

    let response = server
        .post("/api/rewrite")
        .bytes("{\"text\": \"Hello\",".into())
        .content_type("application/json")
        .await;

    assert_eq!(response.status_code(), 400);
    assert!(response
        .json::<api::models::ErrorResponse>()
        .error
        .starts_with("Invalid JSON body"));
    assert_eq!(provider.request_count().await, 0);
}

// ============================================
// Upstream failures
// ============================================

async fn status_for_upstream_error(error: CompletionError, stream: bool) -> (u16, String) {
    let (server, provider) = setup_test_server();
    provider.set_error_override(Some(error)).await;

    let response = server
        .post("/api/rewrite")
        .json(&rewrite_request("Hello world", "formal", stream))
        .await;

    assert_eq!(provider.request_count().await, 1, "exactly one upstream call");
    (
        response.status_code().as_u16(),
        response.json::<api::models::ErrorResponse>().error,
    )
}

#[tokio::test]
async fn test_upstream_unauthorized_maps_to_401() {
    let (status, message) = status_for_upstream_error(
        CompletionError::HttpError {
            status_code: 401,
            message: "No auth credentials found".to_string(),
        },
        false,
    )
    .await;

    assert_eq!(status, 401);
    assert!(!message.contains("No auth credentials found"));
}

#[tokio::test]
async fn test_upstream_rate_limit_maps_to_429() {
    for stream in [false, true] {
        let (status, _) = status_for_upstream_error(
            CompletionError::HttpError {
                status_code: 429,
                message: "Rate limit exceeded".to_string(),
            },
            stream,
        )
        .await;
        assert_eq!(status, 429, "stream = {stream}");
    }
}

#[tokio::test]
async fn test_other_upstream_failures_map_to_500() {
    let errors = [
        CompletionError::HttpError {
            status_code: 502,
            message: "Bad gateway".to_string(),
        },
        CompletionError::CompletionError("connection refused".to_string()),
        CompletionError::InvalidResponse("not json".to_string()),
    ];

    for error in errors {
        let (status, _) = status_for_upstream_error(error.clone(), false).await;
        assert_eq!(status, 500, "{error:?}");
    }
}

#[tokio::test]
async fn test_missing_upstream_content_maps_to_500() {
    let (server, _provider) =
        setup_test_server_with(ResponseTemplate::new("ignored").with_missing_content());

    let response = server
        .post("/api/rewrite")
        .json(&rewrite_request("Hello world", "formal", false))
        .await;

    assert_eq!(response.status_code(), 500);
    assert_eq!(
        response.json::<api::models::ErrorResponse>().error,
        "No rewritten text received"
    );
}

// ============================================
// Streaming
// ============================================

#[tokio::test]
async fn test_stream_emits_tokens_then_done() {
    let (server, provider) = setup_test_server();

    let response = server
        .post("/api/rewrite")
        .json(&rewrite_request("Hello world", "formal", true))
        .await;

    assert_eq!(response.status_code(), 200);
    assert!(response
        .header("content-type")
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let events = sse_data_lines(&response.text());
    assert_eq!(
        events,
        vec![
            serde_json::json!({"token": "Greetings,"}),
            serde_json::json!({"token": " world."}),
            serde_json::json!({"done": true}),
        ]
    );

    let sent = provider.last_request().await.unwrap();
    assert_eq!(sent.stream, Some(true));
}

#[tokio::test]
async fn test_stream_concatenation_matches_content() {
    let content = "The quick brown fox jumps over the lazy dog.";
    let (server, _provider) = setup_test_server_with(ResponseTemplate::new(content));

    let response = server
        .post("/api/rewrite")
        .json(&rewrite_request("Some text", "creative", true))
        .await;

    let events = sse_data_lines(&response.text());
    let joined: String = events
        .iter()
        .filter_map(|event| event["token"].as_str())
        .collect();
    assert_eq!(joined, content);
    assert_eq!(events.last(), Some(&serde_json::json!({"done": true})));
    assert_eq!(
        events.iter().filter(|e| e.get("done").is_some()).count(),
        1
    );
}

#[tokio::test]
async fn test_stream_skips_malformed_upstream_line() {
    let (server, _provider) =
        setup_test_server_with(ResponseTemplate::new("one two three").with_malformed_at(1));

    let response = server
        .post("/api/rewrite")
        .json(&rewrite_request("Hello", "standard", true))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(
        sse_data_lines(&response.text()),
        vec![
            serde_json::json!({"token": "one"}),
            serde_json::json!({"token": " three"}),
            serde_json::json!({"done": true}),
        ]
    );
}

#[tokio::test]
async fn test_stream_validation_error_is_json() {
    let (server, _provider) = setup_test_server();

    let response = server
        .post("/api/rewrite")
        .json(&rewrite_request("   ", "standard", true))
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(
        response.json::<api::models::ErrorResponse>().error,
        "Text is required"
    );
}
