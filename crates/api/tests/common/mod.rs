#![allow(dead_code)]

use api::{build_app, init_services, init_services_with_provider};
use config::ApiConfig;
use inference_providers::{MockProvider, ResponseTemplate};
use std::{collections::HashMap, sync::Arc};

/// Helper function to create a test configuration
///
/// Only the upstream key is required; everything else uses defaults unless
/// overridden.
pub fn test_config_with(overrides: &[(&str, &str)]) -> ApiConfig {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("UPSTREAM_API_KEY".to_string(), "test-key".to_string()),
        ("SERVER_HOST".to_string(), "127.0.0.1".to_string()),
        ("SERVER_PORT".to_string(), "0".to_string()),
        ("LOG_LEVEL".to_string(), "debug".to_string()),
        ("LOG_FORMAT".to_string(), "compact".to_string()),
    ]);
    for (name, value) in overrides {
        vars.insert(name.to_string(), value.to_string());
    }

    ApiConfig::from_source(&move |name: &str| vars.get(name).cloned())
        .expect("test configuration should be valid")
}

pub fn test_config() -> ApiConfig {
    test_config_with(&[])
}

fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::level_filters::LevelFilter::DEBUG)
        .try_init();
}

/// Test server backed by a `MockProvider`
pub fn setup_test_server_with(
    response: ResponseTemplate,
) -> (axum_test::TestServer, Arc<MockProvider>) {
    setup_test_server_with_config(response, test_config())
}

pub fn setup_test_server_with_config(
    response: ResponseTemplate,
    config: ApiConfig,
) -> (axum_test::TestServer, Arc<MockProvider>) {
    init_test_tracing();

    let provider = Arc::new(MockProvider::with_response(response));
    let app_state = init_services_with_provider(provider.clone(), &config);
    let app = build_app(app_state, &config.server);

    (
        axum_test::TestServer::new(app).expect("Failed to start test server"),
        provider,
    )
}

pub fn setup_test_server() -> (axum_test::TestServer, Arc<MockProvider>) {
    setup_test_server_with(ResponseTemplate::new("Greetings, world."))
}

/// Test server talking to a real HTTP upstream (e.g. an httpmock server)
pub fn setup_test_server_with_upstream(base_url: &str) -> axum_test::TestServer {
    init_test_tracing();

    let config = test_config_with(&[
        ("UPSTREAM_BASE_URL", base_url),
        ("UPSTREAM_REFERER", "http://localhost:3000"),
        ("UPSTREAM_TITLE", "Rewriter"),
    ]);
    let app_state = init_services(&config).expect("Failed to initialize services");
    let app = build_app(app_state, &config.server);

    axum_test::TestServer::new(app).expect("Failed to start test server")
}

pub fn rewrite_request(text: &str, mode: &str, stream: bool) -> serde_json::Value {
    serde_json::json!({
        "text": text,
        "mode": mode,
        "stream": stream
    })
}

/// Payloads of the `data:` lines of an SSE body
pub fn sse_data_lines(body: &str) -> Vec<serde_json::Value> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| serde_json::from_str(data.trim()).expect("SSE data should be JSON"))
        .collect()
}
