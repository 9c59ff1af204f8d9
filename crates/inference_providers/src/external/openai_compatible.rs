//! OpenAI-compatible provider implementation
//!
//! Handles providers that use OpenAI's chat-completion API format, including:
//! - OpenRouter
//! - OpenAI (api.openai.com)
//! - Together AI
//! - Groq
//! - Any other OpenAI-compatible provider

use super::ProviderConfig;
use crate::{
    extract_error_message, sse_parser::new_sse_parser, ChatCompletionParams,
    ChatCompletionResponse, CompletionError, InferenceProvider, StreamingResult,
};
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client,
};
use std::time::Duration;

/// OpenAI-compatible provider
///
/// A pass-through client: parameters are sent as-is, the response is parsed
/// into our models, and streaming bodies go through the SSE parser.
pub struct OpenAiCompatibleProvider {
    client: Client,
    config: ProviderConfig,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| {
                CompletionError::CompletionError(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    fn chat_completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn build_headers(&self) -> Result<HeaderMap, CompletionError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        // Authorization header
        let auth_value = format!("Bearer {}", self.config.api_key);
        let mut header_value = HeaderValue::from_str(&auth_value).map_err(|e| {
            CompletionError::CompletionError(format!("Invalid API key format: {e}"))
        })?;
        header_value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, header_value);

        for (name, value) in &self.config.extra_headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                CompletionError::CompletionError(format!("Invalid header name {name}: {e}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                CompletionError::CompletionError(format!("Invalid header value for {name}: {e}"))
            })?;
            headers.insert(name, value);
        }

        Ok(headers)
    }

    /// Send the request and turn non-success statuses into `HttpError`
    async fn send(&self, params: &ChatCompletionParams) -> Result<reqwest::Response, CompletionError> {
        let url = self.chat_completions_url();
        let headers = self.build_headers()?;

        tracing::debug!(
            url = %url,
            model = %params.model,
            stream = ?params.stream,
            "Sending chat completion request"
        );

        let mut request = self.client.post(&url).headers(headers).json(params);
        if let Some(timeout) = self.config.timeout_seconds {
            request = request.timeout(Duration::from_secs(timeout));
        }

        let response = request
            .send()
            .await
            .map_err(|e| CompletionError::CompletionError(e.to_string()))?;

        if !response.status().is_success() {
            let status_code = response.status().as_u16();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Failed to read error response body: {e}"));
            tracing::warn!(status_code, "Provider returned an error status");
            return Err(CompletionError::HttpError {
                status_code,
                message: extract_error_message(&error_text),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl InferenceProvider for OpenAiCompatibleProvider {
    async fn chat_completion(
        &self,
        params: ChatCompletionParams,
    ) -> Result<ChatCompletionResponse, CompletionError> {
        // Ensure non-streaming
        let mut non_streaming_params = params;
        non_streaming_params.stream = Some(false);

        let response = self.send(&non_streaming_params).await?;

        let raw_bytes = response
            .bytes()
            .await
            .map_err(|e| CompletionError::CompletionError(e.to_string()))?;

        serde_json::from_slice(&raw_bytes).map_err(|e| {
            CompletionError::InvalidResponse(format!("Failed to parse response: {e}"))
        })
    }

    async fn chat_completion_stream(
        &self,
        params: ChatCompletionParams,
    ) -> Result<StreamingResult, CompletionError> {
        let mut streaming_params = params;
        streaming_params.stream = Some(true);

        let response = self.send(&streaming_params).await?;

        // Use the SSE parser to handle the stream
        let sse_stream = new_sse_parser(Box::pin(response.bytes_stream()));
        Ok(Box::pin(sse_stream))
    }
}
