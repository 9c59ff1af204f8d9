//! Inference providers crate for talking to chat-completion backends
//!
//! This crate exposes a small trait over OpenAI-style chat completions, with
//! a buffered, non-streaming call and a streaming call that yields parsed
//! server-sent events.
//!
//! # Usage
//!
//! ```rust,ignore
//! use inference_providers::{ChatCompletionParams, ChatMessage, InferenceProvider};
//! use futures_util::StreamExt;
//!
//! async fn example<P: InferenceProvider>(provider: P) -> Result<(), CompletionError> {
//!     let params = ChatCompletionParams {
//!         model: "anthropic/claude-3.5-sonnet".to_string(),
//!         messages: vec![ChatMessage::user("Hello world")],
//!         max_tokens: Some(100),
//!         temperature: Some(0.7),
//!         stream: Some(true),
//!     };
//!
//!     let mut stream = provider.chat_completion_stream(params).await?;
//!     while let Some(event) = stream.next().await {
//!         match event {
//!             Ok(event) => print!("{}", event.chunk.delta_content().unwrap_or_default()),
//!             Err(e) => eprintln!("Stream error: {e}"),
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod external;
pub mod mock;
pub mod models;
pub mod sse_parser;

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

// Re-export commonly used types for convenience
pub use external::{OpenAiCompatibleProvider, ProviderConfig};
pub use mock::{MockProvider, ResponseTemplate};
pub use models::{
    ChatChoice, ChatCompletionChunk, ChatCompletionParams, ChatCompletionResponse,
    ChatCompletionResponseChoice, ChatDelta, ChatMessage, ChatResponseMessage, CompletionError,
    MessageRole, TokenUsage,
};
pub use sse_parser::SSEEvent;

/// Type alias for streaming completion results
///
/// Each event carries:
/// - `raw_bytes` - The exact line received from the provider
/// - `chunk` - The parsed chunk
pub type StreamingResult = Pin<Box<dyn Stream<Item = Result<SSEEvent, CompletionError>> + Send>>;

#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Performs a buffered chat completion and returns the whole response
    async fn chat_completion(
        &self,
        params: ChatCompletionParams,
    ) -> Result<ChatCompletionResponse, CompletionError>;

    /// Performs a streaming chat completion request
    ///
    /// Errors that happen before the provider starts streaming (connection
    /// failures, non-success statuses) are returned directly. Errors after that
    /// point arrive as items of the stream.
    async fn chat_completion_stream(
        &self,
        params: ChatCompletionParams,
    ) -> Result<StreamingResult, CompletionError>;
}

const MAX_ERROR_BODY_CHARS: usize = 500;

/// Pull a human-readable message out of a provider error body
///
/// Understands `{"error":{"message":..}}`, `{"message":..}` and
/// `{"error":".."}`; anything else is returned as (truncated) text.
pub fn extract_error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        let message = json
            .get("error")
            .and_then(|error| error.get("message"))
            .and_then(|message| message.as_str())
            .or_else(|| json.get("message").and_then(|message| message.as_str()))
            .or_else(|| json.get("error").and_then(|error| error.as_str()));
        if let Some(message) = message {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.chars().count() > MAX_ERROR_BODY_CHARS {
        let truncated: String = trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{truncated}...")
    } else {
        trimmed.to_string()
    }
}
