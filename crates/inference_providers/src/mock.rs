//! Mock implementation of InferenceProvider for testing
//!
//! Generates responses from a configurable template without any network
//! access. Streaming responses are emitted word by word, and the template can
//! inject the failures a real provider produces: malformed lines, bodies that
//! break off mid-stream, and responses without content.

use crate::{
    ChatChoice, ChatCompletionChunk, ChatCompletionParams, ChatCompletionResponse,
    ChatCompletionResponseChoice, ChatDelta, ChatResponseMessage, CompletionError,
    InferenceProvider, MessageRole, SSEEvent, StreamingResult, TokenUsage,
};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{
    stream::{self, BoxStream},
    StreamExt,
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::Mutex;

/// Template for generating responses
#[derive(Clone, Debug)]
pub struct ResponseTemplate {
    content: String,
    /// End the stream with `StreamInterrupted` after N chunks
    fail_after_chunks: Option<usize>,
    /// Stop producing after N chunks without ending the stream
    stall_after_chunks: Option<usize>,
    /// Emit an `InvalidResponse` item in place of chunk N
    malformed_at: Option<usize>,
    /// Respond without any message content
    missing_content: bool,
}

impl ResponseTemplate {
    /// Create a new response template with the given content
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            fail_after_chunks: None,
            stall_after_chunks: None,
            malformed_at: None,
            missing_content: false,
        }
    }

    /// Break the stream off after N chunks, as a dropped upstream connection would
    pub fn with_fail_after(mut self, chunks: usize) -> Self {
        self.fail_after_chunks = Some(chunks);
        self
    }

    /// Keep the stream open but silent after N chunks
    pub fn with_stall_after(mut self, chunks: usize) -> Self {
        self.stall_after_chunks = Some(chunks);
        self
    }

    /// Replace chunk N with an unparseable line
    pub fn with_malformed_at(mut self, index: usize) -> Self {
        self.malformed_at = Some(index);
        self
    }

    /// Answer without message content (non-streaming) or delta content (streaming)
    pub fn with_missing_content(mut self) -> Self {
        self.missing_content = true;
        self
    }

    /// Split the content into word-sized pieces, keeping the separating spaces
    fn pieces(&self) -> Vec<String> {
        self.content
            .split(' ')
            .enumerate()
            .map(|(i, word)| {
                if i == 0 {
                    word.to_string()
                } else {
                    format!(" {word}")
                }
            })
            .collect()
    }

    fn generate_response(&self, model: String, input_tokens: i32) -> ChatCompletionResponse {
        let output_tokens = self.content.split_whitespace().count() as i32;
        let content = (!self.missing_content).then(|| self.content.clone());

        ChatCompletionResponse {
            id: Some(mock_id()),
            object: Some("chat.completion".to_string()),
            created: Some(0),
            model: Some(model),
            choices: vec![ChatCompletionResponseChoice {
                index: 0,
                message: Some(ChatResponseMessage {
                    role: Some(MessageRole::Assistant),
                    content,
                    refusal: None,
                }),
                finish_reason: Some("stop".to_string()),
            }],
            usage: Some(TokenUsage::new(input_tokens, output_tokens)),
        }
    }

    fn generate_chunks(&self, model: String) -> Vec<ChatCompletionChunk> {
        let id = mock_id();
        self.pieces()
            .into_iter()
            .map(|piece| ChatCompletionChunk {
                id: Some(id.clone()),
                object: Some("chat.completion.chunk".to_string()),
                created: Some(0),
                model: Some(model.clone()),
                choices: vec![ChatChoice {
                    index: 0,
                    delta: Some(ChatDelta {
                        role: None,
                        content: (!self.missing_content).then_some(piece),
                    }),
                    finish_reason: None,
                }],
                usage: None,
            })
            .collect()
    }

    fn generate_events(&self, model: String) -> Vec<Result<SSEEvent, CompletionError>> {
        let mut events: Vec<Result<SSEEvent, CompletionError>> = self
            .generate_chunks(model)
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| {
                if self.malformed_at == Some(i) {
                    return Err(CompletionError::InvalidResponse(
                        "Failed to parse SSE payload: expected value at line 1 column 1"
                            .to_string(),
                    ));
                }
                let raw_bytes = sse_data(&chunk)?;
                Ok(SSEEvent { raw_bytes, chunk })
            })
            .collect();

        if let Some(limit) = self.fail_after_chunks {
            events.truncate(limit);
            events.push(Err(CompletionError::StreamInterrupted(
                "connection reset by peer".to_string(),
            )));
        } else if let Some(limit) = self.stall_after_chunks {
            events.truncate(limit);
        }

        events
    }
}

fn mock_id() -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let mut hasher = DefaultHasher::new();
    std::time::SystemTime::now().hash(&mut hasher);
    format!("chatcmpl-{:x}", hasher.finish())
}

fn sse_data(chunk: &ChatCompletionChunk) -> Result<Bytes, CompletionError> {
    let json = serde_json::to_string(chunk)
        .map_err(|e| CompletionError::CompletionError(format!("Failed to serialize: {e}")))?;
    Ok(Bytes::from(format!("data: {json}\n\n")))
}

/// Sets a flag when the stream holding it is dropped
struct DropSignal(Arc<AtomicBool>);

impl Drop for DropSignal {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Configuration for the mock provider
struct MockConfig {
    default_response: ResponseTemplate,
    error_override: Option<CompletionError>,
    requests: Vec<ChatCompletionParams>,
}

/// Mock provider that implements InferenceProvider for testing
pub struct MockProvider {
    /// Configuration for responses (thread-safe)
    config: Arc<Mutex<MockConfig>>,
    stream_dropped: Arc<AtomicBool>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::with_response(ResponseTemplate::new("Greetings, world."))
    }

    pub fn with_response(response: ResponseTemplate) -> Self {
        Self {
            config: Arc::new(Mutex::new(MockConfig {
                default_response: response,
                error_override: None,
                requests: Vec::new(),
            })),
            stream_dropped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Set the response used for every following request
    pub async fn set_default_response(&self, response: ResponseTemplate) {
        let mut config = self.config.lock().await;
        config.default_response = response;
    }

    /// Fail every following request with this error before any output is produced
    pub async fn set_error_override(&self, error: Option<CompletionError>) {
        let mut config = self.config.lock().await;
        config.error_override = error;
    }

    /// Parameters of the most recent request
    pub async fn last_request(&self) -> Option<ChatCompletionParams> {
        self.config.lock().await.requests.last().cloned()
    }

    pub async fn request_count(&self) -> usize {
        self.config.lock().await.requests.len()
    }

    /// Whether the most recently returned stream has been released
    pub fn stream_dropped(&self) -> bool {
        self.stream_dropped.load(Ordering::SeqCst)
    }

    async fn record(
        &self,
        params: &ChatCompletionParams,
    ) -> Result<ResponseTemplate, CompletionError> {
        let mut config = self.config.lock().await;
        config.requests.push(params.clone());
        match &config.error_override {
            Some(error) => Err(error.clone()),
            None => Ok(config.default_response.clone()),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceProvider for MockProvider {
    async fn chat_completion(
        &self,
        params: ChatCompletionParams,
    ) -> Result<ChatCompletionResponse, CompletionError> {
        let template = self.record(&params).await?;

        // Rough estimate: 1 word ≈ 1 token
        let input_tokens: i32 = params
            .messages
            .iter()
            .filter_map(|m| m.content.as_ref())
            .map(|c| c.split_whitespace().count() as i32)
            .sum();

        Ok(template.generate_response(params.model, input_tokens))
    }

    async fn chat_completion_stream(
        &self,
        params: ChatCompletionParams,
    ) -> Result<StreamingResult, CompletionError> {
        let template = self.record(&params).await?;
        let stalls = template.stall_after_chunks.is_some() && template.fail_after_chunks.is_none();
        let events = template.generate_events(params.model);

        self.stream_dropped.store(false, Ordering::SeqCst);
        let signal = DropSignal(self.stream_dropped.clone());

        let tail: BoxStream<'static, Result<SSEEvent, CompletionError>> = if stalls {
            stream::pending().boxed()
        } else {
            stream::empty().boxed()
        };
        let stream = stream::iter(events).chain(tail).map(move |event| {
            let _held = &signal;
            event
        });

        Ok(Box::pin(stream))
    }
}
