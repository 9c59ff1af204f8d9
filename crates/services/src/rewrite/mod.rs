//! Rewrite service implementation
//!
//! Validates rewrite requests, builds the prompt for the requested style and
//! issues a single chat-completion call upstream, either buffered or streamed.

pub mod ports;
pub mod prompts;
pub mod relay;

use async_trait::async_trait;
use config::{RewriteConfig, UpstreamConfig, DEFAULT_UPSTREAM_MODEL};
use inference_providers::{ChatCompletionParams, ChatMessage, InferenceProvider};
use ports::{RewriteError, RewriteRequest, RewriteResult, RewriteServiceTrait, TokenStream};
use prompts::{build_prompt, RewriteMode};
use std::sync::Arc;

pub use ports::StreamToken;
pub use relay::relay_tokens;

/// Upstream parameters and limits applied to every rewrite
#[derive(Debug, Clone)]
pub struct RewriteSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: i64,
    pub max_text_length: usize,
}

impl RewriteSettings {
    pub fn from_config(upstream: &UpstreamConfig, rewrite: &RewriteConfig) -> Self {
        Self {
            model: upstream.model.clone(),
            temperature: upstream.temperature,
            max_tokens: upstream.max_tokens,
            max_text_length: rewrite.max_text_length,
        }
    }
}

impl Default for RewriteSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_UPSTREAM_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            max_text_length: RewriteConfig::default().max_text_length,
        }
    }
}

pub struct RewriteServiceImpl {
    provider: Arc<dyn InferenceProvider>,
    settings: RewriteSettings,
}

impl RewriteServiceImpl {
    pub fn new(provider: Arc<dyn InferenceProvider>, settings: RewriteSettings) -> Self {
        Self { provider, settings }
    }

    /// Check the request and resolve its style
    ///
    /// Text is checked before mode, so a request missing both reports the text.
    fn validate(&self, request: &RewriteRequest) -> Result<RewriteMode, RewriteError> {
        if request.text.trim().is_empty() {
            return Err(RewriteError::Validation("Text is required".to_string()));
        }

        let length = request.text.chars().count();
        if length > self.settings.max_text_length {
            return Err(RewriteError::Validation(format!(
                "Text is too long ({length} characters, maximum is {})",
                self.settings.max_text_length
            )));
        }

        match request.mode.as_deref().map(str::trim) {
            Some(mode) if !mode.is_empty() => Ok(RewriteMode::parse(mode)),
            _ => Err(RewriteError::Validation("Mode is required".to_string())),
        }
    }

    fn build_params(
        &self,
        request: &RewriteRequest,
        mode: RewriteMode,
        stream: bool,
    ) -> ChatCompletionParams {
        let prompt = build_prompt(&request.text, mode, request.language.as_deref());

        ChatCompletionParams {
            model: self.settings.model.clone(),
            messages: vec![ChatMessage::system(prompt.system), ChatMessage::user(prompt.user)],
            max_tokens: Some(self.settings.max_tokens),
            temperature: Some(self.settings.temperature),
            stream: Some(stream),
        }
    }
}

#[async_trait]
impl RewriteServiceTrait for RewriteServiceImpl {
    async fn rewrite(&self, request: RewriteRequest) -> Result<RewriteResult, RewriteError> {
        let mode = self.validate(&request)?;
        tracing::debug!(
            %mode,
            text_chars = request.text.chars().count(),
            "Processing rewrite request"
        );

        let params = self.build_params(&request, mode, false);
        let response = self.provider.chat_completion(params).await.map_err(|e| {
            tracing::error!(error = %e, %mode, "Upstream completion failed");
            RewriteError::from(e)
        })?;

        let rewritten_text = match response.first_content() {
            Some(content) if !content.trim().is_empty() => content.to_string(),
            _ => {
                tracing::error!(%mode, "Upstream response contained no rewritten text");
                return Err(RewriteError::UpstreamProtocol(
                    "No rewritten text received".to_string(),
                ));
            }
        };

        tracing::info!(
            %mode,
            output_chars = rewritten_text.chars().count(),
            "Rewrite completed"
        );
        Ok(RewriteResult { rewritten_text })
    }

    async fn rewrite_stream(&self, request: RewriteRequest) -> Result<TokenStream, RewriteError> {
        let mode = self.validate(&request)?;
        tracing::debug!(
            %mode,
            text_chars = request.text.chars().count(),
            "Processing streaming rewrite request"
        );

        let params = self.build_params(&request, mode, true);
        let upstream = self
            .provider
            .chat_completion_stream(params)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, %mode, "Upstream stream request failed");
                RewriteError::from(e)
            })?;

        Ok(relay_tokens(upstream))
    }
}
