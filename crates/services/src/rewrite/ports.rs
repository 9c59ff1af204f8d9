//! Rewrite service ports (trait definitions)
//!
//! Request and result types, the error taxonomy and the service contract the
//! HTTP layer depends on.

use async_trait::async_trait;
use futures::stream::Stream;
use inference_providers::CompletionError;
use std::pin::Pin;

// ==================== Request Types ====================

/// A request to rewrite a piece of text
#[derive(Debug, Clone, Default)]
pub struct RewriteRequest {
    /// Source text to rewrite
    pub text: String,
    /// Rewriting style; unknown values fall back to the standard style
    pub mode: Option<String>,
    /// Whether the caller wants a token stream
    pub stream: bool,
    /// Optional output locale (e.g. "en", "zh-CN")
    pub language: Option<String>,
}

// ==================== Response Types ====================

/// Buffered rewrite result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteResult {
    pub rewritten_text: String,
}

/// One unit of a streamed rewrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamToken {
    /// A fragment of the rewritten text, in arrival order
    Token(String),
    /// The upstream finished normally; always the last item
    Done,
}

// ==================== Error Types ====================

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RewriteError {
    /// The request was rejected before anything was sent upstream
    #[error("{0}")]
    Validation(String),

    /// Upstream rejected our credentials (401/403)
    #[error("Upstream authentication failed: {0}")]
    UpstreamAuth(String),

    /// Upstream rate limited the request (429)
    #[error("Upstream rate limit exceeded: {0}")]
    UpstreamRateLimited(String),

    /// Upstream answered with something we could not use
    #[error("Upstream protocol error: {0}")]
    UpstreamProtocol(String),

    /// Any other upstream failure, including transport errors
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The upstream body failed after streaming started
    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),
}

impl From<CompletionError> for RewriteError {
    fn from(error: CompletionError) -> Self {
        match error {
            CompletionError::HttpError {
                status_code: 401 | 403,
                message,
            } => RewriteError::UpstreamAuth(message),
            CompletionError::HttpError {
                status_code: 429,
                message,
            } => RewriteError::UpstreamRateLimited(message),
            CompletionError::HttpError {
                status_code,
                message,
            } => RewriteError::Upstream(format!("HTTP {status_code}: {message}")),
            CompletionError::CompletionError(message) => RewriteError::Upstream(message),
            CompletionError::InvalidResponse(message) => RewriteError::UpstreamProtocol(message),
            CompletionError::StreamInterrupted(message) => RewriteError::StreamInterrupted(message),
        }
    }
}

// ==================== Service Trait ====================

/// Type alias for streamed rewrite results
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<StreamToken, RewriteError>> + Send>>;

#[async_trait]
pub trait RewriteServiceTrait: Send + Sync {
    /// Rewrite the text and return the whole result at once
    async fn rewrite(&self, request: RewriteRequest) -> Result<RewriteResult, RewriteError>;

    /// Rewrite the text and stream tokens as the upstream produces them
    ///
    /// Validation and upstream status errors are returned before the stream
    /// is handed out. A failure after that point is the stream's last item.
    async fn rewrite_stream(&self, request: RewriteRequest) -> Result<TokenStream, RewriteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_errors_map_by_status() {
        let map = |status_code| {
            RewriteError::from(CompletionError::HttpError {
                status_code,
                message: "nope".to_string(),
            })
        };

        assert_eq!(map(401), RewriteError::UpstreamAuth("nope".to_string()));
        assert_eq!(map(403), RewriteError::UpstreamAuth("nope".to_string()));
        assert_eq!(
            map(429),
            RewriteError::UpstreamRateLimited("nope".to_string())
        );
        assert_eq!(map(502), RewriteError::Upstream("HTTP 502: nope".to_string()));
    }

    #[test]
    fn test_non_http_errors() {
        assert!(matches!(
            RewriteError::from(CompletionError::CompletionError("refused".into())),
            RewriteError::Upstream(_)
        ));
        assert!(matches!(
            RewriteError::from(CompletionError::InvalidResponse("bad".into())),
            RewriteError::UpstreamProtocol(_)
        ));
        assert!(matches!(
            RewriteError::from(CompletionError::StreamInterrupted("reset".into())),
            RewriteError::StreamInterrupted(_)
        ));
    }
}
