use serde::{Deserialize, Serialize};
use services::RewriteRequest;
use utoipa::ToSchema;

/// Request body for `POST /api/rewrite`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RewriteRequestBody {
    /// Text to rewrite
    #[serde(default)]
    pub text: String,
    /// Rewriting style: standard, formal, academic, expanded, summary, narrative or creative.
    /// Unknown styles are rewritten in the standard style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Stream the result as server-sent events
    #[serde(default)]
    pub stream: bool,
    /// Output locale, e.g. "en" or "zh-CN". Defaults to the language of the text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl From<RewriteRequestBody> for RewriteRequest {
    fn from(body: RewriteRequestBody) -> Self {
        RewriteRequest {
            text: body.text,
            mode: body.mode,
            stream: body.stream,
            language: body.language,
        }
    }
}

/// Non-streaming rewrite result
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RewriteResponse {
    #[serde(rename = "rewrittenText")]
    pub rewritten_text: String,
}

/// Payload of one server-sent event in a streamed rewrite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum StreamEvent {
    /// A fragment of the rewritten text
    Token { token: String },
    /// Always `true`; marks the successful end of the stream
    Done { done: bool },
}

/// Request body for `POST /api/download`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DownloadRequestBody {
    /// Text to place in the document
    #[serde(default)]
    pub text: String,
    /// Output format: pdf, docx or rtf
    #[serde(default)]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
