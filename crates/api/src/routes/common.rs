use crate::models::ErrorResponse;
use axum::{extract::rejection::JsonRejection, http::StatusCode, response::Json as ResponseJson};
use services::{ExportError, RewriteError};

pub type ErrorReply = (StatusCode, ResponseJson<ErrorResponse>);

/// Map rewrite errors to HTTP status codes and client-facing messages
///
/// Upstream details stay in the logs; clients get a short message.
pub fn map_rewrite_error(error: &RewriteError) -> ErrorReply {
    let (status, message) = match error {
        RewriteError::Validation(message) => (StatusCode::BAD_REQUEST, message.as_str()),
        RewriteError::UpstreamAuth(_) => (
            StatusCode::UNAUTHORIZED,
            "AI service authentication failed",
        ),
        RewriteError::UpstreamRateLimited(_) => (
            StatusCode::TOO_MANY_REQUESTS,
            "Rate limit exceeded, please try again later",
        ),
        RewriteError::UpstreamProtocol(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "No rewritten text received",
        ),
        RewriteError::Upstream(_) | RewriteError::StreamInterrupted(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to process rewrite request",
        ),
    };
    (status, ResponseJson(ErrorResponse::new(message)))
}

pub fn map_export_error(error: &ExportError) -> ErrorReply {
    let (status, message) = match error {
        ExportError::Validation(message) => (StatusCode::BAD_REQUEST, message.as_str()),
        ExportError::UnsupportedFormat(_) => (StatusCode::BAD_REQUEST, "Unsupported format"),
        ExportError::Render(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to generate document",
        ),
    };
    (status, ResponseJson(ErrorResponse::new(message)))
}

/// Any body the JSON extractor refuses is a client error
pub fn map_json_rejection(rejection: &JsonRejection) -> ErrorReply {
    tracing::debug!(error = %rejection.body_text(), "Rejected request body");
    (
        StatusCode::BAD_REQUEST,
        ResponseJson(ErrorResponse::new(format!(
            "Invalid JSON body: {}",
            rejection.body_text()
        ))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_error_statuses() {
        let cases = [
            (RewriteError::Validation("Text is required".into()), 400),
            (RewriteError::UpstreamAuth("x".into()), 401),
            (RewriteError::UpstreamRateLimited("x".into()), 429),
            (RewriteError::UpstreamProtocol("x".into()), 500),
            (RewriteError::Upstream("x".into()), 500),
            (RewriteError::StreamInterrupted("x".into()), 500),
        ];
        for (error, status) in cases {
            assert_eq!(map_rewrite_error(&error).0.as_u16(), status, "{error:?}");
        }
    }

    #[test]
    fn test_validation_message_passed_through() {
        let (_, ResponseJson(body)) =
            map_rewrite_error(&RewriteError::Validation("Mode is required".into()));
        assert_eq!(body.error, "Mode is required");
    }

    #[test]
    fn test_upstream_details_not_leaked() {
        let (_, ResponseJson(body)) =
            map_rewrite_error(&RewriteError::Upstream("HTTP 502: internal trace id 42".into()));
        assert!(!body.error.contains("trace id"));
    }

    #[test]
    fn test_export_error_statuses() {
        assert_eq!(
            map_export_error(&ExportError::Validation("Text is required".into())).0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            map_export_error(&ExportError::UnsupportedFormat("odt".into())).0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            map_export_error(&ExportError::Render("font".into())).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
