use crate::{
    models::{ErrorResponse, RewriteRequestBody, RewriteResponse, StreamEvent},
    routes::common::{map_json_rejection, map_rewrite_error},
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json as ResponseJson, Response,
    },
    Json,
};
use futures::StreamExt;
use services::{RewriteError, RewriteRequest, StreamToken};

/// An encoding failure is passed on like an upstream error and aborts the body
fn to_event(token: Result<StreamToken, RewriteError>) -> Result<Event, RewriteError> {
    let event = match token? {
        StreamToken::Token(token) => StreamEvent::Token { token },
        StreamToken::Done => StreamEvent::Done { done: true },
    };
    Event::default().json_data(&event).map_err(|e| {
        tracing::error!(error = %e, "Failed to encode stream event");
        RewriteError::StreamInterrupted(format!("Failed to encode stream event: {e}"))
    })
}

/// Rewrite text
///
/// Rewrites the text in the requested style. With `stream: true` the result is
/// sent as server-sent events: one `{"token": ...}` event per fragment and a
/// final `{"done": true}`. If the upstream fails mid-stream the connection is
/// closed without the final event.
#[utoipa::path(
    post,
    path = "/api/rewrite",
    tag = "Rewrite",
    request_body = RewriteRequestBody,
    responses(
        (status = 200, description = "Rewritten text, or a token stream when `stream` is true", content(
            (RewriteResponse = "application/json"),
            (StreamEvent = "text/event-stream")
        )),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Upstream rejected the service credentials", body = ErrorResponse),
        (status = 429, description = "Upstream rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Upstream failure", body = ErrorResponse)
    )
)]
pub async fn rewrite(
    State(app_state): State<AppState>,
    payload: Result<Json<RewriteRequestBody>, JsonRejection>,
) -> Response {
    let request: RewriteRequest = match payload {
        Ok(Json(body)) => body.into(),
        Err(rejection) => return map_json_rejection(&rejection).into_response(),
    };

    if request.stream {
        return match app_state.rewrite_service.rewrite_stream(request).await {
            // Passing the error through makes axum abort the body
            Ok(tokens) => Sse::new(tokens.map(to_event))
                .keep_alive(KeepAlive::default())
                .into_response(),
            Err(error) => {
                tracing::warn!(error = %error, "Streaming rewrite request failed");
                map_rewrite_error(&error).into_response()
            }
        };
    }

    match app_state.rewrite_service.rewrite(request).await {
        Ok(result) => (
            StatusCode::OK,
            ResponseJson(RewriteResponse {
                rewritten_text: result.rewritten_text,
            }),
        )
            .into_response(),
        Err(error) => {
            tracing::warn!(error = %error, "Rewrite request failed");
            map_rewrite_error(&error).into_response()
        }
    }
}
