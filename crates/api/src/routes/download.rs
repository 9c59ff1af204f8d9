use crate::{
    models::{DownloadRequestBody, ErrorResponse},
    routes::common::{map_export_error, map_json_rejection},
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use services::{export::validate_text, DocumentFormat};

/// Download text as a document
///
/// Renders the given text as a PDF, DOCX or RTF attachment.
#[utoipa::path(
    post,
    path = "/api/download",
    tag = "Download",
    request_body = DownloadRequestBody,
    responses(
        (status = 200, description = "Document attachment", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 400, description = "Missing text or unsupported format", body = ErrorResponse),
        (status = 500, description = "Document rendering failed", body = ErrorResponse)
    )
)]
pub async fn download(
    State(app_state): State<AppState>,
    payload: Result<Json<DownloadRequestBody>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return map_json_rejection(&rejection).into_response(),
    };

    // Text is checked before the format
    if let Err(error) = validate_text(&body.text) {
        return map_export_error(&error).into_response();
    }
    let format = match body.format.parse::<DocumentFormat>() {
        Ok(format) => format,
        Err(error) => {
            tracing::debug!(format = %body.format, "Unsupported download format");
            return map_export_error(&error).into_response();
        }
    };

    match app_state.exporter.export(body.text, format).await {
        Ok(document) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, document.content_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", document.filename),
                ),
            ],
            document.bytes,
        )
            .into_response(),
        Err(error) => map_export_error(&error).into_response(),
    }
}
