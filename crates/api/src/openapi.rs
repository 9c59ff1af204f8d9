use crate::models::*;
use crate::routes::health::HealthResponse;
use utoipa::OpenApi;

/// OpenAPI documentation configuration
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rewriter API",
        description = "Rewrites text in a chosen style through an OpenAI-compatible chat-completion service, and exports text as PDF, DOCX or RTF documents.",
        version = "1.0.0",
        license(
            name = "MIT",
        )
    ),
    paths(
        crate::routes::rewrite::rewrite,
        crate::routes::download::download,
        crate::routes::health::health_check,
    ),
    components(
        schemas(
            RewriteRequestBody, RewriteResponse, StreamEvent,
            DownloadRequestBody, ErrorResponse, HealthResponse,
        )
    ),
    tags(
        (name = "Rewrite", description = "AI text rewriting"),
        (name = "Download", description = "Document export"),
        (name = "Health", description = "Service health"),
    )
)]
pub struct ApiDoc;
