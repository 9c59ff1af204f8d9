use anyhow::Context;
use api::{build_app, init_services};
use config::{ApiConfig, LoggingConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A .env file is optional; real deployments inject the environment directly
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    // Load configuration first to get logging settings
    let config = ApiConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {e}");
        eprintln!("Application cannot start without UPSTREAM_API_KEY and valid settings.");
        std::process::exit(1);
    });

    init_tracing(&config.logging);
    if dotenv_loaded {
        tracing::debug!("Loaded environment from .env");
    }
    tracing::debug!(?config, "Configuration loaded");

    let app_state = init_services(&config).context("Failed to initialize upstream provider")?;
    let app = build_app(app_state, &config.server);

    let bind_address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;

    tracing::info!(address = %bind_address, "Server started successfully");
    tracing::info!("API Endpoints:");
    tracing::info!("  - POST /api/rewrite (Rewrite text, JSON or SSE)");
    tracing::info!("  - POST /api/download (Export text as pdf, docx or rtf)");
    tracing::info!("  - GET /health (Health check)");
    tracing::info!("  - GET /api-docs/openapi.json (OpenAPI document)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

fn init_tracing(logging_config: &LoggingConfig) {
    let filter = logging_config.filter_directive();

    // Initialize tracing based on the format specified in config
    match logging_config.format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .init();
        }
        "compact" => {
            tracing_subscriber::fmt()
                .compact()
                .with_env_filter(filter)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(filter)
                .init();
        }
    }
}
