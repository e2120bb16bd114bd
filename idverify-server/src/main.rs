//! IdVerify Server - REST API proxy for identity document verification
//!
//! Exposes the verification proxy via HTTP endpoints:
//! - POST /api/verify - Forward a document + selfie pair to the analysis service
//! - GET /health     - Health check
//! - GET /ready      - Readiness check

use tracing_subscriber::{fmt, EnvFilter};

use idverify_server::{create_router_with_config, AppState, Config};

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("idverify_server=info,tower_http=info")),
        )
        .with_target(true)
        .init();

    let config = Config::from_env();
    let addr = config.socket_addr();

    tracing::info!(
        upstream = %config.upstream_url,
        "Starting idverify-server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let state = AppState::from_config(&config).expect("Failed to build upstream client");
    let app = create_router_with_config(state, &config);

    tracing::info!("Listening on http://{}", addr);
    tracing::info!("  POST /api/verify - Verify document + selfie (multipart: aadhar, selfie)");
    tracing::info!("  GET  /health     - Health check");
    tracing::info!("  GET  /ready      - Readiness check");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
