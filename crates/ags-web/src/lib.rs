//! # AGS Web
//!
//! Axum read surface: liveness, the structured hierarchy, and graph counts.

pub mod routes;
pub mod state;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::root))
        .route("/areas-structured", get(routes::areas_structured))
        .route("/graph/counts", get(routes::graph_counts))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the web server.
pub async fn run_server(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{host}:{port}")).await?;
    tracing::info!("web server listening on http://{host}:{port}");

    axum::serve(listener, app).await?;
    Ok(())
}
