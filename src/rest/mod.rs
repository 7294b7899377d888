//! REST API over the workflow registry, progress tracker and intake wizard.
//!
//! The caller's role comes from the `x-medjourney-role` header set by the
//! identity layer in front of this server.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod dto;
pub mod error;
pub mod openapi;
pub mod role;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::ApiState;

/// Build the API router with all routes
pub fn build_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(routes::health::health))
        .route("/api/v1/openapi.json", get(routes::health::openapi))
        // Workflow steps
        .route(
            "/api/v1/steps",
            get(routes::steps::list).post(routes::steps::create),
        )
        .route(
            "/api/v1/steps/:id",
            axum::routing::put(routes::steps::update).delete(routes::steps::delete),
        )
        .route("/api/v1/steps/:id/toggle", post(routes::steps::toggle))
        .route("/api/v1/steps/:id/move", post(routes::steps::move_step))
        // Patient progression
        .route(
            "/api/v1/patients/:id/progress",
            get(routes::patients::get_progress).put(routes::patients::assign),
        )
        .route("/api/v1/patients/:id/admit", post(routes::patients::admit))
        .route(
            "/api/v1/patients/:id/advance",
            post(routes::patients::advance),
        )
        .route(
            "/api/v1/patients/:id/retreat",
            post(routes::patients::retreat),
        )
        .route("/api/v1/board", get(routes::board::board))
        // Intake
        .route("/api/v1/intake", post(routes::intake::start))
        .route("/api/v1/intake/options", get(routes::intake::options))
        .route(
            "/api/v1/intake/:id",
            get(routes::intake::get_one).delete(routes::intake::abandon),
        )
        .route("/api/v1/intake/:id/submit", post(routes::intake::submit))
        .route("/api/v1/intake/:id/back", post(routes::intake::back))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the REST API server and run until ctrl-c
pub async fn serve(state: ApiState) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", state.config.rest_api.bind, state.config.rest_api.port)
        .parse()
        .context("Invalid rest_api.bind address")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("REST API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down REST API");
        })
        .await?;

    Ok(())
}
