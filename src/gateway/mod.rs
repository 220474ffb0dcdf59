//! HTTP gateway (Axum) for report verification.
//!
//! One POST endpoint runs the full pipeline over an uploaded document
//! structure: field extraction, standards-validity verification (cited codes
//! and test-method codes), and compliance reconciliation.

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;

#[cfg(test)]
mod handler_tests;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use handler::verify_handler;
pub use payload::{VerifyData, VerifyRequest, VerifyResponse};
pub use state::HandlerState;

use crate::registry::RegistryClient;
use crate::retrieval::RetrievalClient;

pub fn create_router_with_state<R, C>(state: HandlerState<R, C>) -> Router
where
    R: RegistryClient + Send + Sync + 'static,
    C: RetrievalClient + Send + Sync + 'static,
{
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/api/verify", post(verify_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    (StatusCode::OK, Json(HealthResponse { status: "ok" })).into_response()
}
