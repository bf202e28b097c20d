//! HTTP gateway (Axum) in front of the matching engine.
//!
//! The gateway owns request validation and status mapping only; every
//! answering decision lives in [`crate::engine`].

pub mod error;
pub mod payload;

#[cfg(test)]
mod tests;

pub use error::GatewayError;
pub use payload::{QueryRequest, QueryResponse};

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::engine::Engine;

/// Response header naming which path produced the answer
/// (`small_talk` / `catalog` / `fallback`, or `error`).
pub const SOURCE_HEADER: &str = "x-faqmatch-source";

/// Builds the application router over a shared engine.
pub fn create_router(engine: Arc<Engine>) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/query", post(query_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(engine)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub entries: usize,
    pub vocab_len: usize,
    pub max_seq_len: usize,
    pub embedder_mode: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    (StatusCode::OK, Json(HealthResponse { status: "ok" })).into_response()
}

#[tracing::instrument(skip(engine))]
pub async fn ready_handler(State(engine): State<Arc<Engine>>) -> Response {
    let bundle = engine.bundle();

    let body = ReadyResponse {
        status: "ok",
        entries: bundle.len(),
        vocab_len: bundle.vocab().len(),
        max_seq_len: bundle.max_seq_len(),
        embedder_mode: if bundle.embedder().is_stub() {
            "stub"
        } else {
            "real"
        },
    };

    (StatusCode::OK, Json(body)).into_response()
}

#[tracing::instrument(skip(engine, request))]
pub async fn query_handler(
    State(engine): State<Arc<Engine>>,
    Json(request): Json<QueryRequest>,
) -> Result<Response, GatewayError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "message must not be empty".to_string(),
        ));
    }

    let reply = engine.answer(message)?;

    info!(
        source = reply.source.label(),
        confidence = reply.confidence,
        "query answered"
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        SOURCE_HEADER,
        HeaderValue::from_static(reply.source.label()),
    );

    let body = Json(QueryResponse {
        answer: reply.text,
        confidence_score: reply.confidence,
    });

    Ok((StatusCode::OK, headers, body).into_response())
}
