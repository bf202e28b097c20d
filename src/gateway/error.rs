use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::engine::EngineError;
use crate::gateway::SOURCE_HEADER;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Recovered at the transport boundary; never reaches the engine.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The engine could not run the matching pipeline. Mapped to a 5xx so
    /// callers can tell system failure apart from a low-confidence answer.
    #[error(transparent)]
    MatchingUnavailable(#[from] EngineError),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::MatchingUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let mut headers = HeaderMap::new();
        headers.insert(SOURCE_HEADER, HeaderValue::from_static("error"));

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
