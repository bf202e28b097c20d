use serde::{Deserialize, Serialize};

/// Body of `POST /query`.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    /// The user's free-text question. Must be non-empty after trimming.
    pub message: String,
}

/// Successful answer payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub confidence_score: f32,
}
