use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::ranker::RankError;

/// Failures on the query path. Every variant means "matching unavailable":
/// the engine never converts a failure into a fabricated catalog answer.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("matching unavailable: {0}")]
    Ranking(#[from] RankError),

    #[error("matching unavailable: {0}")]
    Embedding(#[from] EmbeddingError),
}

pub type EngineResult<T> = Result<T, EngineError>;
