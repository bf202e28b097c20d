use std::path::PathBuf;
use thiserror::Error;

use crate::embedding::EmbeddingError;

/// Errors surfaced once, at bundle build/load time. The query path never
/// sees these.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("bundle artifact not found: {path}")]
    ArtifactNotFound { path: PathBuf },

    #[error("failed to read bundle artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON artifact {path}: {source}")]
    MalformedJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed embedding matrix artifact: {reason}")]
    MalformedMatrix { reason: String },

    #[error("catalog has no entries")]
    EmptyCatalog,

    #[error("embedding matrix has {rows} rows for {entries} catalog entries")]
    RowCountMismatch { rows: usize, entries: usize },

    #[error("matrix row {row} has dimension {actual}, embedder produces {expected}")]
    DimensionMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
}

pub type LoadResult<T> = Result<T, LoadError>;
