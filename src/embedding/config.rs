use std::path::PathBuf;

use crate::constants::DEFAULT_EMBEDDING_DIM;
use crate::embedding::error::EmbeddingError;

/// Configuration for [`QueryEmbedder`](super::QueryEmbedder).
#[derive(Debug, Clone)]
pub struct EmbedderConfig {
    /// Path to the safetensors weights file.
    pub weights_path: PathBuf,
    /// Output embedding dimension. For the model backend this is checked
    /// against the loaded weights; the stub backend produces vectors of
    /// exactly this size.
    pub embedding_dim: usize,
    /// If true, run in deterministic stub mode (no weights file required).
    pub testing_stub: bool,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            weights_path: PathBuf::new(),
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            testing_stub: false,
        }
    }
}

impl EmbedderConfig {
    /// Creates a config for a weights file.
    pub fn new<P: Into<PathBuf>>(weights_path: P) -> Self {
        Self {
            weights_path: weights_path.into(),
            ..Default::default()
        }
    }

    /// Creates a stub config (no weights; deterministic embeddings).
    pub fn stub() -> Self {
        Self {
            testing_stub: true,
            ..Default::default()
        }
    }

    /// Validates required fields for non-stub mode.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.embedding_dim == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "embedding_dim must be > 0".to_string(),
            });
        }

        if self.testing_stub {
            return Ok(());
        }

        if self.weights_path.as_os_str().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "weights_path is required (stubbing is disabled)".to_string(),
            });
        }

        if !self.weights_path.exists() {
            return Err(EmbeddingError::WeightsNotFound {
                path: self.weights_path.clone(),
            });
        }

        Ok(())
    }

    /// Returns `true` if the weights file path exists.
    pub fn weights_available(&self) -> bool {
        !self.weights_path.as_os_str().is_empty() && self.weights_path.exists()
    }
}
