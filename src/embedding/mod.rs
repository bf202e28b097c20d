//! Query/catalog embedding generation.
//!
//! [`QueryEmbedder`] maps a fixed-length id sequence to an L2-normalized
//! vector. The same frozen function is applied to catalog questions
//! (offline) and live queries (online); that symmetry is what makes the
//! cosine scores downstream meaningful.
//!
//! Use [`EmbedderConfig::stub`] for tests and deployments without a weights
//! file.

/// Embedder configuration.
pub mod config;
mod error;
pub(crate) mod net;

#[cfg(test)]
mod tests;

pub use config::EmbedderConfig;
pub use error::EmbeddingError;

use candle_core::{Device, Tensor};
use tracing::{debug, info, warn};

use net::SiameseEncoder;

enum EmbedderBackend {
    Model { net: SiameseEncoder },
    Stub,
}

/// Embedding generator over fixed-length id sequences (supports stub mode).
pub struct QueryEmbedder {
    backend: EmbedderBackend,
    config: EmbedderConfig,
    device: Device,
}

impl std::fmt::Debug for QueryEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEmbedder")
            .field(
                "backend",
                &match &self.backend {
                    EmbedderBackend::Model { .. } => "Model",
                    EmbedderBackend::Stub => "Stub",
                },
            )
            .field("embedding_dim", &self.embedding_dim())
            .finish()
    }
}

impl QueryEmbedder {
    /// Loads the embedder from a config (stub mode is supported).
    pub fn load(config: EmbedderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        let device = Device::Cpu;

        if config.testing_stub {
            warn!("query embedder running in STUB mode (testing only)");
            return Ok(Self {
                backend: EmbedderBackend::Stub,
                config,
                device,
            });
        }

        if !config.weights_available() {
            return Err(EmbeddingError::WeightsNotFound {
                path: config.weights_path.clone(),
            });
        }

        let net = SiameseEncoder::from_safetensors(&config.weights_path, &device).map_err(
            |e| EmbeddingError::WeightsLoadFailed {
                reason: e.to_string(),
            },
        )?;

        info!(
            weights_path = %config.weights_path.display(),
            vocab_size = net.config().vocab_size,
            token_embed_dim = net.config().token_embed_dim,
            hidden_dim = net.config().hidden_dim,
            "sentence encoder loaded"
        );

        let config = EmbedderConfig {
            embedding_dim: net.config().hidden_dim,
            ..config
        };

        Ok(Self {
            backend: EmbedderBackend::Model { net },
            config,
            device,
        })
    }

    /// Generates an L2-normalized embedding for a single id sequence.
    ///
    /// An empty sequence yields the all-zero vector; under the
    /// epsilon-guarded cosine it scores ~0 against everything.
    pub fn embed(&self, ids: &[u32]) -> Result<Vec<f32>, EmbeddingError> {
        if ids.is_empty() {
            return Ok(vec![0.0; self.embedding_dim()]);
        }

        match &self.backend {
            EmbedderBackend::Model { net } => self.embed_with_model(ids, net),
            EmbedderBackend::Stub => Ok(self.embed_stub(ids)),
        }
    }

    /// Generates embeddings for a batch of id sequences.
    pub fn embed_batch(&self, sequences: &[Vec<u32>]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        sequences.iter().map(|ids| self.embed(ids)).collect()
    }

    fn embed_with_model(
        &self,
        ids: &[u32],
        net: &SiameseEncoder,
    ) -> Result<Vec<f32>, EmbeddingError> {
        debug!(token_count = ids.len(), "running encoder forward pass");

        let input_ids = Tensor::new(ids, &self.device)?.unsqueeze(0)?;
        let embedding = net.forward(&input_ids)?.squeeze(0)?.to_vec1::<f32>()?;

        Ok(l2_normalize(embedding))
    }

    fn embed_stub(&self, ids: &[u32]) -> Vec<f32> {
        use std::hash::{DefaultHasher, Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        ids.hash(&mut hasher);
        let seed = hasher.finish();

        let mut embedding = Vec::with_capacity(self.config.embedding_dim);
        let mut state = seed;

        for _ in 0..self.config.embedding_dim {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let value = ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0;
            embedding.push(value);
        }

        l2_normalize(embedding)
    }

    /// Returns the output embedding dimension.
    pub fn embedding_dim(&self) -> usize {
        self.config.embedding_dim
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EmbedderBackend::Stub)
    }

    /// Returns `true` if real weights are loaded.
    pub fn has_model(&self) -> bool {
        matches!(self.backend, EmbedderBackend::Model { .. })
    }

    /// Returns the embedder configuration.
    pub fn config(&self) -> &EmbedderConfig {
        &self.config
    }
}

fn l2_normalize(mut embedding: Vec<f32>) -> Vec<f32> {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm > 0.0 {
        for x in &mut embedding {
            *x /= norm;
        }
    }

    embedding
}
