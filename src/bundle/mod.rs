//! The versioned, atomically-swappable serving bundle.
//!
//! A [`Bundle`] holds everything one model version needs to answer queries:
//! vocabulary, catalog entries, the precomputed embedding matrix, the
//! derived max sequence length, and the embedder itself. The pieces are
//! produced together by one offline build pass and must only ever be
//! replaced together: catalog entry `i` and matrix row `i` are joined by
//! index alone.

mod error;


pub use error::{LoadError, LoadResult};

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use candle_core::{Device, Tensor};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::constants::MAX_LEN_MARGIN;
use crate::embedding::{EmbedderConfig, QueryEmbedder};
use crate::text::normalize;
use crate::vocab::{Vocabulary, to_fixed_length};

/// Vocabulary artifact: non-reserved tokens in insertion order.
pub const VOCAB_FILE: &str = "vocab.json";
/// Catalog artifact: ordered question/answer pairs.
pub const CATALOG_FILE: &str = "catalog.json";
/// Frozen encoder weights.
pub const MODEL_FILE: &str = "model.safetensors";
/// Precomputed catalog embedding matrix.
pub const EMBEDDINGS_FILE: &str = "embeddings.safetensors";
/// Tensor name of the matrix inside [`EMBEDDINGS_FILE`].
pub const EMBEDDINGS_TENSOR: &str = "catalog_embeddings";

/// One question/answer pair. Identity is the position in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub question: String,
    pub answer: String,
}

impl CatalogEntry {
    pub fn new<Q: Into<String>, A: Into<String>>(question: Q, answer: A) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Immutable serving bundle for one model version.
pub struct Bundle {
    vocab: Vocabulary,
    entries: Vec<CatalogEntry>,
    matrix: Vec<Vec<f32>>,
    max_seq_len: usize,
    embedder: QueryEmbedder,
}

impl std::fmt::Debug for Bundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bundle")
            .field("entries", &self.entries.len())
            .field("vocab_len", &self.vocab.len())
            .field("max_seq_len", &self.max_seq_len)
            .field("embedder", &self.embedder)
            .finish()
    }
}

impl Bundle {
    /// Assembles a bundle from already-built parts, validating the
    /// index-alignment invariants.
    pub fn from_parts(
        vocab: Vocabulary,
        entries: Vec<CatalogEntry>,
        matrix: Vec<Vec<f32>>,
        max_seq_len: usize,
        embedder: QueryEmbedder,
    ) -> LoadResult<Self> {
        if entries.is_empty() {
            return Err(LoadError::EmptyCatalog);
        }
        if matrix.len() != entries.len() {
            return Err(LoadError::RowCountMismatch {
                rows: matrix.len(),
                entries: entries.len(),
            });
        }
        let expected = embedder.embedding_dim();
        for (row, vector) in matrix.iter().enumerate() {
            if vector.len() != expected {
                return Err(LoadError::DimensionMismatch {
                    row,
                    expected,
                    actual: vector.len(),
                });
            }
        }

        Ok(Self {
            vocab,
            entries,
            matrix,
            max_seq_len,
            embedder,
        })
    }

    /// The offline build pass: normalizes every catalog question, grows the
    /// vocabulary, derives the max sequence length, and precomputes the
    /// embedding matrix through the (frozen) embedder.
    pub fn build(entries: Vec<CatalogEntry>, embedder: QueryEmbedder) -> LoadResult<Self> {
        if entries.is_empty() {
            return Err(LoadError::EmptyCatalog);
        }

        let normalized: Vec<String> =
            entries.iter().map(|e| normalize(&e.question)).collect();

        let mut vocab = Vocabulary::new();
        for question in &normalized {
            vocab.add_sentence(question);
        }

        let max_seq_len = derive_max_seq_len(&normalized);

        let sequences: Vec<Vec<u32>> = normalized
            .iter()
            .map(|q| to_fixed_length(&vocab.encode(q), max_seq_len))
            .collect();
        let matrix = embedder.embed_batch(&sequences)?;

        info!(
            entries = entries.len(),
            vocab_len = vocab.len(),
            max_seq_len,
            "bundle built"
        );

        Self::from_parts(vocab, entries, matrix, max_seq_len, embedder)
    }

    /// Loads a bundle from an artifact directory, falling back to the stub
    /// embedder (with a warning) when no weights file is present.
    pub fn load<P: AsRef<Path>>(dir: P) -> LoadResult<Self> {
        let dir = dir.as_ref();
        let weights_path = dir.join(MODEL_FILE);

        let embedder_config = if weights_path.exists() {
            EmbedderConfig::new(weights_path)
        } else {
            warn!(
                dir = %dir.display(),
                "no {MODEL_FILE} in bundle directory, using stub embedder"
            );
            EmbedderConfig::stub()
        };

        Self::load_with(dir, embedder_config)
    }

    /// Loads a bundle from an artifact directory with an explicit embedder
    /// configuration.
    ///
    /// When the embedder runs as a stub, the catalog matrix is recomputed
    /// through the stub instead of reading [`EMBEDDINGS_FILE`]: queries and
    /// catalog rows must come from the same embedding function for the
    /// scores to mean anything.
    pub fn load_with<P: AsRef<Path>>(
        dir: P,
        embedder_config: EmbedderConfig,
    ) -> LoadResult<Self> {
        let dir = dir.as_ref();

        let tokens: Vec<String> = read_json(&dir.join(VOCAB_FILE))?;
        let vocab = Vocabulary::from_tokens(&tokens);

        let entries: Vec<CatalogEntry> = read_json(&dir.join(CATALOG_FILE))?;
        if entries.is_empty() {
            return Err(LoadError::EmptyCatalog);
        }

        let embedder = QueryEmbedder::load(embedder_config)?;

        let normalized: Vec<String> =
            entries.iter().map(|e| normalize(&e.question)).collect();
        let max_seq_len = derive_max_seq_len(&normalized);

        let embeddings_path = dir.join(EMBEDDINGS_FILE);
        let matrix = if embedder.is_stub() {
            warn!("stub embedder active, recomputing catalog embeddings for symmetry");
            embed_questions(&vocab, &normalized, max_seq_len, &embedder)?
        } else if embeddings_path.exists() {
            read_matrix(&embeddings_path)?
        } else {
            warn!(
                path = %embeddings_path.display(),
                "embeddings artifact missing, computing catalog embeddings at startup"
            );
            embed_questions(&vocab, &normalized, max_seq_len, &embedder)?
        };

        let bundle = Self::from_parts(vocab, entries, matrix, max_seq_len, embedder)?;
        info!(
            dir = %dir.display(),
            entries = bundle.entries.len(),
            vocab_len = bundle.vocab.len(),
            max_seq_len = bundle.max_seq_len,
            embedder_stub = bundle.embedder.is_stub(),
            "bundle loaded"
        );
        Ok(bundle)
    }

    /// Writes the vocabulary, catalog, and embedding-matrix artifacts.
    ///
    /// The weights file is not written here; it is an opaque upstream
    /// artifact that is copied into the bundle directory as-is.
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> LoadResult<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        write_json(&dir.join(VOCAB_FILE), &self.vocab.tokens())?;
        write_json(&dir.join(CATALOG_FILE), &self.entries)?;
        write_matrix(&dir.join(EMBEDDINGS_FILE), &self.matrix)?;

        Ok(())
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    pub fn matrix(&self) -> &[Vec<f32>] {
        &self.matrix
    }

    pub fn max_seq_len(&self) -> usize {
        self.max_seq_len
    }

    pub fn embedder(&self) -> &QueryEmbedder {
        &self.embedder
    }

    /// Number of catalog entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false` for a constructed bundle; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Longest normalized question in tokens, plus the fixed margin.
fn derive_max_seq_len(normalized_questions: &[String]) -> usize {
    let longest = normalized_questions
        .iter()
        .map(|q| q.split_whitespace().count())
        .max()
        .unwrap_or(0);
    longest + MAX_LEN_MARGIN
}

fn embed_questions(
    vocab: &Vocabulary,
    normalized: &[String],
    max_seq_len: usize,
    embedder: &QueryEmbedder,
) -> LoadResult<Vec<Vec<f32>>> {
    let sequences: Vec<Vec<u32>> = normalized
        .iter()
        .map(|q| to_fixed_length(&vocab.encode(q), max_seq_len))
        .collect();
    Ok(embedder.embed_batch(&sequences)?)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> LoadResult<T> {
    if !path.exists() {
        return Err(LoadError::ArtifactNotFound {
            path: path.to_path_buf(),
        });
    }
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| LoadError::MalformedJson {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> LoadResult<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|source| LoadError::MalformedJson {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, bytes).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_matrix(path: &Path) -> LoadResult<Vec<Vec<f32>>> {
    let tensors = candle_core::safetensors::load(path, &Device::Cpu).map_err(|e| {
        LoadError::MalformedMatrix {
            reason: e.to_string(),
        }
    })?;
    let tensor = tensors
        .get(EMBEDDINGS_TENSOR)
        .ok_or_else(|| LoadError::MalformedMatrix {
            reason: format!("missing tensor: {EMBEDDINGS_TENSOR}"),
        })?;
    tensor
        .to_vec2::<f32>()
        .map_err(|e| LoadError::MalformedMatrix {
            reason: e.to_string(),
        })
}

fn write_matrix(path: &Path, matrix: &[Vec<f32>]) -> LoadResult<()> {
    let rows = matrix.len();
    let cols = matrix.first().map_or(0, Vec::len);
    let flat: Vec<f32> = matrix.iter().flatten().copied().collect();

    let tensor = Tensor::from_vec(flat, (rows, cols), &Device::Cpu).map_err(|e| {
        LoadError::MalformedMatrix {
            reason: e.to_string(),
        }
    })?;

    let tensors = HashMap::from([(EMBEDDINGS_TENSOR.to_string(), tensor)]);
    candle_core::safetensors::save(&tensors, path).map_err(|e| LoadError::MalformedMatrix {
        reason: e.to_string(),
    })
}

/// Read-mostly shared handle to the current bundle.
///
/// Readers clone the inner `Arc` under a short read lock; a hot reload
/// swaps the whole `Arc` under the write lock, so an in-flight request
/// always sees one fully consistent version.
#[derive(Debug)]
pub struct BundleHandle {
    inner: RwLock<Arc<Bundle>>,
}

impl BundleHandle {
    pub fn new(bundle: Bundle) -> Self {
        Self {
            inner: RwLock::new(Arc::new(bundle)),
        }
    }

    /// Snapshot of the current bundle.
    pub fn current(&self) -> Arc<Bundle> {
        self.inner.read().clone()
    }

    /// Atomically replaces the served bundle.
    pub fn swap(&self, bundle: Bundle) {
        let next = Arc::new(bundle);
        info!(entries = next.len(), "bundle swapped");
        *self.inner.write() = next;
    }
}
