//! Cosine-similarity ranking of a query embedding against the catalog
//! matrix.
//!
//! The catalog is small enough that an exhaustive left-to-right scan is the
//! whole index.


use thiserror::Error;

use crate::constants::COSINE_EPSILON;

#[derive(Debug, Error)]
pub enum RankError {
    /// The catalog embedding matrix has no rows. A bundle is never built
    /// this way, so hitting it means misconfiguration, not a runtime
    /// condition to recover from.
    #[error("catalog embedding matrix is empty")]
    EmptyMatrix,

    #[error("embedding dimension mismatch at row {row}: expected {expected}, got {actual}")]
    DimensionMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

pub type RankResult<T> = Result<T, RankError>;

/// Best-matching catalog row for a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranked {
    pub index: usize,
    pub score: f32,
}

/// Epsilon-guarded cosine similarity: `dot / (norm_a * norm_b + 1e-8)`.
///
/// The guard keeps degenerate all-zero vectors at score 0 instead of NaN.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (dot, norm_a_sq, norm_b_sq) =
        a.iter()
            .zip(b.iter())
            .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (&av, &bv)| {
                (dot + av * bv, na + av * av, nb + bv * bv)
            });

    dot / (norm_a_sq.sqrt() * norm_b_sq.sqrt() + COSINE_EPSILON)
}

/// Scores `query` against every row of `matrix` and returns the index and
/// score of the maximum. Ties break to the lowest index (stable
/// left-to-right scan).
pub fn rank(query: &[f32], matrix: &[Vec<f32>]) -> RankResult<Ranked> {
    if matrix.is_empty() {
        return Err(RankError::EmptyMatrix);
    }

    let mut best = Ranked {
        index: 0,
        score: f32::NEG_INFINITY,
    };

    for (index, row) in matrix.iter().enumerate() {
        if row.len() != query.len() {
            return Err(RankError::DimensionMismatch {
                row: index,
                expected: query.len(),
                actual: row.len(),
            });
        }

        let score = cosine_similarity(query, row);
        if score > best.score {
            best = Ranked { index, score };
        }
    }

    Ok(best)
}
