//! Cross-cutting, shared constants.
//!
//! Prefer deriving secondary constants from primary ones to avoid drift.
//! Policy values (thresholds, cutoffs) are defaults only; runtime overrides
//! go through [`crate::config::Config`].

/// Id of the padding token. Sequences are right-padded with this id.
pub const PAD_ID: u32 = 0;

/// Id of the unknown-token placeholder. Encoding never fails; unseen tokens
/// map here.
pub const UNK_ID: u32 = 1;

/// Surface form of the padding token in vocabulary artifacts.
pub const PAD_TOKEN: &str = "<pad>";

/// Surface form of the unknown token in vocabulary artifacts.
pub const UNK_TOKEN: &str = "<unk>";

/// Number of reserved vocabulary entries (`<pad>` + `<unk>`).
pub const RESERVED_TOKENS: usize = 2;

/// Per-token embedding table width of the encoder network.
pub const DEFAULT_TOKEN_EMBED_DIM: usize = 50;

/// LSTM hidden width. The final projection maps back to this size, so it is
/// also the output embedding dimension.
pub const DEFAULT_HIDDEN_DIM: usize = 64;

/// Output embedding dimension (one per catalog row and per query).
pub const DEFAULT_EMBEDDING_DIM: usize = DEFAULT_HIDDEN_DIM;

/// Margin added to the longest normalized catalog question when deriving a
/// bundle's max sequence length.
pub const MAX_LEN_MARGIN: usize = 2;

/// Minimum cosine similarity for a catalog answer to be returned directly.
/// Scores below this fall back to the help-desk handoff message. The
/// boundary is inclusive on the confident side.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.80;

/// Minimum similarity ratio for a fuzzy small-talk phrase match.
pub const DEFAULT_SMALL_TALK_CUTOFF: f32 = 0.75;

/// Denominator guard for cosine similarity: `dot / (na * nb + EPSILON)`.
/// Keeps degenerate all-zero vectors at score 0 instead of NaN.
pub const COSINE_EPSILON: f32 = 1e-8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_ids_are_dense_from_zero() {
        assert_eq!(PAD_ID, 0);
        assert_eq!(UNK_ID, 1);
        assert_eq!(RESERVED_TOKENS, 2);
    }

    #[test]
    fn test_embedding_dim_tracks_hidden_dim() {
        assert_eq!(DEFAULT_EMBEDDING_DIM, DEFAULT_HIDDEN_DIM);
    }

    #[test]
    fn test_encoder_geometry() {
        assert_eq!(DEFAULT_TOKEN_EMBED_DIM, 50);
        assert_eq!(DEFAULT_HIDDEN_DIM, 64);
    }

    #[test]
    fn test_policy_defaults_in_range() {
        assert!((0.0..=1.0).contains(&DEFAULT_CONFIDENCE_THRESHOLD));
        assert!((0.0..=1.0).contains(&DEFAULT_SMALL_TALK_CUTOFF));
        assert!(COSINE_EPSILON > 0.0);
    }
}
