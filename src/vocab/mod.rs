//! Token/id vocabulary and fixed-length sequence encoding.
//!
//! Ids are dense integers assigned in first-seen order during the offline
//! bundle build; at serving time the vocabulary is read-only and encoding
//! is total (unknown tokens map to [`UNK_ID`], never an error).


use std::collections::HashMap;

use crate::constants::{PAD_ID, PAD_TOKEN, RESERVED_TOKENS, UNK_ID, UNK_TOKEN};

/// Bidirectional token/id mapping with reserved `<pad>` and `<unk>` entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    token_to_id: HashMap<String, u32>,
    id_to_token: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

impl Vocabulary {
    /// Creates a vocabulary containing only the reserved entries.
    pub fn new() -> Self {
        let mut vocab = Self {
            token_to_id: HashMap::new(),
            id_to_token: Vec::new(),
        };
        vocab.insert(PAD_TOKEN);
        vocab.insert(UNK_TOKEN);
        debug_assert_eq!(vocab.id_of(PAD_TOKEN), Some(PAD_ID));
        debug_assert_eq!(vocab.id_of(UNK_TOKEN), Some(UNK_ID));
        vocab
    }

    /// Rebuilds a vocabulary from its non-reserved tokens in insertion
    /// order (the `vocab.json` artifact format).
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocab = Self::new();
        for token in tokens {
            vocab.insert(token.as_ref());
        }
        vocab
    }

    /// Build-time only: assigns a fresh id to every previously-unseen
    /// whitespace-delimited token of `sentence`. Re-adding is a no-op.
    pub fn add_sentence(&mut self, sentence: &str) {
        for token in sentence.split_whitespace() {
            self.insert(token);
        }
    }

    fn insert(&mut self, token: &str) {
        if self.token_to_id.contains_key(token) {
            return;
        }
        let id = self.id_to_token.len() as u32;
        self.token_to_id.insert(token.to_string(), id);
        self.id_to_token.push(token.to_string());
    }

    /// Maps each whitespace-delimited token to its id, substituting
    /// [`UNK_ID`] for unknown tokens. Total; never mutates.
    pub fn encode(&self, sentence: &str) -> Vec<u32> {
        sentence
            .split_whitespace()
            .map(|token| self.token_to_id.get(token).copied().unwrap_or(UNK_ID))
            .collect()
    }

    /// Id of `token`, if present.
    pub fn id_of(&self, token: &str) -> Option<u32> {
        self.token_to_id.get(token).copied()
    }

    /// Token for `id`, if in range.
    pub fn token_of(&self, id: u32) -> Option<&str> {
        self.id_to_token.get(id as usize).map(String::as_str)
    }

    /// Total entry count, reserved entries included.
    pub fn len(&self) -> usize {
        self.id_to_token.len()
    }

    /// `true` when only the reserved entries are present.
    pub fn is_empty(&self) -> bool {
        self.id_to_token.len() <= RESERVED_TOKENS
    }

    /// Non-reserved tokens in insertion order (the artifact payload).
    pub fn tokens(&self) -> &[String] {
        &self.id_to_token[RESERVED_TOKENS..]
    }
}

/// Pads `ids` on the right with [`PAD_ID`] or truncates to the first
/// `max_len` ids. The result always has length exactly `max_len`.
pub fn to_fixed_length(ids: &[u32], max_len: usize) -> Vec<u32> {
    let mut out = Vec::with_capacity(max_len);
    out.extend(ids.iter().take(max_len));
    out.resize(max_len, PAD_ID);
    out
}
