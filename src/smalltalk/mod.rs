//! Small-talk fast path.
//!
//! Greetings, thanks, acknowledgements and farewells are answered from a
//! static phrase table (exact lookup first, then a fuzzy pass) without
//! ever touching the embedding pipeline. The table is small and fixed, so
//! the fuzzy pass is O(table size) per call and fine on the synchronous
//! request path.


use std::collections::HashMap;
use std::sync::LazyLock;

use crate::constants::DEFAULT_SMALL_TALK_CUTOFF;
use crate::text::normalize;

/// Canonical small-talk intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Greeting,
    Thanks,
    Acknowledgement,
    Farewell,
}

impl Intent {
    /// Canned response for the intent.
    pub fn response(self) -> &'static str {
        match self {
            Intent::Greeting => "Hello. How may I assist you today?",
            Intent::Thanks => {
                "You're welcome. Please let me know if you need further assistance."
            }
            Intent::Acknowledgement => "Noted. Let me know if you have any other questions.",
            Intent::Farewell => "Thank you for reaching out. Have a great day.",
        }
    }
}

/// Phrase variants in lookup order. Fuzzy ties resolve to the earliest
/// entry.
const PHRASE_VARIANTS: &[(&str, Intent)] = &[
    ("hi", Intent::Greeting),
    ("hello", Intent::Greeting),
    ("hey", Intent::Greeting),
    ("good morning", Intent::Greeting),
    ("good afternoon", Intent::Greeting),
    ("good evening", Intent::Greeting),
    ("help", Intent::Greeting),
    ("thanks", Intent::Thanks),
    ("thank you", Intent::Thanks),
    ("thank u", Intent::Thanks),
    ("welcome", Intent::Thanks),
    ("no problem", Intent::Thanks),
    ("np", Intent::Thanks),
    ("okay", Intent::Acknowledgement),
    ("ok", Intent::Acknowledgement),
    ("fine", Intent::Acknowledgement),
    ("alright", Intent::Acknowledgement),
    ("sure", Intent::Acknowledgement),
    ("cool", Intent::Acknowledgement),
    ("bye", Intent::Farewell),
    ("goodbye", Intent::Farewell),
    ("see you", Intent::Farewell),
    ("see ya", Intent::Farewell),
    ("later", Intent::Farewell),
];

static EXACT: LazyLock<HashMap<&'static str, Intent>> =
    LazyLock::new(|| PHRASE_VARIANTS.iter().copied().collect());

/// Small-talk matcher with a configurable fuzzy cutoff.
#[derive(Debug, Clone)]
pub struct SmallTalk {
    cutoff: f32,
}

impl Default for SmallTalk {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_SMALL_TALK_CUTOFF,
        }
    }
}

impl SmallTalk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the fuzzy similarity cutoff (policy constant, default
    /// 0.75).
    pub fn with_cutoff(cutoff: f32) -> Self {
        Self { cutoff }
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Returns the canned response if `raw` is small talk, `None`
    /// otherwise so the caller proceeds to semantic matching.
    pub fn match_phrase(&self, raw: &str) -> Option<&'static str> {
        let text = normalize(raw);
        if text.is_empty() {
            return None;
        }

        if let Some(intent) = EXACT.get(text.as_str()) {
            return Some(intent.response());
        }

        self.closest_variant(&text).map(Intent::response)
    }

    /// Fuzzy pass: best similarity ratio over all phrase variants,
    /// accepted only at or above the cutoff.
    fn closest_variant(&self, text: &str) -> Option<Intent> {
        let mut best: Option<(f32, Intent)> = None;

        for &(variant, intent) in PHRASE_VARIANTS {
            let ratio = similarity_ratio(text, variant);
            if best.is_none_or(|(best_ratio, _)| ratio > best_ratio) {
                best = Some((ratio, intent));
            }
        }

        best.and_then(|(ratio, intent)| (ratio >= self.cutoff).then_some(intent))
    }
}

/// Sequence similarity ratio: `2 * M / (len_a + len_b)` where `M` is the
/// total length of the matching blocks found by recursively taking the
/// leftmost longest common substring. Two empty strings rate 1.0.
pub fn similarity_ratio(a: &str, b: &str) -> f32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_total(&a, &b) as f32 / total as f32
}

fn matching_total(a: &[char], b: &[char]) -> usize {
    let (mut best_i, mut best_j, mut best_len) = (0usize, 0usize, 0usize);

    for i in 0..a.len() {
        for j in 0..b.len() {
            let mut k = 0;
            while i + k < a.len() && j + k < b.len() && a[i + k] == b[j + k] {
                k += 1;
            }
            if k > best_len {
                (best_i, best_j, best_len) = (i, j, k);
            }
        }
    }

    if best_len == 0 {
        return 0;
    }

    best_len
        + matching_total(&a[..best_i], &b[..best_j])
        + matching_total(&a[best_i + best_len..], &b[best_j + best_len..])
}
