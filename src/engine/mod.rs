//! Decision policy: the one-pass orchestrator behind `answer`.
//!
//! Small talk first, then normalize -> encode -> embed -> rank ->
//! threshold. Stateless across calls; all versioned state lives in the
//! [`Bundle`] snapshot taken at the start of each call.

mod error;


pub use error::{EngineError, EngineResult};

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::bundle::{Bundle, BundleHandle};
use crate::constants::DEFAULT_CONFIDENCE_THRESHOLD;
use crate::ranker::{Ranked, rank};
use crate::smalltalk::SmallTalk;
use crate::text::normalize;
use crate::vocab::to_fixed_length;

/// Message returned when no catalog entry is confidently close enough.
pub const FALLBACK_MESSAGE: &str = "I'm not confident I have the right answer for this \
     question. I've forwarded your query to our help desk team, and they'll get back to you \
     shortly.";

/// Where a reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    /// Small-talk fast path; confidence is always 1.0.
    SmallTalk,
    /// A catalog entry at or above the confidence threshold.
    Catalog { index: usize },
    /// Low-confidence handoff. Not an error: the score is the true best
    /// score, so callers can distinguish "no good match" from failure.
    Fallback,
}

impl ReplySource {
    /// Short label for logs and response headers.
    pub fn label(&self) -> &'static str {
        match self {
            ReplySource::SmallTalk => "small_talk",
            ReplySource::Catalog { .. } => "catalog",
            ReplySource::Fallback => "fallback",
        }
    }
}

/// A user-facing answer plus its confidence score.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub confidence: f32,
    pub source: ReplySource,
}

/// Engine policy knobs. Defaults come from [`crate::constants`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Minimum cosine similarity for a catalog answer (inclusive).
    pub confidence_threshold: f32,
    /// Fuzzy cutoff for the small-talk intercept.
    pub small_talk_cutoff: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            small_talk_cutoff: crate::constants::DEFAULT_SMALL_TALK_CUTOFF,
        }
    }
}

/// The semantic matching engine. Safe to share across request handlers:
/// every call works on an immutable bundle snapshot.
#[derive(Debug)]
pub struct Engine {
    bundle: BundleHandle,
    small_talk: SmallTalk,
    config: EngineConfig,
}

impl Engine {
    pub fn new(bundle: Bundle) -> Self {
        Self::with_config(bundle, EngineConfig::default())
    }

    pub fn with_config(bundle: Bundle, config: EngineConfig) -> Self {
        Self {
            bundle: BundleHandle::new(bundle),
            small_talk: SmallTalk::with_cutoff(config.small_talk_cutoff),
            config,
        }
    }

    /// Answers a query: small talk short-circuits at confidence 1.0, else
    /// the embedding pipeline runs and the best catalog score decides
    /// between the stored answer and the fallback message.
    #[instrument(skip(self, query), fields(query_len = query.len()))]
    pub fn answer(&self, query: &str) -> EngineResult<Reply> {
        if let Some(response) = self.small_talk.match_phrase(query) {
            debug!("small talk intercept");
            return Ok(Reply {
                text: response.to_string(),
                confidence: 1.0,
                source: ReplySource::SmallTalk,
            });
        }

        let bundle = self.bundle.current();

        let cleaned = normalize(query);
        let ids = to_fixed_length(&bundle.vocab().encode(&cleaned), bundle.max_seq_len());
        let query_embedding = bundle.embedder().embed(&ids)?;
        let ranked = rank(&query_embedding, bundle.matrix())?;

        debug!(
            best_index = ranked.index,
            best_score = ranked.score,
            "ranked query against catalog"
        );

        Ok(decide(ranked, &bundle, self.config.confidence_threshold))
    }

    /// Atomically replaces the served bundle (hot reload).
    pub fn swap_bundle(&self, bundle: Bundle) {
        self.bundle.swap(bundle);
    }

    /// Snapshot of the currently served bundle.
    pub fn bundle(&self) -> Arc<Bundle> {
        self.bundle.current()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

/// Threshold gate: at or above `threshold` the catalog answer is returned,
/// below it the fallback message, in both cases with the true best score.
fn decide(ranked: Ranked, bundle: &Bundle, threshold: f32) -> Reply {
    if ranked.score >= threshold {
        let entry = &bundle.entries()[ranked.index];
        Reply {
            text: entry.answer.clone(),
            confidence: ranked.score,
            source: ReplySource::Catalog {
                index: ranked.index,
            },
        }
    } else {
        Reply {
            text: FALLBACK_MESSAGE.to_string(),
            confidence: ranked.score,
            source: ReplySource::Fallback,
        }
    }
}
