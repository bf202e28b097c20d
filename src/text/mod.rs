//! Text normalization for catalog questions and live queries.
//!
//! Both sides of the similarity comparison must pass through the exact same
//! normalization, so this module is the single entry point for it.

mod lemma;
mod stopwords;

#[cfg(test)]
mod tests;

pub use lemma::lemmatize;
pub use stopwords::is_stopword;

/// Normalizes a raw string into a canonical token sequence joined by single
/// spaces.
///
/// Steps: lower-case, split into maximal alphanumeric runs (which both
/// collapses whitespace and discards punctuation), drop stopwords, and
/// lemmatize each surviving token. Pure and total: empty input yields an
/// empty string, never an error.
pub fn normalize(raw: &str) -> String {
    let lowered = raw.to_lowercase();

    let mut parts: Vec<String> = Vec::new();
    for token in lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        if is_stopword(token) {
            continue;
        }
        parts.push(lemmatize(token));
    }

    parts.join(" ")
}
