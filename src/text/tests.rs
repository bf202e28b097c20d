use super::*;

#[test]
fn test_normalize_lowercases_and_collapses_whitespace() {
    assert_eq!(normalize("  How   DO I\tReset    my PASSWORD  "), "reset password");
}

#[test]
fn test_normalize_strips_punctuation_tokens() {
    assert_eq!(normalize("Hello!!"), "hello");
    assert_eq!(normalize("reset... password??"), "reset password");
    assert_eq!(normalize("?!,."), "");
}

#[test]
fn test_normalize_drops_stopwords() {
    assert_eq!(normalize("what is the weather today"), "weather today");
    assert_eq!(normalize("can you help me"), "help");
}

#[test]
fn test_normalize_lemmatizes_tokens() {
    assert_eq!(normalize("changing passwords in settings"), "changing password setting");
}

#[test]
fn test_normalize_keeps_numerals() {
    assert_eq!(normalize("error 404 page"), "error 404 page");
}

#[test]
fn test_normalize_empty_input_is_empty_output() {
    assert_eq!(normalize(""), "");
    assert_eq!(normalize("   \t\n  "), "");
}

#[test]
fn test_normalize_all_stopwords_is_empty() {
    assert_eq!(normalize("is it you or me"), "");
}

#[test]
fn test_normalize_is_idempotent() {
    for raw in [
        "How do I reset my password?",
        "Thanks a lot!!",
        "what is   the Weather today",
        "",
    ] {
        let once = normalize(raw);
        assert_eq!(normalize(&once), once, "normalize not idempotent for {raw:?}");
    }
}

#[test]
fn test_normalize_handles_contractions_via_fragments() {
    // "don't" splits into "don" + "t", both stopwords.
    assert_eq!(normalize("don't panic"), "panic");
}

#[test]
fn test_is_stopword() {
    assert!(is_stopword("the"));
    assert!(is_stopword("how"));
    assert!(is_stopword("can"));
    assert!(!is_stopword("password"));
    assert!(!is_stopword("thanks"));
}
