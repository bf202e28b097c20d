//! Dictionary-base-form lemmatization for single tokens.
//!
//! Noun-style: maps inflected plurals to their singular lemma via an
//! irregular-form table and ordered suffix rules, and leaves everything
//! else untouched. Words the dictionary treats as their own lemma
//! ("thanks", "news") are pinned as invariant so phrase matching downstream
//! sees the surface form users actually type.

/// Plural forms whose lemma is not reachable by suffix rules.
const IRREGULAR: &[(&str, &str)] = &[
    ("men", "man"),
    ("women", "woman"),
    ("children", "child"),
    ("teeth", "tooth"),
    ("feet", "foot"),
    ("geese", "goose"),
    ("mice", "mouse"),
    ("lives", "life"),
    ("wives", "wife"),
    ("knives", "knife"),
    ("leaves", "leaf"),
    ("selves", "self"),
    ("movies", "movie"),
    ("indices", "index"),
    ("analyses", "analysis"),
    ("crises", "crisis"),
];

/// Words that end like plurals but are already in base form.
const INVARIANT: &[&str] = &[
    "thanks", "news", "series", "species", "means", "physics", "analysis", "basis", "status",
];

/// Lemmatizes an already-lowercased token to its dictionary base form.
pub fn lemmatize(token: &str) -> String {
    if token.len() <= 3 {
        return token.to_string();
    }

    if let Some(&(_, lemma)) = IRREGULAR.iter().find(|(form, _)| *form == token) {
        return lemma.to_string();
    }

    if INVARIANT.contains(&token) {
        return token.to_string();
    }

    // Suffixes that never mark a plural.
    if token.ends_with("ss") || token.ends_with("us") || token.ends_with("is") {
        return token.to_string();
    }

    if let Some(stem) = token.strip_suffix("ies") {
        return format!("{stem}y");
    }

    // Sibilant-stem plurals: boxes -> box, branches -> branch. "-oes" and
    // "-zes" are deliberately absent ("shoes", "sizes" just drop the "s").
    for suffix in ["sses", "xes", "ches", "shes"] {
        if let Some(stem) = token.strip_suffix("es")
            && token.ends_with(suffix)
        {
            return stem.to_string();
        }
    }

    if let Some(stem) = token.strip_suffix('s') {
        return stem.to_string();
    }

    token.to_string()
}
