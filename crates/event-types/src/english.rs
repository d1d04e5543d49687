//! English noun helpers for default patterns and messages.

/// Splits a word into its singular form and whether it looked plural.
///
/// ```
/// use event_types::english::split_plural;
///
/// assert_eq!(split_plural("players"), ("player".to_string(), true));
/// assert_eq!(split_plural("entities"), ("entity".to_string(), true));
/// assert_eq!(split_plural("boss"), ("boss".to_string(), false));
/// ```
#[must_use]
pub fn split_plural(word: &str) -> (String, bool) {
    if let Some(stem) = word.strip_suffix("ies") {
        if !stem.is_empty() {
            return (format!("{stem}y"), true);
        }
    }
    for suffix in ["sses", "xes", "ches", "shes", "zzes"] {
        if word.len() > suffix.len() && word.ends_with(suffix) {
            return (word[..word.len() - 2].to_string(), true);
        }
    }
    if word.len() > 1 && word.ends_with('s') && !word.ends_with("ss") {
        return (word[..word.len() - 1].to_string(), true);
    }
    (word.to_string(), false)
}

/// Regular English plural of a singular noun.
///
/// ```
/// use event_types::english::to_plural;
///
/// assert_eq!(to_plural("player"), "players");
/// assert_eq!(to_plural("entity"), "entities");
/// assert_eq!(to_plural("box"), "boxes");
/// ```
#[must_use]
pub fn to_plural(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if let Some(stem) = word.strip_suffix('y') {
        let before = stem.chars().last();
        if before.is_some_and(|c| !is_vowel(c)) {
            return format!("{stem}ies");
        }
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|s| lower.ends_with(s)) {
        return format!("{word}es");
    }
    format!("{word}s")
}

/// `"a"` or `"an"` for the given noun.
#[must_use]
pub fn indefinite_article(word: &str) -> &'static str {
    match word.chars().next() {
        Some(c) if is_vowel(c) => "an",
        _ => "a",
    }
}

/// Prefixes a noun with its indefinite article.
#[must_use]
pub fn with_article(word: &str) -> String {
    format!("{} {word}", indefinite_article(word))
}

fn is_vowel(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}
