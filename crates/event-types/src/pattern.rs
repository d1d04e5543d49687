//! Full-match user input patterns.
//!
//! Patterns identify a value by what the user types ("player", "attacker",
//! "victims"). A pattern always matches the whole input; partial matches never
//! count.

use std::fmt;
use std::hash::{Hash, Hasher};

use regex::Regex;

use crate::error::{Result, TypeError};

/// A compiled, anchored regular expression.
///
/// Two patterns are equal when their source text is equal.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    matcher: Matcher,
}

/// Plain word lists skip the regex engine entirely.
#[derive(Clone)]
enum Matcher {
    Words(Vec<String>),
    Regex(Regex),
}

impl Pattern {
    /// Compiles a pattern that must match the entire input.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::InvalidPattern`] if the source is not a valid
    /// regular expression.
    pub fn new(source: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{source})$")).map_err(|e| TypeError::InvalidPattern {
            pattern: source.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            source: source.to_string(),
            matcher: Matcher::Regex(regex),
        })
    }

    /// A pattern matching exactly `text`.
    ///
    /// Its source is the escaped text, so it equals `Pattern::new` of
    /// [`regex::escape`]d input.
    #[must_use]
    pub fn literal(text: &str) -> Self {
        Self {
            source: regex::escape(text),
            matcher: Matcher::Words(vec![text.to_string()]),
        }
    }

    /// A pattern matching either of the given words.
    #[must_use]
    pub fn either(first: &str, second: &str) -> Self {
        if first == second {
            return Self::literal(first);
        }
        Self {
            source: format!("{}|{}", regex::escape(first), regex::escape(second)),
            matcher: Matcher::Words(vec![first.to_string(), second.to_string()]),
        }
    }

    /// Returns true if `input` matches in full.
    #[must_use]
    pub fn matches(&self, input: &str) -> bool {
        match &self.matcher {
            Matcher::Words(words) => words.iter().any(|word| word == input),
            Matcher::Regex(regex) => regex.is_match(input),
        }
    }

    /// The source text this pattern was compiled from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl Hash for Pattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({:?})", self.source)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
