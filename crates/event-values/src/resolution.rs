//! Resolution results.

use std::sync::Arc;

use thiserror::Error;

use crate::changer::ChangeMode;
use crate::descriptor::Descriptor;

/// The outcome of a resolution query.
///
/// | state | `successful` | `errored` |
/// |---|---|---|
/// | nothing matched | false | false |
/// | one or more candidates (more means ambiguous) | true | false |
/// | an exclusion fired | false | true |
///
/// An errored resolution is terminal: callers report the error and must not
/// look for other candidates. Cloning is cheap.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    state: State,
}

#[derive(Debug, Clone, PartialEq)]
enum State {
    Found(Arc<[Descriptor]>),
    Errored(Option<Arc<str>>),
}

/// Why [`Resolution::unique`] found no single candidate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotUnique {
    /// Nothing matched.
    #[error("resolution is empty")]
    Empty,
    /// Several candidates tied.
    #[error("resolution is not unique (size: {0})")]
    Multiple(usize),
    /// An exclusion fired.
    #[error("resolution errored")]
    Errored,
}

impl Resolution {
    /// A resolution holding `candidates`.
    #[must_use]
    pub fn of(candidates: Vec<Descriptor>) -> Self {
        Self {
            state: State::Found(candidates.into()),
        }
    }

    /// A resolution with no candidates and no error.
    #[must_use]
    pub fn empty() -> Self {
        Self::of(Vec::new())
    }

    /// An errored resolution carrying an optional user-facing message.
    #[must_use]
    pub fn error(message: Option<String>) -> Self {
        Self {
            state: State::Errored(message.map(Into::into)),
        }
    }

    /// Returns true if at least one candidate exists.
    #[must_use]
    pub fn successful(&self) -> bool {
        !self.all().is_empty()
    }

    /// Returns true if more than one candidate tied.
    #[must_use]
    pub fn multiple(&self) -> bool {
        self.len() > 1
    }

    /// Returns true if an exclusion poisoned the resolution.
    #[must_use]
    pub fn errored(&self) -> bool {
        matches!(self.state, State::Errored(_))
    }

    /// Returns true if the resolution either found something or errored; in
    /// both cases later resolution phases must not run.
    #[must_use]
    pub fn is_conclusive(&self) -> bool {
        self.errored() || self.successful()
    }

    /// The message of the exclusion that fired, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            State::Errored(message) => message.as_deref(),
            State::Found(_) => None,
        }
    }

    /// All candidates. Empty when errored.
    #[must_use]
    pub fn all(&self) -> &[Descriptor] {
        match &self.state {
            State::Found(candidates) => &candidates[..],
            State::Errored(_) => &[],
        }
    }

    /// Number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.all().len()
    }

    /// Returns true if there are no candidates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all().is_empty()
    }

    /// The first candidate.
    #[must_use]
    pub fn any(&self) -> Option<&Descriptor> {
        self.all().first()
    }

    /// The single candidate.
    ///
    /// # Errors
    ///
    /// Returns [`NotUnique`] when there are zero or several candidates, or
    /// when the resolution errored.
    pub fn unique(&self) -> Result<&Descriptor, NotUnique> {
        match &self.state {
            State::Errored(_) => Err(NotUnique::Errored),
            State::Found(candidates) => match &candidates[..] {
                [] => Err(NotUnique::Empty),
                [only] => Ok(only),
                many => Err(NotUnique::Multiple(many.len())),
            },
        }
    }

    /// The single candidate, or `None` if not unique.
    #[must_use]
    pub fn unique_or_none(&self) -> Option<&Descriptor> {
        self.unique().ok()
    }

    /// Returns true if the resolution succeeded and every candidate can be
    /// changed with `mode`.
    #[must_use]
    pub fn supports_change(&self, mode: ChangeMode) -> bool {
        self.successful() && self.all().iter().all(|d| d.has_changer(mode))
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::empty()
    }
}
