//! User-facing resolution errors.
//!
//! Turns a [`Resolution`] into either a single usable [`Descriptor`] or a
//! [`ResolveError`] phrased in the nouns of the named types involved, e.g.
//! `there's no player in a join event`.

use event_types::english::with_article;
use event_types::{TypeKey, TypeSystem};
use thiserror::Error;

use crate::descriptor::Descriptor;
use crate::resolution::{NotUnique, Resolution};

/// Shown when an exclusion fired without a message of its own.
pub const DEFAULT_EXCLUDED_MESSAGE: &str = "this value can't be used here";

/// Why a required event value is unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No descriptor answers the query.
    #[error("there's no {value} in {context} event")]
    NotFound {
        /// Singular display name of the value type
        value: String,
        /// Context display name with its indefinite article
        context: String,
    },
    /// Several descriptors tied.
    #[error("there are multiple {values} in {context} event; you must define which {value} to use")]
    Ambiguous {
        /// Plural display name of the value type
        values: String,
        /// Singular display name of the value type
        value: String,
        /// Context display name with its indefinite article
        context: String,
    },
    /// An exclusion or context validator rejected the context.
    #[error("{message}")]
    Excluded {
        /// The descriptor's exclusion message, or [`DEFAULT_EXCLUDED_MESSAGE`]
        message: String,
    },
}

/// Demands exactly one candidate from `resolution`.
///
/// # Errors
///
/// Returns [`ResolveError::NotFound`], [`ResolveError::Ambiguous`] or
/// [`ResolveError::Excluded`] depending on the state of `resolution`.
pub fn require(
    types: &TypeSystem,
    resolution: &Resolution,
    context: TypeKey,
    value_type: TypeKey,
) -> Result<Descriptor, ResolveError> {
    match resolution.unique() {
        Ok(descriptor) => Ok(descriptor.clone()),
        Err(NotUnique::Errored) => Err(ResolveError::Excluded {
            message: resolution
                .error_message()
                .unwrap_or(DEFAULT_EXCLUDED_MESSAGE)
                .to_string(),
        }),
        Err(NotUnique::Empty) => Err(ResolveError::NotFound {
            value: types.display_name(value_type, false),
            context: context_phrase(types, context),
        }),
        Err(NotUnique::Multiple(_)) => Err(ResolveError::Ambiguous {
            values: types.display_name(value_type, true),
            value: types.display_name(value_type, false),
            context: context_phrase(types, context),
        }),
    }
}

fn context_phrase(types: &TypeSystem, context: TypeKey) -> String {
    with_article(&types.display_name(context, false))
}
