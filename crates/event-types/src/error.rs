//! Error types for the type substrate.

use thiserror::Error;

use crate::hierarchy::TypeKey;

/// Errors raised while building a [`TypeSystem`](crate::TypeSystem).
///
/// All of these indicate a programming error in whoever populates the type
/// system at startup; none are produced by queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// A type with this name already exists.
    #[error("type '{0}' is already defined")]
    DuplicateName(String),

    /// The key was not issued by this hierarchy.
    #[error("unknown type {0}")]
    UnknownType(TypeKey),

    /// Array types are created through `array_of` and cannot be extended.
    #[error("type '{name}' cannot extend array type '{parent}'")]
    ArrayParent {
        /// Name of the type being defined.
        name: String,
        /// Name of the array type given as parent.
        parent: String,
    },

    /// The type already has a named type; carries the rejected code name.
    #[error("cannot name a type '{0}': it already has a named type")]
    DuplicateNamedType(String),

    /// A user input pattern failed to compile.
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// Pattern source text.
        pattern: String,
        /// Compiler message.
        message: String,
    },
}

/// Result alias for type system construction.
pub type Result<T> = std::result::Result<T, TypeError>;
