//! Error types for descriptor construction and registration.
//!
//! Errors produced while *resolving* live in [`crate::diagnostics`]; resolution
//! itself never fails and reports its outcome through
//! [`Resolution`](crate::Resolution).

use event_types::{TypeError, TypeKey};
use thiserror::Error;

use crate::time::Time;

/// Errors raised by [`DescriptorBuilder::build`](crate::DescriptorBuilder::build).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// Every descriptor needs a getter.
    #[error("descriptor for {context} -> {value} has no getter")]
    MissingGetter {
        /// Context type name.
        context: String,
        /// Value type name.
        value: String,
    },

    /// A referenced type is not part of the type system.
    #[error("descriptor references unknown type {0}")]
    UnknownType(TypeKey),

    /// An identifier pattern failed to compile.
    #[error(transparent)]
    Pattern(#[from] TypeError),
}

/// Errors raised by [`EventValueRegistry::register`](crate::EventValueRegistry::register).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A descriptor with the same context type, value type and identifier
    /// patterns is already registered for this time state.
    #[error("'{context}' already has a registered event value with the identifier patterns {patterns:?} (time: {time})")]
    Duplicate {
        /// Context type name.
        context: String,
        /// Value type name.
        value: String,
        /// Identifier pattern sources.
        patterns: Vec<String>,
        /// Time state of the bucket.
        time: Time,
    },

    /// The descriptor references a type the registry's type system does not know.
    #[error("descriptor references unknown type {0}")]
    UnknownType(TypeKey),
}

/// A numeric time state outside `-1..=1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("time must be -1, 0 or 1, got {0}")]
pub struct InvalidTime(pub i8);
