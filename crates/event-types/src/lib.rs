//! # Event Types
//!
//! Runtime type substrate for event value resolution.
//!
//! Scripts talk about occurrences ("a player joined") and the values hanging off
//! them ("the player", "the join message"). Both sides are described by runtime
//! types that live in a single inheritance hierarchy, so that a value provider
//! registered for a broad occurrence type can answer queries for narrower ones.
//!
//! This crate provides:
//!
//! - **Hierarchy**: [`TypeHierarchy`] with single inheritance and covariant array
//!   ("plural") types, plus exact distance computation between types
//! - **Values**: [`Value`], a cheaply clonable dynamically-typed payload tagged
//!   with its runtime [`TypeKey`]
//! - **Named types**: [`NamedTypes`], the human-facing names and user input
//!   patterns of types
//! - **Conversion**: the [`Conversion`] trait and the default
//!   [`ConverterRegistry`]
//! - **Type system**: [`TypeSystem`], the bundle the resolution engine shares
//!
//! ## Quick Start
//!
//! ```
//! use event_types::{TypeHierarchy, TypeSystem, Value};
//!
//! let mut types = TypeSystem::new();
//! let entity = types.hierarchy_mut().define("Entity", TypeHierarchy::OBJECT).unwrap();
//! let player = types.hierarchy_mut().define("Player", entity).unwrap();
//!
//! assert_eq!(types.hierarchy().hierarchy_distance(entity, player), Some(1));
//!
//! let steve = Value::new(player, String::from("Steve"));
//! assert!(steve.is_instance_of(types.hierarchy(), entity));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod convert;
pub mod english;
pub mod error;
pub mod hierarchy;
pub mod named;
pub mod pattern;
pub mod system;
pub mod value;

// Re-exports for convenience
pub use convert::{Conversion, ConverterFn, ConverterRegistry};
pub use error::TypeError;
pub use hierarchy::{TypeHierarchy, TypeKey};
pub use named::{NamedType, NamedTypes};
pub use pattern::Pattern;
pub use system::TypeSystem;
pub use value::Value;
