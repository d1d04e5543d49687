//! # Event Values
//!
//! Registry and resolver for typed event value providers.
//!
//! A script running inside an event handler asks for "the player" or "the
//! damage". Providers for such values are registered as [`ValueDescriptor`]s
//! against an occurrence (context) type, a value type and a [`Time`] state.
//! [`EventValueRegistry`] answers queries by value type or by free-text
//! identifier, picking the most specific provider and bridging types through
//! conversion when nothing fits directly.
//!
//! ## Architecture
//!
//! - **Descriptors**: [`ValueDescriptor`] built with [`DescriptorBuilder`];
//!   [`Descriptor`] is either a registered descriptor or a
//!   [`ConvertedDescriptor`] view of one
//! - **Resolver**: the filter, rank, map and disambiguate pipeline in
//!   [`resolver`], shared by every resolution phase
//! - **Registry**: per-time buckets, the phase sequence, temporal fallback and
//!   the resolution cache
//! - **Diagnostics**: [`ResolveError`] messages for missing, ambiguous and
//!   excluded values
//!
//! The type substrate lives in [`event_types`], re-exported here.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use event_types::{TypeHierarchy, TypeSystem, Value};
//! use event_values::{EventValueRegistry, Time, ValueDescriptor};
//!
//! let mut types = TypeSystem::new();
//! let event = types.hierarchy_mut().define("Event", TypeHierarchy::OBJECT).unwrap();
//! let damage = types.hierarchy_mut().define("DamageEvent", event).unwrap();
//! let number = types.hierarchy_mut().define("Number", TypeHierarchy::OBJECT).unwrap();
//! let types = Arc::new(types);
//!
//! let mut registry = EventValueRegistry::new(Arc::clone(&types));
//! registry
//!     .register(
//!         ValueDescriptor::builder(damage, number)
//!             .getter(move |_| Some(Value::new(number, 4.5_f64)))
//!             .build(&types)
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//! let provider = registry.require(damage, number, Time::Now).unwrap();
//! let amount = provider.get(&Value::new(damage, ())).unwrap();
//! assert_eq!(amount.downcast_ref::<f64>(), Some(&4.5));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export the type substrate
pub use event_types;

pub mod changer;
pub mod config;
pub mod converted;
pub mod descriptor;
pub mod diagnostics;
pub mod error;
pub mod flags;
pub mod registry;
pub mod resolution;
pub mod resolver;
pub mod time;

#[cfg(test)]
mod tests;

pub use changer::{ChangeMode, Changer};
pub use config::RegistryConfig;
pub use converted::ConvertedDescriptor;
pub use descriptor::{Descriptor, DescriptorBuilder, Validation, ValueDescriptor};
pub use diagnostics::ResolveError;
pub use error::{DescriptorError, InvalidTime, RegistryError};
pub use flags::ResolveFlags;
pub use registry::{EventValueRegistry, Query};
pub use resolution::{NotUnique, Resolution};
pub use time::Time;
