//! Value conversion between runtime types.
//!
//! The resolution engine treats conversion as a black box behind the
//! [`Conversion`] trait: given a source and target type it asks for a
//! [`ConverterFn`], and a converter returning `None` means "does not apply".
//!
//! # Lookup Rules
//!
//! [`ConverterRegistry`] resolves `from -> to` as follows:
//! 1. If `to` is assignable from `from`, the identity converter is used
//! 2. Otherwise the ancestors of `from` are searched closest-first for a
//!    registered converter whose target is `to` or a subtype of it
//! 3. Among the targets of the closest source, the one nearest to `to` wins
//!
//! Converters are stored in a `BTreeMap` so lookup is deterministic.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::hierarchy::{TypeHierarchy, TypeKey};
use crate::value::Value;

/// A conversion function. `None` means the value could not be converted.
pub type ConverterFn = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

/// The identity converter.
#[must_use]
pub fn identity() -> ConverterFn {
    Arc::new(|value: &Value| Some(value.clone()))
}

/// Source of converters between runtime types.
///
/// Implementations must be deterministic: the same `(from, to)` pair must
/// always yield an equivalent converter.
pub trait Conversion: Send + Sync {
    /// Finds a converter from values of type `from` to values of type `to`.
    fn converter(&self, hierarchy: &TypeHierarchy, from: TypeKey, to: TypeKey) -> Option<ConverterFn>;

    /// Returns true if a converter from `from` to `to` exists.
    fn converter_exists(&self, hierarchy: &TypeHierarchy, from: TypeKey, to: TypeKey) -> bool {
        self.converter(hierarchy, from, to).is_some()
    }

    /// Converts `value` to type `to` using its runtime type as the source.
    fn convert(&self, hierarchy: &TypeHierarchy, value: &Value, to: TypeKey) -> Option<Value> {
        let converter = self.converter(hierarchy, value.type_key(), to)?;
        converter(value)
    }
}

/// Default [`Conversion`] backed by explicitly registered converters.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use event_types::{Conversion, ConverterRegistry, TypeHierarchy, Value};
///
/// let mut hierarchy = TypeHierarchy::new();
/// let text = hierarchy.define("Text", TypeHierarchy::OBJECT).unwrap();
/// let number = hierarchy.define("Number", TypeHierarchy::OBJECT).unwrap();
///
/// let mut converters = ConverterRegistry::new();
/// converters.register(text, number, Arc::new(move |v: &Value| -> Option<Value> {
///     let parsed = v.downcast_ref::<String>()?.parse::<i64>().ok()?;
///     Some(Value::new(number, parsed))
/// }));
///
/// let out = converters.convert(&hierarchy, &Value::new(text, "42".to_string()), number).unwrap();
/// assert_eq!(out.downcast_ref::<i64>(), Some(&42));
/// assert!(converters.convert(&hierarchy, &Value::new(text, "x".to_string()), number).is_none());
/// ```
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: BTreeMap<(TypeKey, TypeKey), ConverterFn>,
}

impl ConverterRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a converter, replacing any previous one for the same pair.
    pub fn register(&mut self, from: TypeKey, to: TypeKey, converter: ConverterFn) {
        tracing::trace!(?from, ?to, "converter registered");
        self.converters.insert((from, to), converter);
    }

    /// Number of registered converters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    /// Returns true if no converters are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    fn closest_target(&self, hierarchy: &TypeHierarchy, source: TypeKey, to: TypeKey) -> Option<&ConverterFn> {
        self.converters
            .range((source, TypeHierarchy::OBJECT)..)
            .take_while(|((from, _), _)| *from == source)
            .filter_map(|((_, target), converter)| {
                hierarchy
                    .hierarchy_distance(to, *target)
                    .map(|distance| (distance, converter))
            })
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, converter)| converter)
    }
}

impl Conversion for ConverterRegistry {
    fn converter(&self, hierarchy: &TypeHierarchy, from: TypeKey, to: TypeKey) -> Option<ConverterFn> {
        if hierarchy.is_assignable_from(to, from) {
            return Some(identity());
        }
        hierarchy
            .ancestors(from)
            .find_map(|source| self.closest_target(hierarchy, source, to))
            .cloned()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("converter_count", &self.converters.len())
            .finish()
    }
}
