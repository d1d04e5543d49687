//! Converted descriptors.
//!
//! A [`ConvertedDescriptor`] lets a descriptor registered for one
//! `(context, value)` pair answer a query for another. The contexts must be
//! related in the hierarchy; the values only need a converter between them.
//!
//! Converted descriptors live only as long as the resolution that produced
//! them and are never registered.
//!
//! # Rules
//!
//! - Reading checks the runtime context type against the source's context
//!   type and yields `None` on mismatch
//! - Changers need a reverse converter, except for modes that take no value
//! - Identifier patterns, time state, validation and the exclusion message are
//!   those of the source

use std::fmt;
use std::sync::Arc;

use event_types::convert::identity;
use event_types::{ConverterFn, TypeKey, TypeSystem, Value};

use crate::changer::{ChangeMode, Changer};
use crate::descriptor::Descriptor;

/// A view of a source descriptor under different context and value types.
pub struct ConvertedDescriptor {
    types: Arc<TypeSystem>,
    context_type: TypeKey,
    value_type: TypeKey,
    source: Descriptor,
    forward: ConverterFn,
    reverse: Option<ConverterFn>,
}

impl ConvertedDescriptor {
    /// Bridges `source` to `context_type -> value_type`.
    ///
    /// Returns the source itself when its context type is a supertype of
    /// `context_type` and its value type is a subtype of `value_type`.
    /// Returns `None` when no converter from the source's value type exists.
    #[must_use]
    pub fn new_instance(
        types: &Arc<TypeSystem>,
        context_type: TypeKey,
        value_type: TypeKey,
        source: Descriptor,
    ) -> Option<Descriptor> {
        let hierarchy = types.hierarchy();
        if hierarchy.is_assignable_from(source.context_type(), context_type)
            && hierarchy.is_assignable_from(value_type, source.value_type())
        {
            return Some(source);
        }
        let forward = converter_between(types, source.value_type(), value_type)?;
        let reverse = converter_between(types, value_type, source.value_type());
        Some(Descriptor::Converted(Arc::new(Self {
            types: Arc::clone(types),
            context_type,
            value_type,
            source,
            forward,
            reverse,
        })))
    }

    /// Creates a converted view with explicit converters. A missing reverse
    /// converter is looked up from the type system.
    #[must_use]
    pub fn new(
        types: Arc<TypeSystem>,
        context_type: TypeKey,
        value_type: TypeKey,
        source: Descriptor,
        forward: ConverterFn,
        reverse: Option<ConverterFn>,
    ) -> Self {
        let reverse = reverse.or_else(|| converter_between(&types, value_type, source.value_type()));
        Self {
            types,
            context_type,
            value_type,
            source,
            forward,
            reverse,
        }
    }

    /// Context type of this view.
    #[must_use]
    pub fn context_type(&self) -> TypeKey {
        self.context_type
    }

    /// Value type of this view.
    #[must_use]
    pub fn value_type(&self) -> TypeKey {
        self.value_type
    }

    /// The descriptor this view converts from.
    #[must_use]
    pub fn source(&self) -> &Descriptor {
        &self.source
    }

    /// Returns true if values can be converted back for changers.
    #[must_use]
    pub fn has_reverse(&self) -> bool {
        self.reverse.is_some()
    }

    fn fits_source(&self, context: &Value) -> bool {
        context.is_instance_of(self.types.hierarchy(), self.source.context_type())
    }

    /// Reads through the source and converts the result.
    #[must_use]
    pub fn get(&self, context: &Value) -> Option<Value> {
        if !self.fits_source(context) {
            return None;
        }
        let value = self.source.get(context)?;
        (self.forward)(&value)
    }

    /// The source's changer for `mode`, wrapped to check the runtime context
    /// type and convert values back to the source's value type.
    #[must_use]
    pub fn changer(&self, mode: ChangeMode) -> Option<Changer> {
        let inner = self.source.changer(mode)?;
        let types = Arc::clone(&self.types);
        let source_context = self.source.context_type();
        let fits = move |context: &Value| context.is_instance_of(types.hierarchy(), source_context);

        Some(match inner {
            Changer::NoValue(change) => Changer::no_value(move |context| {
                if fits(context) {
                    change(context);
                }
            }),
            Changer::WithValue(change) => {
                let reverse = self.reverse.clone();
                Changer::with_value(move |context, value| {
                    if !fits(context) {
                        return;
                    }
                    let Some(reverse) = &reverse else {
                        return;
                    };
                    if let Some(source_value) = reverse(value) {
                        change(context, &source_value);
                    }
                })
            }
        })
    }

    /// Source exclusions that are subtypes of this view's context type.
    #[must_use]
    pub fn excluded_contexts(&self) -> Vec<TypeKey> {
        let hierarchy = self.types.hierarchy();
        self.source
            .excluded_contexts()
            .iter()
            .copied()
            .filter(|&excluded| hierarchy.is_assignable_from(self.context_type, excluded))
            .collect()
    }
}

fn converter_between(types: &TypeSystem, from: TypeKey, to: TypeKey) -> Option<ConverterFn> {
    if types.hierarchy().is_assignable_from(to, from) {
        Some(identity())
    } else {
        types.converter(from, to)
    }
}

impl PartialEq for ConvertedDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.context_type == other.context_type
            && self.value_type == other.value_type
            && self.source == other.source
    }
}

impl fmt::Debug for ConvertedDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertedDescriptor")
            .field("context_type", &self.context_type)
            .field("value_type", &self.value_type)
            .field("source", &self.source)
            .field("has_reverse", &self.reverse.is_some())
            .finish_non_exhaustive()
    }
}
