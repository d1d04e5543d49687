//! The bundled type system shared by the resolution engine.

use std::fmt;

use crate::convert::{Conversion, ConverterFn, ConverterRegistry};
use crate::hierarchy::{TypeHierarchy, TypeKey};
use crate::named::NamedTypes;

/// Hierarchy, named types and conversion in one place.
///
/// Built once at startup and then shared behind an `Arc`. Construction uses
/// the `_mut` accessors; everything the engine needs at query time takes
/// `&self`.
pub struct TypeSystem {
    hierarchy: TypeHierarchy,
    names: NamedTypes,
    conversion: Box<dyn Conversion>,
}

impl TypeSystem {
    /// Creates a type system with only the root type and an empty
    /// [`ConverterRegistry`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_conversion(ConverterRegistry::new())
    }

    /// Creates a type system using a custom conversion subsystem.
    #[must_use]
    pub fn with_conversion(conversion: impl Conversion + 'static) -> Self {
        Self {
            hierarchy: TypeHierarchy::new(),
            names: NamedTypes::new(),
            conversion: Box::new(conversion),
        }
    }

    /// The type hierarchy.
    #[must_use]
    pub fn hierarchy(&self) -> &TypeHierarchy {
        &self.hierarchy
    }

    /// Mutable access to the type hierarchy.
    pub fn hierarchy_mut(&mut self) -> &mut TypeHierarchy {
        &mut self.hierarchy
    }

    /// The named type registry.
    #[must_use]
    pub fn names(&self) -> &NamedTypes {
        &self.names
    }

    /// Mutable access to the named type registry.
    pub fn names_mut(&mut self) -> &mut NamedTypes {
        &mut self.names
    }

    /// The conversion subsystem.
    #[must_use]
    pub fn conversion(&self) -> &dyn Conversion {
        self.conversion.as_ref()
    }

    /// Replaces the conversion subsystem.
    pub fn set_conversion(&mut self, conversion: impl Conversion + 'static) {
        self.conversion = Box::new(conversion);
    }

    /// Finds a converter between two types.
    #[must_use]
    pub fn converter(&self, from: TypeKey, to: TypeKey) -> Option<ConverterFn> {
        self.conversion.converter(&self.hierarchy, from, to)
    }

    /// Human-readable name of a type. See [`NamedTypes::display_name`].
    #[must_use]
    pub fn display_name(&self, type_key: TypeKey, plural: bool) -> String {
        self.names.display_name(&self.hierarchy, type_key, plural)
    }
}

impl Default for TypeSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeSystem")
            .field("type_count", &self.hierarchy.len())
            .field("named_count", &self.names.len())
            .finish_non_exhaustive()
    }
}
