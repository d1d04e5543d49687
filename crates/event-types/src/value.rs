//! Dynamically typed values.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::hierarchy::{TypeHierarchy, TypeKey};

/// A runtime value tagged with its declared type.
///
/// Cloning is cheap: the payload is shared. The tag is the value's *runtime*
/// type, which may be narrower than the type a provider declares it returns.
#[derive(Clone)]
pub struct Value {
    type_key: TypeKey,
    data: Arc<dyn Any + Send + Sync>,
}

impl Value {
    /// Wraps `data` as a value of type `type_key`.
    pub fn new<T: Any + Send + Sync>(type_key: TypeKey, data: T) -> Self {
        Self {
            type_key,
            data: Arc::new(data),
        }
    }

    /// Wraps a list of elements as a value of the array type `type_key`.
    #[must_use]
    pub fn array(type_key: TypeKey, elements: Vec<Value>) -> Self {
        Self::new(type_key, elements)
    }

    /// Runtime type of this value.
    #[must_use]
    pub fn type_key(&self) -> TypeKey {
        self.type_key
    }

    /// Borrows the payload as `T`, if that is what it holds.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.data).downcast_ref::<T>()
    }

    /// Elements of an array value.
    #[must_use]
    pub fn elements(&self) -> Option<&[Value]> {
        self.downcast_ref::<Vec<Value>>().map(Vec::as_slice)
    }

    /// Returns true if this value's runtime type is `ty` or a subtype of it.
    #[must_use]
    pub fn is_instance_of(&self, hierarchy: &TypeHierarchy, ty: TypeKey) -> bool {
        hierarchy.is_assignable_from(ty, self.type_key)
    }

    /// Returns true if both values share the same payload allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("type_key", &self.type_key)
            .finish_non_exhaustive()
    }
}
