//! Runtime type hierarchy.
//!
//! Types form a tree rooted at [`TypeHierarchy::OBJECT`]. Every type has at most
//! one parent, and every type except the root has exactly one.
//!
//! # Array Types
//!
//! Array ("plural") types are created with [`TypeHierarchy::array_of`] and are
//! covariant: the parent of `Player[]` is `Entity[]` when `Player` extends
//! `Entity`, and the parent of `Object[]` is `Object`. Because array types sit in
//! the same parent chain as everything else, distance computations need no
//! special casing.
//!
//! # Distances
//!
//! [`TypeHierarchy::hierarchy_distance`] counts parent steps from a subtype up to
//! a supertype. Every ranking decision made during resolution reduces to this
//! number, so it is exact: for `A ⊇ B ⊇ C`,
//! `d(A, C) == d(A, B) + d(B, C)`.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TypeError};

/// Handle for a type defined in a [`TypeHierarchy`].
///
/// Keys are only meaningful for the hierarchy that issued them.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeKey(u32);

impl TypeKey {
    /// Returns the raw index of this key.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.0)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct TypeNode {
    name: String,
    parent: Option<TypeKey>,
    component: Option<TypeKey>,
}

/// A single-inheritance type tree with covariant array types.
///
/// # Example
///
/// ```
/// use event_types::TypeHierarchy;
///
/// let mut hierarchy = TypeHierarchy::new();
/// let entity = hierarchy.define("Entity", TypeHierarchy::OBJECT).unwrap();
/// let player = hierarchy.define("Player", entity).unwrap();
/// let players = hierarchy.array_of(player).unwrap();
/// let entities = hierarchy.array_of(entity).unwrap();
///
/// assert!(hierarchy.is_assignable_from(entity, player));
/// assert!(hierarchy.is_assignable_from(entities, players));
/// assert_eq!(hierarchy.hierarchy_distance(TypeHierarchy::OBJECT, player), Some(2));
/// assert_eq!(hierarchy.hierarchy_distance(player, entity), None);
/// ```
#[derive(Debug, Clone)]
pub struct TypeHierarchy {
    nodes: Vec<TypeNode>,
    by_name: HashMap<String, TypeKey>,
    arrays: HashMap<TypeKey, TypeKey>,
}

impl TypeHierarchy {
    /// The root type every other type extends.
    pub const OBJECT: TypeKey = TypeKey(0);

    /// Name of the root type.
    pub const OBJECT_NAME: &'static str = "Object";

    /// Creates a hierarchy containing only the root type.
    #[must_use]
    pub fn new() -> Self {
        let mut by_name = HashMap::new();
        by_name.insert(Self::OBJECT_NAME.to_string(), Self::OBJECT);
        Self {
            nodes: vec![TypeNode {
                name: Self::OBJECT_NAME.to_string(),
                parent: None,
                component: None,
            }],
            by_name,
            arrays: HashMap::new(),
        }
    }

    /// Defines a new type extending `parent`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken, the parent is unknown, or the
    /// parent is an array type.
    pub fn define(&mut self, name: &str, parent: TypeKey) -> Result<TypeKey> {
        if self.by_name.contains_key(name) {
            return Err(TypeError::DuplicateName(name.to_string()));
        }
        if !self.contains(parent) {
            return Err(TypeError::UnknownType(parent));
        }
        if self.is_array(parent) {
            return Err(TypeError::ArrayParent {
                name: name.to_string(),
                parent: self.name(parent).to_string(),
            });
        }
        Ok(self.push(name.to_string(), Some(parent), None))
    }

    /// Returns the array type whose elements are `component`, creating it (and
    /// the arrays of all of `component`'s ancestors) on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if `component` is unknown or its array name collides
    /// with an explicitly defined type.
    pub fn array_of(&mut self, component: TypeKey) -> Result<TypeKey> {
        if !self.contains(component) {
            return Err(TypeError::UnknownType(component));
        }
        if let Some(&key) = self.arrays.get(&component) {
            return Ok(key);
        }

        let parent = match self.nodes[component.index()].parent {
            Some(parent) => self.array_of(parent)?,
            None => Self::OBJECT,
        };

        let name = format!("{}[]", self.name(component));
        if self.by_name.contains_key(&name) {
            return Err(TypeError::DuplicateName(name));
        }
        let key = self.push(name, Some(parent), Some(component));
        self.arrays.insert(component, key);
        Ok(key)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn push(&mut self, name: String, parent: Option<TypeKey>, component: Option<TypeKey>) -> TypeKey {
        let key = TypeKey(self.nodes.len() as u32);
        self.by_name.insert(name.clone(), key);
        self.nodes.push(TypeNode {
            name,
            parent,
            component,
        });
        key
    }

    /// Returns true if `key` was issued by this hierarchy.
    #[must_use]
    pub fn contains(&self, key: TypeKey) -> bool {
        key.index() < self.nodes.len()
    }

    /// Looks up a type by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<TypeKey> {
        self.by_name.get(name).copied()
    }

    /// Returns the name of a type, or `"<unknown>"` for a foreign key.
    #[must_use]
    pub fn name(&self, key: TypeKey) -> &str {
        self.nodes
            .get(key.index())
            .map_or("<unknown>", |node| node.name.as_str())
    }

    /// Returns the parent of a type (`None` for the root and foreign keys).
    #[must_use]
    pub fn parent(&self, key: TypeKey) -> Option<TypeKey> {
        self.nodes.get(key.index()).and_then(|node| node.parent)
    }

    /// Returns the element type of an array type.
    #[must_use]
    pub fn component(&self, key: TypeKey) -> Option<TypeKey> {
        self.nodes.get(key.index()).and_then(|node| node.component)
    }

    /// Returns true if `key` is an array type.
    #[must_use]
    pub fn is_array(&self, key: TypeKey) -> bool {
        self.component(key).is_some()
    }

    /// Iterates over `key` and then each of its ancestors up to the root.
    #[must_use]
    pub fn ancestors(&self, key: TypeKey) -> Ancestors<'_> {
        Ancestors {
            hierarchy: self,
            next: self.contains(key).then_some(key),
        }
    }

    /// Returns true if a value of type `sub` is also a value of type `sup`.
    #[must_use]
    pub fn is_assignable_from(&self, sup: TypeKey, sub: TypeKey) -> bool {
        self.hierarchy_distance(sup, sub).is_some()
    }

    /// Number of parent steps from `sub` up to `sup`.
    ///
    /// Returns `Some(0)` when the types are equal and `None` when `sup` is not
    /// a supertype of `sub`.
    #[must_use]
    pub fn hierarchy_distance(&self, sup: TypeKey, sub: TypeKey) -> Option<u32> {
        let mut distance = 0;
        for ancestor in self.ancestors(sub) {
            if ancestor == sup {
                return Some(distance);
            }
            distance += 1;
        }
        None
    }

    /// Distance between two types in whichever direction they are related.
    #[must_use]
    pub fn distance_between(&self, a: TypeKey, b: TypeKey) -> Option<u32> {
        self.hierarchy_distance(a, b)
            .or_else(|| self.hierarchy_distance(b, a))
    }

    /// Returns true if either type is a supertype of the other.
    #[must_use]
    pub fn is_related_to(&self, a: TypeKey, b: TypeKey) -> bool {
        self.distance_between(a, b).is_some()
    }

    /// Number of types defined, including the root and array types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root type is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over all `(key, name)` pairs in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeKey, &str)> {
        self.nodes.iter().enumerate().map(|(i, node)| {
            #[allow(clippy::cast_possible_truncation)]
            let key = TypeKey(i as u32);
            (key, node.name.as_str())
        })
    }
}

impl Default for TypeHierarchy {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a type and its ancestors. See [`TypeHierarchy::ancestors`].
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    hierarchy: &'a TypeHierarchy,
    next: Option<TypeKey>,
}

impl Iterator for Ancestors<'_> {
    type Item = TypeKey;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.hierarchy.parent(current);
        Some(current)
    }
}
