//! Named types: the user-facing side of runtime types.
//!
//! A [`NamedType`] gives a runtime type a code name, English nouns for messages,
//! and the patterns users type to refer to it. Only some types are named; the
//! rest are reachable through their nearest named ancestor.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::english::to_plural;
use crate::error::{Result, TypeError};
use crate::hierarchy::{TypeHierarchy, TypeKey};
use crate::pattern::Pattern;

/// Nouns for a named type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nouns {
    /// Singular form, e.g. `"living entity"`.
    pub singular: String,
    /// Plural form, e.g. `"living entities"`.
    pub plural: String,
}

/// The user-facing identity of a runtime type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedType {
    code_name: String,
    nouns: Nouns,
    user_patterns: Vec<Pattern>,
}

impl NamedType {
    /// Creates a named type whose plural is derived from `singular` and whose
    /// user pattern accepts either noun form.
    #[must_use]
    pub fn new(code_name: &str, singular: &str) -> Self {
        let plural = to_plural(singular);
        let user_patterns = vec![Pattern::either(singular, &plural)];
        Self {
            code_name: code_name.to_string(),
            nouns: Nouns {
                singular: singular.to_string(),
                plural,
            },
            user_patterns,
        }
    }

    /// Overrides the plural noun. Default patterns follow the new plural.
    #[must_use]
    pub fn with_plural(mut self, plural: &str) -> Self {
        let was_default = self.user_patterns.len() == 1
            && self.user_patterns[0] == Pattern::either(&self.nouns.singular, &self.nouns.plural);
        self.nouns.plural = plural.to_string();
        if was_default {
            self.user_patterns = vec![Pattern::either(&self.nouns.singular, plural)];
        }
        self
    }

    /// Replaces the user input patterns.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::InvalidPattern`] for a pattern that does not
    /// compile.
    pub fn with_user_patterns<I, S>(mut self, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.user_patterns = patterns
            .into_iter()
            .map(|p| Pattern::new(p.as_ref()))
            .collect::<Result<_>>()?;
        Ok(self)
    }

    /// Identifier used in code, e.g. `"livingentity"`.
    #[must_use]
    pub fn code_name(&self) -> &str {
        &self.code_name
    }

    /// English nouns.
    #[must_use]
    pub fn nouns(&self) -> &Nouns {
        &self.nouns
    }

    /// Singular or plural noun.
    #[must_use]
    pub fn noun(&self, plural: bool) -> &str {
        if plural {
            &self.nouns.plural
        } else {
            &self.nouns.singular
        }
    }

    /// Patterns users type to refer to this type.
    #[must_use]
    pub fn user_patterns(&self) -> &[Pattern] {
        &self.user_patterns
    }
}


/// Registry of named types keyed by runtime type.
#[derive(Debug, Clone, Default)]
pub struct NamedTypes {
    by_type: HashMap<TypeKey, NamedType>,
}

impl NamedTypes {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Names `type_key`.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::DuplicateNamedType`] if the type is already named.
    pub fn register(&mut self, type_key: TypeKey, named: NamedType) -> Result<()> {
        if self.by_type.contains_key(&type_key) {
            return Err(TypeError::DuplicateNamedType(named.code_name));
        }
        self.by_type.insert(type_key, named);
        Ok(())
    }

    /// The named type registered for exactly `type_key`.
    #[must_use]
    pub fn exact(&self, type_key: TypeKey) -> Option<&NamedType> {
        self.by_type.get(&type_key)
    }

    /// The named type of `type_key` or of its closest named ancestor.
    #[must_use]
    pub fn nearest(&self, hierarchy: &TypeHierarchy, type_key: TypeKey) -> Option<&NamedType> {
        hierarchy.ancestors(type_key).find_map(|key| self.exact(key))
    }

    /// Human-readable name of a type.
    ///
    /// Array types use the plural noun of their component. Types without a
    /// named ancestor fall back to the lowercase hierarchy name.
    #[must_use]
    pub fn display_name(&self, hierarchy: &TypeHierarchy, type_key: TypeKey, plural: bool) -> String {
        if let Some(component) = hierarchy.component(type_key) {
            return self.display_name(hierarchy, component, true);
        }
        match self.nearest(hierarchy, type_key) {
            Some(named) => named.noun(plural).to_string(),
            None => {
                let name = hierarchy.name(type_key).to_lowercase();
                if plural {
                    to_plural(&name)
                } else {
                    name
                }
            }
        }
    }

    /// Number of named types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    /// Returns true if no types are named.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (TypeHierarchy, NamedTypes, TypeKey, TypeKey, TypeKey) {
        let mut hierarchy = TypeHierarchy::new();
        let entity = hierarchy.define("Entity", TypeHierarchy::OBJECT).unwrap();
        let living = hierarchy.define("LivingEntity", entity).unwrap();
        let zombie = hierarchy.define("Zombie", living).unwrap();

        let mut names = NamedTypes::new();
        names.register(entity, NamedType::new("entity", "entity")).unwrap();
        names
            .register(living, NamedType::new("livingentity", "living entity"))
            .unwrap();
        (hierarchy, names, entity, living, zombie)
    }

    #[test]
    fn default_nouns_and_patterns() {
        let named = NamedType::new("entity", "entity");
        assert_eq!(named.nouns().plural, "entities");
        assert!(named.user_patterns()[0].matches("entity"));
        assert!(named.user_patterns()[0].matches("entities"));
        assert!(!named.user_patterns()[0].matches("entitys"));
    }

    #[test]
    fn irregular_plural_updates_default_pattern() {
        let named = NamedType::new("sheep", "sheep").with_plural("sheep");
        assert_eq!(named.user_patterns(), &[Pattern::literal("sheep")]);

        let named = NamedType::new("person", "person").with_plural("people");
        assert!(named.user_patterns()[0].matches("people"));
        assert!(!named.user_patterns()[0].matches("persons"));
    }

    #[test]
    fn custom_patterns() {
        let named = NamedType::new("player", "player")
            .with_user_patterns(["players?", "humans?"])
            .unwrap();
        assert_eq!(named.user_patterns().len(), 2);
        assert!(named.user_patterns()[1].matches("humans"));

        let err = NamedType::new("player", "player").with_user_patterns(["(bad"]);
        assert!(err.is_err());
    }

    #[test]
    fn duplicate_registration_rejected() {
        let (_, mut names, entity, _, _) = setup();
        assert_eq!(
            names.register(entity, NamedType::new("thing", "thing")),
            Err(TypeError::DuplicateNamedType("thing".to_string()))
        );
    }

    #[test]
    fn exact_versus_nearest() {
        let (hierarchy, names, _, living, zombie) = setup();
        assert!(names.exact(zombie).is_none());
        assert_eq!(names.nearest(&hierarchy, zombie).map(NamedType::code_name), Some("livingentity"));
        assert_eq!(names.exact(living).map(NamedType::code_name), Some("livingentity"));
        assert!(names.nearest(&hierarchy, TypeHierarchy::OBJECT).is_none());
    }

    #[test]
    fn display_names() {
        let (mut hierarchy, names, _, _, zombie) = setup();
        assert_eq!(names.display_name(&hierarchy, zombie, false), "living entity");
        let zombies = hierarchy.array_of(zombie).unwrap();
        assert_eq!(names.display_name(&hierarchy, zombies, false), "living entities");

        let block = hierarchy.define("Block", TypeHierarchy::OBJECT).unwrap();
        assert_eq!(names.display_name(&hierarchy, block, false), "block");
        assert_eq!(names.display_name(&hierarchy, block, true), "blocks");
    }
}
