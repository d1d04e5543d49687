//! Value descriptors: the unit of registration.
//!
//! A [`ValueDescriptor`] states that occurrences of some context type carry a
//! value of some value type, how to read it, how to change it, which temporal
//! snapshot it describes, and which context subtypes must never use it.
//!
//! # Architecture
//!
//! Descriptors come in two kinds, unified by the [`Descriptor`] enum:
//!
//! - [`Descriptor::Plain`]: a registered [`ValueDescriptor`]
//! - [`Descriptor::Converted`]: a [`ConvertedDescriptor`] built during
//!   resolution that bridges a source descriptor to other context and value
//!   types
//!
//! Resolution results hold `Descriptor`s so callers never need to know which
//! kind they got.
//!
//! # Example
//!
//! ```
//! use event_types::{TypeHierarchy, TypeSystem, Value};
//! use event_values::{Time, ValueDescriptor};
//!
//! let mut types = TypeSystem::new();
//! let event = types.hierarchy_mut().define("Event", TypeHierarchy::OBJECT).unwrap();
//! let text = types.hierarchy_mut().define("Text", TypeHierarchy::OBJECT).unwrap();
//!
//! let descriptor = ValueDescriptor::builder(event, text)
//!     .identifier_patterns(["message"])
//!     .getter(move |_| Some(Value::new(text, String::from("hello"))))
//!     .time(Time::Now)
//!     .build(&types)
//!     .unwrap();
//!
//! assert!(descriptor.matches_input("message"));
//! assert!(!descriptor.matches_input("messages"));
//! ```

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use event_types::english::{split_plural, to_plural};
use event_types::{ConverterFn, Pattern, TypeHierarchy, TypeKey, TypeSystem, Value};

use crate::changer::{ChangeMode, Changer};
use crate::converted::ConvertedDescriptor;
use crate::error::DescriptorError;
use crate::time::Time;

/// Reads a value from a context. `None` means the context has no value.
pub type GetterFn = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

/// Extra check on identifier input, run after a pattern matched.
pub type InputValidatorFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Extra check on the requested context type, run after exclusions.
pub type ContextValidatorFn = Arc<dyn Fn(&TypeHierarchy, TypeKey) -> bool + Send + Sync>;

// =============================================================================
// Validation
// =============================================================================

/// Outcome of checking a descriptor against a requested context type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// The descriptor may be used.
    Valid,
    /// The requested context is a subtype of an excluded context.
    Excluded {
        /// The excluded context type that matched.
        excluded: TypeKey,
        /// User-facing explanation, if the descriptor supplies one.
        message: Option<String>,
    },
    /// The descriptor's context validator refused the context.
    Rejected,
}

impl Validation {
    /// Returns true for [`Validation::Valid`].
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }
}

// =============================================================================
// ValueDescriptor
// =============================================================================

/// An immutable, registered value provider.
///
/// Equality is structural over context type, value type, identifier patterns
/// and time state; callbacks are not compared.
pub struct ValueDescriptor {
    context_type: TypeKey,
    value_type: TypeKey,
    identifier_patterns: Vec<Pattern>,
    input_validator: Option<InputValidatorFn>,
    context_validator: Option<ContextValidatorFn>,
    getter: GetterFn,
    changers: BTreeMap<ChangeMode, Changer>,
    time: Time,
    excluded_contexts: Vec<TypeKey>,
    excluded_error_message: Option<String>,
}

impl ValueDescriptor {
    /// Starts building a descriptor for `context_type -> value_type`.
    #[must_use]
    pub fn builder(context_type: TypeKey, value_type: TypeKey) -> DescriptorBuilder {
        DescriptorBuilder::new(context_type, value_type)
    }

    /// The occurrence type this descriptor applies to.
    #[must_use]
    pub fn context_type(&self) -> TypeKey {
        self.context_type
    }

    /// The type of value produced.
    #[must_use]
    pub fn value_type(&self) -> TypeKey {
        self.value_type
    }

    /// Patterns matched against identifier queries.
    #[must_use]
    pub fn identifier_patterns(&self) -> &[Pattern] {
        &self.identifier_patterns
    }

    /// The temporal snapshot this descriptor answers for.
    #[must_use]
    pub fn time(&self) -> Time {
        self.time
    }

    /// Context subtypes this descriptor must never be used for.
    #[must_use]
    pub fn excluded_contexts(&self) -> &[TypeKey] {
        &self.excluded_contexts
    }

    /// Message reported when an exclusion fires.
    #[must_use]
    pub fn excluded_error_message(&self) -> Option<&str> {
        self.excluded_error_message.as_deref()
    }

    /// Checks whether this descriptor may serve a query for `context`.
    #[must_use]
    pub fn validate(&self, hierarchy: &TypeHierarchy, context: TypeKey) -> Validation {
        if let Some(&excluded) = self
            .excluded_contexts
            .iter()
            .find(|&&excluded| hierarchy.is_assignable_from(excluded, context))
        {
            return Validation::Excluded {
                excluded,
                message: self.excluded_error_message.clone(),
            };
        }
        match &self.context_validator {
            Some(validator) if !validator(hierarchy, context) => Validation::Rejected,
            _ => Validation::Valid,
        }
    }

    /// Returns true if `input` fully matches an identifier pattern and passes
    /// the input validator.
    #[must_use]
    pub fn matches_input(&self, input: &str) -> bool {
        self.identifier_patterns.iter().any(|p| p.matches(input))
            && self.input_validator.as_ref().map_or(true, |validator| validator(input))
    }

    /// Reads the value from `context`.
    #[must_use]
    pub fn get(&self, context: &Value) -> Option<Value> {
        (self.getter)(context)
    }

    /// The raw getter.
    #[must_use]
    pub fn getter(&self) -> &GetterFn {
        &self.getter
    }

    /// Returns true if a changer exists for `mode`.
    #[must_use]
    pub fn has_changer(&self, mode: ChangeMode) -> bool {
        self.changers.contains_key(&mode)
    }

    /// The changer for `mode`.
    #[must_use]
    pub fn changer(&self, mode: ChangeMode) -> Option<&Changer> {
        self.changers.get(&mode)
    }

    /// Returns true if `other` occupies the same registration slot: same
    /// context type, value type and identifier patterns.
    #[must_use]
    pub fn same_slot(&self, other: &ValueDescriptor) -> bool {
        self.context_type == other.context_type
            && self.value_type == other.value_type
            && self.identifier_patterns == other.identifier_patterns
    }
}

impl PartialEq for ValueDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.same_slot(other) && self.time == other.time
    }
}

impl Eq for ValueDescriptor {}

impl fmt::Debug for ValueDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueDescriptor")
            .field("context_type", &self.context_type)
            .field("value_type", &self.value_type)
            .field("identifier_patterns", &self.identifier_patterns)
            .field("time", &self.time)
            .field("changers", &self.changers.keys().collect::<Vec<_>>())
            .field("excluded_contexts", &self.excluded_contexts)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`ValueDescriptor`].
///
/// Only the getter is mandatory. Without explicit identifier patterns the
/// descriptor answers to the user patterns of its value type's named type, or
/// to the lowercase type name when the type is unnamed.
#[must_use]
pub struct DescriptorBuilder {
    context_type: TypeKey,
    value_type: TypeKey,
    identifier_patterns: Option<Vec<String>>,
    input_validator: Option<InputValidatorFn>,
    context_validator: Option<ContextValidatorFn>,
    getter: Option<GetterFn>,
    changers: BTreeMap<ChangeMode, Changer>,
    time: Time,
    excluded_contexts: Vec<TypeKey>,
    excluded_error_message: Option<String>,
}

impl DescriptorBuilder {
    fn new(context_type: TypeKey, value_type: TypeKey) -> Self {
        Self {
            context_type,
            value_type,
            identifier_patterns: None,
            input_validator: None,
            context_validator: None,
            getter: None,
            changers: BTreeMap::new(),
            time: Time::Now,
            excluded_contexts: Vec::new(),
            excluded_error_message: None,
        }
    }

    /// Regular expressions matched in full against identifier queries.
    pub fn identifier_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.identifier_patterns = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    /// Further restricts identifier input after a pattern matched.
    pub fn input_validator(mut self, validator: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.input_validator = Some(Arc::new(validator));
        self
    }

    /// Restricts the context types this descriptor serves. A refusal poisons
    /// the resolution like an exclusion does.
    pub fn context_validator(
        mut self,
        validator: impl Fn(&TypeHierarchy, TypeKey) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.context_validator = Some(Arc::new(validator));
        self
    }

    /// Reads the value from a context.
    pub fn getter(mut self, getter: impl Fn(&Value) -> Option<Value> + Send + Sync + 'static) -> Self {
        self.getter = Some(Arc::new(getter));
        self
    }

    /// Changer for [`ChangeMode::Set`].
    pub fn set_changer(self, changer: impl Fn(&Value, &Value) + Send + Sync + 'static) -> Self {
        self.with_changer(ChangeMode::Set, Changer::with_value(changer))
    }

    /// Changer for [`ChangeMode::Add`].
    pub fn add_changer(self, changer: impl Fn(&Value, &Value) + Send + Sync + 'static) -> Self {
        self.with_changer(ChangeMode::Add, Changer::with_value(changer))
    }

    /// Changer for [`ChangeMode::Remove`].
    pub fn remove_changer(self, changer: impl Fn(&Value, &Value) + Send + Sync + 'static) -> Self {
        self.with_changer(ChangeMode::Remove, Changer::with_value(changer))
    }

    /// Changer for [`ChangeMode::RemoveAll`].
    pub fn remove_all_changer(self, changer: impl Fn(&Value, &Value) + Send + Sync + 'static) -> Self {
        self.with_changer(ChangeMode::RemoveAll, Changer::with_value(changer))
    }

    /// Changer for [`ChangeMode::Delete`].
    pub fn delete_changer(self, changer: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.with_changer(ChangeMode::Delete, Changer::no_value(changer))
    }

    /// Changer for [`ChangeMode::Reset`].
    pub fn reset_changer(self, changer: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.with_changer(ChangeMode::Reset, Changer::no_value(changer))
    }

    fn with_changer(mut self, mode: ChangeMode, changer: Changer) -> Self {
        self.changers.insert(mode, changer);
        self
    }

    /// Temporal snapshot answered for. Defaults to [`Time::Now`].
    pub fn time(mut self, time: Time) -> Self {
        self.time = time;
        self
    }

    /// Context subtypes this descriptor must never serve.
    pub fn excludes(mut self, contexts: impl IntoIterator<Item = TypeKey>) -> Self {
        self.excluded_contexts.extend(contexts);
        self
    }

    /// Message reported when an exclusion fires.
    pub fn excluded_error_message(mut self, message: impl Into<String>) -> Self {
        self.excluded_error_message = Some(message.into());
        self
    }

    /// Finishes the descriptor.
    ///
    /// # Errors
    ///
    /// Fails if the getter is missing, a type is unknown to `types`, or an
    /// identifier pattern does not compile.
    pub fn build(self, types: &TypeSystem) -> Result<ValueDescriptor, DescriptorError> {
        let hierarchy = types.hierarchy();
        for key in [self.context_type, self.value_type]
            .into_iter()
            .chain(self.excluded_contexts.iter().copied())
        {
            if !hierarchy.contains(key) {
                return Err(DescriptorError::UnknownType(key));
            }
        }
        let getter = self.getter.ok_or_else(|| DescriptorError::MissingGetter {
            context: hierarchy.name(self.context_type).to_string(),
            value: hierarchy.name(self.value_type).to_string(),
        })?;

        let mut input_validator = self.input_validator;
        let identifier_patterns = match self.identifier_patterns {
            Some(sources) => sources
                .iter()
                .map(|source| Pattern::new(source))
                .collect::<Result<Vec<_>, _>>()?,
            None => {
                let (patterns, plurality) = default_patterns(types, self.value_type);
                if let Some(plurality) = plurality {
                    let combined: InputValidatorFn = match input_validator {
                        Some(user) => Arc::new(move |input: &str| plurality(input) && user(input)),
                        None => plurality,
                    };
                    input_validator = Some(combined);
                }
                patterns
            }
        };

        Ok(ValueDescriptor {
            context_type: self.context_type,
            value_type: self.value_type,
            identifier_patterns,
            input_validator,
            context_validator: self.context_validator,
            getter,
            changers: self.changers,
            time: self.time,
            excluded_contexts: self.excluded_contexts,
            excluded_error_message: self.excluded_error_message,
        })
    }
}

/// Patterns for a descriptor that supplied none, plus a validator requiring
/// the plurality of the input to match the array-ness of `value_type`.
fn default_patterns(types: &TypeSystem, value_type: TypeKey) -> (Vec<Pattern>, Option<InputValidatorFn>) {
    let hierarchy = types.hierarchy();
    let plural = hierarchy.is_array(value_type);
    let element = hierarchy.component(value_type).unwrap_or(value_type);

    if let Some(named) = types.names().exact(element) {
        let singular = named.nouns().singular.clone();
        let plural_noun = named.nouns().plural.clone();
        let plurality: InputValidatorFn = Arc::new(move |input: &str| {
            let input_is_plural = if input == singular {
                false
            } else if input == plural_noun {
                true
            } else {
                split_plural(input).1
            };
            input_is_plural == plural
        });
        return (named.user_patterns().to_vec(), Some(plurality));
    }

    let name = hierarchy.name(element).to_lowercase();
    let name = if plural { to_plural(&name) } else { name };
    (vec![Pattern::literal(&name)], None)
}

// =============================================================================
// Descriptor
// =============================================================================

/// A descriptor as returned by resolution: registered or converted.
#[derive(Clone, PartialEq)]
pub enum Descriptor {
    /// A registered descriptor, used as is.
    Plain(Arc<ValueDescriptor>),
    /// A view bridging a source descriptor to other types.
    Converted(Arc<ConvertedDescriptor>),
}

impl Descriptor {
    /// Context type this descriptor answers for.
    #[must_use]
    pub fn context_type(&self) -> TypeKey {
        match self {
            Descriptor::Plain(d) => d.context_type(),
            Descriptor::Converted(d) => d.context_type(),
        }
    }

    /// Value type this descriptor produces.
    #[must_use]
    pub fn value_type(&self) -> TypeKey {
        match self {
            Descriptor::Plain(d) => d.value_type(),
            Descriptor::Converted(d) => d.value_type(),
        }
    }

    /// Identifier patterns, always those of the registered descriptor.
    #[must_use]
    pub fn identifier_patterns(&self) -> &[Pattern] {
        self.registered().identifier_patterns()
    }

    /// Temporal state, always that of the registered descriptor.
    #[must_use]
    pub fn time(&self) -> Time {
        self.registered().time()
    }

    /// See [`ValueDescriptor::validate`].
    #[must_use]
    pub fn validate(&self, hierarchy: &TypeHierarchy, context: TypeKey) -> Validation {
        self.registered().validate(hierarchy, context)
    }

    /// See [`ValueDescriptor::matches_input`].
    #[must_use]
    pub fn matches_input(&self, input: &str) -> bool {
        self.registered().matches_input(input)
    }

    /// Reads the value from `context`.
    ///
    /// Converted descriptors return `None` when the runtime type of `context`
    /// does not fit the source, or when conversion fails.
    #[must_use]
    pub fn get(&self, context: &Value) -> Option<Value> {
        match self {
            Descriptor::Plain(d) => d.get(context),
            Descriptor::Converted(d) => d.get(context),
        }
    }

    /// Returns true if a changer exists for `mode`.
    #[must_use]
    pub fn has_changer(&self, mode: ChangeMode) -> bool {
        self.registered().has_changer(mode)
    }

    /// The changer for `mode`, converting values back for converted
    /// descriptors.
    #[must_use]
    pub fn changer(&self, mode: ChangeMode) -> Option<Changer> {
        match self {
            Descriptor::Plain(d) => d.changer(mode).cloned(),
            Descriptor::Converted(d) => d.changer(mode),
        }
    }

    /// Excluded context types. Converted descriptors only report exclusions
    /// that are subtypes of their own context type.
    #[must_use]
    pub fn excluded_contexts(&self) -> Cow<'_, [TypeKey]> {
        match self {
            Descriptor::Plain(d) => Cow::Borrowed(d.excluded_contexts()),
            Descriptor::Converted(d) => Cow::Owned(d.excluded_contexts()),
        }
    }

    /// Message reported when an exclusion fires.
    #[must_use]
    pub fn excluded_error_message(&self) -> Option<&str> {
        self.registered().excluded_error_message()
    }

    /// Returns true for [`Descriptor::Converted`].
    #[must_use]
    pub fn is_converted(&self) -> bool {
        matches!(self, Descriptor::Converted(_))
    }

    /// The registered descriptor at the root of any conversion chain.
    #[must_use]
    pub fn registered(&self) -> &Arc<ValueDescriptor> {
        match self {
            Descriptor::Plain(d) => d,
            Descriptor::Converted(d) => d.source().registered(),
        }
    }

    /// A view of this descriptor for `context_type -> value_type`.
    ///
    /// Returns `self` when it already fits, a converted view when a converter
    /// exists, and `None` otherwise. Converted descriptors re-bridge from
    /// their own source.
    #[must_use]
    pub fn converted(&self, types: &Arc<TypeSystem>, context_type: TypeKey, value_type: TypeKey) -> Option<Descriptor> {
        let source = match self {
            Descriptor::Plain(_) => self.clone(),
            Descriptor::Converted(d) => d.source().clone(),
        };
        ConvertedDescriptor::new_instance(types, context_type, value_type, source)
    }

    /// A converted view of this descriptor using explicit converters. Without
    /// a reverse converter one is looked up for changers.
    #[must_use]
    pub fn converted_with(
        &self,
        types: &Arc<TypeSystem>,
        context_type: TypeKey,
        value_type: TypeKey,
        forward: ConverterFn,
        reverse: Option<ConverterFn>,
    ) -> Descriptor {
        Descriptor::Converted(Arc::new(ConvertedDescriptor::new(
            Arc::clone(types),
            context_type,
            value_type,
            self.clone(),
            forward,
            reverse,
        )))
    }
}

impl From<Arc<ValueDescriptor>> for Descriptor {
    fn from(descriptor: Arc<ValueDescriptor>) -> Self {
        Descriptor::Plain(descriptor)
    }
}

impl From<ValueDescriptor> for Descriptor {
    fn from(descriptor: ValueDescriptor) -> Self {
        Descriptor::Plain(Arc::new(descriptor))
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Plain(d) => fmt::Debug::fmt(d, f),
            Descriptor::Converted(d) => fmt::Debug::fmt(d, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_types::NamedType;

    struct Fixture {
        types: TypeSystem,
        event: TypeKey,
        join: TypeKey,
        player: TypeKey,
        players: TypeKey,
        location: TypeKey,
    }

    fn fixture() -> Fixture {
        let mut types = TypeSystem::new();
        let h = types.hierarchy_mut();
        let event = h.define("Event", TypeHierarchy::OBJECT).unwrap();
        let join = h.define("JoinEvent", event).unwrap();
        let player = h.define("Player", TypeHierarchy::OBJECT).unwrap();
        let players = h.array_of(player).unwrap();
        let location = h.define("Location", TypeHierarchy::OBJECT).unwrap();
        types.names_mut().register(player, NamedType::new("player", "player")).unwrap();
        Fixture {
            types,
            event,
            join,
            player,
            players,
            location,
        }
    }

    fn null_getter(_: &Value) -> Option<Value> {
        None
    }

    mod builder_tests {
        use super::*;

        #[test]
        fn getter_is_required() {
            let fx = fixture();
            let err = ValueDescriptor::builder(fx.event, fx.player).build(&fx.types).unwrap_err();
            assert_eq!(
                err,
                DescriptorError::MissingGetter {
                    context: "Event".to_string(),
                    value: "Player".to_string(),
                }
            );
        }

        #[test]
        fn unknown_types_rejected() {
            let fx = fixture();
            let mut other = TypeSystem::new();
            let foreign = (0..20)
                .map(|i| other.hierarchy_mut().define(&format!("T{i}"), TypeHierarchy::OBJECT).unwrap())
                .last()
                .unwrap();
            let err = ValueDescriptor::builder(fx.event, foreign)
                .getter(null_getter)
                .build(&fx.types)
                .unwrap_err();
            assert_eq!(err, DescriptorError::UnknownType(foreign));
        }

        #[test]
        fn invalid_pattern_rejected() {
            let fx = fixture();
            let err = ValueDescriptor::builder(fx.event, fx.player)
                .identifier_patterns(["(oops"])
                .getter(null_getter)
                .build(&fx.types);
            assert!(matches!(err, Err(DescriptorError::Pattern(_))));
        }

        #[test]
        fn defaults() {
            let fx = fixture();
            let d = ValueDescriptor::builder(fx.event, fx.location)
                .getter(null_getter)
                .build(&fx.types)
                .unwrap();
            assert_eq!(d.time(), Time::Now);
            assert!(d.excluded_contexts().is_empty());
            assert!(d.excluded_error_message().is_none());
            assert!(!d.has_changer(ChangeMode::Set));
        }

        #[test]
        fn changers_by_mode() {
            let fx = fixture();
            let d = ValueDescriptor::builder(fx.event, fx.location)
                .getter(null_getter)
                .set_changer(|_, _| {})
                .delete_changer(|_| {})
                .build(&fx.types)
                .unwrap();
            assert!(d.has_changer(ChangeMode::Set));
            assert!(d.has_changer(ChangeMode::Delete));
            assert!(!d.has_changer(ChangeMode::Add));
            assert!(d.changer(ChangeMode::Delete).unwrap().is_no_value());
            assert!(!d.changer(ChangeMode::Set).unwrap().is_no_value());
        }
    }

    mod pattern_tests {
        use super::*;

        #[test]
        fn named_type_patterns_with_plurality() {
            let fx = fixture();
            let single = ValueDescriptor::builder(fx.event, fx.player)
                .getter(null_getter)
                .build(&fx.types)
                .unwrap();
            assert!(single.matches_input("player"));
            assert!(!single.matches_input("players"));

            let plural = ValueDescriptor::builder(fx.event, fx.players)
                .getter(null_getter)
                .build(&fx.types)
                .unwrap();
            assert!(plural.matches_input("players"));
            assert!(!plural.matches_input("player"));
        }

        #[test]
        fn unnamed_type_uses_lowercase_name() {
            let mut fx = fixture();
            let locations = fx.types.hierarchy_mut().array_of(fx.location).unwrap();
            let single = ValueDescriptor::builder(fx.event, fx.location)
                .getter(null_getter)
                .build(&fx.types)
                .unwrap();
            let plural = ValueDescriptor::builder(fx.event, locations)
                .getter(null_getter)
                .build(&fx.types)
                .unwrap();
            assert_eq!(single.identifier_patterns(), &[Pattern::literal("location")]);
            assert_eq!(plural.identifier_patterns(), &[Pattern::literal("locations")]);
        }

        #[test]
        fn user_validator_combined_with_plurality() {
            let fx = fixture();
            let d = ValueDescriptor::builder(fx.event, fx.player)
                .input_validator(|_| false)
                .getter(null_getter)
                .build(&fx.types)
                .unwrap();
            assert!(!d.matches_input("player"));
        }

        #[test]
        fn explicit_patterns_are_full_match() {
            let fx = fixture();
            let d = ValueDescriptor::builder(fx.event, fx.player)
                .identifier_patterns(["joiner|newcomer"])
                .getter(null_getter)
                .build(&fx.types)
                .unwrap();
            assert!(d.matches_input("joiner"));
            assert!(d.matches_input("newcomer"));
            assert!(!d.matches_input("player"));
            assert!(!d.matches_input("joiners"));
        }
    }

    mod validation_tests {
        use super::*;

        #[test]
        fn exclusion_matches_subtypes() {
            let fx = fixture();
            let d = ValueDescriptor::builder(fx.event, fx.player)
                .getter(null_getter)
                .excludes([fx.join])
                .excluded_error_message("no player here")
                .build(&fx.types)
                .unwrap();
            let h = fx.types.hierarchy();
            assert_eq!(d.validate(h, fx.event), Validation::Valid);
            assert_eq!(
                d.validate(h, fx.join),
                Validation::Excluded {
                    excluded: fx.join,
                    message: Some("no player here".to_string()),
                }
            );
        }

        #[test]
        fn context_validator_rejects() {
            let fx = fixture();
            let join = fx.join;
            let d = ValueDescriptor::builder(fx.event, fx.player)
                .getter(null_getter)
                .context_validator(move |_, context| context != join)
                .build(&fx.types)
                .unwrap();
            let h = fx.types.hierarchy();
            assert!(d.validate(h, fx.event).is_valid());
            assert_eq!(d.validate(h, fx.join), Validation::Rejected);
        }
    }

    #[test]
    fn structural_equality_ignores_callbacks() {
        let fx = fixture();
        let a = ValueDescriptor::builder(fx.event, fx.player)
            .getter(null_getter)
            .build(&fx.types)
            .unwrap();
        let b = ValueDescriptor::builder(fx.event, fx.player)
            .getter(|ctx| Some(ctx.clone()))
            .set_changer(|_, _| {})
            .build(&fx.types)
            .unwrap();
        let c = ValueDescriptor::builder(fx.event, fx.player)
            .getter(null_getter)
            .time(Time::Past)
            .build(&fx.types)
            .unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.same_slot(&c));
    }
}
