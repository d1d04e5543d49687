//! Generic resolver pipeline.
//!
//! Every resolution phase is a reduction over the descriptors of one time
//! bucket, configured with four pieces:
//!
//! 1. **filter**: which descriptors apply at all
//! 2. **rank**: how well an applicable descriptor fits (lower is better)
//! 3. **mapper**: the view returned to the caller; `None` rejects the
//!    descriptor even though it passed the filter
//! 4. **disambiguation**: optional stripping of tied candidates that answer to
//!    a different named type than the one requested
//!
//! # Invariants
//!
//! - Every descriptor passing the filter is validated before it is ranked. A
//!   failed validation aborts the whole reduction with an errored
//!   [`Resolution`], whether or not that descriptor would have won.
//! - All descriptors tied at the best rank are kept, in bucket order.
//! - Disambiguation never turns a non-empty candidate list into an empty one.

use std::cmp::Ordering;
use std::sync::Arc;

use event_types::{TypeHierarchy, TypeKey, TypeSystem};

use crate::descriptor::{Descriptor, Validation, ValueDescriptor};
use crate::resolution::Resolution;

// =============================================================================
// Rank
// =============================================================================

/// How a candidate's context type relates to the requested context type.
///
/// Supertype contexts always rank before subtype contexts: a subtype context
/// only applies when the runtime occurrence happens to be of that subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContextDistance {
    /// The candidate's context is the requested one or a supertype of it.
    Super(u32),
    /// The candidate's context is a subtype of the requested one.
    Sub(u32),
    /// The contexts are unrelated.
    Unrelated,
}

impl ContextDistance {
    /// Relation of `candidate` to `requested`.
    #[must_use]
    pub fn between(hierarchy: &TypeHierarchy, requested: TypeKey, candidate: TypeKey) -> Self {
        if let Some(distance) = hierarchy.hierarchy_distance(candidate, requested) {
            ContextDistance::Super(distance)
        } else if let Some(distance) = hierarchy.hierarchy_distance(requested, candidate) {
            ContextDistance::Sub(distance)
        } else {
            ContextDistance::Unrelated
        }
    }
}

/// Ranking of a candidate: context first, value as tiebreak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rank {
    /// Context relation.
    pub context: ContextDistance,
    /// Value tiebreak; `u32::MAX` for unrelated values.
    pub value: u32,
}

impl Rank {
    /// Rank by context alone.
    #[must_use]
    pub fn context(hierarchy: &TypeHierarchy, requested: TypeKey, candidate: TypeKey) -> Self {
        Self {
            context: ContextDistance::between(hierarchy, requested, candidate),
            value: 0,
        }
    }

    /// Adds a value tiebreak; `None` ranks last.
    #[must_use]
    pub fn then_value(self, distance: Option<u32>) -> Self {
        Self {
            value: distance.unwrap_or(u32::MAX),
            ..self
        }
    }
}

impl Default for Rank {
    fn default() -> Self {
        Self {
            context: ContextDistance::Super(0),
            value: 0,
        }
    }
}

// =============================================================================
// Resolver
// =============================================================================

type FilterFn<'a> = Box<dyn Fn(&ValueDescriptor) -> bool + 'a>;
type RankFn<'a> = Box<dyn Fn(&ValueDescriptor) -> Rank + 'a>;
type MapperFn<'a> = Box<dyn Fn(&Arc<ValueDescriptor>) -> Option<Descriptor> + 'a>;

/// A configured reduction over a list of descriptors.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use event_types::{TypeHierarchy, TypeSystem, Value};
/// use event_values::resolver::{Rank, Resolver};
/// use event_values::ValueDescriptor;
///
/// let mut types = TypeSystem::new();
/// let event = types.hierarchy_mut().define("Event", TypeHierarchy::OBJECT).unwrap();
/// let join = types.hierarchy_mut().define("JoinEvent", event).unwrap();
/// let text = types.hierarchy_mut().define("Text", TypeHierarchy::OBJECT).unwrap();
///
/// let broad = Arc::new(ValueDescriptor::builder(event, text).getter(|_| None).build(&types).unwrap());
/// let narrow = Arc::new(ValueDescriptor::builder(join, text).getter(|_| None).build(&types).unwrap());
///
/// let resolution = Resolver::builder(&types, join)
///     .rank(|d| Rank::context(types.hierarchy(), join, d.context_type()))
///     .build()
///     .resolve(&[broad, Arc::clone(&narrow)]);
///
/// assert_eq!(resolution.unique().unwrap().registered(), &narrow);
/// ```
pub struct Resolver<'a> {
    types: &'a TypeSystem,
    context: TypeKey,
    value_type: Option<TypeKey>,
    filter: FilterFn<'a>,
    rank: RankFn<'a>,
    mapper: MapperFn<'a>,
    disambiguate: bool,
}

impl<'a> Resolver<'a> {
    /// Starts a resolver for queries against `context`.
    pub fn builder(types: &'a TypeSystem, context: TypeKey) -> ResolverBuilder<'a> {
        ResolverBuilder {
            types,
            context,
            value_type: None,
            filter: Box::new(|_| true),
            rank: Box::new(|_| Rank::default()),
            mapper: Box::new(|d| Some(Descriptor::Plain(Arc::clone(d)))),
            disambiguate: false,
        }
    }

    /// Reduces `candidates` to the best-ranked views.
    #[must_use]
    pub fn resolve(&self, candidates: &[Arc<ValueDescriptor>]) -> Resolution {
        let hierarchy = self.types.hierarchy();
        let mut best: Vec<Descriptor> = Vec::new();
        let mut best_rank: Option<Rank> = None;

        for candidate in candidates {
            if !(self.filter)(candidate) {
                continue;
            }

            match candidate.validate(hierarchy, self.context) {
                Validation::Valid => {}
                Validation::Excluded { excluded, message } => {
                    tracing::warn!(
                        context = hierarchy.name(self.context),
                        excluded = hierarchy.name(excluded),
                        value = hierarchy.name(candidate.value_type()),
                        message = message.as_deref().unwrap_or_default(),
                        "event value excluded for context"
                    );
                    return Resolution::error(message);
                }
                Validation::Rejected => {
                    tracing::debug!(
                        context = hierarchy.name(self.context),
                        value = hierarchy.name(candidate.value_type()),
                        "event value rejected context"
                    );
                    return Resolution::error(None);
                }
            }

            let rank = (self.rank)(candidate);
            let ordering = best_rank.map_or(Ordering::Less, |current| rank.cmp(&current));
            if ordering == Ordering::Greater {
                continue;
            }
            let Some(view) = (self.mapper)(candidate) else {
                continue;
            };
            if ordering == Ordering::Less {
                best.clear();
                best_rank = Some(rank);
            }
            best.push(view);
        }

        if self.disambiguate {
            if let Some(value_type) = self.value_type {
                best = self.disambiguate_named(value_type, best);
            }
        }
        Resolution::of(best)
    }

    fn disambiguate_named(&self, value_type: TypeKey, candidates: Vec<Descriptor>) -> Vec<Descriptor> {
        let names = self.types.names();
        let requested = names.exact(value_type).map(|named| named.code_name());
        disambiguate(candidates, requested, |d| {
            names
                .exact(d.registered().value_type())
                .map(|named| named.code_name())
        })
    }
}

/// Builder for [`Resolver`].
#[must_use]
pub struct ResolverBuilder<'a> {
    types: &'a TypeSystem,
    context: TypeKey,
    value_type: Option<TypeKey>,
    filter: FilterFn<'a>,
    rank: RankFn<'a>,
    mapper: MapperFn<'a>,
    disambiguate: bool,
}

impl<'a> ResolverBuilder<'a> {
    /// Which descriptors apply. Defaults to all.
    pub fn filter(mut self, filter: impl Fn(&ValueDescriptor) -> bool + 'a) -> Self {
        self.filter = Box::new(filter);
        self
    }

    /// Ranking of applicable descriptors. Defaults to all tied.
    pub fn rank(mut self, rank: impl Fn(&ValueDescriptor) -> Rank + 'a) -> Self {
        self.rank = Box::new(rank);
        self
    }

    /// View returned for a winning descriptor. Defaults to the descriptor
    /// itself.
    pub fn mapper(mut self, mapper: impl Fn(&Arc<ValueDescriptor>) -> Option<Descriptor> + 'a) -> Self {
        self.mapper = Box::new(mapper);
        self
    }

    /// Strips tied candidates whose own value type is named differently from
    /// `value_type`.
    pub fn disambiguate(mut self, value_type: TypeKey) -> Self {
        self.value_type = Some(value_type);
        self.disambiguate = true;
        self
    }

    /// Finishes the resolver.
    #[must_use]
    pub fn build(self) -> Resolver<'a> {
        Resolver {
            types: self.types,
            context: self.context,
            value_type: self.value_type,
            filter: self.filter,
            rank: self.rank,
            mapper: self.mapper,
            disambiguate: self.disambiguate,
        }
    }
}

/// Keeps the items whose identity is unknown or equal to `requested`.
///
/// With fewer than two items, or when nothing would be kept, the input is
/// returned unchanged.
pub fn disambiguate<T, I, F>(items: Vec<T>, requested: Option<I>, identity: F) -> Vec<T>
where
    I: PartialEq,
    F: Fn(&T) -> Option<I>,
{
    if items.len() <= 1 {
        return items;
    }
    let (kept, stripped): (Vec<T>, Vec<T>) = items
        .into_iter()
        .partition(|item| identity(item).map_or(true, |id| requested.as_ref() == Some(&id)));
    if kept.is_empty() {
        stripped
    } else {
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod rank_tests {
        use super::*;

        #[test]
        fn supertypes_before_subtypes() {
            let mut h = TypeHierarchy::new();
            let event = h.define("Event", TypeHierarchy::OBJECT).unwrap();
            let player = h.define("PlayerEvent", event).unwrap();
            let join = h.define("JoinEvent", player).unwrap();
            let other = h.define("Other", TypeHierarchy::OBJECT).unwrap();

            let exact = Rank::context(&h, player, player);
            let parent = Rank::context(&h, player, event);
            let child = Rank::context(&h, player, join);
            let unrelated = Rank::context(&h, player, other);

            assert_eq!(exact.context, ContextDistance::Super(0));
            assert_eq!(parent.context, ContextDistance::Super(1));
            assert_eq!(child.context, ContextDistance::Sub(1));
            assert!(exact < parent);
            assert!(parent < child);
            assert!(child < unrelated);
        }

        #[test]
        fn value_breaks_ties_only() {
            let near = Rank::default().then_value(Some(1));
            let far = Rank::default().then_value(Some(3));
            let none = Rank::default().then_value(None);
            let worse_context = Rank {
                context: ContextDistance::Super(1),
                value: 0,
            };
            assert!(near < far);
            assert!(far < none);
            assert!(none < worse_context);
        }
    }

    mod disambiguate_tests {
        use super::*;

        #[test]
        fn strips_differently_named() {
            let items = vec![("player", Some("player")), ("villager", None)];
            let out = disambiguate(items, Some("entity"), |(_, id)| *id);
            assert_eq!(out, vec![("villager", None)]);
        }

        #[test]
        fn keeps_requested_name() {
            let items = vec![("a", Some("entity")), ("b", Some("player"))];
            let out = disambiguate(items, Some("entity"), |(_, id)| *id);
            assert_eq!(out, vec![("a", Some("entity"))]);
        }

        #[test]
        fn never_empties() {
            let items = vec![("a", Some("player")), ("b", Some("villager"))];
            let out = disambiguate(items.clone(), Some("entity"), |(_, id)| *id);
            assert_eq!(out, items);
        }

        #[test]
        fn single_item_untouched() {
            let items = vec![("a", Some("player"))];
            let out = disambiguate(items.clone(), Some("entity"), |(_, id)| *id);
            assert_eq!(out, items);
        }
    }

    proptest! {
        #[test]
        fn disambiguation_never_empties_non_empty_input(
            ids in proptest::collection::vec(proptest::option::of(0u8..4), 1..12),
            requested in proptest::option::of(0u8..4),
        ) {
            let items: Vec<(usize, Option<u8>)> = ids.into_iter().enumerate().collect();
            let len = items.len();
            let out = disambiguate(items.clone(), requested, |(_, id)| *id);

            prop_assert!(!out.is_empty());
            prop_assert!(out.len() <= len);
            // Survivors keep their relative order.
            prop_assert!(out.windows(2).all(|w| w[0].0 < w[1].0));
            if out.len() < len {
                prop_assert!(out.iter().all(|(_, id)| id.is_none() || *id == requested));
            }
        }
    }

    mod pipeline_tests {
        use super::*;
        use event_types::{NamedType, Value};

        struct Fixture {
            types: TypeSystem,
            event: TypeKey,
            join: TypeKey,
            quit: TypeKey,
            entity: TypeKey,
            player: TypeKey,
            villager: TypeKey,
        }

        fn fixture() -> Fixture {
            let mut types = TypeSystem::new();
            let h = types.hierarchy_mut();
            let event = h.define("Event", TypeHierarchy::OBJECT).unwrap();
            let join = h.define("JoinEvent", event).unwrap();
            let quit = h.define("QuitEvent", event).unwrap();
            let entity = h.define("Entity", TypeHierarchy::OBJECT).unwrap();
            let player = h.define("Player", entity).unwrap();
            let villager = h.define("Villager", entity).unwrap();
            types.names_mut().register(entity, NamedType::new("entity", "entity")).unwrap();
            types.names_mut().register(player, NamedType::new("player", "player")).unwrap();
            Fixture {
                types,
                event,
                join,
                quit,
                entity,
                player,
                villager,
            }
        }

        fn descriptor(fx: &Fixture, context: TypeKey, value: TypeKey) -> Arc<ValueDescriptor> {
            Arc::new(
                ValueDescriptor::builder(context, value)
                    .getter(|ctx: &Value| Some(ctx.clone()))
                    .build(&fx.types)
                    .unwrap(),
            )
        }

        #[test]
        fn exclusion_poisons_even_when_losing() {
            let fx = fixture();
            let winner = descriptor(&fx, fx.join, fx.player);
            let loser = Arc::new(
                ValueDescriptor::builder(fx.event, fx.player)
                    .getter(|_| None)
                    .excludes([fx.join])
                    .excluded_error_message("not here")
                    .build(&fx.types)
                    .unwrap(),
            );

            let resolution = Resolver::builder(&fx.types, fx.join)
                .rank(|d| Rank::context(fx.types.hierarchy(), fx.join, d.context_type()))
                .build()
                .resolve(&[winner, loser]);

            assert!(resolution.errored());
            assert_eq!(resolution.error_message(), Some("not here"));
            assert!(!resolution.successful());
        }

        #[test]
        fn filtered_out_exclusions_do_not_poison() {
            let fx = fixture();
            let excluded = Arc::new(
                ValueDescriptor::builder(fx.event, fx.villager)
                    .getter(|_| None)
                    .excludes([fx.join])
                    .build(&fx.types)
                    .unwrap(),
            );
            let wanted = descriptor(&fx, fx.event, fx.player);
            let player = fx.player;

            let resolution = Resolver::builder(&fx.types, fx.join)
                .filter(move |d| d.value_type() == player)
                .build()
                .resolve(&[excluded, Arc::clone(&wanted)]);

            assert!(!resolution.errored());
            assert_eq!(resolution.unique().unwrap().registered(), &wanted);
        }

        #[test]
        fn ties_kept_in_order() {
            let fx = fixture();
            let a = descriptor(&fx, fx.event, fx.player);
            let b = descriptor(&fx, fx.event, fx.villager);
            let resolution = Resolver::builder(&fx.types, fx.quit).build().resolve(&[a.clone(), b.clone()]);

            assert!(resolution.multiple());
            let all: Vec<_> = resolution.all().iter().map(|d| Arc::clone(d.registered())).collect();
            assert_eq!(all, vec![a, b]);
        }

        #[test]
        fn mapper_rejection_skips_candidate() {
            let fx = fixture();
            let rejected = descriptor(&fx, fx.join, fx.villager);
            let accepted = descriptor(&fx, fx.event, fx.player);
            let villager = fx.villager;

            let resolution = Resolver::builder(&fx.types, fx.join)
                .rank(|d| Rank::context(fx.types.hierarchy(), fx.join, d.context_type()))
                .mapper(move |d| (d.value_type() != villager).then(|| Descriptor::Plain(Arc::clone(d))))
                .build()
                .resolve(&[rejected, Arc::clone(&accepted)]);

            assert_eq!(resolution.unique().unwrap().registered(), &accepted);
        }

        #[test]
        fn disambiguation_prefers_unnamed_over_other_name() {
            let fx = fixture();
            let player = descriptor(&fx, fx.event, fx.player);
            let villager = descriptor(&fx, fx.event, fx.villager);
            let entity = fx.entity;

            let plain = Resolver::builder(&fx.types, fx.join)
                .build()
                .resolve(&[Arc::clone(&player), Arc::clone(&villager)]);
            assert!(plain.multiple());

            let disambiguated = Resolver::builder(&fx.types, fx.join)
                .disambiguate(entity)
                .build()
                .resolve(&[player, Arc::clone(&villager)]);
            assert_eq!(disambiguated.unique().unwrap().registered(), &villager);
        }

        #[test]
        fn context_validator_poisons() {
            let fx = fixture();
            let picky = Arc::new(
                ValueDescriptor::builder(fx.event, fx.player)
                    .getter(|_| None)
                    .context_validator(|_, _| false)
                    .build(&fx.types)
                    .unwrap(),
            );
            let resolution = Resolver::builder(&fx.types, fx.join).build().resolve(&[picky]);
            assert!(resolution.errored());
            assert_eq!(resolution.error_message(), None);
        }
    }
}
