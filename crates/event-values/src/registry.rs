//! The event value registry.
//!
//! Stores [`ValueDescriptor`]s in one bucket per [`Time`] state and resolves
//! queries against them.
//!
//! # Resolution Phases
//!
//! A query by value type runs these phases in order, stopping at the first
//! that finds something or errors:
//!
//! 1. **Exact**: value type equal to the request, context a supertype of the
//!    request
//! 2. **Nearest**: value type a subtype of the request, context related in
//!    either direction
//! 3. **Downcast** (`ALLOW_CONVERSION`): value type a supertype of the
//!    request, narrowed at runtime by an instance check
//! 4. **Full conversion** (`ALLOW_CONVERSION`): any related context, bridged
//!    through the conversion subsystem
//! 5. **Fallback** (`FALLBACK_TO_DEFAULT_TIME_STATE`, past and future only):
//!    the whole query again against the present
//!
//! A query by identifier runs a single phase matching identifier patterns over
//! related contexts, followed by the same fallback.
//!
//! An errored phase ends the query: no later phase and no fallback runs.
//!
//! # Caching
//!
//! Resolutions are memoized per `(context, query, time, flags)`, including
//! empty and errored ones. Any registration change clears the whole cache.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use event_types::{TypeKey, TypeSystem, Value};
use parking_lot::RwLock;

use crate::config::RegistryConfig;
use crate::descriptor::{Descriptor, ValueDescriptor};
use crate::diagnostics::{self, ResolveError};
use crate::error::RegistryError;
use crate::flags::ResolveFlags;
use crate::resolution::Resolution;
use crate::resolver::{Rank, Resolver};
use crate::time::Time;

// =============================================================================
// Queries
// =============================================================================

/// What a query asks for: a textual identifier or a value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query<'a> {
    /// Free-text identifier matched against identifier patterns.
    Identifier(&'a str),
    /// A value type.
    Type(TypeKey),
}

impl<'a> From<&'a str> for Query<'a> {
    fn from(identifier: &'a str) -> Self {
        Query::Identifier(identifier)
    }
}

impl From<TypeKey> for Query<'_> {
    fn from(value_type: TypeKey) -> Self {
        Query::Type(value_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum QueryKey {
    Identifier(Box<str>),
    Type(TypeKey),
}

type Phase = fn(&EventValueRegistry, TypeKey, TypeKey, Time) -> Resolution;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    context: TypeKey,
    query: QueryKey,
    time: Time,
    flags: ResolveFlags,
}

// =============================================================================
// Registry
// =============================================================================

/// Registry of value descriptors with phased, cached resolution.
///
/// Registration takes `&mut self`; resolution takes `&self` and may run from
/// many threads at once.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use event_types::{TypeHierarchy, TypeSystem, Value};
/// use event_values::{EventValueRegistry, ResolveFlags, Time, ValueDescriptor};
///
/// let mut types = TypeSystem::new();
/// let event = types.hierarchy_mut().define("Event", TypeHierarchy::OBJECT).unwrap();
/// let join = types.hierarchy_mut().define("JoinEvent", event).unwrap();
/// let text = types.hierarchy_mut().define("Text", TypeHierarchy::OBJECT).unwrap();
/// let types = Arc::new(types);
///
/// let mut registry = EventValueRegistry::new(Arc::clone(&types));
/// registry
///     .register(
///         ValueDescriptor::builder(event, text)
///             .identifier_patterns(["message"])
///             .getter(move |_| Some(Value::new(text, String::from("welcome"))))
///             .build(&types)
///             .unwrap(),
///     )
///     .unwrap();
///
/// let by_type = registry.resolve(join, text, Time::Now, ResolveFlags::DEFAULT);
/// let by_name = registry.resolve(join, "message", Time::Now, ResolveFlags::DEFAULT);
/// assert!(by_type.successful());
/// assert_eq!(by_type, by_name);
///
/// let value = by_type.unique().unwrap().get(&Value::new(join, ())).unwrap();
/// assert_eq!(value.downcast_ref::<String>().map(String::as_str), Some("welcome"));
/// ```
pub struct EventValueRegistry {
    types: Arc<TypeSystem>,
    config: RegistryConfig,
    buckets: [Vec<Arc<ValueDescriptor>>; 3],
    cache: RwLock<HashMap<CacheKey, Resolution>>,
}

impl EventValueRegistry {
    /// Creates an empty registry with the default configuration.
    #[must_use]
    pub fn new(types: Arc<TypeSystem>) -> Self {
        Self::with_config(types, RegistryConfig::default())
    }

    /// Creates an empty registry.
    #[must_use]
    pub fn with_config(types: Arc<TypeSystem>, config: RegistryConfig) -> Self {
        Self {
            types,
            config,
            buckets: [Vec::new(), Vec::new(), Vec::new()],
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// The type system descriptors are resolved against.
    #[must_use]
    pub fn types(&self) -> &Arc<TypeSystem> {
        &self.types
    }

    /// The registry configuration.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------

    /// Registers a descriptor in the bucket of its time state.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if a descriptor with the same
    /// context type, value type and identifier patterns is already registered
    /// for that time state, and [`RegistryError::UnknownType`] if the
    /// descriptor references a type outside this registry's type system.
    pub fn register(&mut self, descriptor: ValueDescriptor) -> Result<Arc<ValueDescriptor>, RegistryError> {
        let hierarchy = self.types.hierarchy();
        for key in [descriptor.context_type(), descriptor.value_type()] {
            if !hierarchy.contains(key) {
                return Err(RegistryError::UnknownType(key));
            }
        }
        if self.is_registered(&descriptor) {
            return Err(RegistryError::Duplicate {
                context: hierarchy.name(descriptor.context_type()).to_string(),
                value: hierarchy.name(descriptor.value_type()).to_string(),
                patterns: descriptor
                    .identifier_patterns()
                    .iter()
                    .map(|p| p.as_str().to_string())
                    .collect(),
                time: descriptor.time(),
            });
        }

        tracing::debug!(
            context = hierarchy.name(descriptor.context_type()),
            value = hierarchy.name(descriptor.value_type()),
            time = %descriptor.time(),
            "event value registered"
        );
        let descriptor = Arc::new(descriptor);
        self.buckets[descriptor.time().index()].push(Arc::clone(&descriptor));
        self.invalidate();
        Ok(descriptor)
    }

    /// Removes descriptors occupying the same slot as `descriptor`.
    ///
    /// Returns whether anything was removed.
    pub fn unregister(&mut self, descriptor: &ValueDescriptor) -> bool {
        let bucket = &mut self.buckets[descriptor.time().index()];
        let before = bucket.len();
        bucket.retain(|registered| !registered.same_slot(descriptor));
        let removed = bucket.len() != before;
        if removed {
            let hierarchy = self.types.hierarchy();
            tracing::debug!(
                context = hierarchy.name(descriptor.context_type()),
                value = hierarchy.name(descriptor.value_type()),
                time = %descriptor.time(),
                "event value unregistered"
            );
            self.invalidate();
        }
        removed
    }

    /// Returns true if a descriptor occupying the same slot is registered.
    #[must_use]
    pub fn is_registered(&self, descriptor: &ValueDescriptor) -> bool {
        self.bucket(descriptor.time())
            .iter()
            .any(|registered| registered.same_slot(descriptor))
    }

    /// Returns true if any descriptor for exactly `context -> value` is
    /// registered at `time`.
    #[must_use]
    pub fn is_registered_types(&self, context: TypeKey, value: TypeKey, time: Time) -> bool {
        self.bucket(time)
            .iter()
            .any(|d| d.context_type() == context && d.value_type() == value)
    }

    fn bucket(&self, time: Time) -> &[Arc<ValueDescriptor>] {
        &self.buckets[time.index()]
    }

    fn invalidate(&mut self) {
        let cache = self.cache.get_mut();
        if !cache.is_empty() {
            tracing::debug!(entries = cache.len(), "resolution cache cleared");
            cache.clear();
        }
    }

    // -------------------------------------------------------------------------
    // Resolution
    // -------------------------------------------------------------------------

    /// Resolves by identifier or value type.
    #[must_use]
    pub fn resolve<'q>(&self, context: TypeKey, query: impl Into<Query<'q>>, time: Time, flags: ResolveFlags) -> Resolution {
        match query.into() {
            Query::Identifier(identifier) => self.resolve_identifier(context, identifier, time, flags),
            Query::Type(value_type) => self.resolve_type(context, value_type, time, flags),
        }
    }

    /// Resolves at [`Time::Now`] with the configured default flags.
    #[must_use]
    pub fn resolve_now<'q>(&self, context: TypeKey, query: impl Into<Query<'q>>) -> Resolution {
        self.resolve(context, query, Time::Now, self.config.default_flags)
    }

    /// Resolves by identifier.
    #[must_use]
    pub fn resolve_identifier(&self, context: TypeKey, identifier: &str, time: Time, flags: ResolveFlags) -> Resolution {
        let flags = flags.normalized_for(time);
        let key = CacheKey {
            context,
            query: QueryKey::Identifier(identifier.into()),
            time,
            flags,
        };
        if let Some(hit) = self.cached(&key) {
            return hit;
        }

        let hierarchy = self.types.hierarchy();
        let resolution = Resolver::builder(&self.types, context)
            .filter(|d| hierarchy.is_related_to(d.context_type(), context) && d.matches_input(identifier))
            .rank(|d| Rank::context(hierarchy, context, d.context_type()))
            .mapper(|d| Descriptor::Plain(Arc::clone(d)).converted(&self.types, context, d.value_type()))
            .build()
            .resolve(self.bucket(time));
        tracing::trace!(
            context = hierarchy.name(context),
            identifier,
            %time,
            found = resolution.len(),
            errored = resolution.errored(),
            "identifier phase"
        );

        let resolution = if resolution.is_conclusive() {
            resolution
        } else if self.falls_back(time, flags) {
            self.resolve_identifier(context, identifier, Time::Now, flags)
        } else {
            Resolution::empty()
        };
        self.store(key, &resolution);
        resolution
    }

    /// Resolves by value type through the phases described in the module
    /// documentation.
    #[must_use]
    pub fn resolve_type(&self, context: TypeKey, value_type: TypeKey, time: Time, flags: ResolveFlags) -> Resolution {
        let flags = flags.normalized_for(time);
        let key = CacheKey {
            context,
            query: QueryKey::Type(value_type),
            time,
            flags,
        };
        if let Some(hit) = self.cached(&key) {
            return hit;
        }

        let resolution = self.resolve_type_phases(context, value_type, time, flags);
        let resolution = if resolution.is_conclusive() {
            resolution
        } else if self.falls_back(time, flags) {
            self.resolve_type(context, value_type, Time::Now, flags)
        } else {
            Resolution::empty()
        };
        self.store(key, &resolution);
        resolution
    }

    fn resolve_type_phases(&self, context: TypeKey, value_type: TypeKey, time: Time, flags: ResolveFlags) -> Resolution {
        let hierarchy = self.types.hierarchy();
        let conversion = flags.contains(ResolveFlags::ALLOW_CONVERSION);
        let phases = [
            ("exact", Self::resolve_exact as Phase, true),
            ("nearest", Self::resolve_nearest as Phase, true),
            ("downcast", Self::resolve_downcast as Phase, conversion),
            ("conversion", Self::resolve_converted as Phase, conversion),
        ];

        for (phase, run, enabled) in phases {
            if !enabled {
                continue;
            }
            let resolution = run(self, context, value_type, time);
            tracing::trace!(
                phase,
                context = hierarchy.name(context),
                value = hierarchy.name(value_type),
                %time,
                found = resolution.len(),
                errored = resolution.errored(),
                "resolution phase"
            );
            if resolution.is_conclusive() {
                return resolution;
            }
        }
        Resolution::empty()
    }

    /// Exact phase only: value type equal to `value_type`, context a
    /// supertype of `context`, ranked by context distance. Not cached.
    #[must_use]
    pub fn resolve_exact(&self, context: TypeKey, value_type: TypeKey, time: Time) -> Resolution {
        let hierarchy = self.types.hierarchy();
        Resolver::builder(&self.types, context)
            .filter(|d| hierarchy.is_assignable_from(d.context_type(), context) && d.value_type() == value_type)
            .rank(|d| Rank::context(hierarchy, context, d.context_type()))
            .disambiguate(value_type)
            .build()
            .resolve(self.bucket(time))
    }

    fn resolve_nearest(&self, context: TypeKey, value_type: TypeKey, time: Time) -> Resolution {
        let hierarchy = self.types.hierarchy();
        Resolver::builder(&self.types, context)
            .filter(|d| {
                hierarchy.is_related_to(d.context_type(), context)
                    && hierarchy.is_assignable_from(value_type, d.value_type())
            })
            .rank(|d| {
                Rank::context(hierarchy, context, d.context_type())
                    .then_value(hierarchy.hierarchy_distance(value_type, d.value_type()))
            })
            .mapper(|d| Descriptor::Plain(Arc::clone(d)).converted(&self.types, context, value_type))
            .disambiguate(value_type)
            .build()
            .resolve(self.bucket(time))
    }

    fn resolve_downcast(&self, context: TypeKey, value_type: TypeKey, time: Time) -> Resolution {
        let hierarchy = self.types.hierarchy();
        let types = Arc::clone(&self.types);
        let narrow: event_types::ConverterFn = Arc::new(move |value: &Value| {
            value
                .is_instance_of(types.hierarchy(), value_type)
                .then(|| value.clone())
        });
        Resolver::builder(&self.types, context)
            .filter(|d| {
                hierarchy.is_related_to(d.context_type(), context)
                    && hierarchy.is_assignable_from(d.value_type(), value_type)
            })
            .rank(|d| {
                Rank::context(hierarchy, context, d.context_type())
                    .then_value(hierarchy.hierarchy_distance(d.value_type(), value_type))
            })
            .mapper(move |d| {
                Some(Descriptor::Plain(Arc::clone(d)).converted_with(
                    &self.types,
                    context,
                    value_type,
                    Arc::clone(&narrow),
                    None,
                ))
            })
            .disambiguate(value_type)
            .build()
            .resolve(self.bucket(time))
    }

    fn resolve_converted(&self, context: TypeKey, value_type: TypeKey, time: Time) -> Resolution {
        let hierarchy = self.types.hierarchy();
        Resolver::builder(&self.types, context)
            .filter(|d| hierarchy.is_related_to(d.context_type(), context))
            .rank(|d| {
                Rank::context(hierarchy, context, d.context_type())
                    .then_value(hierarchy.distance_between(d.value_type(), value_type))
            })
            .mapper(|d| Descriptor::Plain(Arc::clone(d)).converted(&self.types, context, value_type))
            .build()
            .resolve(self.bucket(time))
    }

    fn falls_back(&self, time: Time, flags: ResolveFlags) -> bool {
        !time.is_now() && flags.contains(ResolveFlags::FALLBACK_TO_DEFAULT_TIME_STATE)
    }

    fn cached(&self, key: &CacheKey) -> Option<Resolution> {
        if !self.config.cache_resolutions {
            return None;
        }
        self.cache.read().get(key).cloned()
    }

    fn store(&self, key: CacheKey, resolution: &Resolution) {
        if self.config.cache_resolutions {
            self.cache.write().insert(key, resolution.clone());
        }
    }

    /// Number of memoized resolutions.
    #[must_use]
    pub fn cached_resolutions(&self) -> usize {
        self.cache.read().len()
    }

    /// Drops all memoized resolutions.
    pub fn clear_cache(&self) {
        self.cache.write().clear();
    }

    // -------------------------------------------------------------------------
    // Convenience
    // -------------------------------------------------------------------------

    /// Returns true if a past or future variant of `context -> value_type`
    /// resolves, conversion allowed but without falling back to the present.
    #[must_use]
    pub fn has_time_states(&self, context: TypeKey, value_type: TypeKey) -> bool {
        let flags = self
            .config
            .default_flags
            .difference(ResolveFlags::FALLBACK_TO_DEFAULT_TIME_STATE);
        [Time::Past, Time::Future]
            .into_iter()
            .any(|time| self.resolve_type(context, value_type, time, flags).successful())
    }

    /// Returns true if a past or future variant of `context -> value_type`
    /// resolves exactly.
    #[must_use]
    pub fn has_exact_time_states(&self, context: TypeKey, value_type: TypeKey) -> bool {
        [Time::Past, Time::Future]
            .into_iter()
            .any(|time| self.resolve_exact(context, value_type, time).successful())
    }

    /// Resolves by the runtime type of `context` and reads the value from the
    /// first candidate.
    #[must_use]
    pub fn value_of(&self, context: &Value, value_type: TypeKey, time: Time) -> Option<Value> {
        self.resolve_type(context.type_key(), value_type, time, self.config.default_flags)
            .any()?
            .get(context)
    }

    /// Resolves `context -> value_type` and demands a single usable candidate.
    ///
    /// Ambiguity is checked without conversion first, so that a value offered
    /// directly by several descriptors is reported as ambiguous even when
    /// conversion would pick one.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] describing the missing, ambiguous or
    /// excluded value in user-facing terms.
    pub fn require(&self, context: TypeKey, value_type: TypeKey, time: Time) -> Result<Descriptor, ResolveError> {
        let strict = self
            .config
            .default_flags
            .difference(ResolveFlags::ALLOW_CONVERSION);
        let direct = self.resolve_type(context, value_type, time, strict);
        if direct.multiple() || direct.errored() {
            return diagnostics::require(&self.types, &direct, context, value_type);
        }
        let resolution = self.resolve_type(context, value_type, time, self.config.default_flags);
        diagnostics::require(&self.types, &resolution, context, value_type)
    }

    // -------------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------------

    /// All descriptors, past first, then present, then future.
    #[must_use]
    pub fn elements(&self) -> Vec<Arc<ValueDescriptor>> {
        self.buckets.iter().flatten().cloned().collect()
    }

    /// Descriptors registered for `time`.
    #[must_use]
    pub fn elements_at(&self, time: Time) -> Vec<Arc<ValueDescriptor>> {
        self.bucket(time).to_vec()
    }

    /// All descriptors grouped by context type.
    #[must_use]
    pub fn per_context(&self) -> BTreeMap<TypeKey, Vec<Arc<ValueDescriptor>>> {
        let mut grouped: BTreeMap<TypeKey, Vec<Arc<ValueDescriptor>>> = BTreeMap::new();
        for descriptor in self.buckets.iter().flatten() {
            grouped
                .entry(descriptor.context_type())
                .or_default()
                .push(Arc::clone(descriptor));
        }
        grouped
    }

    /// Total number of registered descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }
}

impl fmt::Debug for EventValueRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventValueRegistry")
            .field("past", &self.buckets[Time::Past.index()].len())
            .field("now", &self.buckets[Time::Now.index()].len())
            .field("future", &self.buckets[Time::Future.index()].len())
            .field("cached", &self.cache.read().len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
