//! Test helper functions for setting up type systems, occurrences and
//! registries.
//!
//! The fixture models a small game server:
//!
//! ```text
//! Event
//! ├── PlayerEvent
//! │   ├── PlayerJoinEvent   (named "join")
//! │   ├── PlayerQuitEvent   (named "quit")
//! │   └── PlayerTradeEvent  (named "trade")
//! └── EntityEvent
//!     └── EntityDamageEvent (named "damage")
//!
//! Entity                    (named "entity")
//! └── LivingEntity
//!     ├── Player            (named "player")
//!     └── Villager
//!
//! Text, Number, Location    (Location named "location")
//! Player[]
//! ```
//!
//! Converters: `Player -> Location`, `Text <-> Number`.

use std::sync::Arc;

use event_types::{ConverterRegistry, NamedType, TypeHierarchy, TypeKey, TypeSystem, Value};
use parking_lot::Mutex;

use crate::descriptor::{DescriptorBuilder, ValueDescriptor};
use crate::registry::EventValueRegistry;

// =============================================================================
// Runtime Payloads
// =============================================================================

/// Payload of entity values.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub name: String,
    pub location: (i32, i32),
}

/// Payload of occurrence values.
#[derive(Debug, Default)]
pub struct Occurrence {
    pub actor: Option<Value>,
    pub message: Mutex<String>,
}

// =============================================================================
// Fixture
// =============================================================================

/// The fixture type system and its keys.
pub struct World {
    pub types: Arc<TypeSystem>,
    pub event: TypeKey,
    pub player_event: TypeKey,
    pub join: TypeKey,
    pub quit: TypeKey,
    pub trade: TypeKey,
    pub entity_event: TypeKey,
    pub damage: TypeKey,
    pub entity: TypeKey,
    pub living: TypeKey,
    pub player: TypeKey,
    pub villager: TypeKey,
    pub players: TypeKey,
    pub text: TypeKey,
    pub number: TypeKey,
    pub location: TypeKey,
}

/// Builds the fixture type system.
pub fn world() -> World {
    let mut types = TypeSystem::new();

    let h = types.hierarchy_mut();
    let event = h.define("Event", TypeHierarchy::OBJECT).unwrap();
    let player_event = h.define("PlayerEvent", event).unwrap();
    let join = h.define("PlayerJoinEvent", player_event).unwrap();
    let quit = h.define("PlayerQuitEvent", player_event).unwrap();
    let trade = h.define("PlayerTradeEvent", player_event).unwrap();
    let entity_event = h.define("EntityEvent", event).unwrap();
    let damage = h.define("EntityDamageEvent", entity_event).unwrap();
    let entity = h.define("Entity", TypeHierarchy::OBJECT).unwrap();
    let living = h.define("LivingEntity", entity).unwrap();
    let player = h.define("Player", living).unwrap();
    let villager = h.define("Villager", living).unwrap();
    let players = h.array_of(player).unwrap();
    let text = h.define("Text", TypeHierarchy::OBJECT).unwrap();
    let number = h.define("Number", TypeHierarchy::OBJECT).unwrap();
    let location = h.define("Location", TypeHierarchy::OBJECT).unwrap();

    let names = types.names_mut();
    for (key, code, noun) in [
        (join, "join", "join"),
        (quit, "quit", "quit"),
        (trade, "trade", "trade"),
        (damage, "damage", "damage"),
        (entity, "entity", "entity"),
        (player, "player", "player"),
        (location, "location", "location"),
    ] {
        names.register(key, NamedType::new(code, noun)).unwrap();
    }

    let mut conversions = ConverterRegistry::new();
    conversions.register(
        player,
        location,
        Arc::new(move |value: &Value| {
            value
                .downcast_ref::<Actor>()
                .map(|actor| Value::new(location, actor.location))
        }),
    );
    conversions.register(
        text,
        number,
        Arc::new(move |value: &Value| -> Option<Value> {
            let parsed = value.downcast_ref::<String>()?.parse::<f64>().ok()?;
            Some(Value::new(number, parsed))
        }),
    );
    conversions.register(
        number,
        text,
        Arc::new(move |value: &Value| value.downcast_ref::<f64>().map(|n| Value::new(text, n.to_string()))),
    );
    types.set_conversion(conversions);

    World {
        types: Arc::new(types),
        event,
        player_event,
        join,
        quit,
        trade,
        entity_event,
        damage,
        entity,
        living,
        player,
        villager,
        players,
        text,
        number,
        location,
    }
}

/// Routes engine logs to the test harness output. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

/// An empty registry over the fixture types.
pub fn registry(world: &World) -> EventValueRegistry {
    init_tracing();
    EventValueRegistry::new(Arc::clone(&world.types))
}

// =============================================================================
// Values
// =============================================================================

/// An entity value of runtime type `ty`.
pub fn actor(ty: TypeKey, name: &str, location: (i32, i32)) -> Value {
    Value::new(
        ty,
        Actor {
            name: name.to_string(),
            location,
        },
    )
}

/// An occurrence value of runtime type `ty`.
pub fn occurrence(ty: TypeKey, actor: Option<Value>, message: &str) -> Value {
    Value::new(
        ty,
        Occurrence {
            actor,
            message: Mutex::new(message.to_string()),
        },
    )
}

/// Name of an entity value.
pub fn actor_name(value: &Value) -> Option<String> {
    value.downcast_ref::<Actor>().map(|actor| actor.name.clone())
}

/// Current message of an occurrence value.
pub fn message(context: &Value) -> Option<String> {
    context
        .downcast_ref::<Occurrence>()
        .map(|occurrence| occurrence.message.lock().clone())
}

// =============================================================================
// Descriptors
// =============================================================================

/// A descriptor reading the occurrence's actor.
pub fn actor_descriptor(context: TypeKey, value: TypeKey) -> DescriptorBuilder {
    ValueDescriptor::builder(context, value).getter(|context: &Value| {
        context
            .downcast_ref::<Occurrence>()
            .and_then(|occurrence| occurrence.actor.clone())
    })
}

/// A descriptor reading and setting the occurrence's message as text.
pub fn message_descriptor(world: &World, context: TypeKey) -> DescriptorBuilder {
    let text = world.text;
    ValueDescriptor::builder(context, text)
        .getter(move |context: &Value| message(context).map(|m| Value::new(text, m)))
        .set_changer(|context: &Value, value: &Value| {
            if let (Some(occurrence), Some(new)) =
                (context.downcast_ref::<Occurrence>(), value.downcast_ref::<String>())
            {
                *occurrence.message.lock() = new.clone();
            }
        })
        .reset_changer(|context: &Value| {
            if let Some(occurrence) = context.downcast_ref::<Occurrence>() {
                occurrence.message.lock().clear();
            }
        })
}

/// A descriptor with a constant text value, answering to `patterns`.
pub fn constant_text(world: &World, context: TypeKey, constant: &'static str, patterns: &[&str]) -> DescriptorBuilder {
    let text = world.text;
    ValueDescriptor::builder(context, text)
        .identifier_patterns(patterns.iter().copied())
        .getter(move |_: &Value| Some(Value::new(text, constant.to_string())))
}

/// Registers `builder` and returns the registered descriptor.
pub fn register(registry: &mut EventValueRegistry, builder: DescriptorBuilder) -> Arc<ValueDescriptor> {
    let types = Arc::clone(registry.types());
    registry.register(builder.build(&types).unwrap()).unwrap()
}
