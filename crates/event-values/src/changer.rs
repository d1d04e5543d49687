//! Mutation of event values.
//!
//! A descriptor may support changing its value through any of the
//! [`ChangeMode`]s. Modes that take a value receive the context and the new
//! value; [`ChangeMode::Delete`] and [`ChangeMode::Reset`] receive only the
//! context.

use std::fmt;
use std::sync::Arc;

use event_types::Value;
use serde::{Deserialize, Serialize};

/// Ways a script may change a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeMode {
    /// Replace the value.
    Set,
    /// Add to the value.
    Add,
    /// Remove from the value.
    Remove,
    /// Remove every occurrence from the value.
    RemoveAll,
    /// Clear the value.
    Delete,
    /// Restore the value's default.
    Reset,
}

impl ChangeMode {
    /// All modes.
    pub const ALL: [ChangeMode; 6] = [
        ChangeMode::Set,
        ChangeMode::Add,
        ChangeMode::Remove,
        ChangeMode::RemoveAll,
        ChangeMode::Delete,
        ChangeMode::Reset,
    ];

    /// Returns true if changers for this mode receive a value.
    #[must_use]
    pub const fn takes_value(self) -> bool {
        !matches!(self, ChangeMode::Delete | ChangeMode::Reset)
    }
}

impl fmt::Display for ChangeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeMode::Set => "set",
            ChangeMode::Add => "add",
            ChangeMode::Remove => "remove",
            ChangeMode::RemoveAll => "remove all",
            ChangeMode::Delete => "delete",
            ChangeMode::Reset => "reset",
        })
    }
}

/// Callback for modes that take a value: `(context, value)`.
pub type ValueChangerFn = Arc<dyn Fn(&Value, &Value) + Send + Sync>;

/// Callback for modes that take no value: `(context)`.
pub type NoValueChangerFn = Arc<dyn Fn(&Value) + Send + Sync>;

/// A mutation callback.
#[derive(Clone)]
pub enum Changer {
    /// Receives the context and the new value.
    WithValue(ValueChangerFn),
    /// Receives only the context.
    NoValue(NoValueChangerFn),
}

impl Changer {
    /// Wraps a callback taking a value.
    pub fn with_value(f: impl Fn(&Value, &Value) + Send + Sync + 'static) -> Self {
        Changer::WithValue(Arc::new(f))
    }

    /// Wraps a callback taking no value.
    pub fn no_value(f: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        Changer::NoValue(Arc::new(f))
    }

    /// Returns true for [`Changer::NoValue`].
    #[must_use]
    pub fn is_no_value(&self) -> bool {
        matches!(self, Changer::NoValue(_))
    }

    /// Runs the changer.
    ///
    /// Value changers do nothing when `value` is `None`. Returns whether the
    /// callback ran.
    pub fn apply(&self, context: &Value, value: Option<&Value>) -> bool {
        match (self, value) {
            (Changer::NoValue(f), _) => {
                f(context);
                true
            }
            (Changer::WithValue(f), Some(value)) => {
                f(context, value);
                true
            }
            (Changer::WithValue(_), None) => false,
        }
    }
}

impl fmt::Debug for Changer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Changer::WithValue(_) => f.write_str("Changer::WithValue"),
            Changer::NoValue(_) => f.write_str("Changer::NoValue"),
        }
    }
}
