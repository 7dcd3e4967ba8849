//! Tagged property keys used to address a [`Dep`](crate::dep::Dep) within a
//! target's per-key table.
//!
//! JavaScript property keys are either strings or symbols; Rust has no
//! built-in analogue, so this module defines an explicit tagged key type
//! (per `spec.md` §9's "Dynamic key tracking" note) plus the three reserved
//! sentinel keys that must never collide with a user-supplied key.

use std::{borrow::Cow, fmt};

/// A property key as seen by the dependency graph.
///
/// `Field` covers both string-like object keys and collection keys once
/// they've been normalized to their raw (non-reactive) form. `Index` is a
/// small optimization for array access so integer keys don't allocate.
/// `Sentinel` covers the three reserved tracking keys.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum ReactiveKey {
    Field(Cow<'static, str>),
    Index(usize),
    Sentinel(Sentinel),
}

impl ReactiveKey {
    pub fn field(key: impl Into<Cow<'static, str>>) -> Self {
        ReactiveKey::Field(key.into())
    }
}

impl From<usize> for ReactiveKey {
    fn from(index: usize) -> Self {
        ReactiveKey::Index(index)
    }
}

impl From<&'static str> for ReactiveKey {
    fn from(key: &'static str) -> Self {
        ReactiveKey::Field(Cow::Borrowed(key))
    }
}

impl From<String> for ReactiveKey {
    fn from(key: String) -> Self {
        ReactiveKey::Field(Cow::Owned(key))
    }
}

impl fmt::Display for ReactiveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReactiveKey::Field(key) => write!(f, "{key}"),
            ReactiveKey::Index(i) => write!(f, "[{i}]"),
            ReactiveKey::Sentinel(s) => write!(f, "{s:?}"),
        }
    }
}

/// Reserved keys that never collide with user data.
///
/// - `Iterate`: tracked by `ownKeys`/iteration over an object, and by
///   `keys`/`values`/`entries`/`forEach`/`size` on a `Set` or `Map` value
///   iteration.
/// - `MapKeyIterate`: tracked specifically by `Map::keys()`, since adding or
///   removing a key (but not just changing a value) is what should
///   invalidate a dependent that only reads keys.
/// - `ArrayLength`: tracked by reads of `.len()` and by any array mutation
///   that can change length.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Sentinel {
    Iterate,
    MapKeyIterate,
    ArrayLength,
}

impl ReactiveKey {
    pub const ITERATE: ReactiveKey = ReactiveKey::Sentinel(Sentinel::Iterate);
    pub const MAP_KEY_ITERATE: ReactiveKey =
        ReactiveKey::Sentinel(Sentinel::MapKeyIterate);
    pub const ARRAY_LENGTH: ReactiveKey =
        ReactiveKey::Sentinel(Sentinel::ArrayLength);
}

/// The kind of mutation that produced a `trigger` call, used only for
/// diagnostics (the dependency graph itself doesn't branch on it, other than
/// `batch`'s ordering guarantees, which are key-based).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TriggerOp {
    Add,
    Set,
    Delete,
    Clear,
}
