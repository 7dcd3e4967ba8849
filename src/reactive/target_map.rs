//! The process-wide, identity-keyed target map described in `spec.md` §3:
//! "outer keyed by target object (weak reference, identity-keyed), inner
//! keyed by property". Four instances live on [`crate::runtime::Runtime`],
//! one per proxy flavor, so the same raw object gets at most one cached
//! wrapper per flavor (`spec.md` §6: "construct or retrieve the cached
//! proxy").

use crate::{dep::DepId, key::ReactiveKey, runtime::Runtime};
use rustc_hash::FxHashMap;
use std::cell::RefCell;

/// The four proxy flavors, matching `spec.md` §3's "Four such maps exist".
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(usize)]
pub enum Flavor {
    Reactive = 0,
    ShallowReactive = 1,
    Readonly = 2,
    ShallowReadonly = 3,
}

impl Flavor {
    pub const ALL: [Flavor; 4] = [
        Flavor::Reactive,
        Flavor::ShallowReactive,
        Flavor::Readonly,
        Flavor::ShallowReadonly,
    ];

    pub fn is_readonly(self) -> bool {
        matches!(self, Flavor::Readonly | Flavor::ShallowReadonly)
    }

    pub fn is_shallow(self) -> bool {
        matches!(self, Flavor::ShallowReactive | Flavor::ShallowReadonly)
    }
}

/// Identity key for a raw target: the address of its backing allocation.
/// Two wrappers over the same `Rc<RefCell<_>>` (or any other stable
/// allocation) compare equal here even though Rust gives us no structural
/// equality to rely on otherwise.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct RawId(pub(crate) usize);

impl RawId {
    pub fn of<T>(ptr: *const T) -> Self {
        RawId(ptr as usize)
    }
}

#[derive(Default)]
pub(crate) struct TargetMap {
    table: RefCell<FxHashMap<RawId, RefCell<FxHashMap<ReactiveKey, DepId>>>>,
}

impl TargetMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the `Dep` for `(raw, key)`, creating it lazily. This is the
    /// only way a `Dep` comes into existence (`spec.md` §4.1: "resolves the
    /// Dep for (target, key), creating it lazily").
    pub fn dep_for(&self, raw: RawId, key: ReactiveKey, rt: &Runtime) -> DepId {
        let table = self.table.borrow();
        if let Some(key_map) = table.get(&raw) {
            let mut key_map = key_map.borrow_mut();
            if let Some(id) = key_map.get(&key) {
                return *id;
            }
            let id = rt.new_dep();
            key_map.insert(key, id);
            return id;
        }
        drop(table);
        let id = rt.new_dep();
        let mut key_map = FxHashMap::default();
        key_map.insert(key, id);
        self.table
            .borrow_mut()
            .insert(raw, RefCell::new(key_map));
        id
    }

    /// Drops every `Dep` tracked for `raw`, across all keys. Called when a
    /// wrapper's raw target is being dropped, so its `Dep`s (and their
    /// links) don't linger forever. Since Rust has no weak-map-style GC
    /// notification, this is invoked explicitly rather than implicitly.
    pub fn forget(&self, raw: RawId) {
        self.table.borrow_mut().remove(&raw);
    }
}
