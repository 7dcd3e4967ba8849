//! `Reactive<V>`: a dynamic, reactive property bag over plain values —
//! the stand-in for `spec.md` §4.6's object/array Proxy `get`/`set`/`has`/
//! `deleteProperty`/`ownKeys` traps, expressed as explicit methods per
//! `spec.md` §9's guidance for languages without native property
//! interception.

use crate::{
    key::{ReactiveKey, TriggerOp},
    reactive::target_map::Flavor,
    runtime::with_runtime,
    value::same_value,
};
use rustc_hash::FxHashMap;
use std::{cell::RefCell, rc::Rc};

struct Raw<V> {
    fields: FxHashMap<ReactiveKey, V>,
}

/// A reactive object: any field read under a tracking context is recorded
/// as a dependency; any field write that actually changes the stored value
/// triggers whoever read it. Adding or removing a key also invalidates
/// anyone who iterated the object's keys (`spec.md` §4.6 "ITERATE_KEY").
pub struct Reactive<V> {
    raw: Rc<RefCell<Raw<V>>>,
    flavor: Flavor,
}

impl<V> Clone for Reactive<V> {
    fn clone(&self) -> Self {
        Reactive {
            raw: self.raw.clone(),
            flavor: self.flavor,
        }
    }
}

impl<V: Clone + PartialEq + 'static> Reactive<V> {
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
    fn build(fields: FxHashMap<ReactiveKey, V>, flavor: Flavor) -> Self {
        Reactive {
            raw: Rc::new(RefCell::new(Raw { fields })),
            flavor,
        }
    }

    /// Wraps `fields` as a deeply-reactive object (`spec.md` §6 `reactive`).
    pub fn new(fields: FxHashMap<ReactiveKey, V>) -> Self {
        Self::build(fields, Flavor::Reactive)
    }

    /// Wraps `fields` as a read-only object (`spec.md` §6 `readonly`):
    /// reads still track, but `set`/`delete` are no-ops that log a warning
    /// instead of panicking, mirroring the original's dev-mode console
    /// warning rather than a thrown error.
    pub fn new_readonly(fields: FxHashMap<ReactiveKey, V>) -> Self {
        Self::build(fields, Flavor::Readonly)
    }

    /// Shallow variant of [`Reactive::new`]: top-level field writes still
    /// trigger, but `V` itself isn't auto-wrapped on read (`spec.md` §4.6).
    pub fn new_shallow(fields: FxHashMap<ReactiveKey, V>) -> Self {
        Self::build(fields, Flavor::ShallowReactive)
    }

    pub fn new_shallow_readonly(fields: FxHashMap<ReactiveKey, V>) -> Self {
        Self::build(fields, Flavor::ShallowReadonly)
    }

    fn raw_id(&self) -> crate::reactive::target_map::RawId {
        crate::reactive::target_map::RawId::of(Rc::as_ptr(&self.raw))
    }

    fn dep_for(&self, key: ReactiveKey) -> crate::dep::DepId {
        with_runtime(|rt| rt.target_map(self.flavor).dep_for(self.raw_id(), key, rt))
    }

    /// Reads a field, tracking the calling subscriber against that key.
    pub fn get(&self, key: impl Into<ReactiveKey>) -> Option<V> {
        let key = key.into();
        with_runtime(|rt| rt.track_dep(self.dep_for(key.clone())));
        self.raw.borrow().fields.get(&key).cloned()
    }

    /// `true` if `key` is present, tracking the calling subscriber against
    /// that key the same way [`Reactive::get`] does.
    pub fn has(&self, key: impl Into<ReactiveKey>) -> bool {
        let key = key.into();
        with_runtime(|rt| rt.track_dep(self.dep_for(key.clone())));
        self.raw.borrow().fields.contains_key(&key)
    }

    /// Every current key, tracking the calling subscriber against
    /// [`ReactiveKey::ITERATE`] so that adding or removing a key (not just
    /// changing a value) invalidates it.
    pub fn keys(&self) -> Vec<ReactiveKey> {
        with_runtime(|rt| rt.track_dep(self.dep_for(ReactiveKey::ITERATE)));
        self.raw.borrow().fields.keys().cloned().collect()
    }

    /// Sets a field, triggering subscribers of that key iff the value
    /// actually changed, and additionally triggering
    /// [`ReactiveKey::ITERATE`] when the key didn't previously exist
    /// (`spec.md` §4.6: "Add vs Set... only Add touches ITERATE_KEY").
    /// No-op on a readonly object.
    pub fn set(&self, key: impl Into<ReactiveKey>, value: V) {
        if self.flavor.is_readonly() {
            tracing::warn!("set on a readonly reactive object was ignored");
            return;
        }
        let key = key.into();
        let (op, changed) = {
            let mut raw = self.raw.borrow_mut();
            match raw.fields.get(&key) {
                Some(old) if same_value(old, &value) => (TriggerOp::Set, false),
                Some(_) => (TriggerOp::Set, true),
                None => (TriggerOp::Add, true),
            }
        };
        if !changed {
            return;
        }
        self.raw.borrow_mut().fields.insert(key.clone(), value);
        with_runtime(|rt| {
            rt.trigger_dep(self.dep_for(key));
            if op == TriggerOp::Add {
                rt.trigger_dep(self.dep_for(ReactiveKey::ITERATE));
            }
        });
    }

    /// Removes a field, triggering both that key and
    /// [`ReactiveKey::ITERATE`] if it was actually present. No-op on a
    /// readonly object.
    pub fn delete(&self, key: impl Into<ReactiveKey>) -> bool {
        if self.flavor.is_readonly() {
            tracing::warn!("delete on a readonly reactive object was ignored");
            return false;
        }
        let key = key.into();
        let removed = self.raw.borrow_mut().fields.remove(&key).is_some();
        if removed {
            with_runtime(|rt| {
                rt.trigger_dep(self.dep_for(key));
                rt.trigger_dep(self.dep_for(ReactiveKey::ITERATE));
            });
        }
        removed
    }

    /// `true` if this wrapper is one of the readonly flavors.
    pub fn is_readonly(&self) -> bool {
        self.flavor.is_readonly()
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// `spec.md` §6 `toRaw`: an untracked snapshot of the current fields.
    pub fn to_raw(&self) -> FxHashMap<ReactiveKey, V> {
        self.raw.borrow().fields.clone()
    }

    /// `spec.md` §8 "Calling `readonly` on a reactive proxy yields a
    /// distinct readonly proxy wrapping the same raw target": returns a new
    /// wrapper sharing this one's storage, tagged readonly (or shallow
    /// readonly, if this one was already shallow).
    pub fn to_readonly(&self) -> Self {
        Reactive {
            raw: self.raw.clone(),
            flavor: if self.flavor.is_shallow() {
                Flavor::ShallowReadonly
            } else {
                Flavor::Readonly
            },
        }
    }

    /// `true` iff `self` and `other` wrap the same underlying storage,
    /// regardless of flavor — the Rust analogue of `toRaw(a) === toRaw(b)`.
    pub fn same_raw_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.raw, &other.raw)
    }
}
