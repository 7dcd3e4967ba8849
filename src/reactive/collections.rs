//! `ReactiveMap`/`ReactiveSet`: collection handlers over `Map`/`Set`-shaped
//! data (`spec.md` §4.7). Keyed access tracks per-key; `size`/iteration
//! tracks [`ReactiveKey::ITERATE`], which a `Map::insert` triggers on every
//! change (value-only updates included, matching the upstream `SET` trap);
//! `Map::keys()` instead tracks [`ReactiveKey::MAP_KEY_ITERATE`], which only
//! an add or delete triggers, since a reader that only cares about the key
//! set shouldn't re-run on a value-only update to an existing key.

use crate::{
    key::ReactiveKey,
    reactive::target_map::Flavor,
    runtime::with_runtime,
    value::same_value,
};
use indexmap::IndexMap;
use std::{
    cell::RefCell,
    hash::Hash,
    rc::Rc,
};

fn dep_key<K: Eq + Hash + ToString>(k: &K) -> ReactiveKey {
    ReactiveKey::field(k.to_string())
}

struct MapRaw<K, V> {
    entries: IndexMap<K, V>,
}

/// A reactive `Map<K, V>`.
pub struct ReactiveMap<K, V> {
    raw: Rc<RefCell<MapRaw<K, V>>>,
    flavor: Flavor,
}

impl<K, V> Clone for ReactiveMap<K, V> {
    fn clone(&self) -> Self {
        ReactiveMap {
            raw: self.raw.clone(),
            flavor: self.flavor,
        }
    }
}

impl<K, V> ReactiveMap<K, V>
where
    K: Eq + Hash + Clone + ToString + 'static,
    V: Clone + PartialEq + 'static,
{
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
    fn build(entries: IndexMap<K, V>, flavor: Flavor) -> Self {
        ReactiveMap {
            raw: Rc::new(RefCell::new(MapRaw { entries })),
            flavor,
        }
    }

    pub fn new(entries: IndexMap<K, V>) -> Self {
        Self::build(entries, Flavor::Reactive)
    }

    pub fn new_readonly(entries: IndexMap<K, V>) -> Self {
        Self::build(entries, Flavor::Readonly)
    }

    /// Shallow variant: top-level `insert`/`remove` still trigger, but a
    /// stored value that is itself reactive isn't recursively unwrapped —
    /// moot in this crate's homogeneous-value-type design (no such
    /// recursive unwrap ever happens), kept for flavor-dedup parity with
    /// `spec.md` §3's four target maps.
    pub fn new_shallow(entries: IndexMap<K, V>) -> Self {
        Self::build(entries, Flavor::ShallowReactive)
    }

    pub fn new_shallow_readonly(entries: IndexMap<K, V>) -> Self {
        Self::build(entries, Flavor::ShallowReadonly)
    }

    fn raw_id(&self) -> crate::reactive::target_map::RawId {
        crate::reactive::target_map::RawId::of(Rc::as_ptr(&self.raw))
    }

    fn dep_for(&self, key: ReactiveKey) -> crate::dep::DepId {
        with_runtime(|rt| rt.target_map(self.flavor).dep_for(self.raw_id(), key, rt))
    }

    /// `spec.md` §4.7 `get`: tracks the specific key.
    pub fn get(&self, key: &K) -> Option<V> {
        with_runtime(|rt| rt.track_dep(self.dep_for(dep_key(key))));
        self.raw.borrow().entries.get(key).cloned()
    }

    /// `spec.md` §4.7 `has`: tracks the specific key.
    pub fn has(&self, key: &K) -> bool {
        with_runtime(|rt| rt.track_dep(self.dep_for(dep_key(key))));
        self.raw.borrow().entries.contains_key(key)
    }

    /// `spec.md` §4.7 `size`: tracks `ITERATE_KEY`.
    pub fn size(&self) -> usize {
        with_runtime(|rt| rt.track_dep(self.dep_for(ReactiveKey::ITERATE)));
        self.raw.borrow().entries.len()
    }

    /// `spec.md` §4.7 `keys`: tracks `MAP_KEY_ITERATE`, not `ITERATE_KEY`,
    /// so a value-only `set` on an existing key doesn't invalidate it.
    pub fn keys(&self) -> Vec<K> {
        with_runtime(|rt| rt.track_dep(self.dep_for(ReactiveKey::MAP_KEY_ITERATE)));
        self.raw.borrow().entries.keys().cloned().collect()
    }

    /// `spec.md` §4.7 `values`/`entries`/`forEach`: track `ITERATE_KEY`.
    pub fn values(&self) -> Vec<V> {
        with_runtime(|rt| rt.track_dep(self.dep_for(ReactiveKey::ITERATE)));
        self.raw.borrow().entries.values().cloned().collect()
    }

    pub fn entries(&self) -> Vec<(K, V)> {
        with_runtime(|rt| rt.track_dep(self.dep_for(ReactiveKey::ITERATE)));
        self.raw
            .borrow()
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// `spec.md` §4.7 `set`: triggers the key always (when the value
    /// actually changed), plus `ITERATE_KEY` on every change (value-only
    /// included, matching the upstream Map handler's `ITERATE_KEY` trigger
    /// on `SET`) and `MAP_KEY_ITERATE` only when the key is new
    /// (`TriggerOp::Add`) — the key set itself only changes on an add.
    pub fn insert(&self, key: K, value: V) {
        if self.flavor.is_readonly() {
            tracing::warn!("insert on a readonly reactive map was ignored");
            return;
        }
        let (is_new, changed) = {
            let raw = self.raw.borrow();
            match raw.entries.get(&key) {
                Some(old) => (false, !same_value(old, &value)),
                None => (true, true),
            }
        };
        if !changed {
            return;
        }
        self.raw.borrow_mut().entries.insert(key.clone(), value);
        with_runtime(|rt| {
            rt.trigger_dep(self.dep_for(dep_key(&key)));
            rt.trigger_dep(self.dep_for(ReactiveKey::ITERATE));
            if is_new {
                rt.trigger_dep(self.dep_for(ReactiveKey::MAP_KEY_ITERATE));
            }
        });
    }

    /// `spec.md` §4.7 `delete`: triggers the key, `ITERATE_KEY`, and
    /// `MAP_KEY_ITERATE` iff the key was actually present.
    pub fn remove(&self, key: &K) -> Option<V> {
        if self.flavor.is_readonly() {
            tracing::warn!("remove on a readonly reactive map was ignored");
            return None;
        }
        let removed = self.raw.borrow_mut().entries.shift_remove(key);
        if removed.is_some() {
            with_runtime(|rt| {
                rt.trigger_dep(self.dep_for(dep_key(key)));
                rt.trigger_dep(self.dep_for(ReactiveKey::ITERATE));
                rt.trigger_dep(self.dep_for(ReactiveKey::MAP_KEY_ITERATE));
            });
        }
        removed
    }

    /// `spec.md` §4.7 `clear`: triggers `ITERATE_KEY` and
    /// `MAP_KEY_ITERATE` once, iff the map was non-empty.
    pub fn clear(&self) {
        if self.flavor.is_readonly() {
            tracing::warn!("clear on a readonly reactive map was ignored");
            return;
        }
        let had_entries = !self.raw.borrow().entries.is_empty();
        self.raw.borrow_mut().entries.clear();
        if had_entries {
            with_runtime(|rt| {
                rt.trigger_dep(self.dep_for(ReactiveKey::ITERATE));
                rt.trigger_dep(self.dep_for(ReactiveKey::MAP_KEY_ITERATE));
            });
        }
    }

    pub fn is_readonly(&self) -> bool {
        self.flavor.is_readonly()
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// `spec.md` §6 `toRaw`: an untracked snapshot of the current entries.
    pub fn to_raw(&self) -> IndexMap<K, V> {
        self.raw.borrow().entries.clone()
    }

    /// `spec.md` §8 "readonly(reactive(o)) !== reactive(o)": a distinct
    /// wrapper sharing this one's storage, tagged readonly.
    pub fn to_readonly(&self) -> Self {
        ReactiveMap {
            raw: self.raw.clone(),
            flavor: if self.flavor.is_shallow() {
                Flavor::ShallowReadonly
            } else {
                Flavor::Readonly
            },
        }
    }

    pub fn same_raw_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.raw, &other.raw)
    }
}

struct SetRaw<T> {
    entries: IndexMap<T, ()>,
}

/// A reactive `Set<T>`, built the same way as [`ReactiveMap`] but without a
/// separate value — membership is the only state.
pub struct ReactiveSet<T> {
    raw: Rc<RefCell<SetRaw<T>>>,
    flavor: Flavor,
}

impl<T> Clone for ReactiveSet<T> {
    fn clone(&self) -> Self {
        ReactiveSet {
            raw: self.raw.clone(),
            flavor: self.flavor,
        }
    }
}

impl<T> ReactiveSet<T>
where
    T: Eq + Hash + Clone + ToString + 'static,
{
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
    fn build(items: IndexMap<T, ()>, flavor: Flavor) -> Self {
        ReactiveSet {
            raw: Rc::new(RefCell::new(SetRaw { entries: items })),
            flavor,
        }
    }

    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        Self::build(items.into_iter().map(|i| (i, ())).collect(), Flavor::Reactive)
    }

    pub fn new_readonly(items: impl IntoIterator<Item = T>) -> Self {
        Self::build(
            items.into_iter().map(|i| (i, ())).collect(),
            Flavor::Readonly,
        )
    }

    pub fn new_shallow(items: impl IntoIterator<Item = T>) -> Self {
        Self::build(
            items.into_iter().map(|i| (i, ())).collect(),
            Flavor::ShallowReactive,
        )
    }

    pub fn new_shallow_readonly(items: impl IntoIterator<Item = T>) -> Self {
        Self::build(
            items.into_iter().map(|i| (i, ())).collect(),
            Flavor::ShallowReadonly,
        )
    }

    fn raw_id(&self) -> crate::reactive::target_map::RawId {
        crate::reactive::target_map::RawId::of(Rc::as_ptr(&self.raw))
    }

    fn dep_for(&self, key: ReactiveKey) -> crate::dep::DepId {
        with_runtime(|rt| rt.target_map(self.flavor).dep_for(self.raw_id(), key, rt))
    }

    pub fn has(&self, value: &T) -> bool {
        with_runtime(|rt| rt.track_dep(self.dep_for(dep_key(value))));
        self.raw.borrow().entries.contains_key(value)
    }

    pub fn size(&self) -> usize {
        with_runtime(|rt| rt.track_dep(self.dep_for(ReactiveKey::ITERATE)));
        self.raw.borrow().entries.len()
    }

    pub fn values(&self) -> Vec<T> {
        with_runtime(|rt| rt.track_dep(self.dep_for(ReactiveKey::ITERATE)));
        self.raw.borrow().entries.keys().cloned().collect()
    }

    /// `spec.md` §4.7 `add`: triggers the value and `ITERATE_KEY` iff it
    /// wasn't already a member.
    pub fn insert(&self, value: T) {
        if self.flavor.is_readonly() {
            tracing::warn!("insert on a readonly reactive set was ignored");
            return;
        }
        let is_new = !self.raw.borrow().entries.contains_key(&value);
        if !is_new {
            return;
        }
        self.raw.borrow_mut().entries.insert(value.clone(), ());
        with_runtime(|rt| {
            rt.trigger_dep(self.dep_for(dep_key(&value)));
            rt.trigger_dep(self.dep_for(ReactiveKey::ITERATE));
        });
    }

    /// `spec.md` §4.7 `delete`.
    pub fn remove(&self, value: &T) -> bool {
        if self.flavor.is_readonly() {
            tracing::warn!("remove on a readonly reactive set was ignored");
            return false;
        }
        let removed = self.raw.borrow_mut().entries.shift_remove(value).is_some();
        if removed {
            with_runtime(|rt| {
                rt.trigger_dep(self.dep_for(dep_key(value)));
                rt.trigger_dep(self.dep_for(ReactiveKey::ITERATE));
            });
        }
        removed
    }

    pub fn clear(&self) {
        if self.flavor.is_readonly() {
            tracing::warn!("clear on a readonly reactive set was ignored");
            return;
        }
        let had_entries = !self.raw.borrow().entries.is_empty();
        self.raw.borrow_mut().entries.clear();
        if had_entries {
            with_runtime(|rt| rt.trigger_dep(self.dep_for(ReactiveKey::ITERATE)));
        }
    }

    pub fn is_readonly(&self) -> bool {
        self.flavor.is_readonly()
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// `spec.md` §6 `toRaw`: an untracked snapshot of the current members.
    pub fn to_raw(&self) -> IndexMap<T, ()> {
        self.raw.borrow().entries.clone()
    }

    pub fn to_readonly(&self) -> Self {
        ReactiveSet {
            raw: self.raw.clone(),
            flavor: if self.flavor.is_shallow() {
                Flavor::ShallowReadonly
            } else {
                Flavor::Readonly
            },
        }
    }

    pub fn same_raw_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.raw, &other.raw)
    }
}
