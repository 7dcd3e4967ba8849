//! Reactive wrapper types over plain data and collections (`spec.md` §4.6,
//! §4.7), plus the flavor-query helpers `spec.md` §6 lists alongside
//! `reactive`/`readonly` (`isReactive`, `isReadonly`, `isShallow`,
//! `isProxy`).
//!
//! Rust has no object/property reflection to build a generic `Proxy` on top
//! of, so each shape (plain object, array, map, set) gets its own explicit
//! wrapper implementing the track/trigger contract directly, per
//! `spec.md` §9.

pub mod array;
pub mod collections;
pub mod object;
pub(crate) mod target_map;

use target_map::Flavor;

/// Implemented by every reactive wrapper type so the flavor-query helpers
/// below (and anything generic over "some reactive handle") can be written
/// once.
pub trait ReactiveHandle {
    fn flavor(&self) -> Flavor;
}

/// `spec.md` §6 `toRaw`: unwraps a reactive handle back to its plain Rust
/// value. In this crate a wrapper never hides a nested proxy chain the way
/// a JS `Proxy` can (there's no `RAW` back-pointer to walk iteratively —
/// each wrapper holds its raw storage directly), so one call always reaches
/// the plain value; "iteratively follow RAW" collapses to a single read.
pub trait ToRaw {
    type Raw;

    fn to_raw(&self) -> Self::Raw;
}

/// Free-function form matching `spec.md` §6's `toRaw(x)`.
pub fn to_raw<H: ToRaw>(handle: &H) -> H::Raw {
    handle.to_raw()
}

impl<V> ReactiveHandle for object::Reactive<V> {
    fn flavor(&self) -> Flavor {
        object::Reactive::flavor(self)
    }
}

impl<T> ReactiveHandle for array::ReactiveArray<T> {
    fn flavor(&self) -> Flavor {
        array::ReactiveArray::flavor(self)
    }
}

impl<V: Clone + PartialEq + 'static> ToRaw for object::Reactive<V> {
    type Raw = rustc_hash::FxHashMap<crate::key::ReactiveKey, V>;

    fn to_raw(&self) -> Self::Raw {
        object::Reactive::to_raw(self)
    }
}

impl<T: Clone + PartialEq + 'static> ToRaw for array::ReactiveArray<T> {
    type Raw = Vec<T>;

    fn to_raw(&self) -> Self::Raw {
        array::ReactiveArray::to_raw(self)
    }
}

impl<K, V> ReactiveHandle for collections::ReactiveMap<K, V> {
    fn flavor(&self) -> Flavor {
        collections::ReactiveMap::flavor(self)
    }
}

impl<T> ReactiveHandle for collections::ReactiveSet<T> {
    fn flavor(&self) -> Flavor {
        collections::ReactiveSet::flavor(self)
    }
}

impl<K, V> ToRaw for collections::ReactiveMap<K, V>
where
    K: std::hash::Hash + Eq + Clone + ToString + 'static,
    V: Clone + PartialEq + 'static,
{
    type Raw = indexmap::IndexMap<K, V>;

    fn to_raw(&self) -> Self::Raw {
        collections::ReactiveMap::to_raw(self)
    }
}

impl<T> ToRaw for collections::ReactiveSet<T>
where
    T: std::hash::Hash + Eq + Clone + ToString + 'static,
{
    type Raw = indexmap::IndexMap<T, ()>;

    fn to_raw(&self) -> Self::Raw {
        collections::ReactiveSet::to_raw(self)
    }
}

/// `spec.md` §6 `isReactive`: `true` for any non-readonly wrapper
/// (shallow or deep).
pub fn is_reactive(handle: &impl ReactiveHandle) -> bool {
    !handle.flavor().is_readonly()
}

/// `spec.md` §6 `isReadonly`.
pub fn is_readonly(handle: &impl ReactiveHandle) -> bool {
    handle.flavor().is_readonly()
}

/// `spec.md` §6 `isShallow`.
pub fn is_shallow(handle: &impl ReactiveHandle) -> bool {
    handle.flavor().is_shallow()
}

/// `spec.md` §6 `isProxy`: any of the above is one of our explicit
/// wrapper types, so this is always `true` for a `ReactiveHandle`. Kept as
/// a named function anyway so call sites read the same as the other
/// flavor queries.
pub fn is_proxy(_handle: &impl ReactiveHandle) -> bool {
    true
}
