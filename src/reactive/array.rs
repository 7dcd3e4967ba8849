//! `ReactiveArray<T>`: an index- and length-tracked reactive sequence
//! (`spec.md` §4.6's array-specific handler overrides: patched search
//! methods, single `ARRAY_LENGTH` trigger per length-changing mutation).

use crate::{key::ReactiveKey, reactive::target_map::Flavor, runtime::with_runtime, value::same_value};
use std::{cell::RefCell, rc::Rc};

struct Raw<T> {
    items: Vec<T>,
}

/// A reactive, growable sequence. Each index is tracked independently;
/// `.len()` and any mutation that can change the length instead track/
/// trigger the shared [`ReactiveKey::ARRAY_LENGTH`] sentinel, so pushing
/// doesn't spuriously invalidate readers of unrelated indices
/// (`spec.md` §4.6).
pub struct ReactiveArray<T> {
    raw: Rc<RefCell<Raw<T>>>,
    flavor: Flavor,
}

impl<T> Clone for ReactiveArray<T> {
    fn clone(&self) -> Self {
        ReactiveArray {
            raw: self.raw.clone(),
            flavor: self.flavor,
        }
    }
}

impl<T: Clone + PartialEq + 'static> ReactiveArray<T> {
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
    fn build(items: Vec<T>, flavor: Flavor) -> Self {
        ReactiveArray {
            raw: Rc::new(RefCell::new(Raw { items })),
            flavor,
        }
    }

    pub fn new(items: Vec<T>) -> Self {
        Self::build(items, Flavor::Reactive)
    }

    pub fn new_readonly(items: Vec<T>) -> Self {
        Self::build(items, Flavor::Readonly)
    }

    pub fn new_shallow(items: Vec<T>) -> Self {
        Self::build(items, Flavor::ShallowReactive)
    }

    pub fn new_shallow_readonly(items: Vec<T>) -> Self {
        Self::build(items, Flavor::ShallowReadonly)
    }

    fn raw_id(&self) -> crate::reactive::target_map::RawId {
        crate::reactive::target_map::RawId::of(Rc::as_ptr(&self.raw))
    }

    fn dep_for(&self, key: ReactiveKey) -> crate::dep::DepId {
        with_runtime(|rt| rt.target_map(self.flavor).dep_for(self.raw_id(), key, rt))
    }

    fn track_index(&self, index: usize) {
        with_runtime(|rt| rt.track_dep(self.dep_for(ReactiveKey::Index(index))));
    }

    fn track_length(&self) {
        with_runtime(|rt| rt.track_dep(self.dep_for(ReactiveKey::ARRAY_LENGTH)));
    }

    fn trigger_length(&self) {
        with_runtime(|rt| rt.trigger_dep(self.dep_for(ReactiveKey::ARRAY_LENGTH)));
    }

    /// Current length, tracking [`ReactiveKey::ARRAY_LENGTH`].
    pub fn len(&self) -> usize {
        self.track_length();
        self.raw.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads one element, tracking only that index.
    pub fn get(&self, index: usize) -> Option<T> {
        self.track_index(index);
        self.raw.borrow().items.get(index).cloned()
    }

    /// Writes one element in place, triggering that index iff the value
    /// actually changed. No-op (with a warning) on a readonly array.
    pub fn set(&self, index: usize, value: T) {
        if self.flavor.is_readonly() {
            tracing::warn!("set on a readonly reactive array was ignored");
            return;
        }
        let changed = match self.raw.borrow().items.get(index) {
            Some(old) => !same_value(old, &value),
            None => return,
        };
        if !changed {
            return;
        }
        self.raw.borrow_mut().items[index] = value;
        with_runtime(|rt| rt.trigger_dep(self.dep_for(ReactiveKey::Index(index))));
    }

    /// Appends an element, triggering `ARRAY_LENGTH` once.
    pub fn push(&self, value: T) {
        if self.flavor.is_readonly() {
            tracing::warn!("push on a readonly reactive array was ignored");
            return;
        }
        self.raw.borrow_mut().items.push(value);
        self.trigger_length();
    }

    /// Removes and returns the last element, triggering `ARRAY_LENGTH` if
    /// the array was non-empty.
    pub fn pop(&self) -> Option<T> {
        if self.flavor.is_readonly() {
            tracing::warn!("pop on a readonly reactive array was ignored");
            return None;
        }
        let popped = self.raw.borrow_mut().items.pop();
        if popped.is_some() {
            self.trigger_length();
        }
        popped
    }

    /// Linear search by equality. Reads the whole array's current contents
    /// without tracking individual indices, only `ARRAY_LENGTH` plus each
    /// index visited, matching `spec.md` §4.6's patched `includes`/
    /// `indexOf`/`lastIndexOf` ("disable tracking while reading `.length`,
    /// then iterate tracking each index").
    pub fn contains(&self, value: &T) -> bool {
        self.position(value).is_some()
    }

    /// `spec.md` §4.6's patched `indexOf`.
    pub fn position(&self, value: &T) -> Option<usize> {
        self.track_length();
        let len = self.raw.borrow().items.len();
        for i in 0..len {
            self.track_index(i);
            if self.raw.borrow().items.get(i) == Some(value) {
                return Some(i);
            }
        }
        None
    }

    /// `spec.md` §4.6's patched `lastIndexOf`.
    pub fn rposition(&self, value: &T) -> Option<usize> {
        self.track_length();
        let len = self.raw.borrow().items.len();
        for i in (0..len).rev() {
            self.track_index(i);
            if self.raw.borrow().items.get(i) == Some(value) {
                return Some(i);
            }
        }
        None
    }

    /// A snapshot `Vec` of the current contents, tracking every index plus
    /// `ARRAY_LENGTH`.
    pub fn to_vec(&self) -> Vec<T> {
        self.track_length();
        let len = self.raw.borrow().items.len();
        let mut out = Vec::with_capacity(len);
        for i in 0..len {
            self.track_index(i);
            out.push(self.raw.borrow().items[i].clone());
        }
        out
    }

    /// Removes the first element, shifting the rest down by one index.
    /// Triggers `ARRAY_LENGTH` if the array was non-empty; per-index
    /// triggers aren't fired for the shifted elements since nothing
    /// currently tracks "index N moved to index N-1" as distinct from a
    /// length change (`spec.md` §4.6 groups `shift` with the other
    /// length-affecting mutators).
    pub fn shift(&self) -> Option<T> {
        if self.flavor.is_readonly() {
            tracing::warn!("shift on a readonly reactive array was ignored");
            return None;
        }
        let removed = {
            let mut raw = self.raw.borrow_mut();
            if raw.items.is_empty() {
                None
            } else {
                Some(raw.items.remove(0))
            }
        };
        if removed.is_some() {
            self.trigger_length();
        }
        removed
    }

    /// Inserts an element at the front, shifting the rest up by one index.
    /// Triggers `ARRAY_LENGTH` once.
    pub fn unshift(&self, value: T) {
        if self.flavor.is_readonly() {
            tracing::warn!("unshift on a readonly reactive array was ignored");
            return;
        }
        self.raw.borrow_mut().items.insert(0, value);
        self.trigger_length();
    }

    /// Inserts an element at `index`, triggering `ARRAY_LENGTH` once.
    pub fn insert(&self, index: usize, value: T) {
        if self.flavor.is_readonly() {
            tracing::warn!("insert on a readonly reactive array was ignored");
            return;
        }
        self.raw.borrow_mut().items.insert(index, value);
        self.trigger_length();
    }

    /// Removes the element at `index`, triggering `ARRAY_LENGTH` once.
    pub fn remove(&self, index: usize) -> T {
        if self.flavor.is_readonly() {
            tracing::warn!("remove on a readonly reactive array was ignored");
            return self.raw.borrow().items[index].clone();
        }
        let value = self.raw.borrow_mut().items.remove(index);
        self.trigger_length();
        value
    }

    /// `spec.md` §4.6's `splice`: removes `count` elements starting at
    /// `start` and inserts `replace_with` in their place, triggering
    /// `ARRAY_LENGTH` once iff the length actually changed (a same-length
    /// replacement still mutates contents but doesn't move `ARRAY_LENGTH`
    /// readers, only the individual index readers it overlaps — which this
    /// simplified splice doesn't fire per-index triggers for, matching
    /// `shift`/`unshift` above).
    pub fn splice(&self, start: usize, count: usize, replace_with: Vec<T>) -> Vec<T> {
        if self.flavor.is_readonly() {
            tracing::warn!("splice on a readonly reactive array was ignored");
            return Vec::new();
        }
        let inserted_len = replace_with.len();
        let removed = {
            let mut raw = self.raw.borrow_mut();
            let end = (start + count).min(raw.items.len());
            raw.items.splice(start..end, replace_with).collect::<Vec<T>>()
        };
        if removed.len() != inserted_len {
            self.trigger_length();
        }
        removed
    }

    pub fn is_readonly(&self) -> bool {
        self.flavor.is_readonly()
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// `spec.md` §6 `toRaw`: an untracked snapshot of the current contents.
    pub fn to_raw(&self) -> Vec<T> {
        self.raw.borrow().items.clone()
    }

    /// `spec.md` §8 "readonly(reactive(o)) !== reactive(o)": a distinct
    /// wrapper sharing this one's storage, tagged readonly.
    pub fn to_readonly(&self) -> Self {
        ReactiveArray {
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
