//! `Ref`/`ShallowRef`: a single reactive cell, independent of any property
//! bag (`spec.md` §3, §6). The simplest possible dep source: one `Dep`,
//! one stored value.

use crate::{dep::DepId, runtime::with_runtime, value::same_value};
use std::{cell::RefCell, rc::Rc};

struct RefState<T> {
    value: RefCell<T>,
    dep_id: DepId,
    shallow: bool,
}

/// A reactive cell holding a single value of type `T`.
///
/// Reading [`Ref::get`] tracks the calling subscriber; writing via
/// [`Ref::set`] triggers every tracked subscriber, but only if the new
/// value differs from the old one by [`same_value`] (`spec.md` §4.1's
/// SameValue-gated trigger).
pub struct Ref<T> {
    state: Rc<RefState<T>>,
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Ref {
            state: self.state.clone(),
        }
    }
}

impl<T: PartialEq + Clone + 'static> Ref<T> {
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
    fn build(value: T, shallow: bool) -> Self {
        let dep_id = with_runtime(|rt| rt.new_dep());
        Ref {
            state: Rc::new(RefState {
                value: RefCell::new(value),
                dep_id,
                shallow,
            }),
        }
    }

    /// Creates a deep reactive ref: `spec.md` §4.6's "deeply reactive"
    /// default, so a `Ref<Reactive>`'s nested object is itself reactive
    /// where `T` is a wrapper type that already does so.
    pub fn new(value: T) -> Self {
        Self::build(value, false)
    }

    /// Creates a shallow reactive ref: reassigning `.value` is tracked, but
    /// nested mutation through the stored value is not (`spec.md` §4.6).
    pub fn new_shallow(value: T) -> Self {
        Self::build(value, true)
    }

    /// Reads the current value, tracking the calling subscriber.
    pub fn get(&self) -> T {
        with_runtime(|rt| rt.track_dep(self.state.dep_id));
        self.state.value.borrow().clone()
    }

    /// Reads the current value without tracking.
    pub fn peek(&self) -> T {
        self.state.value.borrow().clone()
    }

    /// Writes a new value, triggering subscribers iff it differs from the
    /// old one.
    pub fn set(&self, value: T) {
        let changed = !same_value(&*self.state.value.borrow(), &value);
        *self.state.value.borrow_mut() = value;
        if changed {
            with_runtime(|rt| rt.trigger_dep(self.state.dep_id));
        }
    }

    /// `true` for a ref created with [`Ref::new_shallow`].
    pub fn is_shallow(&self) -> bool {
        self.state.shallow
    }
}

/// Creates a deep [`Ref`].
pub fn reactive_ref<T: PartialEq + Clone + 'static>(value: T) -> Ref<T> {
    Ref::new(value)
}

/// Creates a [`Ref`] that only tracks reassignment of `.value`, not
/// mutation through it.
pub fn shallow_ref<T: PartialEq + Clone + 'static>(value: T) -> Ref<T> {
    Ref::new_shallow(value)
}
