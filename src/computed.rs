//! `Computed`: a lazily-evaluated, cached derivation that is both a
//! subscriber (it tracks whatever it reads) and a dep source (other
//! subscribers track it in turn) — `spec.md` §3, §4.3.

use crate::{
    dep::DepId,
    error::ReactivityError,
    flags::SubscriberFlags,
    runtime::with_runtime,
    subscriber::{AnySubscriber, SubscriberId, SubscriberKind},
    value::same_value,
};
use std::{cell::RefCell, rc::Rc};

struct ComputedState<T> {
    getter: Box<dyn Fn(Option<&T>) -> T>,
    setter: Option<Box<dyn Fn(T)>>,
    value: RefCell<Option<T>>,
    dep_id: DepId,
}

impl<T: PartialEq + 'static> AnySubscriber for ComputedState<T> {
    fn run(&self, id: SubscriberId) {
        self.refresh(id);
    }

    fn own_dep(&self) -> Option<DepId> {
        Some(self.dep_id)
    }
}

impl<T: PartialEq + 'static> ComputedState<T> {
    /// `spec.md` §4.3's refresh: tracks like an effect, then compares the
    /// freshly computed value against the cached one with `PartialEq` (the
    /// closest Rust analogue to SameValue for an arbitrary `T`) and only
    /// bumps its own dep's version if the value actually changed — this is
    /// what keeps chains of computeds glitch-free.
    fn refresh(&self, id: SubscriberId) {
        with_runtime(|rt| {
            let prev_sub = rt.active_sub.replace(Some(id));
            rt.set_flags(id, |f| {
                f.insert(SubscriberFlags::RUNNING | SubscriberFlags::TRACKING);
                f.remove(SubscriberFlags::DIRTY | SubscriberFlags::PENDING);
            });
            rt.reset_deps_tail(id);

            let new_value = {
                let old = self.value.borrow();
                (self.getter)(old.as_ref())
            };

            let changed = match self.value.borrow().as_ref() {
                Some(old) => !same_value(old, &new_value),
                None => true,
            };
            *self.value.borrow_mut() = Some(new_value);

            rt.trim_stale_deps(id);
            rt.active_sub.set(prev_sub);
            rt.set_flags(id, |f| f.remove(SubscriberFlags::RUNNING));

            if changed {
                rt.bump_dep_version(self.dep_id);
            }
        });
    }
}

/// A cached, lazily (re)computed derivation of other reactive state.
///
/// Reading a `Computed` (via [`Computed::get`]) refreshes its cached value
/// only if something it depends on actually changed since the last read —
/// notifications merely mark it `PENDING`; the real check happens on pull.
pub struct Computed<T> {
    id: SubscriberId,
    dep_id: DepId,
    state: Rc<ComputedState<T>>,
}

impl<T> Clone for Computed<T> {
    fn clone(&self) -> Self {
        Computed {
            id: self.id,
            dep_id: self.dep_id,
            state: self.state.clone(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Computed<T> {
    /// Creates a read-only computed from a getter closure. The getter is
    /// called with the previously cached value (`None` on the first run),
    /// mirroring `spec.md` §4.3's "recompute(oldValue)".
    pub fn new(getter: impl Fn(Option<&T>) -> T + 'static) -> Self {
        Self::build(getter, None)
    }

    /// Creates a writable computed (`spec.md` §6's `{ get, set }` form).
    /// Calling [`Computed::set`] invokes `setter` directly; it's up to the
    /// setter to mutate whatever underlying reactive state `getter` reads.
    pub fn new_writable(
        getter: impl Fn(Option<&T>) -> T + 'static,
        setter: impl Fn(T) + 'static,
    ) -> Self {
        Self::build(getter, Some(Box::new(setter)))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
    fn build(getter: impl Fn(Option<&T>) -> T + 'static, setter: Option<Box<dyn Fn(T)>>) -> Self {
        with_runtime(|rt| {
            let id = rt.reserve_subscriber();
            let dep_id = rt.new_owned_dep(id);
            let state = Rc::new(ComputedState {
                getter: Box::new(getter),
                setter,
                value: RefCell::new(None),
                dep_id,
            });
            let owner_scope = rt.active_scope.get();
            rt.install_subscriber(id, SubscriberKind::Computed(state.clone()), owner_scope);
            // Dirty from birth: nothing has been computed yet, so the
            // first `get()` must refresh unconditionally.
            rt.set_flags(id, |f| f.insert(SubscriberFlags::DIRTY));
            Computed { id, dep_id, state }
        })
    }

    /// Returns the current value, recomputing it first if anything it
    /// depends on changed since the last read. Tracked by the currently
    /// running subscriber, if any.
    pub fn get(&self) -> T {
        with_runtime(|rt| {
            if rt.resolve_dirty(self.id) {
                self.state.refresh(self.id);
            }
            rt.track_dep(self.dep_id);
            self.state
                .value
                .borrow()
                .clone()
                .expect("computed value populated by the refresh above")
        })
    }

    /// Writes through this computed's setter. Errs with
    /// [`ReactivityError::NoSetter`] if this was constructed with
    /// [`Computed::new`] rather than [`Computed::new_writable`].
    pub fn set(&self, value: T) -> Result<(), ReactivityError> {
        match &self.state.setter {
            Some(setter) => {
                setter(value);
                Ok(())
            }
            None => Err(ReactivityError::NoSetter),
        }
    }
}

/// Creates a read-only [`Computed`] from a getter.
pub fn computed<T: Clone + PartialEq + 'static>(
    getter: impl Fn(Option<&T>) -> T + 'static,
) -> Computed<T> {
    Computed::new(getter)
}

/// Creates a writable [`Computed`] from a `{ get, set }` pair.
pub fn computed_writable<T: Clone + PartialEq + 'static>(
    getter: impl Fn(Option<&T>) -> T + 'static,
    setter: impl Fn(T) + 'static,
) -> Computed<T> {
    Computed::new_writable(getter, setter)
}
