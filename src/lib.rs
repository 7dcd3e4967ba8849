//! A fine-grained reactivity core.
//!
//! The system is built from two halves that depend on each other: sources
//! ([`Ref`], [`computed::Computed`], and the fields of a [`reactive::object::Reactive`]/
//! [`reactive::array::ReactiveArray`]/`Map`/`Set` wrapper) and subscribers
//! ([`effect::ReactiveEffect`], and `Computed` again, since a computed is
//! both). Reading a source while a subscriber is running links the two;
//! writing a source re-runs every subscriber still linked to it, batched
//! and ordered so a whole chain of computeds settles before any effect
//! sees an inconsistent intermediate state.
//!
//! ```
//! use fine_reactive::{effect::effect, ref_::reactive_ref};
//!
//! let count = reactive_ref(0);
//! let seen = reactive_ref(Vec::<i32>::new());
//!
//! let seen_for_effect = seen.clone();
//! effect(move || {
//!     let mut log = seen_for_effect.peek();
//!     log.push(count.get());
//!     seen_for_effect.set(log);
//! });
//!
//! count.set(1);
//! assert_eq!(seen.peek(), vec![0, 1]);
//! ```
//!
//! Dependency tracking, dirty propagation, and [`batch::batch`] scheduling
//! all live in [`runtime`], behind a single thread-local [`runtime::Runtime`] —
//! this crate is intentionally single-threaded (see the module docs there
//! for why).

pub mod batch;
pub mod computed;
mod dep;
pub mod effect;
pub mod error;
mod flags;
pub mod key;
pub mod reactive;
pub mod ref_;
mod runtime;
pub mod scope;
mod subscriber;
mod value;

pub use computed::{computed, computed_writable, Computed};
pub use effect::{effect, effect_with_options, EffectOptions, ReactiveEffect};
pub use error::ReactivityError;
pub use key::{ReactiveKey, TriggerOp};
pub use ref_::{reactive_ref, shallow_ref, Ref};
pub use scope::{effect_scope, on_scope_cleanup, EffectScope};

/// Runs `f` without establishing any dependency links, even if a
/// subscriber is currently tracking (`spec.md` §6 `untrack`).
pub fn untrack<T>(f: impl FnOnce() -> T) -> T {
    runtime::with_runtime(|rt| rt.untrack(f))
}
