//! Error types for the handful of fallible entry points. Per `spec.md` §7,
//! the core almost never returns `Result` — most "error" conditions (writing
//! a readonly proxy, notifying a stopped effect, reactivity on a primitive)
//! are defined to be silent no-ops, not failures. `ReactivityError` exists
//! for the few genuine misuse cases a caller can act on.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReactivityError {
    /// Returned by [`crate::computed::Computed::set`] when the computed was
    /// constructed from a bare getter ([`crate::computed::Computed::new`])
    /// rather than a `{ get, set }` pair
    /// ([`crate::computed::Computed::new_writable`]).
    #[error("computed has no setter")]
    NoSetter,
}
