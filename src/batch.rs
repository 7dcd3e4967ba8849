//! The public batch API (`spec.md` §4.4, §6): defers effect (and computed
//! propagation) dispatch until a matching `end_batch`, so a sequence of
//! writes settles once instead of once per write.

use crate::runtime::with_runtime;

/// Increments the batch depth. Writes made before the matching
/// [`end_batch`] still update state and version numbers immediately; only
/// dispatch is deferred.
pub fn start_batch() {
    with_runtime(|rt| rt.start_batch());
}

/// Decrements the batch depth, draining the queued computed propagation
/// and effect dispatch once it reaches zero.
pub fn end_batch() {
    with_runtime(|rt| rt.end_batch());
}

/// Runs `f` inside a [`start_batch`]/[`end_batch`] pair, draining on return
/// (or on unwind, since `end_batch` is run via a guard).
pub fn batch<T>(f: impl FnOnce() -> T) -> T {
    start_batch();
    struct Guard;
    impl Drop for Guard {
        fn drop(&mut self) {
            end_batch();
        }
    }
    let _guard = Guard;
    f()
}
