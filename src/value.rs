//! Small pure helpers the core depends on but does not itself specify the
//! shape of (`spec.md` §1 keeps "generic value helpers" out of scope beyond
//! this).

/// SameValue-ish equality gate: `spec.md` §4.1/§4.6 define a write as a
/// no-op (no trigger) when the new value is SameValue-equal to the old one.
/// `T: PartialEq`'s `==` is the closest general Rust analogue; it diverges
/// from SameValue for `f64` (`NaN != NaN`, `+0.0 == -0.0`), which is an
/// accepted gap for this crate's generic `T` — a write of `NaN` over `NaN`
/// will trigger where true SameValue semantics would treat it as a no-op.
/// Used by [`crate::ref_::Ref::set`] and the `reactive::*` wrapper writes to
/// decide whether a mutation is a no-op.
pub fn same_value<T: PartialEq>(a: &T, b: &T) -> bool {
    a == b
}
