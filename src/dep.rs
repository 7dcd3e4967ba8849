//! `Dep` and `Link`: the two record types the dependency graph is built
//! from (`spec.md` §3, §4.1).
//!
//! Both are allocated in slab arenas on [`crate::runtime::Runtime`] rather
//! than as individually heap-allocated, reference-counted nodes — per
//! `spec.md` §9's systems-language guidance, a `Link` is just an index into
//! a `SlotMap`, and detaching it returns the slot to `SlotMap`'s own
//! freelist.

use crate::subscriber::SubscriberId;

slotmap::new_key_type! {
    /// Identifies one change source: a `(target, key)` pair, a standalone
    /// [`crate::ref_::Ref`] cell, or a [`crate::computed::Computed`]'s own
    /// output.
    pub struct DepId;
}

slotmap::new_key_type! {
    /// Identifies one edge between a [`DepId`] and a [`SubscriberId`].
    pub struct LinkId;
}

/// A change source. Holds a monotonic version counter and the head/tail of
/// the doubly-linked list of [`Link`]s to its current subscribers.
#[derive(Default)]
pub(crate) struct Dep {
    pub version: u64,
    pub subs_head: Option<LinkId>,
    pub subs_tail: Option<LinkId>,
    /// Set when this `Dep` is a computed's own output dep, so that
    /// propagation during batch drain can tell "notified because an
    /// upstream computed changed" apart from "notified because a plain
    /// source changed" (see [`crate::flags::SubscriberFlags::PENDING`]).
    pub owner_computed: Option<SubscriberId>,
}

impl Dep {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owned_by(owner: SubscriberId) -> Self {
        Self {
            owner_computed: Some(owner),
            ..Self::default()
        }
    }
}

/// An edge between one [`Dep`] and one subscriber. Carries the dep version
/// observed the last time the subscriber's run confirmed it, plus the four
/// pointers threading it through both the dep's subscriber list and the
/// subscriber's dep list.
pub(crate) struct Link {
    pub dep: DepId,
    pub sub: SubscriberId,
    pub version: u64,
    pub prev_dep: Option<LinkId>,
    pub next_dep: Option<LinkId>,
    pub prev_sub: Option<LinkId>,
    pub next_sub: Option<LinkId>,
}
