use bitflags::bitflags;

bitflags! {
    /// State bits for anything that runs in a tracking context
    /// ([`crate::effect::ReactiveEffect`] or [`crate::computed::Computed`]),
    /// per `spec.md` §4.2.
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct SubscriberFlags: u16 {
        /// Has not been stopped.
        const ACTIVE        = 1 << 0;
        /// Currently executing its function; guards against nested
        /// self-triggering.
        const RUNNING        = 1 << 1;
        /// Reads performed right now should establish deps.
        const TRACKING       = 1 << 2;
        /// Already queued onto the current batch; prevents duplicate
        /// enqueue.
        const NOTIFIED       = 1 << 3;
        /// At least one dep's version has advanced since the last
        /// successful run; needs to re-run (effect) or recompute
        /// (computed).
        const DIRTY          = 1 << 4;
        /// A computed ancestor may be dirty; must be revalidated before
        /// the cached value can be trusted.
        const PENDING        = 1 << 5;
        /// Notifications queue but don't dispatch until resumed.
        const PAUSED         = 1 << 6;
        /// A single self-notification during the run is permitted.
        const ALLOW_RECURSE  = 1 << 7;
    }
}

impl Default for SubscriberFlags {
    fn default() -> Self {
        SubscriberFlags::ACTIVE
    }
}
