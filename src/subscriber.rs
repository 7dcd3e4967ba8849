//! `Subscriber`: the runtime-side record shared by [`crate::effect::ReactiveEffect`]
//! and [`crate::computed::Computed`] (`spec.md` §3, §4.2).

use crate::{
    dep::{DepId, LinkId},
    flags::SubscriberFlags,
};
use std::rc::Rc;

slotmap::new_key_type! {
    /// Identifies one subscriber: an effect or a computed.
    pub struct SubscriberId;
}

/// Anything a [`SubscriberId`] can be dispatched to when it's pulled off the
/// batch queue. Implemented by `ReactiveEffect` and `Computed`.
pub(crate) trait AnySubscriber {
    /// Re-run (effect) or refresh (computed) this subscriber, honoring a
    /// user-supplied scheduler if one was configured.
    fn run(&self, id: SubscriberId);

    /// Performs the real run protocol unconditionally, bypassing any
    /// scheduler indirection. Used by the scheduler's own callback to
    /// actually do the work once it decides to. Defaults to `run` for
    /// subscribers that have no scheduler concept (every `Computed`).
    fn force_run(&self, id: SubscriberId) {
        self.run(id);
    }

    /// Run the user's `onStop` callback, if any. Called once, from
    /// `stop()`.
    fn on_stop(&self) {}

    /// The `Dep` this subscriber is itself a source through, if it's a
    /// computed. `None` for plain effects.
    fn own_dep(&self) -> Option<DepId> {
        None
    }
}

#[derive(Clone)]
pub(crate) enum SubscriberKind {
    Effect(Rc<dyn AnySubscriber>),
    Computed(Rc<dyn AnySubscriber>),
}

impl SubscriberKind {
    pub fn inner(&self) -> &Rc<dyn AnySubscriber> {
        match self {
            SubscriberKind::Effect(e) => e,
            SubscriberKind::Computed(c) => c,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, SubscriberKind::Computed(_))
    }
}

/// The per-subscriber bookkeeping record stored in
/// [`crate::runtime::Runtime::subscribers`].
pub(crate) struct Subscriber {
    pub flags: SubscriberFlags,
    pub deps_head: Option<LinkId>,
    pub deps_tail: Option<LinkId>,
    /// Intrusive singly-linked batch-queue slot (`spec.md` §4.4).
    pub batch_next: Option<SubscriberId>,
    pub kind: SubscriberKind,
    /// The scope that owns this subscriber, if any, so `EffectScope::stop`
    /// can remove it from the scope's effect list without a second lookup.
    pub owner_scope: Option<crate::scope::ScopeId>,
}
