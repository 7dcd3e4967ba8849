//! The process-wide mutable state the reactive system needs: the dep/link/
//! subscriber arenas, the scope tree, the active-subscriber and
//! active-scope "registers", the batch queues, and the global version
//! counter (`spec.md` §3 "Global version", §5, §9).
//!
//! `spec.md` §9 leaves the choice open ("encapsulate in an explicit
//! `ReactivityRuntime` object... or keep thread-local for single-threaded
//! runtimes"). This crate is single-threaded by design (§5), so it follows
//! `leptos_reactive::runtime`'s lead and keeps one `Runtime` per thread in a
//! `thread_local!`, rather than threading a handle through every call.

use crate::{
    dep::{Dep, DepId, Link, LinkId},
    flags::SubscriberFlags,
    reactive::target_map::{Flavor, TargetMap},
    scope::{ScopeId, ScopeRecord},
    subscriber::{AnySubscriber, Subscriber, SubscriberId, SubscriberKind},
};
use slotmap::SlotMap;
use std::cell::{Cell, RefCell};

thread_local! {
    static RUNTIME: Runtime = Runtime::new();
}

/// Runs `f` with the thread's [`Runtime`]. Every public entry point in this
/// crate goes through this function; there is no way to observe a `Runtime`
/// from another thread, which is what lets the rest of the crate use `Rc`/
/// `RefCell` instead of `Arc`/`Mutex` (`spec.md` §5).
pub(crate) fn with_runtime<T>(f: impl FnOnce(&Runtime) -> T) -> T {
    RUNTIME.with(f)
}

pub(crate) struct Runtime {
    pub(crate) deps: RefCell<SlotMap<DepId, Dep>>,
    pub(crate) links: RefCell<SlotMap<LinkId, Link>>,
    pub(crate) subscribers: RefCell<SlotMap<SubscriberId, Subscriber>>,
    pub(crate) scopes: RefCell<SlotMap<ScopeId, ScopeRecord>>,

    pub(crate) active_sub: Cell<Option<SubscriberId>>,
    /// Whether reads under the current `active_sub` should actually track.
    /// Separate from `RUNNING` so `untrack`-style helpers can suspend
    /// tracking without touching the subscriber's own flags.
    pub(crate) should_track: Cell<bool>,
    pub(crate) active_scope: Cell<Option<ScopeId>>,
    pub(crate) scope_on_prev: RefCell<Vec<Option<ScopeId>>>,

    pub(crate) global_version: Cell<u64>,
    pub(crate) batch_depth: Cell<u32>,
    pub(crate) batch_computed_head: Cell<Option<SubscriberId>>,
    pub(crate) batch_effect_head: Cell<Option<SubscriberId>>,

    pub(crate) target_maps: [TargetMap; 4],
}

impl Runtime {
    fn new() -> Self {
        Self {
            deps: RefCell::new(SlotMap::with_key()),
            links: RefCell::new(SlotMap::with_key()),
            subscribers: RefCell::new(SlotMap::with_key()),
            scopes: RefCell::new(SlotMap::with_key()),
            active_sub: Cell::new(None),
            should_track: Cell::new(true),
            active_scope: Cell::new(None),
            scope_on_prev: RefCell::new(Vec::new()),
            global_version: Cell::new(0),
            batch_depth: Cell::new(0),
            batch_computed_head: Cell::new(None),
            batch_effect_head: Cell::new(None),
            target_maps: [
                TargetMap::new(),
                TargetMap::new(),
                TargetMap::new(),
                TargetMap::new(),
            ],
        }
    }

    pub(crate) fn target_map(&self, flavor: Flavor) -> &TargetMap {
        &self.target_maps[flavor as usize]
    }

    pub(crate) fn new_dep(&self) -> DepId {
        self.deps.borrow_mut().insert(Dep::new())
    }

    pub(crate) fn new_owned_dep(&self, owner: SubscriberId) -> DepId {
        self.deps.borrow_mut().insert(Dep::owned_by(owner))
    }

    // ---- tracking context -------------------------------------------------

    /// The currently running subscriber, if reads right now should be
    /// tracked at all.
    pub(crate) fn current_subscriber(&self) -> Option<SubscriberId> {
        if self.should_track.get() {
            self.active_sub.get()
        } else {
            None
        }
    }

    /// Runs `f` with tracking suspended, restoring the previous state
    /// afterwards even if `f` panics.
    pub(crate) fn untrack<T>(&self, f: impl FnOnce() -> T) -> T {
        let prev = self.should_track.replace(false);
        struct Restore<'a>(&'a Cell<bool>, bool);
        impl Drop for Restore<'_> {
            fn drop(&mut self) {
                self.0.set(self.1);
            }
        }
        let _restore = Restore(&self.should_track, prev);
        f()
    }

    /// `spec.md` §4.1 `track(target, key)`: called by every proxy `get`/
    /// `has`/`ownKeys` handler. A no-op if there's no active subscriber.
    pub(crate) fn track_dep(&self, dep_id: DepId) {
        let Some(sub_id) = self.current_subscriber() else {
            return;
        };
        self.dep_track(dep_id, sub_id);
    }

    /// `spec.md` §4.1 `dep.track()`.
    fn dep_track(&self, dep_id: DepId, sub_id: SubscriberId) {
        let dep_version = self.deps.borrow()[dep_id].version;

        let tail = self.subscribers.borrow()[sub_id].deps_tail;
        let reuse_candidate = match tail {
            Some(tail_link) => self.links.borrow()[tail_link].next_dep,
            None => self.subscribers.borrow()[sub_id].deps_head,
        };

        if let Some(link_id) = reuse_candidate {
            let matches = self.links.borrow()[link_id].dep == dep_id;
            if matches {
                self.links.borrow_mut()[link_id].version = dep_version;
                self.subscribers.borrow_mut()[sub_id].deps_tail = Some(link_id);
                return;
            }
        }

        self.link_new(dep_id, sub_id, dep_version, tail, reuse_candidate);
    }

    /// Inserts a new link for `(dep_id, sub_id)` at the current read
    /// position in `sub`'s dep list: right after `tail` (or at the head, if
    /// `tail` is `None`). `old_next` is whatever `dep_track` found at that
    /// position before deciding it didn't match (a stale link left over
    /// from a previous run, or `None` at a genuine list end) — it is
    /// spliced in as the new link's successor rather than discarded, so it
    /// stays reachable from `deps_tail.next_dep` and gets detached by
    /// [`Runtime::trim_stale_deps`] once the run confirms it's unused,
    /// instead of leaking off the end of the list (`spec.md` §3, §4.1,
    /// §8 "Link integrity").
    fn link_new(
        &self,
        dep_id: DepId,
        sub_id: SubscriberId,
        version: u64,
        tail: Option<LinkId>,
        old_next: Option<LinkId>,
    ) {
        let link_id = self.links.borrow_mut().insert(Link {
            dep: dep_id,
            sub: sub_id,
            version,
            prev_dep: None,
            next_dep: old_next,
            prev_sub: None,
            next_sub: None,
        });

        // Append to the dep's subscriber list (this list has nothing to do
        // with read order, so it's a plain append).
        {
            let mut deps = self.deps.borrow_mut();
            let dep = &mut deps[dep_id];
            let mut links = self.links.borrow_mut();
            if let Some(dep_tail) = dep.subs_tail {
                links[dep_tail].next_sub = Some(link_id);
                links[link_id].prev_sub = Some(dep_tail);
            } else {
                dep.subs_head = Some(link_id);
            }
            dep.subs_tail = Some(link_id);
        }

        // Splice into the subscriber's dep list at the current read
        // position, preserving whatever followed it.
        {
            let mut subs = self.subscribers.borrow_mut();
            let sub = &mut subs[sub_id];
            let mut links = self.links.borrow_mut();
            match tail {
                Some(tail_link) => {
                    links[tail_link].next_dep = Some(link_id);
                    links[link_id].prev_dep = Some(tail_link);
                }
                None => {
                    sub.deps_head = Some(link_id);
                }
            }
            if let Some(next) = old_next {
                links[next].prev_dep = Some(link_id);
            }
            sub.deps_tail = Some(link_id);
        }
    }

    /// Detaches one link from both the lists it's threaded through and
    /// frees its slot.
    fn unlink(&self, link_id: LinkId) {
        let (dep_id, sub_id, prev_dep, next_dep, prev_sub, next_sub) = {
            let links = self.links.borrow();
            let link = &links[link_id];
            (
                link.dep,
                link.sub,
                link.prev_dep,
                link.next_dep,
                link.prev_sub,
                link.next_sub,
            )
        };

        {
            let mut deps = self.deps.borrow_mut();
            let mut links = self.links.borrow_mut();
            match prev_sub {
                Some(p) => links[p].next_sub = next_sub,
                None => deps[dep_id].subs_head = next_sub,
            }
            match next_sub {
                Some(n) => links[n].prev_sub = prev_sub,
                None => deps[dep_id].subs_tail = prev_sub,
            }
        }

        {
            let mut subs = self.subscribers.borrow_mut();
            let mut links = self.links.borrow_mut();
            match prev_dep {
                Some(p) => links[p].next_dep = next_dep,
                None => subs[sub_id].deps_head = next_dep,
            }
            match next_dep {
                Some(n) => links[n].prev_dep = prev_dep,
                None => subs[sub_id].deps_tail = prev_dep,
            }
        }

        self.links.borrow_mut().remove(link_id);
    }

    /// Clears a subscriber's `deps_tail` back to "nothing confirmed yet",
    /// done at the start of every run before deps are re-tracked in order
    /// (`spec.md` §4.1's dep-reuse-by-position scheme).
    pub(crate) fn reset_deps_tail(&self, sub_id: SubscriberId) {
        if let Some(sub) = self.subscribers.borrow_mut().get_mut(sub_id) {
            sub.deps_tail = None;
        }
    }

    /// Detaches every link after `subs[sub_id].deps_tail` — the stale deps
    /// left over from a previous run that weren't re-confirmed this run
    /// (`spec.md` §4.1 "Edge policies").
    pub(crate) fn trim_stale_deps(&self, sub_id: SubscriberId) {
        let first_stale = {
            let subs = self.subscribers.borrow();
            let sub = &subs[sub_id];
            match sub.deps_tail {
                Some(tail) => self.links.borrow()[tail].next_dep,
                None => sub.deps_head,
            }
        };

        let mut cursor = first_stale;
        while let Some(link_id) = cursor {
            cursor = self.links.borrow()[link_id].next_dep;
            self.unlink(link_id);
        }
    }

    /// Detaches every dep link a subscriber holds (used by `stop`).
    pub(crate) fn detach_all_deps(&self, sub_id: SubscriberId) {
        let head = self.subscribers.borrow()[sub_id].deps_head;
        let mut cursor = head;
        while let Some(link_id) = cursor {
            cursor = self.links.borrow()[link_id].next_dep;
            self.unlink(link_id);
        }
        let mut subs = self.subscribers.borrow_mut();
        subs[sub_id].deps_head = None;
        subs[sub_id].deps_tail = None;
    }

    // ---- trigger / notify --------------------------------------------------

    /// `spec.md` §4.1 `trigger`: bumps the global version and the dep's own
    /// version, then notifies every linked subscriber. Wrapped in an
    /// implicit batch so that a single logical write that touches several
    /// deps (e.g. a key plus `ITERATE_KEY`) still dispatches effects once.
    pub(crate) fn trigger_dep(&self, dep_id: DepId) {
        self.start_batch();
        self.global_version.set(self.global_version.get() + 1);
        let (owner, subs_head) = {
            let mut deps = self.deps.borrow_mut();
            let dep = &mut deps[dep_id];
            dep.version += 1;
            (dep.owner_computed, dep.subs_head)
        };
        self.notify_subs(subs_head, owner.is_some());
        self.end_batch();
    }

    fn notify_subs(&self, head: Option<LinkId>, from_computed: bool) {
        // Snapshot first: a subscriber's own cleanup (e.g. `stop`) could
        // mutate this list while we're walking it.
        let mut subs = Vec::new();
        let mut cursor = head;
        while let Some(link_id) = cursor {
            let link = &self.links.borrow()[link_id];
            subs.push(link.sub);
            cursor = link.next_sub;
        }
        for sub_id in subs {
            self.notify_subscriber(sub_id, from_computed);
        }
    }

    /// `spec.md` §4.2 `effect.notify()` / `spec.md` §4.3's equivalent for
    /// computed: mark dirty, guard against harmful re-entrance, and enqueue
    /// onto the right batch queue.
    fn notify_subscriber(&self, sub_id: SubscriberId, from_computed: bool) {
        let (flags, is_computed) = {
            let subs = self.subscribers.borrow();
            let Some(sub) = subs.get(sub_id) else {
                return;
            };
            (sub.flags, sub.kind.is_computed())
        };

        if !flags.contains(SubscriberFlags::ACTIVE) {
            return;
        }

        if flags.contains(SubscriberFlags::RUNNING)
            && self.active_sub.get() == Some(sub_id)
            && !flags.contains(SubscriberFlags::ALLOW_RECURSE)
        {
            // Re-entry guard: a subscriber would otherwise notify itself
            // while running and recurse without bound.
            return;
        }

        if flags.contains(SubscriberFlags::NOTIFIED) {
            return;
        }

        {
            let mut subs = self.subscribers.borrow_mut();
            let sub = &mut subs[sub_id];
            sub.flags.insert(SubscriberFlags::NOTIFIED);
            // A direct write marks a subscriber unconditionally dirty. A
            // notification relayed through a computed only means "one of my
            // sources may have changed" — the computed's own value might
            // not actually differ, so downstream subscribers are only
            // PENDING until something actually reads (and so resolves)
            // them, which is what keeps a->c1->c2->e glitch-free.
            if from_computed {
                sub.flags.insert(SubscriberFlags::PENDING);
            } else {
                sub.flags.insert(SubscriberFlags::DIRTY);
            }
        }

        self.batch_enqueue(sub_id, is_computed);
    }

    /// Resolves whether a subscriber actually needs to (re)run: an
    /// unconditional `DIRTY` always does; a merely `PENDING` one only does
    /// if walking its own deps turns up one whose version no longer
    /// matches the link it tracked (`spec.md` §4.3's glitch-free check).
    pub(crate) fn resolve_dirty(&self, sub_id: SubscriberId) -> bool {
        let flags = self.flags(sub_id);
        if flags.contains(SubscriberFlags::DIRTY) {
            return true;
        }
        if !flags.contains(SubscriberFlags::PENDING) {
            return false;
        }
        if self.any_dep_stale(sub_id) {
            self.set_flags(sub_id, |f| f.insert(SubscriberFlags::DIRTY));
            true
        } else {
            self.set_flags(sub_id, |f| f.remove(SubscriberFlags::PENDING));
            false
        }
    }

    /// Walks a subscriber's deps looking for one whose version no longer
    /// matches the link. Before comparing, a dep owned by a still-`PENDING`
    /// or `DIRTY` computed is resolved (recursively, via `resolve_dirty` and
    /// a refresh) first — otherwise a `Computed` nobody has read yet would
    /// report an unchanged version even though its own sources moved,
    /// breaking chains like a -> c1 -> c2 -> e.
    fn any_dep_stale(&self, sub_id: SubscriberId) -> bool {
        let head = match self.subscribers.borrow().get(sub_id) {
            Some(sub) => sub.deps_head,
            None => return false,
        };
        let mut cursor = head;
        while let Some(link_id) = cursor {
            let (dep_id, link_version, next) = {
                let links = self.links.borrow();
                let link = &links[link_id];
                (link.dep, link.version, link.next_dep)
            };

            let owner = self.deps.borrow().get(dep_id).and_then(|d| d.owner_computed);
            if let Some(owner_id) = owner {
                if self.resolve_dirty(owner_id) {
                    self.run_subscriber(owner_id);
                }
            }

            if self.deps.borrow()[dep_id].version != link_version {
                return true;
            }
            cursor = next;
        }
        false
    }

    // ---- batch scheduler ----------------------------------------------------

    pub(crate) fn start_batch(&self) {
        self.batch_depth.set(self.batch_depth.get() + 1);
    }

    pub(crate) fn end_batch(&self) {
        let depth = self.batch_depth.get() - 1;
        self.batch_depth.set(depth);
        if depth == 0 {
            self.drain_batch();
        }
    }

    fn batch_enqueue(&self, sub_id: SubscriberId, is_computed: bool) {
        let head_cell = if is_computed {
            &self.batch_computed_head
        } else {
            &self.batch_effect_head
        };
        let prev_head = head_cell.get();
        self.subscribers.borrow_mut()[sub_id].batch_next = prev_head;
        head_cell.set(Some(sub_id));
    }

    /// Pops the entire queue rooted at `head_cell`, returning it oldest-
    /// enqueued-first (`spec.md` §4.4: "walking and reversing the head-
    /// inserted stack once").
    fn drain_queue(&self, head_cell: &Cell<Option<SubscriberId>>) -> Vec<SubscriberId> {
        let mut items = Vec::new();
        let mut cursor = head_cell.take();
        while let Some(sub_id) = cursor {
            let next = self.subscribers.borrow()[sub_id].batch_next;
            self.subscribers.borrow_mut()[sub_id].batch_next = None;
            items.push(sub_id);
            cursor = next;
        }
        items.reverse();
        items
    }

    /// `spec.md` §4.4 drain: computed first (to revalidate caches and
    /// propagate to their own downstream subs), then effects in FIFO
    /// enqueue order, repeating until both queues are empty. The first
    /// exception from a user effect/computed is captured and rethrown only
    /// after the whole queue has drained, so later subscribers still settle
    /// into a consistent state (`spec.md` §7).
    fn drain_batch(&self) {
        let mut first_panic: Option<Box<dyn std::any::Any + Send>> = None;

        loop {
            let computed = self.drain_queue(&self.batch_computed_head);
            let effects = self.drain_queue(&self.batch_effect_head);
            if computed.is_empty() && effects.is_empty() {
                break;
            }

            for sub_id in computed {
                let was_active = {
                    let mut subs = self.subscribers.borrow_mut();
                    let Some(sub) = subs.get_mut(sub_id) else {
                        continue;
                    };
                    sub.flags.remove(SubscriberFlags::NOTIFIED);
                    sub.flags.contains(SubscriberFlags::ACTIVE)
                };
                if !was_active {
                    continue;
                }
                // Propagate to the computed's own downstream subs; the
                // computed's *value* refreshes lazily on next read.
                let own_dep = self.computed_own_dep(sub_id);
                if let Some(dep_id) = own_dep {
                    let head = self.deps.borrow()[dep_id].subs_head;
                    self.notify_subs(head, true);
                }
            }

            for sub_id in effects {
                let eligible = {
                    let mut subs = self.subscribers.borrow_mut();
                    let Some(sub) = subs.get_mut(sub_id) else {
                        continue;
                    };
                    sub.flags.remove(SubscriberFlags::NOTIFIED);
                    sub.flags.contains(SubscriberFlags::ACTIVE)
                        && !sub.flags.contains(SubscriberFlags::PAUSED)
                };
                if !eligible || !self.resolve_dirty(sub_id) {
                    continue;
                }
                if first_panic.is_none() {
                    let result =
                        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                            self.run_subscriber(sub_id);
                        }));
                    if let Err(payload) = result {
                        first_panic = Some(payload);
                    }
                }
            }
        }

        if let Some(payload) = first_panic {
            std::panic::resume_unwind(payload);
        }
    }

    fn computed_own_dep(&self, sub_id: SubscriberId) -> Option<DepId> {
        self.subscribers
            .borrow()
            .get(sub_id)
            .and_then(|sub| sub.kind.inner().own_dep())
    }

    // ---- subscriber lifecycle ----------------------------------------------

    pub(crate) fn new_subscriber(
        &self,
        kind: SubscriberKind,
        owner_scope: Option<ScopeId>,
    ) -> SubscriberId {
        let id = self.subscribers.borrow_mut().insert(Subscriber {
            flags: SubscriberFlags::default(),
            deps_head: None,
            deps_tail: None,
            batch_next: None,
            kind,
            owner_scope,
        });
        if let Some(scope_id) = owner_scope {
            self.register_effect_on_scope(id, scope_id);
        }
        id
    }

    /// Reserves a [`SubscriberId`] with a placeholder kind, for callers that
    /// need the id to build the real kind (a `Computed`'s own output
    /// [`DepId`] is owned by its subscriber id, so the id must exist before
    /// the `ComputedState` that references it does). Pair with
    /// [`Runtime::install_subscriber`].
    pub(crate) fn reserve_subscriber(&self) -> SubscriberId {
        struct Placeholder;
        impl AnySubscriber for Placeholder {
            fn run(&self, _id: SubscriberId) {}
        }
        self.subscribers.borrow_mut().insert(Subscriber {
            flags: SubscriberFlags::default(),
            deps_head: None,
            deps_tail: None,
            batch_next: None,
            kind: SubscriberKind::Computed(std::rc::Rc::new(Placeholder)),
            owner_scope: None,
        })
    }

    /// Installs the real kind and owning scope for a [`SubscriberId`]
    /// obtained from [`Runtime::reserve_subscriber`].
    pub(crate) fn install_subscriber(
        &self,
        id: SubscriberId,
        kind: SubscriberKind,
        owner_scope: Option<ScopeId>,
    ) {
        if let Some(sub) = self.subscribers.borrow_mut().get_mut(id) {
            sub.kind = kind;
            sub.owner_scope = owner_scope;
        }
        if let Some(scope_id) = owner_scope {
            self.register_effect_on_scope(id, scope_id);
        }
    }

    /// Bumps a dep's version, with no further propagation. Called by a
    /// `Computed` once it has confirmed its freshly recomputed value
    /// actually differs from the cached one.
    ///
    /// No renotify is needed here: every subscriber transitively reachable
    /// through this dep was already marked `PENDING` (or `DIRTY`, if
    /// directly downstream of a raw write) by the structural graph walk
    /// `trigger_dep`/`drain_batch`'s computed phase performs at write time,
    /// which doesn't wait to find out whether values actually change. What
    /// this bump does is give `resolve_dirty`'s per-edge version comparison,
    /// performed lazily as each `PENDING` subscriber is actually resolved,
    /// something accurate to compare against.
    pub(crate) fn bump_dep_version(&self, dep_id: DepId) {
        self.global_version.set(self.global_version.get() + 1);
        if let Some(dep) = self.deps.borrow_mut().get_mut(dep_id) {
            dep.version += 1;
        }
    }

    pub(crate) fn flags(&self, sub_id: SubscriberId) -> SubscriberFlags {
        self.subscribers
            .borrow()
            .get(sub_id)
            .map_or(SubscriberFlags::empty(), |s| s.flags)
    }

    pub(crate) fn set_flags(&self, sub_id: SubscriberId, f: impl FnOnce(&mut SubscriberFlags)) {
        if let Some(sub) = self.subscribers.borrow_mut().get_mut(sub_id) {
            f(&mut sub.flags);
        }
    }

    /// `spec.md` §4.2 stop: clears ACTIVE, detaches all dep links, removes
    /// from the owning scope, invokes `onStop`. Idempotent.
    pub(crate) fn stop_subscriber(&self, sub_id: SubscriberId) {
        let already_stopped = {
            let subs = self.subscribers.borrow();
            !subs
                .get(sub_id)
                .map_or(false, |s| s.flags.contains(SubscriberFlags::ACTIVE))
        };
        if already_stopped {
            return;
        }

        let (runner, owner_scope) = {
            let mut subs = self.subscribers.borrow_mut();
            let sub = &mut subs[sub_id];
            sub.flags.remove(SubscriberFlags::ACTIVE);
            (sub.kind.inner().clone(), sub.owner_scope)
        };

        self.detach_all_deps(sub_id);

        if let Some(scope_id) = owner_scope {
            if let Some(scope) = self.scopes.borrow_mut().get_mut(scope_id) {
                scope.effects.retain(|id| *id != sub_id);
            }
        }

        runner.on_stop();
    }

    // ---- scope lifecycle ----------------------------------------------------

    pub(crate) fn stop_scope(&self, scope_id: ScopeId, from_parent: bool) {
        let captured = {
            let mut scopes = self.scopes.borrow_mut();
            match scopes.get_mut(scope_id) {
                Some(scope) if scope.active => {
                    scope.active = false;
                    Some((
                        std::mem::take(&mut scope.effects),
                        std::mem::take(&mut scope.cleanups),
                        scope.children.clone(),
                        scope.parent,
                        scope.index_in_parent,
                    ))
                }
                _ => None,
            }
        };
        let Some((effects, cleanups, children, parent, index_in_parent)) = captured else {
            return;
        };

        for sub_id in effects {
            self.stop_subscriber(sub_id);
        }
        for cleanup in cleanups {
            cleanup();
        }
        for child in children {
            self.stop_scope(child, true);
        }

        if !from_parent {
            if let (Some(parent), Some(index)) = (parent, index_in_parent) {
                let mut scopes = self.scopes.borrow_mut();
                if let Some(parent_scope) = scopes.get_mut(parent) {
                    if index < parent_scope.children.len() {
                        parent_scope.children.swap_remove(index);
                        if index < parent_scope.children.len() {
                            let moved = parent_scope.children[index];
                            drop(parent_scope);
                            if let Some(moved_scope) = scopes.get_mut(moved) {
                                moved_scope.index_in_parent = Some(index);
                            }
                        }
                    }
                }
            }
        }

        self.scopes.borrow_mut().remove(scope_id);
    }

    pub(crate) fn set_scope_paused(&self, scope_id: ScopeId, paused: bool) {
        let (effects, children) = {
            let mut scopes = self.scopes.borrow_mut();
            let Some(scope) = scopes.get_mut(scope_id) else {
                return;
            };
            scope.paused = paused;
            (scope.effects.clone(), scope.children.clone())
        };

        for sub_id in effects {
            if paused {
                self.set_flags(sub_id, |f| f.insert(SubscriberFlags::PAUSED));
            } else {
                self.set_flags(sub_id, |f| f.remove(SubscriberFlags::PAUSED));
                if self.resolve_dirty(sub_id) {
                    self.run_subscriber(sub_id);
                }
            }
        }

        for child in children {
            self.set_scope_paused(child, paused);
        }
    }

    /// Dispatches a subscriber through its own `run` (honoring a
    /// configured scheduler, for effects). No-op if the id has since been
    /// removed from the arena.
    pub(crate) fn run_subscriber(&self, sub_id: SubscriberId) {
        let runner = match self.subscribers.borrow().get(sub_id) {
            Some(sub) => sub.kind.inner().clone(),
            None => return,
        };
        runner.run(sub_id);
    }

    pub(crate) fn register_effect_on_scope(&self, sub_id: SubscriberId, scope_id: ScopeId) {
        if let Some(scope) = self.scopes.borrow_mut().get_mut(scope_id) {
            scope.effects.push(sub_id);
        }
    }
}
