//! `EffectScope`: a tree of scopes used for cascading teardown
//! (`spec.md` §3, §4.5).

use crate::{runtime::with_runtime, subscriber::SubscriberId};

slotmap::new_key_type! {
    /// Identifies one scope node.
    pub struct ScopeId;
}

/// One node in the scope tree. Stored in
/// [`crate::runtime::Runtime::scopes`].
pub(crate) struct ScopeRecord {
    pub active: bool,
    pub paused: bool,
    pub on_depth: u32,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    /// This scope's own index in `parent.children`, kept current so removal
    /// on `stop` is an O(1) swap-and-pop rather than a linear search.
    pub index_in_parent: Option<usize>,
    pub effects: Vec<SubscriberId>,
    pub cleanups: Vec<Box<dyn FnOnce()>>,
    #[cfg(debug_assertions)]
    pub defined_at: &'static std::panic::Location<'static>,
}

impl ScopeRecord {
    fn new(parent: Option<ScopeId>) -> Self {
        Self {
            active: true,
            paused: false,
            on_depth: 0,
            parent,
            children: Vec::new(),
            index_in_parent: None,
            effects: Vec::new(),
            cleanups: Vec::new(),
            #[cfg(debug_assertions)]
            defined_at: std::panic::Location::caller(),
        }
    }
}

/// A node in the tree of reactive scopes used for cascading teardown.
///
/// Every [`crate::effect::effect`] created while a scope is "current" (via
/// [`EffectScope::run`] or [`EffectScope::on`]/`off`) is owned by it:
/// stopping the scope stops every owned effect, runs every registered
/// cleanup (in registration order), and recurses into child scopes, before
/// finally unlinking itself from its parent.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EffectScope {
    pub(crate) id: ScopeId,
    /// Captured at construction so a use-after-stop diagnostic can still
    /// name a call site after `ScopeRecord` itself has been removed from
    /// the arena by `stop` (`spec.md` §4.5's `stop` is the one place a
    /// scope's bookkeeping is actually freed, not just deactivated).
    #[cfg(debug_assertions)]
    defined_at: &'static std::panic::Location<'static>,
}

impl EffectScope {
    /// Creates a new scope. Unless `detached` is `true`, it is attached as a
    /// child of the currently active scope (if any), so that stopping the
    /// parent also stops this one.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
    #[track_caller]
    pub fn new(detached: bool) -> Self {
        #[cfg(debug_assertions)]
        let defined_at = std::panic::Location::caller();

        with_runtime(|rt| {
            let parent = if detached {
                None
            } else {
                rt.active_scope.get()
            };

            let id = rt.scopes.borrow_mut().insert(ScopeRecord::new(parent));

            if let Some(parent) = parent {
                let mut scopes = rt.scopes.borrow_mut();
                let index = scopes[parent].children.len();
                scopes[parent].children.push(id);
                scopes[id].index_in_parent = Some(index);
            }

            EffectScope {
                id,
                #[cfg(debug_assertions)]
                defined_at,
            }
        })
    }

    /// Logs this handle's captured `defined_at` when a caller hits one of
    /// this type's use-after-stop no-ops, so the warning at least says
    /// which `effect_scope` call site is being misused instead of just
    /// "nothing happened".
    #[allow(unused_variables)]
    fn warn_use_after_stop(&self, what: &str) {
        #[cfg(debug_assertions)]
        tracing::debug!(
            "{what} on a stopped effect_scope (defined at {}) was ignored",
            self.defined_at
        );
    }

    /// Runs `f` with this scope set as the current scope, so that any
    /// `effect`/`computed`/child `effect_scope` created inside it is owned
    /// by this scope. No-op (returns `None`) if the scope has been stopped.
    pub fn run<T>(&self, f: impl FnOnce() -> T) -> Option<T> {
        with_runtime(|rt| {
            if !rt.scopes.borrow().get(self.id).map_or(false, |s| s.active) {
                self.warn_use_after_stop("run");
                return None;
            }
            let prev = rt.active_scope.replace(Some(self.id));
            let result = f();
            rt.active_scope.set(prev);
            Some(result)
        })
    }

    /// Makes this scope current without requiring a closure; nestable via a
    /// reference count. Must be paired with a later [`EffectScope::off`].
    /// No-op on a scope that has already been stopped.
    pub fn on(&self) {
        let is_active = with_runtime(|rt| {
            rt.scopes.borrow().get(self.id).map_or(false, |s| s.active)
        });
        if !is_active {
            self.warn_use_after_stop("on");
            return;
        }
        with_runtime(|rt| {
            let mut scopes = rt.scopes.borrow_mut();
            let Some(scope) = scopes.get_mut(self.id) else {
                return;
            };
            if scope.on_depth == 0 {
                rt.scope_on_prev.borrow_mut().push(rt.active_scope.get());
                rt.active_scope.set(Some(self.id));
            }
            scope.on_depth += 1;
        })
    }

    /// Ends one level of [`EffectScope::on`] nesting, restoring the
    /// previously-current scope once the nesting depth returns to zero.
    pub fn off(&self) {
        with_runtime(|rt| {
            let mut scopes = rt.scopes.borrow_mut();
            let Some(scope) = scopes.get_mut(self.id) else {
                return;
            };
            if scope.on_depth == 0 {
                return;
            }
            scope.on_depth -= 1;
            if scope.on_depth == 0 {
                if let Some(prev) = rt.scope_on_prev.borrow_mut().pop() {
                    rt.active_scope.set(prev);
                }
            }
        })
    }

    /// Stops every effect and child scope owned by this scope, runs every
    /// registered cleanup (in registration order), then unlinks this scope
    /// from its parent. Idempotent: stopping an already-stopped scope is a
    /// safe no-op.
    pub fn stop(&self) {
        with_runtime(|rt| rt.stop_scope(self.id, false));
    }

    /// Cascades a pause to every owned effect and every child scope.
    /// Notifications during a pause still mark effects dirty; they dispatch
    /// immediately on [`EffectScope::resume`].
    pub fn pause(&self) {
        with_runtime(|rt| rt.set_scope_paused(self.id, true));
    }

    /// Cascades a resume to every owned effect and every child scope,
    /// immediately dispatching any effect left dirty while paused.
    pub fn resume(&self) {
        with_runtime(|rt| rt.set_scope_paused(self.id, false));
    }

    /// Registers a cleanup callback to run (in registration order, once)
    /// when this scope is stopped. No-op if the scope has already been
    /// stopped.
    pub fn on_cleanup(&self, cleanup: impl FnOnce() + 'static) {
        with_runtime(|rt| {
            let mut scopes = rt.scopes.borrow_mut();
            match scopes.get_mut(self.id) {
                Some(scope) if scope.active => scope.cleanups.push(Box::new(cleanup)),
                Some(_) => {}
                None => self.warn_use_after_stop("on_cleanup"),
            }
        })
    }

    /// `true` unless this scope has been stopped.
    pub fn active(&self) -> bool {
        with_runtime(|rt| {
            rt.scopes.borrow().get(self.id).map_or(false, |s| s.active)
        })
    }
}

/// Creates a new [`EffectScope`]. Attached to the currently active scope
/// unless `detached` is `true`.
#[track_caller]
pub fn effect_scope(detached: bool) -> EffectScope {
    EffectScope::new(detached)
}

/// Registers a cleanup callback on the currently active scope, if any. A
/// direct analogue of [`EffectScope::on_cleanup`] for code that doesn't hold
/// a scope handle (e.g. inside [`crate::effect::effect`]'s `onStop`
/// wiring). No-op if there is no active scope.
#[track_caller]
pub fn on_scope_cleanup(cleanup: impl FnOnce() + 'static) {
    with_runtime(|rt| {
        if let Some(id) = rt.active_scope.get() {
            EffectScope {
                id,
                #[cfg(debug_assertions)]
                defined_at: std::panic::Location::caller(),
            }
            .on_cleanup(cleanup);
        }
    })
}
