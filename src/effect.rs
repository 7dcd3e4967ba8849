//! `ReactiveEffect`: a subscriber whose purpose is a side effect
//! (`spec.md` §3, §4.2).

use crate::{
    flags::SubscriberFlags,
    runtime::with_runtime,
    scope::on_scope_cleanup,
    subscriber::{AnySubscriber, SubscriberId, SubscriberKind},
};
use std::{cell::RefCell, rc::Rc};

/// Options accepted by [`effect`], matching `spec.md` §6.
#[derive(Default)]
pub struct EffectOptions {
    /// Invoked instead of running the effect directly when it's dispatched;
    /// the runner passed in is a zero-arg closure that performs the real
    /// run whenever (or however many times, or never) the scheduler calls
    /// it.
    pub scheduler: Option<Box<dyn Fn(Box<dyn Fn()>)>>,
    /// Cleanup invoked once, when the effect is stopped.
    pub on_stop: Option<Box<dyn FnOnce()>>,
    /// Permits one self-notification during the effect's own run.
    pub allow_recurse: bool,
    /// Skip the initial run; the effect only runs once notified.
    pub lazy: bool,
}

impl EffectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheduler(mut self, scheduler: impl Fn(Box<dyn Fn()>) + 'static) -> Self {
        self.scheduler = Some(Box::new(scheduler));
        self
    }

    pub fn on_stop(mut self, on_stop: impl FnOnce() + 'static) -> Self {
        self.on_stop = Some(Box::new(on_stop));
        self
    }

    pub fn allow_recurse(mut self, allow_recurse: bool) -> Self {
        self.allow_recurse = allow_recurse;
        self
    }

    pub fn lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }
}

struct EffectState {
    f: Box<dyn Fn()>,
    scheduler: Option<Box<dyn Fn(Box<dyn Fn()>)>>,
    on_stop: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl AnySubscriber for EffectState {
    fn run(&self, id: SubscriberId) {
        match &self.scheduler {
            Some(scheduler) => scheduler(Box::new(move || dispatch(id))),
            None => self.force_run(id),
        }
    }

    fn force_run(&self, id: SubscriberId) {
        with_runtime(|rt| {
            if !rt.flags(id).contains(SubscriberFlags::ACTIVE) {
                return;
            }

            loop {
                let prev_sub = rt.active_sub.replace(Some(id));
                rt.set_flags(id, |f| {
                    f.insert(SubscriberFlags::RUNNING | SubscriberFlags::TRACKING);
                    f.remove(SubscriberFlags::DIRTY | SubscriberFlags::PENDING);
                });
                rt.reset_deps_tail(id);

                (self.f)();

                rt.trim_stale_deps(id);
                rt.active_sub.set(prev_sub);

                let recurse = {
                    let flags = rt.flags(id);
                    flags.contains(SubscriberFlags::NOTIFIED)
                        && flags.contains(SubscriberFlags::ALLOW_RECURSE)
                };
                rt.set_flags(id, |f| f.remove(SubscriberFlags::RUNNING));
                if recurse {
                    rt.set_flags(id, |f| f.remove(SubscriberFlags::NOTIFIED));
                    continue;
                }
                break;
            }
        });
    }

    fn on_stop(&self) {
        if let Some(cb) = self.on_stop.borrow_mut().take() {
            cb();
        }
    }
}

/// Re-fetches the subscriber's runner by id and forces the real run,
/// bypassing its scheduler. The closure a scheduler is handed ultimately
/// calls back into this.
fn dispatch(id: SubscriberId) {
    with_runtime(|rt| {
        let runner = match rt.subscribers.borrow().get(id) {
            Some(sub) => sub.kind.inner().clone(),
            None => return,
        };
        runner.force_run(id);
    });
}

/// A running, disposable side effect (`spec.md` §3 "Subscriber... Variants:
/// ReactiveEffect").
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ReactiveEffect {
    pub(crate) id: SubscriberId,
}

impl ReactiveEffect {
    /// Re-runs the effect immediately, outside the batch queue, regardless
    /// of whether it is currently dirty. Bypasses any configured scheduler.
    pub fn run(&self) {
        dispatch(self.id);
    }

    /// Stops the effect: it will never run again, even if still queued.
    /// Idempotent.
    pub fn stop(&self) {
        with_runtime(|rt| rt.stop_subscriber(self.id));
    }

    /// Suppresses dispatch until [`ReactiveEffect::resume`]. Notifications
    /// received while paused still mark the effect dirty.
    pub fn pause(&self) {
        with_runtime(|rt| rt.set_flags(self.id, |f| f.insert(SubscriberFlags::PAUSED)));
    }

    /// Resumes dispatch, running immediately if the effect is dirty.
    pub fn resume(&self) {
        with_runtime(|rt| {
            rt.set_flags(self.id, |f| f.remove(SubscriberFlags::PAUSED));
            if rt.resolve_dirty(self.id) {
                rt.run_subscriber(self.id);
            }
        });
    }

    /// `true` unless the effect has been stopped.
    pub fn active(&self) -> bool {
        with_runtime(|rt| rt.flags(self.id).contains(SubscriberFlags::ACTIVE))
    }
}

/// Creates and immediately runs a [`ReactiveEffect`] (unless
/// `options.lazy`), tracking whatever reactive state `f` reads and
/// re-running whenever it changes (`spec.md` §6).
pub fn effect(f: impl Fn() + 'static) -> ReactiveEffect {
    effect_with_options(f, EffectOptions::default())
}

/// [`effect`] with explicit [`EffectOptions`].
#[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
pub fn effect_with_options(f: impl Fn() + 'static, options: EffectOptions) -> ReactiveEffect {
    let EffectOptions {
        scheduler,
        on_stop,
        allow_recurse,
        lazy,
    } = options;

    let state = Rc::new(EffectState {
        f: Box::new(f),
        scheduler,
        on_stop: RefCell::new(on_stop),
    });

    let id = with_runtime(|rt| {
        let owner_scope = rt.active_scope.get();
        let id = rt.new_subscriber(SubscriberKind::Effect(state), owner_scope);
        if allow_recurse {
            rt.set_flags(id, |f| f.insert(SubscriberFlags::ALLOW_RECURSE));
        }
        id
    });

    let effect = ReactiveEffect { id };

    on_scope_cleanup(move || effect.stop());

    if !lazy {
        effect.run();
    }

    effect
}
