use fine_reactive::{effect, ref_::reactive_ref, untrack};
use std::{cell::RefCell, rc::Rc};

#[test]
fn effect_runs_immediately_and_on_change() {
    let a = reactive_ref(-1);
    let b = Rc::new(RefCell::new(String::new()));

    let b2 = b.clone();
    let a2 = a.clone();
    effect(move || {
        *b2.borrow_mut() = format!("Value is {}", a2.get());
    });

    assert_eq!(b.borrow().as_str(), "Value is -1");

    a.set(1);

    assert_eq!(b.borrow().as_str(), "Value is 1");
}

#[test]
fn effect_does_not_rerun_on_same_value_write() {
    let a = reactive_ref(0);
    let runs = Rc::new(RefCell::new(0));

    let runs2 = runs.clone();
    let a2 = a.clone();
    effect(move || {
        a2.get();
        *runs2.borrow_mut() += 1;
    });

    assert_eq!(*runs.borrow(), 1);

    a.set(0);

    assert_eq!(*runs.borrow(), 1, "writing the same value must not re-run effects");
}

#[test]
fn untrack_suppresses_dependency_tracking() {
    let a = reactive_ref(-1);
    let b = Rc::new(RefCell::new(String::new()));

    let b2 = b.clone();
    let a2 = a.clone();
    effect(move || {
        let formatted = format!("Value is {}", untrack(|| a2.get()));
        *b2.borrow_mut() = formatted;
    });

    assert_eq!(b.borrow().as_str(), "Value is -1");

    a.set(1);

    assert_eq!(
        b.borrow().as_str(),
        "Value is -1",
        "a read inside untrack must not establish a dependency"
    );
}

#[test]
fn stopped_effect_never_runs_again() {
    let a = reactive_ref(0);
    let runs = Rc::new(RefCell::new(0));

    let runs2 = runs.clone();
    let a2 = a.clone();
    let handle = effect(move || {
        a2.get();
        *runs2.borrow_mut() += 1;
    });

    assert_eq!(*runs.borrow(), 1);
    handle.stop();
    handle.stop(); // idempotent

    a.set(1);
    a.set(2);

    assert_eq!(*runs.borrow(), 1);
    assert!(!handle.active());
}

#[test]
fn pause_defers_dispatch_until_resume() {
    let a = reactive_ref(0);
    let runs = Rc::new(RefCell::new(0));

    let runs2 = runs.clone();
    let a2 = a.clone();
    let handle = effect(move || {
        a2.get();
        *runs2.borrow_mut() += 1;
    });

    handle.pause();
    a.set(1);
    assert_eq!(*runs.borrow(), 1, "a paused effect must not dispatch");

    handle.resume();
    assert_eq!(*runs.borrow(), 2, "resuming a dirty effect runs it once");
}

#[test]
fn re_entrant_notification_is_dropped_without_allow_recurse() {
    let a = reactive_ref(0);
    let runs = Rc::new(RefCell::new(0));

    let runs2 = runs.clone();
    let a2 = a.clone();
    effect(move || {
        let n = a2.get();
        *runs2.borrow_mut() += 1;
        if n == 0 {
            // Would recurse forever without the re-entry guard; the
            // self-notification is dropped instead of queued.
            a2.set(1);
        }
    });

    assert_eq!(*runs.borrow(), 1);
    assert_eq!(a.peek(), 1);
}
