use fine_reactive::{effect, effect_scope, ref_::reactive_ref};
use std::{cell::RefCell, rc::Rc};

#[test]
fn stopping_a_scope_stops_every_owned_effect() {
    let a = reactive_ref(0);
    let runs = Rc::new(RefCell::new(0));

    let scope = effect_scope(false);
    let a2 = a.clone();
    let runs2 = runs.clone();
    scope.run(|| {
        effect(move || {
            a2.get();
            *runs2.borrow_mut() += 1;
        });
    });

    assert_eq!(*runs.borrow(), 1);

    a.set(1);
    assert_eq!(*runs.borrow(), 2);

    scope.stop();
    scope.stop(); // idempotent

    a.set(2);
    assert_eq!(*runs.borrow(), 2, "a stopped scope's effects must never run again");
    assert!(!scope.active());
}

#[test]
fn child_scope_stops_cascade_from_parent() {
    let runs = Rc::new(RefCell::new(0));
    let a = reactive_ref(0);

    let parent = effect_scope(false);
    let child_runs = runs.clone();
    let child_a = a.clone();
    parent.run(|| {
        let child = effect_scope(false);
        child.run(|| {
            effect(move || {
                child_a.get();
                *child_runs.borrow_mut() += 1;
            });
        });
    });

    assert_eq!(*runs.borrow(), 1);
    parent.stop();

    a.set(1);
    assert_eq!(
        *runs.borrow(),
        1,
        "stopping a parent scope must stop effects owned by its children too"
    );
}

#[test]
fn on_cleanup_runs_once_on_stop() {
    let cleaned = Rc::new(RefCell::new(0));

    let scope = effect_scope(false);
    let cleaned2 = cleaned.clone();
    scope.run(|| {
        fine_reactive::on_scope_cleanup(move || {
            *cleaned2.borrow_mut() += 1;
        });
    });

    assert_eq!(*cleaned.borrow(), 0);
    scope.stop();
    assert_eq!(*cleaned.borrow(), 1);
    scope.stop();
    assert_eq!(*cleaned.borrow(), 1, "cleanup must run exactly once");
}

#[test]
fn pause_and_resume_cascade_to_children() {
    let a = reactive_ref(0);
    let runs = Rc::new(RefCell::new(0));

    let scope = effect_scope(false);
    let a2 = a.clone();
    let runs2 = runs.clone();
    scope.run(|| {
        effect(move || {
            a2.get();
            *runs2.borrow_mut() += 1;
        });
    });

    assert_eq!(*runs.borrow(), 1);
    scope.pause();
    a.set(1);
    assert_eq!(*runs.borrow(), 1);

    scope.resume();
    assert_eq!(*runs.borrow(), 2);
}
