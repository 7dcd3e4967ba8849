use fine_reactive::{computed, computed_writable, effect, ref_::reactive_ref};
use std::{cell::RefCell, rc::Rc};

#[test]
fn computed_recomputes_lazily_on_read() {
    let a = reactive_ref(1);
    let recomputes = Rc::new(RefCell::new(0));

    let a2 = a.clone();
    let recomputes2 = recomputes.clone();
    let doubled = computed(move |_| {
        *recomputes2.borrow_mut() += 1;
        a2.get() * 2
    });

    assert_eq!(*recomputes.borrow(), 0, "a fresh computed must not eagerly run");

    assert_eq!(doubled.get(), 2);
    assert_eq!(*recomputes.borrow(), 1);

    // Reading again without any intervening write must not recompute.
    assert_eq!(doubled.get(), 2);
    assert_eq!(*recomputes.borrow(), 1);

    a.set(5);
    assert_eq!(doubled.get(), 10);
    assert_eq!(*recomputes.borrow(), 2);
}

#[test]
fn glitch_free_chain_settles_once() {
    // a -> c1 -> c2 -> e: writing `a` must only run `e` once, with the
    // fully-settled value, never an intermediate one.
    let a = reactive_ref(1);

    let a2 = a.clone();
    let c1 = computed(move |_| a2.get() * 2);

    let c1_2 = c1.clone();
    let c2 = computed(move |_| c1_2.get() + 1);

    let observed = Rc::new(RefCell::new(Vec::new()));
    let runs = Rc::new(RefCell::new(0));

    let c2_2 = c2.clone();
    let observed2 = observed.clone();
    let runs2 = runs.clone();
    effect(move || {
        *runs2.borrow_mut() += 1;
        observed2.borrow_mut().push(c2_2.get());
    });

    assert_eq!(*observed.borrow(), vec![3]);
    assert_eq!(*runs.borrow(), 1);

    a.set(10);

    assert_eq!(*runs.borrow(), 2, "the effect must run exactly once per write");
    assert_eq!(*observed.borrow(), vec![3, 21]);
}

#[test]
fn unchanged_computed_output_does_not_propagate() {
    // c reads a but always returns the same parity bucket; writing a to a
    // value with the same parity must not re-run an effect downstream of
    // c, even though a's own dep did change.
    let a = reactive_ref(0);

    let a2 = a.clone();
    let parity = computed(move |_| a2.get() % 2 == 0);

    let runs = Rc::new(RefCell::new(0));
    let parity2 = parity.clone();
    let runs2 = runs.clone();
    effect(move || {
        parity2.get();
        *runs2.borrow_mut() += 1;
    });

    assert_eq!(*runs.borrow(), 1);

    a.set(2); // still even: c1's cached output doesn't change

    assert_eq!(
        *runs.borrow(),
        1,
        "an unchanged computed output must not dispatch its downstream effect"
    );

    a.set(3); // now odd: output changes

    assert_eq!(*runs.borrow(), 2);
}

#[test]
fn writable_computed_round_trips_through_setter() {
    let celsius = reactive_ref(0.0_f64);

    let get_c = celsius.clone();
    let set_c = celsius.clone();
    let fahrenheit = computed_writable(
        move |_| get_c.get() * 9.0 / 5.0 + 32.0,
        move |f: f64| set_c.set((f - 32.0) * 5.0 / 9.0),
    );

    assert_eq!(fahrenheit.get(), 32.0);

    fahrenheit.set(212.0).unwrap();
    assert_eq!(celsius.get(), 100.0);
    assert_eq!(fahrenheit.get(), 212.0);
}

#[test]
fn readonly_computed_rejects_writes() {
    let c = computed(|_: Option<&i32>| 1);
    assert!(c.set(2).is_err());
}
