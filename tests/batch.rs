use fine_reactive::{
    batch::{batch, end_batch, start_batch},
    effect,
    ref_::reactive_ref,
};
use std::{cell::RefCell, rc::Rc};

#[test]
fn batch_coalesces_multiple_writes_into_one_dispatch() {
    let a = reactive_ref(0);
    let b = reactive_ref(0);
    let runs = Rc::new(RefCell::new(0));

    let a2 = a.clone();
    let b2 = b.clone();
    let runs2 = runs.clone();
    effect(move || {
        a2.get();
        b2.get();
        *runs2.borrow_mut() += 1;
    });

    assert_eq!(*runs.borrow(), 1);

    batch(|| {
        a.set(1);
        b.set(1);
    });

    assert_eq!(*runs.borrow(), 2, "two writes inside one batch must dispatch once");
}

#[test]
fn nested_batches_only_drain_at_the_outermost_end() {
    let a = reactive_ref(0);
    let runs = Rc::new(RefCell::new(0));

    let a2 = a.clone();
    let runs2 = runs.clone();
    effect(move || {
        a2.get();
        *runs2.borrow_mut() += 1;
    });

    start_batch();
    start_batch();
    a.set(1);
    assert_eq!(*runs.borrow(), 1, "still batched, must not have dispatched yet");
    end_batch();
    assert_eq!(*runs.borrow(), 1, "still one level of batching left");
    end_batch();
    assert_eq!(*runs.borrow(), 2);
}

#[test]
fn computed_queue_drains_before_effect_queue() {
    use fine_reactive::computed;

    let a = reactive_ref(0);
    let order = Rc::new(RefCell::new(Vec::new()));

    let a2 = a.clone();
    let c = computed(move |_| a2.get() * 2);

    let order2 = order.clone();
    let c2 = c.clone();
    effect(move || {
        order2.borrow_mut().push(c2.get());
    });

    a.set(5);

    assert_eq!(*order.borrow(), vec![0, 10]);
}
