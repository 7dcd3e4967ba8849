use fine_reactive::{
    effect,
    key::ReactiveKey,
    reactive::{array::ReactiveArray, collections::ReactiveMap, object::Reactive, to_raw},
};
use rustc_hash::FxHashMap;
use std::{cell::RefCell, rc::Rc};

#[test]
fn object_field_read_write_triggers_only_its_own_key() {
    let mut fields = FxHashMap::default();
    fields.insert(ReactiveKey::field("x"), 1i32);
    fields.insert(ReactiveKey::field("y"), 2i32);
    let obj = Reactive::new(fields);

    let runs_x = Rc::new(RefCell::new(0));
    let obj_x = obj.clone();
    let runs_x2 = runs_x.clone();
    effect(move || {
        obj_x.get("x");
        *runs_x2.borrow_mut() += 1;
    });

    assert_eq!(*runs_x.borrow(), 1);

    obj.set("y", 20);
    assert_eq!(*runs_x.borrow(), 1, "writing y must not re-run a reader of x only");

    obj.set("x", 10);
    assert_eq!(*runs_x.borrow(), 2);
}

#[test]
fn adding_a_key_invalidates_iteration_but_not_existing_readers() {
    let fields = FxHashMap::default();
    let obj: Reactive<i32> = Reactive::new(fields);

    let iterations = Rc::new(RefCell::new(0));
    let obj2 = obj.clone();
    let iterations2 = iterations.clone();
    effect(move || {
        obj2.keys();
        *iterations2.borrow_mut() += 1;
    });

    assert_eq!(*iterations.borrow(), 1);

    obj.set("a", 1);
    assert_eq!(*iterations.borrow(), 2, "adding a key must invalidate key iteration");

    obj.set("a", 2); // value-only change on an existing key
    assert_eq!(
        *iterations.borrow(),
        2,
        "changing an existing key's value must not re-trigger iteration"
    );
}

#[test]
fn readonly_object_ignores_writes() {
    let mut fields = FxHashMap::default();
    fields.insert(ReactiveKey::field("x"), 1i32);
    let obj = Reactive::new_readonly(fields);

    obj.set("x", 99);
    assert_eq!(obj.get("x"), Some(1));
    assert!(obj.is_readonly());
}

#[test]
fn array_index_write_does_not_trigger_unrelated_index_readers() {
    let arr = ReactiveArray::new(vec![1, 2, 3]);

    let runs = Rc::new(RefCell::new(0));
    let arr2 = arr.clone();
    let runs2 = runs.clone();
    effect(move || {
        arr2.get(0);
        *runs2.borrow_mut() += 1;
    });

    assert_eq!(*runs.borrow(), 1);

    arr.set(1, 20);
    assert_eq!(*runs.borrow(), 1, "writing index 1 must not re-run a reader of index 0");

    arr.set(0, 10);
    assert_eq!(*runs.borrow(), 2);
}

#[test]
fn push_triggers_length_readers_once() {
    let arr = ReactiveArray::new(vec![1, 2, 3]);

    let runs = Rc::new(RefCell::new(0));
    let arr2 = arr.clone();
    let runs2 = runs.clone();
    effect(move || {
        arr2.len();
        *runs2.borrow_mut() += 1;
    });

    assert_eq!(*runs.borrow(), 1);
    arr.push(4);
    assert_eq!(*runs.borrow(), 2);
    assert_eq!(arr.len(), 4);
}

#[test]
fn map_keys_iteration_ignores_value_only_updates() {
    let map: ReactiveMap<String, i32> = ReactiveMap::new(Default::default());
    map.insert("a".to_string(), 1);

    let key_iterations = Rc::new(RefCell::new(0));
    let map2 = map.clone();
    let key_iterations2 = key_iterations.clone();
    effect(move || {
        map2.keys();
        *key_iterations2.borrow_mut() += 1;
    });

    assert_eq!(*key_iterations.borrow(), 1);

    map.insert("a".to_string(), 2); // same key, new value
    assert_eq!(
        *key_iterations.borrow(),
        1,
        "a value-only set must not re-run a keys() reader"
    );

    map.insert("b".to_string(), 3); // new key
    assert_eq!(*key_iterations.borrow(), 2);
}

#[test]
fn set_membership_tracking() {
    use fine_reactive::reactive::collections::ReactiveSet;

    let set: ReactiveSet<i32> = ReactiveSet::new([1, 2, 3]);

    let runs = Rc::new(RefCell::new(0));
    let set2 = set.clone();
    let runs2 = runs.clone();
    effect(move || {
        set2.has(&2);
        *runs2.borrow_mut() += 1;
    });

    assert_eq!(*runs.borrow(), 1);
    set.insert(4); // unrelated member; `has(&2)`'s own dep key is untouched
    assert_eq!(*runs.borrow(), 1);
    set.remove(&2);
    assert_eq!(*runs.borrow(), 2);
}

#[test]
fn readonly_of_reactive_is_distinct_but_shares_raw() {
    let mut fields = FxHashMap::default();
    fields.insert(ReactiveKey::field("x"), 1i32);
    let obj = Reactive::new(fields);
    let ro = obj.to_readonly();

    assert!(!obj.is_readonly());
    assert!(ro.is_readonly());
    assert!(obj.same_raw_as(&ro), "readonly(reactive(o)) must wrap the same raw target");

    obj.set("x", 2);
    assert_eq!(ro.get("x"), Some(2), "a write through the original must be visible through the readonly view");

    ro.set("x", 99);
    assert_eq!(obj.get("x"), Some(2), "writes through the readonly view must be ignored");
}

#[test]
fn to_raw_snapshots_object_fields_untracked() {
    let mut fields = FxHashMap::default();
    fields.insert(ReactiveKey::field("x"), 1i32);
    let obj = Reactive::new(fields);

    let runs = Rc::new(RefCell::new(0));
    let obj2 = obj.clone();
    let runs2 = runs.clone();
    effect(move || {
        to_raw(&obj2);
        *runs2.borrow_mut() += 1;
    });

    assert_eq!(*runs.borrow(), 1);
    obj.set("x", 2);
    assert_eq!(*runs.borrow(), 1, "to_raw must not establish a dependency");
    assert_eq!(obj.to_raw().get(&ReactiveKey::field("x")), Some(&2));
}

#[test]
fn array_shift_unshift_and_splice_trigger_length_once() {
    let arr = ReactiveArray::new(vec![1, 2, 3]);

    let runs = Rc::new(RefCell::new(0));
    let arr2 = arr.clone();
    let runs2 = runs.clone();
    effect(move || {
        arr2.len();
        *runs2.borrow_mut() += 1;
    });

    assert_eq!(*runs.borrow(), 1);

    assert_eq!(arr.shift(), Some(1));
    assert_eq!(*runs.borrow(), 2);
    assert_eq!(arr.to_raw(), vec![2, 3]);

    arr.unshift(0);
    assert_eq!(*runs.borrow(), 3);
    assert_eq!(arr.to_raw(), vec![0, 2, 3]);

    let removed = arr.splice(0, 2, vec![9]);
    assert_eq!(removed, vec![0, 2]);
    assert_eq!(arr.to_raw(), vec![9, 3]);
    assert_eq!(*runs.borrow(), 4, "a length-changing splice must trigger ARRAY_LENGTH once");

    let same_len_replace = arr.splice(0, 1, vec![7]);
    assert_eq!(same_len_replace, vec![9]);
    assert_eq!(
        *runs.borrow(),
        4,
        "a same-length splice must not trigger ARRAY_LENGTH"
    );
}

#[test]
fn map_to_readonly_shares_raw_and_rejects_writes() {
    let map: ReactiveMap<String, i32> = ReactiveMap::new(Default::default());
    map.insert("a".to_string(), 1);
    let ro = map.to_readonly();

    assert!(map.same_raw_as(&ro));
    ro.insert("b".to_string(), 2);
    assert_eq!(map.get(&"b".to_string()), None, "a write through the readonly view must be ignored");
    assert_eq!(ro.get(&"a".to_string()), Some(1));
}
