use criterion::{criterion_group, criterion_main, Criterion};
use fine_reactive::{computed::computed, ref_::reactive_ref};
use std::rc::Rc;

fn narrow_down(c: &mut Criterion) {
    c.bench_function("narrow_down", |b| {
        b.iter(|| {
            let refs = Rc::new(
                (0..1000)
                    .map(reactive_ref)
                    .collect::<Vec<_>>(),
            );
            let sum = {
                let refs = Rc::clone(&refs);
                computed(move |_| refs.iter().map(|r| r.get()).sum::<i32>())
            };
            assert_eq!(sum.get(), 499500);
        });
    });
}

criterion_group!(narrow_down_group, narrow_down);
criterion_main!(narrow_down_group);
