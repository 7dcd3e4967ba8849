use criterion::{criterion_group, criterion_main, Criterion};
use fine_reactive::{
    computed::{computed, Computed},
    ref_::reactive_ref,
};

fn deep_update(c: &mut Criterion) {
    c.bench_function("deep_update", |b| {
        b.iter(|| {
            let r = reactive_ref(0);
            let mut chain = Vec::<Computed<i32>>::new();
            for i in 0..1000usize {
                let prev = chain.get(i.saturating_sub(1)).cloned();
                if let Some(prev) = prev {
                    chain.push(computed(move |_| prev.get() + 1));
                } else {
                    let r = r.clone();
                    chain.push(computed(move |_| r.get() + 1));
                }
            }
            r.set(1);
            assert_eq!(chain[999].get(), 1001);
        });
    });
}

criterion_group!(deep_update_group, deep_update);
criterion_main!(deep_update_group);
