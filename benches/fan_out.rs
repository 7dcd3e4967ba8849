use criterion::{criterion_group, criterion_main, Criterion};
use fine_reactive::{computed::computed, ref_::reactive_ref};

fn fan_out(c: &mut Criterion) {
    c.bench_function("fan_out", |b| {
        b.iter(|| {
            let r = reactive_ref(0);
            let computeds = (0..1000)
                .map(|_| {
                    let r = r.clone();
                    computed(move |_| r.get())
                })
                .collect::<Vec<_>>();
            assert_eq!(computeds.iter().map(|m| m.get()).sum::<i32>(), 0);
            r.set(1);
            assert_eq!(computeds.iter().map(|m| m.get()).sum::<i32>(), 1000);
        });
    });
}

criterion_group!(fan_out_group, fan_out);
criterion_main!(fan_out_group);
