use criterion::{black_box, criterion_group, criterion_main, Criterion};
use qir_rt::backend::{Backend, ClassicalBackend, QuantumGateSet};
use qir_rt::RefCountTracker;

fn refcount_benchmark(c: &mut Criterion) {
    c.bench_function("share_release_churn", |b| {
        b.iter(|| {
            let mut backend = ClassicalBackend::new();
            let mut tracker = RefCountTracker::new();
            let q = backend.allocate_qubit().unwrap();
            for _ in 0..256 {
                let r = backend.measure(q).unwrap();
                tracker.update(r, 2, &mut backend).unwrap();
                tracker.update(r, -1, &mut backend).unwrap();
                tracker.update(r, -2, &mut backend).unwrap();
            }
            black_box(tracker.len());
        });
    });
}

criterion_group!(benches, refcount_benchmark);
criterion_main!(benches);
