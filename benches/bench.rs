use criterion::{
    criterion_group,
    criterion_main,
    Criterion,
};

use sandbar::Heap;

fn allocate_and_release(c: &mut Criterion) {
    let mut heap = Heap::new();

    c.bench_function("allocate release 256", |b| {
        b.iter(|| {
            let p = heap.allocate(256).unwrap();
            heap.release(p);
        });
    });

    let mut heap = Heap::new();
    let p = heap.allocate(64).unwrap();

    c.bench_function("resize in place", |b| {
        b.iter(|| {
            heap.resize(Some(p), 512).unwrap();
            heap.resize(Some(p), 64).unwrap();
        });
    });
}

criterion_group!(benches, allocate_and_release);
criterion_main!(benches);
