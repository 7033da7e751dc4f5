use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rc_handle::interop::{self, BoundaryValue};
use rc_handle::{NativeHandle, ReleaseFn, WrapperFactory};
use std::cell::Cell;
use std::rc::Rc;

fn counting_release() -> (ReleaseFn<u64>, Rc<Cell<u64>>) {
    let count = Rc::new(Cell::new(0));
    let sink = count.clone();
    (Rc::new(move |_: &u64| sink.set(sink.get() + 1)), count)
}

fn bench_add_ref_release(c: &mut Criterion) {
    c.bench_function("handle_add_ref_release_pair", |b| {
        let (release, _held) = counting_release();
        let h = NativeHandle::with_callback(1, release, Some("BENCH_PTR"));
        b.iter(|| {
            h.add_ref();
            h.release();
            black_box(h.reference_count())
        });
        // Balance the constructing owner so the callback runs once.
        h.release();
    });
}

fn bench_lifecycle(c: &mut Criterion) {
    c.bench_function("handle_full_lifecycle", |b| {
        let (release, _held) = counting_release();
        b.iter_batched(
            || NativeHandle::with_callback(7, release.clone(), Some("BENCH_PTR")),
            |h| {
                h.release();
                black_box(h.disposed())
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_factory_create(c: &mut Criterion) {
    c.bench_function("factory_create_wrapper_10k", |b| {
        let (release, _held) = counting_release();
        let mut f = WrapperFactory::<u64>::new(false);
        f.register(
            "BENCH_PTR",
            Rc::new(|resource, release, tag| match release {
                Some(release) => Ok(NativeHandle::with_callback(resource, release, Some(tag))),
                None => Ok(NativeHandle::owning(resource, Some(tag))),
            }),
        );
        b.iter(|| {
            for i in 0..10_000u64 {
                let h = f
                    .create_wrapper(i, Some("BENCH_PTR"), Some(release.clone()))
                    .expect("registered tag");
                h.release();
            }
            black_box(())
        })
    });
}

fn bench_wrap_unwrap(c: &mut Criterion) {
    c.bench_function("interop_wrap_unwrap", |b| {
        let (release, _held) = counting_release();
        b.iter_batched(
            || BoundaryValue::<u64, String>::Raw(3),
            |v| {
                let wrapped = interop::wrap(v, "BENCH_PTR", Some(release.clone()));
                if let BoundaryValue::Handle(h) = &wrapped {
                    h.release();
                }
                black_box(interop::unwrap(Some(wrapped), false).unwrap())
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_add_ref_release,
    bench_lifecycle,
    bench_factory_create,
    bench_wrap_unwrap
);
criterion_main!(benches);
