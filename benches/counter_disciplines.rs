use std::sync::Arc;
use std::thread;

use coordina::counters::atomic::AtomicCounter;
use coordina::counters::cas::CasCounter;
use coordina::counters::locking::LockingCounter;
use coordina::counters::Counter;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const NUM_THREADS: usize = 8;
const ITERATIONS_PER_THREAD: usize = 100_000;

fn hammer<C: Counter + 'static>(counter: Arc<C>) -> i64 {
    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|_| {
            let counter = Arc::clone(&counter);
            thread::spawn(move || {
                for _ in 0..ITERATIONS_PER_THREAD {
                    counter.increment();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    counter.value()
}

fn bench_counter_disciplines(c: &mut Criterion) {
    let mut group = c.benchmark_group("counter_increment");
    let parameter = format!("{}threads x {}iter", NUM_THREADS, ITERATIONS_PER_THREAD);

    group.bench_function(BenchmarkId::new("LockingCounter (mutex)", &parameter), |b| {
        b.iter(|| black_box(hammer(Arc::new(LockingCounter::new()))))
    });

    group.bench_function(BenchmarkId::new("AtomicCounter (fetch_add)", &parameter), |b| {
        b.iter(|| black_box(hammer(Arc::new(AtomicCounter::new()))))
    });

    group.bench_function(BenchmarkId::new("CasCounter (cas loop)", &parameter), |b| {
        b.iter(|| black_box(hammer(Arc::new(CasCounter::new()))))
    });

    group.finish();
}

criterion_group!(benches, bench_counter_disciplines);
criterion_main!(benches);
