// Sequential vs thread pool on the CPU-bound workload, with and without the
// interpreter lock. The process pool is left out: it needs the built binary.

use cpu_vs_io::strategy::{run_sequential, run_threads};
use cpu_vs_io::{InterpreterLock, LockMode, Workload};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn benchmark_cpu_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_primes_x4");
    group.sample_size(10);

    let workload = Workload::count_primes(20_000);

    for mode in [LockMode::Global, LockMode::Free] {
        let lock = InterpreterLock::new(mode, 1_000);
        let label = format!("{mode:?}");

        group.bench_with_input(BenchmarkId::new("sequential", &label), &workload, |b, w| {
            b.iter(|| run_sequential(black_box(w), 4, &lock))
        });

        group.bench_with_input(BenchmarkId::new("threads", &label), &workload, |b, w| {
            b.iter(|| run_threads(black_box(w), 4, 4, &lock))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_cpu_strategies);
criterion_main!(benches);
