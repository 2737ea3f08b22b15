use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use runiq::{Config, Node};

fn run(runtime: &tokio::runtime::Runtime, source: &str) -> Node {
    runtime
        .block_on(runiq::run(source, vec![], None, Config::default()))
        .unwrap()
}

/// Benchmark sibling reduction as the number of siblings grows
fn bench_sibling_reduction(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("sibling_reduction");

    for size in [10, 50, 100].iter() {
        let siblings: Vec<String> = (0..*size).map(|i| format!("(* {} {})", i, i)).collect();
        let source = format!("({})", siblings.join(" "));

        group.bench_with_input(BenchmarkId::new("flat", size), &source, |b, source| {
            b.iter(|| black_box(run(&runtime, source)))
        });

        // each sibling is a chain of dependent calls
        let chained: Vec<String> = (0..*size)
            .map(|i| format!("(+ (* {} 2) (- (* {} 3) 1))", i, i))
            .collect();
        let source = format!("({})", chained.join(" "));

        group.bench_with_input(BenchmarkId::new("chained", size), &source, |b, source| {
            b.iter(|| black_box(run(&runtime, source)))
        });
    }

    group.finish();
}

/// Delayed siblings wait concurrently, so total time tracks the longest delay
fn bench_delayed_siblings(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("delayed_siblings");
    group.sample_size(10);

    for count in [1, 10, 50].iter() {
        let delayed: Vec<String> = (0..*count).map(|i| format!("(after 5 '(+ {} 1))", i)).collect();
        let source = format!("({})", delayed.join(" "));

        group.bench_with_input(BenchmarkId::new("after_5ms", count), &source, |b, source| {
            b.iter(|| black_box(run(&runtime, source)))
        });
    }

    group.finish();
}

/// Benchmark list mappers, which fan out one call per element
fn bench_list_mapping(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("list_mapping");

    for size in [10, 100].iter() {
        let items: Vec<String> = (0..*size).map(|i| i.to_string()).collect();
        let source = format!("(list.map [{}] (lambda x '(* x 2)))", items.join(" "));

        group.bench_with_input(BenchmarkId::new("map", size), &source, |b, source| {
            b.iter(|| black_box(run(&runtime, source)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_sibling_reduction,
    bench_delayed_siblings,
    bench_list_mapping
);
criterion_main!(benches);
