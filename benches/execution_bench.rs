use criterion::{black_box, criterion_group, criterion_main, Criterion};
use runiq::{Config, Parser, Scanner};

const FIBONACCI: &str = "
    (ycomb (lambda fn n
        '(if (<= n 2)
            '(1)
         else
            '(+ (ycomb fn (- n 1))
                (ycomb fn (- n 2))))
    ) 8)
";

fn lexer_benchmark(c: &mut Criterion) {
    c.bench_function("tokenize fibonacci", |b| {
        b.iter(|| {
            let mut scanner = Scanner::new(black_box(FIBONACCI));
            scanner.scan_tokens().unwrap()
        })
    });
}

fn parser_benchmark(c: &mut Criterion) {
    let tokens = Scanner::new(FIBONACCI).scan_tokens().unwrap();

    c.bench_function("parse fibonacci", |b| {
        b.iter(|| Parser::new(black_box(tokens.clone())).parse().unwrap())
    });
}

fn run_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("run fibonacci 8", |b| {
        b.iter(|| {
            runtime
                .block_on(runiq::run(black_box(FIBONACCI), vec![], None, Config::default()))
                .unwrap()
        })
    });

    c.bench_function("run arithmetic", |b| {
        b.iter(|| {
            runtime
                .block_on(runiq::run(
                    black_box("(+ (* 2 3) (- 10 (/ 9 3)))"),
                    vec![],
                    None,
                    Config::default(),
                ))
                .unwrap()
        })
    });
}

criterion_group!(benches, lexer_benchmark, parser_benchmark, run_benchmark);
criterion_main!(benches);
