use criterion::{black_box, criterion_group, criterion_main, Criterion};

use jackc::prelude::*;

fn criterion_benchmark(c: &mut Criterion) {
    {
        let source = include_str!("../tests/Main.jack");

        c.bench_function("compile main", |b| {
            b.iter(|| black_box(compile_str("Main", black_box(source))))
        });
    }

    {
        let source = include_str!("../tests/Point.jack");
        let conf = CompilerConf {
            annotate: true,
            ..CompilerConf::default()
        };

        c.bench_function("compile point annotated", |b| {
            b.iter(|| black_box(compile_with("Point", black_box(source), &conf, None)))
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
