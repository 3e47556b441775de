//! Performance benchmarks for Entangled

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::path::Path;

use entangled::model::{tangle_target, ReferenceMap};
use entangled::readers::parse_markdown;

fn generate_markdown(num_blocks: usize, lines_per_block: usize) -> String {
    let mut md = String::from("# Benchmark Document\n\n");

    md.push_str("```{.python file=output.py}\n");
    for i in 0..num_blocks {
        md.push_str(&format!("<<block{}>>\n", i));
    }
    md.push_str("```\n\n");

    for i in 0..num_blocks {
        md.push_str(&format!("```{{.python #block{}}}\n", i));
        for j in 0..lines_per_block {
            md.push_str(&format!("print('Block {} line {}')\n", i, j));
        }
        md.push_str("```\n\n");
    }

    md
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_markdown");

    for &num_blocks in &[10, 100, 500] {
        let md = generate_markdown(num_blocks, 10);
        group.bench_with_input(BenchmarkId::from_parameter(num_blocks), &md, |b, md| {
            b.iter(|| {
                let mut refs = ReferenceMap::new();
                parse_markdown(Path::new("bench.md"), black_box(md), &mut refs).unwrap()
            })
        });
    }
    group.finish();
}

fn bench_tangle(c: &mut Criterion) {
    let mut group = c.benchmark_group("tangle");

    for &num_blocks in &[10, 100, 500] {
        let md = generate_markdown(num_blocks, 10);
        let mut refs = ReferenceMap::new();
        parse_markdown(Path::new("bench.md"), &md, &mut refs).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(num_blocks), &refs, |b, refs| {
            b.iter(|| tangle_target(black_box(refs), Path::new("output.py"), None).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_tangle);
criterion_main!(benches);
