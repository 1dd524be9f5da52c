//! Benchmarks for the storage and line-index hot paths.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use quill_core::Document;
use rand::Rng;

fn large_text(lines: usize) -> String {
    let mut text = String::new();
    for i in 0..lines {
        text.push_str(&format!("line {} with some typical content\n", i));
    }
    text
}

fn bench_load(c: &mut Criterion) {
    let text = large_text(10_000);
    c.bench_function("load_10k_lines", |b| {
        b.iter(|| Document::new(black_box(&text)))
    });
}

fn bench_local_typing(c: &mut Criterion) {
    let text = large_text(10_000);
    c.bench_function("local_typing_1k_chars", |b| {
        b.iter(|| {
            let mut doc = Document::new(&text);
            let mut pos = doc.line_start(5_000);
            for _ in 0..1_000 {
                doc.type_text(pos, "x").unwrap();
                pos += 1;
            }
            doc.len()
        })
    });
}

fn bench_random_inserts(c: &mut Criterion) {
    let text = large_text(2_000);
    c.bench_function("random_inserts_100", |b| {
        b.iter(|| {
            let mut rng = rand::thread_rng();
            let mut doc = Document::new(&text);
            for _ in 0..100 {
                let pos = rng.gen_range(0..doc.len());
                doc.insert_string(pos, "insert\n").unwrap();
            }
            doc.len()
        })
    });
}

fn bench_line_queries(c: &mut Criterion) {
    let text = large_text(10_000);
    let doc = Document::new(&text);
    let len = doc.len();
    c.bench_function("line_from_position_1k", |b| {
        b.iter(|| {
            let mut rng = rand::thread_rng();
            let mut acc = 0usize;
            for _ in 0..1_000 {
                acc += doc.line_from_position(rng.gen_range(0..len));
            }
            acc
        })
    });
}

criterion_group!(
    benches,
    bench_load,
    bench_local_typing,
    bench_random_inserts,
    bench_line_queries
);
criterion_main!(benches);
