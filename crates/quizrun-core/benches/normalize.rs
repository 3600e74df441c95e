use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::{json, Value};

use quizrun_core::model::normalize_text;
use quizrun_core::normalize::{normalize_bank, BankPayload};

fn make_records(n: usize, broken_every: usize) -> Vec<Value> {
    (0..n)
        .map(|i| {
            if broken_every > 0 && i % broken_every == 0 {
                json!({"question": "broken", "options": ["only", "three", "options"], "answer_index": 0})
            } else {
                json!({
                    "id": i,
                    "question": format!("  What does   item {i} do?  "),
                    "options": ["a", "b", 3, true],
                    "answer_index": i % 4,
                    "difficulty": "medium",
                    "tags": ["bench", "generated"],
                })
            }
        })
        .collect()
}

fn bench_normalize_bank(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_bank");

    let clean = make_records(1000, 0);
    let noisy = make_records(1000, 5);

    group.bench_function("1000 clean", |b| {
        b.iter(|| normalize_bank("bench", BankPayload::Bare(black_box(clean.clone()))))
    });

    group.bench_function("1000 with 20% malformed", |b| {
        b.iter(|| normalize_bank("bench", BankPayload::Bare(black_box(noisy.clone()))))
    });

    group.finish();
}

fn bench_normalize_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_text");

    let short = "  What is\tTCP?  ";
    let long = "Which\u{00A0}of the following \u{2003}statements about virtual memory \
                is\u{FEFF} correct when   paging is enabled?   ";

    group.bench_function("short", |b| b.iter(|| normalize_text(black_box(short))));
    group.bench_function("long unicode spacing", |b| {
        b.iter(|| normalize_text(black_box(long)))
    });

    group.finish();
}

criterion_group!(benches, bench_normalize_bank, bench_normalize_text);
criterion_main!(benches);
