// ABOUTME: Benchmark suite for the session's hot helpers
// ABOUTME: Measures message segmentation across text sizes and encoding budgets

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use smpp_session::session::segment;
use std::time::Duration;

fn sample_text(len: usize) -> String {
    "Lorem ipsum dolor sit amet ".chars().cycle().take(len).collect()
}

fn bench_segmentation(c: &mut Criterion) {
    let mut group = c.benchmark_group("segmentation");
    group.measurement_time(Duration::from_secs(5));

    for len in [32, 320, 3200] {
        let text = sample_text(len);
        group.bench_with_input(BenchmarkId::new("default_alphabet", len), &text, |b, text| {
            b.iter(|| segment(black_box(text), black_box(140)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("ucs2", len), &text, |b, text| {
            b.iter(|| segment(black_box(text), black_box(70)).unwrap());
        });
    }

    group.finish();
}

fn bench_reassembly(c: &mut Criterion) {
    let text = sample_text(3200);
    let parts = segment(&text, 140).unwrap();

    c.bench_function("reassemble_3200_chars", |b| {
        b.iter(|| {
            let rebuilt: String = black_box(&parts).iter().map(|p| p.text.as_str()).collect();
            black_box(rebuilt)
        });
    });
}

criterion_group!(benches, bench_segmentation, bench_reassembly);
criterion_main!(benches);
