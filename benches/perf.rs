use criterion::{black_box, criterion_group, criterion_main, Criterion};
use diffpane::{compute_line_information, DiffOptions, DiffSession};

fn synthetic_pair(lines: usize) -> (String, String) {
    let old: Vec<String> = (0..lines).map(|i| format!("line {i}: let value = {};", i * 7)).collect();
    let mut new = old.clone();
    // Touch every 50th line so folds and word diffs both get exercised
    for i in (0..lines).step_by(50) {
        new[i] = format!("line {i}: let value = {};", i * 7 + 1);
    }
    (old.join("\n"), new.join("\n"))
}

fn bench_align(c: &mut Criterion) {
    let (old, new) = synthetic_pair(2000);
    c.bench_function("align_2000_lines", |b| {
        b.iter(|| compute_line_information(black_box(&old), black_box(&new), &DiffOptions::default()))
    });
}

fn bench_render(c: &mut Criterion) {
    let (old, new) = synthetic_pair(2000);
    let session = DiffSession::new(old, new, DiffOptions::default());
    c.bench_function("render_2000_lines", |b| b.iter(|| black_box(session.render())));
}

criterion_group!(benches, bench_align, bench_render);
criterion_main!(benches);
