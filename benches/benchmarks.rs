//! Benchmarks for the pagination core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pageflow::{html_to_text, split_at, text_to_html, PageStore, MAX_PAGES_PER_STORY};

fn story_text() -> String {
    (0..40)
        .map(|i| {
            format!(
                "Paragraph {i} has enough text to span a few display lines,\nwith an embedded break for good measure."
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn bench_text_to_html(c: &mut Criterion) {
    let text = story_text();
    c.bench_function("text_to_html_story", |b| {
        b.iter(|| text_to_html(black_box(&text)));
    });
}

fn bench_html_to_text(c: &mut Criterion) {
    let html = text_to_html(&story_text());
    c.bench_function("html_to_text_story", |b| {
        b.iter(|| html_to_text(black_box(&html)));
    });
}

fn bench_round_trip(c: &mut Criterion) {
    let text = story_text();
    c.bench_function("markup_round_trip", |b| {
        b.iter(|| html_to_text(&text_to_html(black_box(&text))));
    });
}

fn bench_split(c: &mut Criterion) {
    let text = story_text();
    let middle = text.len() / 2;
    c.bench_function("split_at_middle", |b| {
        b.iter(|| split_at(black_box(&text), black_box(middle)));
    });
}

fn bench_store_updates(c: &mut Criterion) {
    c.bench_function("store_update_and_project", |b| {
        let mut store = PageStore::from_text(&story_text(), MAX_PAGES_PER_STORY);
        let mut n = 0u64;
        b.iter(|| {
            n += 1;
            store
                .set_current_content(&format!("edited content {n}"))
                .unwrap();
            black_box(store.combined_content());
        });
    });
}

criterion_group!(
    benches,
    bench_text_to_html,
    bench_html_to_text,
    bench_round_trip,
    bench_split,
    bench_store_updates
);
criterion_main!(benches);
