use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ltschem::prelude::*;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn bench_parse_schematic(c: &mut Criterion) {
    c.bench_function("parse_schematic", |b| {
        b.iter(|| ltschem::parse_schematic(black_box(&fixture_path("fuel_tanks.asc"))));
    });
}

fn bench_check_schematic(c: &mut Criterion) {
    let options = CheckOptions::default();
    c.bench_function("check_schematic", |b| {
        b.iter(|| {
            AscToolkit::check_schematic(
                black_box(&fixture_path("fuel_tanks.asc")),
                black_box(&options),
            )
        });
    });
}

fn bench_extract_nets(c: &mut Criterion) {
    let schematic = ltschem::parse_schematic(&fixture_path("fuel_tanks.asc")).unwrap();
    c.bench_function("extract_nets", |b| {
        b.iter(|| NetExtractor::extract(black_box(&schematic)));
    });
}

criterion_group!(
    benches,
    bench_parse_schematic,
    bench_check_schematic,
    bench_extract_nets
);
criterion_main!(benches);
