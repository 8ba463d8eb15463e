use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use mining_exporter::{
    metrics::{descriptor::HostInfo, fetch::SnapshotSource},
    web::exposition,
    Backend, ExporterConfig, JsonCollector,
};
use serde_json::Value;
use std::path::PathBuf;

fn load_fixture(name: &str) -> Value {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let content = std::fs::read_to_string(path).expect("Should read fixture");
    serde_json::from_str(&content).expect("Should parse fixture")
}

fn collector(backend: Backend) -> JsonCollector {
    JsonCollector::new(
        backend.spec(),
        SnapshotSource::fixture("/unused.json"),
        HostInfo::new("bench-host", "Linux"),
        ExporterConfig::default(),
    )
    .expect("Should build collector")
}

/// Benchmark snapshot to family assembly for each backend
fn bench_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("assemble");

    for (backend, file) in [
        (Backend::Trex, "trex_summary.json"),
        (Backend::Lolminer, "lolminer.json"),
    ] {
        let collector = collector(backend);
        let snapshot = load_fixture(file);
        group.bench_with_input(BenchmarkId::from_parameter(backend), &snapshot, |b, snapshot| {
            b.iter(|| collector.assemble(snapshot, 0).expect("Should assemble"))
        });
    }

    group.finish();
}

/// Benchmark rendering assembled families in the text exposition format
fn bench_exposition(c: &mut Criterion) {
    let families = collector(Backend::Trex)
        .assemble(&load_fixture("trex_summary.json"), 0)
        .expect("Should assemble");

    c.bench_function("render_text_exposition", |b| b.iter(|| exposition::render(&families)));
}

criterion_group!(benches, bench_assembly, bench_exposition);
criterion_main!(benches);
