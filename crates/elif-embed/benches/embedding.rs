//! Embedded Association Benchmarks
//!
//! Measures materialization from raw storage, the save cascade and
//! structural equality over growing collections.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use elif_embed::{ClassRegistry, EmbedOptions, Model, ModelClass};
use serde_json::{json, Value};
use std::sync::Arc;

fn user_class(registry: &ClassRegistry) -> Arc<ModelClass> {
    registry
        .model("Project")
        .attribute("title")
        .validates_presence_of("title")
        .build()
        .unwrap();
    registry
        .model("User")
        .attribute("name")
        .embeds_many("projects", EmbedOptions::new())
        .build()
        .unwrap()
}

fn raw_user(size: usize) -> Value {
    let projects: Vec<Value> = (0..size)
        .map(|i| json!({"title": format!("Project {}", i)}))
        .collect();
    json!({"name": "User", "projects": projects})
}

fn bench_load(c: &mut Criterion) {
    let registry = ClassRegistry::new();
    let user = user_class(&registry);
    let mut group = c.benchmark_group("load_embedded");

    for &size in &[1, 10, 100] {
        let raw = raw_user(size);
        group.bench_with_input(BenchmarkId::new("embeds_many", size), &raw, |b, raw| {
            b.iter(|| {
                let mut model = Model::from_value(&user, raw.clone()).unwrap();
                black_box(model.embedded_many("projects").unwrap().len())
            })
        });
    }

    group.finish();
}

fn bench_save(c: &mut Criterion) {
    let registry = ClassRegistry::new();
    let user = user_class(&registry);
    let mut group = c.benchmark_group("save_associations");

    for &size in &[1, 10, 100] {
        let mut model = Model::from_value(&user, raw_user(size)).unwrap();
        model.load_associations().unwrap();
        group.bench_with_input(BenchmarkId::new("cascade", size), &model, |b, model| {
            b.iter(|| {
                let mut model = model.clone();
                black_box(model.save_associations().unwrap())
            })
        });
    }

    group.finish();
}

fn bench_equality(c: &mut Criterion) {
    let registry = ClassRegistry::new();
    let user = user_class(&registry);
    let mut group = c.benchmark_group("equality");

    for &size in &[1, 10, 100] {
        let unloaded = Model::from_value(&user, raw_user(size)).unwrap();
        let mut loaded = unloaded.clone();
        loaded.load_associations().unwrap();
        let other = loaded.clone();

        group.bench_with_input(BenchmarkId::new("loaded", size), &loaded, |b, loaded| {
            b.iter(|| black_box(*loaded == other))
        });
        group.bench_with_input(BenchmarkId::new("unloaded", size), &unloaded, |b, unloaded| {
            b.iter(|| black_box(*unloaded == loaded))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_load, bench_save, bench_equality);
criterion_main!(benches);
