use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde::{Deserialize, Serialize};
use sim_component::{component_types, Component, Store};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Position {
    x: f32,
    y: f32,
}

impl Component for Position {
    fn type_name() -> &'static str {
        "position"
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Leader;

impl Component for Leader {
    fn type_name() -> &'static str {
        "leader"
    }
}

/// 10 000 positioned entities, ten of which are leaders.
fn populated_store() -> Store {
    let mut store = Store::new();
    for i in 0..10_000 {
        let e = store.create_entity();
        store.add_component(
            e,
            Position {
                x: (i % 100) as f32,
                y: (i / 100) as f32,
            },
        );
        if i % 1000 == 0 {
            store.add_component(e, Leader);
        }
    }
    store
}

fn bench_rare_intersection_cold(c: &mut Criterion) {
    let mut store = populated_store();

    // The rare kind drives the scan, so this should cost ~10 lookups rather
    // than 10 000.
    c.bench_function("intersection_rare_kind_cold", |b| {
        b.iter(|| {
            store.clear_query_cache();
            black_box(store.entities_with_components(&component_types![Position, Leader]).len())
        })
    });
}

fn bench_intersection_cached(c: &mut Criterion) {
    let store = populated_store();
    let _ = store.entities_with_components(&component_types![Position, Leader]);

    c.bench_function("intersection_cached", |b| {
        b.iter(|| black_box(store.entities_with_components(&component_types![Position, Leader]).len()))
    });
}

fn bench_single_kind_cold(c: &mut Criterion) {
    let mut store = populated_store();

    c.bench_function("single_kind_10000_cold", |b| {
        b.iter(|| {
            store.clear_query_cache();
            black_box(store.entities_with::<Position>().len())
        })
    });
}

criterion_group!(
    benches,
    bench_rare_intersection_cold,
    bench_intersection_cached,
    bench_single_kind_cold
);
criterion_main!(benches);
