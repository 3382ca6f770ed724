//! Performance benchmarks for IssueGraph core operations
//!
//! Run with: `cargo bench -p issuegraph-core`
//!
//! These benchmarks measure critical path performance:
//! - Node creation (label minting plus index maintenance)
//! - Link creation (two node documents per link)
//! - Listing, which checks every minted index

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use issuegraph_core::{CreateLinkRequest, CreateNodeRequest, GraphConfig, GraphEngine};
use tempfile::TempDir;
use tokio::runtime::Runtime;

/// Setup a seeded in-memory engine
async fn setup_engine() -> GraphEngine {
    GraphEngine::open(&GraphConfig::memory()).await.unwrap()
}

/// Setup a seeded engine over an embedded SQLite file
async fn setup_sqlite_engine() -> (GraphEngine, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let config = GraphConfig::sqlite(temp_dir.path().join("bench.db"));
    let engine = GraphEngine::open(&config).await.unwrap();
    (engine, temp_dir)
}

fn bench_create_node(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let engine = rt.block_on(setup_engine());

    c.bench_function("create_node_memory", |b| {
        b.iter(|| {
            rt.block_on(async {
                let response = engine
                    .create_node(CreateNodeRequest::new("task", "Benchmark task"))
                    .await;
                black_box(response)
            })
        });
    });

    let (sqlite_engine, _temp_dir) = rt.block_on(setup_sqlite_engine());
    c.bench_function("create_node_sqlite", |b| {
        b.iter(|| {
            rt.block_on(async {
                let response = sqlite_engine
                    .create_node(CreateNodeRequest::new("task", "Benchmark task"))
                    .await;
                black_box(response)
            })
        });
    });
}

fn bench_create_link(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let engine = rt.block_on(async {
        let engine = setup_engine().await;
        engine
            .create_node(CreateNodeRequest::new("feature", "Hub"))
            .await;
        engine
    });

    c.bench_function("create_link", |b| {
        b.iter(|| {
            rt.block_on(async {
                let task = engine
                    .create_node(CreateNodeRequest::new("task", "Spoke"))
                    .await
                    .data
                    .unwrap();
                let response = engine
                    .create_link(
                        "feature",
                        "Feature-1",
                        CreateLinkRequest::new("has-task", task.label),
                    )
                    .await;
                black_box(response)
            })
        });
    });
}

fn bench_list_nodes(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let engine = rt.block_on(async {
        let engine = setup_engine().await;
        for i in 0..500 {
            engine
                .create_node(CreateNodeRequest::new("bug", format!("Bug {}", i)))
                .await;
        }
        engine
    });

    c.bench_function("list_nodes_500", |b| {
        b.iter(|| rt.block_on(async { black_box(engine.list_nodes(Some("bug")).await) }));
    });
}

criterion_group!(benches, bench_create_node, bench_create_link, bench_list_nodes);
criterion_main!(benches);
