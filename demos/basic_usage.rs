// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Basic elastic-docstore usage example.
//!
//! Demonstrates:
//! 1. Registering a document type and creating its aliased index
//! 2. A bounded paged query with nested filters
//! 3. Streaming every match over a scroll cursor
//! 4. Fetching one document by id
//! 5. Displaying metrics
//!
//! Runs against the in-process scripted transport, so no cluster is needed.
//!
//! # Run
//!
//! ```bash
//! cargo run --example basic_usage
//! ```

use std::ops::ControlFlow;
use std::sync::Arc;

use elastic_docstore::schema::{DocMapping, DocumentType};
use elastic_docstore::search::{FilterBuilder, QueryCompiler, SearchQuery};
use elastic_docstore::transport::ScriptedTransport;
use elastic_docstore::{DocStoreConfig, DocumentStore};
use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use serde_json::{json, Value};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder.install().expect("failed to install metrics recorder");

    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    println!("\n╔═══════════════════════════════════════════════════════════════╗");
    println!("║          elastic-docstore: Basic Usage Example                ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    // ─────────────────────────────────────────────────────────────────────────
    // 1. Register the document type and create indexes
    // ─────────────────────────────────────────────────────────────────────────
    let transport = Arc::new(ScriptedTransport::new());
    let store = DocumentStore::new(transport.clone(), DocStoreConfig::default());

    let order = DocumentType::new(
        "order",
        DocMapping::new("order", "order")
            .text("status")
            .object("customer")
            .raw("customer.name", "customer.name.raw")
            .many("lines")
            .long("lines.qty")
            .text("lines.sku"),
    );
    store.register(&order);

    let created = store.create_indexes().await?;
    println!("📦 Created {} index(es): order_v1 → alias order", created);

    // ─────────────────────────────────────────────────────────────────────────
    // 2. Paged query
    // ─────────────────────────────────────────────────────────────────────────
    let filter = FilterBuilder::new()
        .eq("status", "NEW")
        .ge("lines.qty", 10)
        .starts_with("lines.sku", "AB")
        .build_and();
    let query = SearchQuery::new(&order)
        .filter_opt(filter)
        .order_by_asc("customer.name");

    let body = QueryCompiler::compile_value(&query.clone().max_rows(2))?;
    println!("\n🔎 Compiled query:\n{}", serde_json::to_string_pretty(&body)?);

    transport.push_page(5, None, &orders(0, 2));
    let page = store.find_paged_list(&query.clone().max_rows(2)).await?;
    println!(
        "\n📄 Page {} of {}: {} record(s), {} total",
        page.page_index() + 1,
        page.total_page_count(),
        page.len(),
        page.total
    );

    // ─────────────────────────────────────────────────────────────────────────
    // 3. Scroll over everything
    // ─────────────────────────────────────────────────────────────────────────
    transport.push_page(5, Some("scroll-1"), &orders(0, 3));
    transport.push_page(5, Some("scroll-2"), &orders(3, 2));

    let count = store
        .find_each(&query, |record| {
            println!("   └─ {:?} {}", record.id, record.source["status"]);
            ControlFlow::Continue(())
        })
        .await?;
    println!("\n🌊 Scrolled {} record(s)", count);
    println!("   Released cursors: {:?}", transport.cleared_scroll_ids());

    // ─────────────────────────────────────────────────────────────────────────
    // 4. Fetch by id
    // ─────────────────────────────────────────────────────────────────────────
    transport.put_document("o-7", &json!({ "status": "SHIPPED" }));
    let found = store.get_by_id(&order, "o-7").await?;
    let missing = store.get_by_id(&order, "o-404").await?;
    println!("\n🔑 o-7 → {:?}", found.map(|doc| doc.source));
    println!("   o-404 → {:?}", missing);

    // ─────────────────────────────────────────────────────────────────────────
    // 5. Metrics
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n📊 Metrics:");
    dump_metrics(&snapshotter);

    println!("\n✅ Done\n");
    Ok(())
}

fn orders(from: usize, count: usize) -> Vec<Value> {
    (from..from + count)
        .map(|i| {
            json!({
                "_id": format!("o-{}", i),
                "_source": {
                    "status": "NEW",
                    "customer": { "name": format!("Customer {}", i) },
                    "lines": [ { "qty": 10 + i, "sku": "AB-1" } ]
                }
            })
        })
        .collect()
}

fn dump_metrics(snapshotter: &Snapshotter) {
    let mut counters: Vec<_> = vec![];
    let mut gauges: Vec<_> = vec![];
    let mut histograms: Vec<_> = vec![];

    for (composite_key, _, _, value) in snapshotter.snapshot().into_vec() {
        let (_, key) = composite_key.into_parts();
        let name = key.name().to_string();
        let labels: Vec<_> = key.labels().map(|l| format!("{}={}", l.key(), l.value())).collect();
        let label_str = if labels.is_empty() { String::new() } else { format!("{{{}}}", labels.join(",")) };

        match value {
            DebugValue::Counter(v) => counters.push((name, label_str, v)),
            DebugValue::Gauge(v) => gauges.push((name, label_str, v.into_inner())),
            DebugValue::Histogram(samples) => {
                let count = samples.len();
                let sum: f64 = samples.iter().map(|v| v.into_inner()).sum();
                histograms.push((name, label_str, count, sum));
            }
        }
    }

    counters.sort_by(|a, b| a.0.cmp(&b.0));
    gauges.sort_by(|a, b| a.0.cmp(&b.0));
    histograms.sort_by(|a, b| a.0.cmp(&b.0));

    for (name, labels, value) in &counters {
        println!("   ├─ {}{} = {}", name, labels, value);
    }
    for (name, labels, value) in &gauges {
        println!("   ├─ {}{} = {:.0}", name, labels, value);
    }
    for (name, labels, count, sum) in &histograms {
        println!("   ├─ {}{} count={} sum={:.4}", name, labels, count, sum);
    }
    if counters.is_empty() && gauges.is_empty() && histograms.is_empty() {
        println!("   └─ (no metrics recorded)");
    }
}
