//! Integration Tests for the Document Store
//!
//! End-to-end facade tests against `ScriptedTransport`: compiled query
//! bodies, page parsing, materialization, scrolling and index lifecycle.
//!
//! # Running Tests
//! ```bash
//! cargo test --test integration
//!
//! # Run only happy-path tests
//! cargo test --test integration happy
//! ```
//!
//! # Test Organization
//! - `happy_*` - Normal operation: lists, pages, streaming, lookups, indexes
//! - `failure_*` - Wire and shape errors surfacing through the facade

use std::ops::ControlFlow;
use std::sync::Arc;

use serde_json::{json, Value};

use elastic_docstore::schema::{DocMapping, DocumentType};
use elastic_docstore::search::{FilterBuilder, FilterExpr, SearchQuery};
use elastic_docstore::transport::{ScriptedTransport, TransportCall, TransportResponse};
use elastic_docstore::{DocStoreConfig, DocStoreError, DocumentStore, ErrorCategory};

// =============================================================================
// Fixtures
// =============================================================================

fn order_type() -> DocumentType {
    DocumentType::new(
        "order",
        DocMapping::new("order", "order")
            .text("status")
            .object("customer")
            .raw("customer.name", "customer.name.raw")
            .long("customer.id")
            .date_time("whenCreated")
            .many("lines")
            .long("lines.qty")
            .text("lines.sku"),
    )
}

fn setup() -> (Arc<ScriptedTransport>, DocumentStore) {
    let transport = Arc::new(ScriptedTransport::new());
    let store = DocumentStore::new(transport.clone(), DocStoreConfig::default());
    (transport, store)
}

fn order_hit(id: usize, status: &str) -> Value {
    json!({
        "_id": id.to_string(),
        "_score": 1.0,
        "_source": { "status": status, "customer": { "name": "Rob" }, "lines": [ { "qty": id } ] }
    })
}

fn order_hits(from: usize, count: usize) -> Vec<Value> {
    (from..from + count).map(|i| order_hit(i, "NEW")).collect()
}

fn posted(transport: &ScriptedTransport) -> Vec<Value> {
    transport
        .posted_queries()
        .iter()
        .map(|body| serde_json::from_str(body).unwrap())
        .collect()
}

// =============================================================================
// Happy path
// =============================================================================

#[tokio::test]
async fn happy_find_list_materializes_full_records() {
    let (transport, store) = setup();
    let order = order_type();
    transport.push_page(2, None, &[order_hit(1, "NEW"), order_hit(2, "NEW")]);

    let query = SearchQuery::new(&order)
        .filter(FilterExpr::eq("status", "NEW"))
        .order_by_asc("customer.name")
        .max_rows(10);
    let orders = store.find_list(&query).await.unwrap();

    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].id.as_deref(), Some("1"));
    assert_eq!(orders[1].get("customer.name"), Some(&json!("Rob")));

    let calls = transport.calls();
    assert!(matches!(
        &calls[0],
        TransportCall::PostQuery { scroll: false, index_name, doc_type, .. }
            if index_name == "order" && doc_type == "order"
    ));

    let body = &posted(&transport)[0];
    assert_eq!(body["size"], 10);
    assert!(body.get("from").is_none());
    assert_eq!(body["query"]["filtered"]["filter"], json!({ "term": { "status": "NEW" } }));
    assert_eq!(body["sort"], json!([{ "customer.name.raw": { "order": "asc" } }]));
}

#[tokio::test]
async fn happy_find_list_never_scrolls_or_clears() {
    let (transport, store) = setup();
    let order = order_type();
    transport.push_page(500, None, &order_hits(0, 10));

    let orders = store.find_list(&SearchQuery::new(&order).max_rows(10)).await.unwrap();
    assert_eq!(orders.len(), 10);
    assert!(!transport
        .calls()
        .iter()
        .any(|c| matches!(c, TransportCall::GetScroll { .. } | TransportCall::ClearScrollIds { .. })));
}

#[tokio::test]
async fn happy_find_list_with_selection_reads_fields() {
    let (transport, store) = setup();
    let order = order_type();
    transport.push_page(
        1,
        None,
        &[json!({
            "_id": "5",
            "fields": { "status": ["NEW"], "customer.name": ["Rob"] }
        })],
    );

    let query = SearchQuery::new(&order).select(["status"]).fetch("customer", ["name"]);
    let orders = store.find_list(&query).await.unwrap();

    assert_eq!(orders[0].id.as_deref(), Some("5"));
    assert_eq!(orders[0].get("status"), Some(&json!("NEW")));
    assert_eq!(orders[0].get("customer.name"), Some(&json!("Rob")));

    let body = &posted(&transport)[0];
    assert_eq!(body["fields"], json!(["customer.name", "status"]));
    assert_eq!(body["query"], json!({ "match_all": {} }));
}

#[tokio::test]
async fn happy_find_paged_list_reports_total() {
    let (transport, store) = setup();
    let order = order_type();
    transport.push_page(45, None, &order_hits(20, 10));

    let page = store
        .find_paged_list(&SearchQuery::new(&order).first_row(20).max_rows(10))
        .await
        .unwrap();

    assert_eq!(page.total, 45);
    assert_eq!(page.list.len(), 10);
    assert_eq!(page.total_page_count(), 5);
    assert_eq!(page.page_index(), 2);
    assert!(page.has_next());
    assert!(page.has_prev());

    let body = &posted(&transport)[0];
    assert_eq!(body["from"], 20);
    assert_eq!(body["size"], 10);
}

#[tokio::test]
async fn happy_find_each_scrolls_and_releases_once() {
    let (transport, store) = setup();
    let order = order_type();
    transport.push_page(100, Some("c1"), &order_hits(0, 50));
    transport.push_page(100, Some("c2"), &order_hits(50, 50));
    transport.push_page(100, Some("c2"), &[]);

    let mut ids = Vec::new();
    let count = store
        .find_each(&SearchQuery::new(&order), |order| {
            ids.push(order.id.unwrap_or_default());
            ControlFlow::Continue(())
        })
        .await
        .unwrap();

    assert_eq!(count, 100);
    assert_eq!(ids.len(), 100);
    assert_eq!(ids[0], "0");
    assert_eq!(ids[99], "99");

    let calls = transport.calls();
    assert!(matches!(&calls[0], TransportCall::PostQuery { scroll: true, .. }));
    assert_eq!(
        calls.iter().filter(|c| matches!(c, TransportCall::GetScroll { .. })).count(),
        2
    );
    assert_eq!(
        transport.cleared_scroll_ids(),
        vec![vec!["c1".to_string(), "c2".to_string()]]
    );
}

#[tokio::test]
async fn happy_find_each_zero_hits_makes_no_scroll_call() {
    let (transport, store) = setup();
    let order = order_type();
    transport.push_page(0, Some("c1"), &[]);

    let count = store
        .find_each(&SearchQuery::new(&order), |_| ControlFlow::Continue(()))
        .await
        .unwrap();

    assert_eq!(count, 0);
    assert!(!transport.calls().iter().any(|c| matches!(c, TransportCall::GetScroll { .. })));
    assert_eq!(transport.cleared_scroll_ids(), vec![vec!["c1".to_string()]]);
}

#[tokio::test]
async fn happy_find_each_raw_source_streams_source_text() {
    let (transport, store) = setup();
    let order = order_type();
    transport.push_page(
        2,
        Some("r1"),
        &[
            json!({ "_id": "a", "_source": { "status": "NEW" } }),
            json!({ "_id": "b", "_source": { "status": "OLD" } }),
        ],
    );

    let mut raw = Vec::new();
    let count = store
        .find_each_raw_source(&SearchQuery::new(&order), |source| {
            raw.push(source);
            ControlFlow::Continue(())
        })
        .await
        .unwrap();

    assert_eq!(count, 2);
    assert_eq!(raw[0].id, "a");
    assert_eq!(raw[1].source, r#"{"status":"OLD"}"#);
    assert_eq!(transport.cleared_scroll_ids(), vec![vec!["r1".to_string()]]);
}

#[tokio::test]
async fn happy_get_by_id_found() {
    let (transport, store) = setup();
    let order = order_type();
    transport.put_document("o-1", &json!({ "status": "NEW" }));

    let found = store.get_by_id(&order, "o-1").await.unwrap().unwrap();
    assert_eq!(found.id.as_deref(), Some("o-1"));
    assert_eq!(found.get("status"), Some(&json!("NEW")));

    assert!(matches!(
        &transport.calls()[0],
        TransportCall::GetDocSource { id, index_name, .. } if id == "o-1" && index_name == "order"
    ));
}

#[tokio::test]
async fn happy_get_by_id_missing_is_none() {
    let (_transport, store) = setup();
    let order = order_type();
    assert!(store.get_by_id(&order, 42).await.unwrap().is_none());
}

#[tokio::test]
async fn happy_nested_filter_end_to_end() {
    let (transport, store) = setup();
    let order = order_type();
    transport.push_page(0, None, &[]);

    let filter = FilterBuilder::new()
        .eq("lines.sku", "A")
        .ge("lines.qty", 2)
        .ieq("customer.name", "Rob Smith")
        .build_and();
    store
        .find_list(&SearchQuery::new(&order).filter_opt(filter))
        .await
        .unwrap();

    let body = &posted(&transport)[0];
    assert_eq!(
        body["query"]["filtered"]["filter"],
        json!({ "bool": { "must": [
            { "nested": { "path": "lines", "filter": { "bool": { "must": [
                { "term": { "lines.sku": "A" } },
                { "range": { "lines.qty": { "gte": 2 } } }
            ] } } } },
            { "bool": { "must": [
                { "match": { "customer.name": "rob" } },
                { "match": { "customer.name": "smith" } }
            ] } }
        ] } })
    );
}

#[tokio::test]
async fn happy_create_indexes_uses_versioned_name_and_alias() {
    let (transport, store) = setup();
    store.register(&order_type());

    assert_eq!(store.create_indexes().await.unwrap(), 1);

    let calls = transport.calls();
    let mapping = calls
        .iter()
        .find_map(|c| match c {
            TransportCall::IndexCreate { index_name, mapping_json } if index_name == "order_v1" => {
                Some(serde_json::from_str::<Value>(mapping_json).unwrap())
            }
            _ => None,
        })
        .unwrap();
    assert_eq!(mapping["mappings"]["order"]["properties"]["lines"]["type"], "nested");
    assert!(calls.iter().any(|c| matches!(c, TransportCall::IndexAlias(json) if json.contains("\"alias\":\"order\""))));
}

// =============================================================================
// Failure scenarios
// =============================================================================

#[tokio::test]
async fn failure_get_by_id_server_error_is_io() {
    let (transport, store) = setup();
    let order = order_type();
    transport.put_document_response("o-1", TransportResponse::new(500, "shard failure"));

    let err = store.get_by_id(&order, "o-1").await.unwrap_err();
    assert!(matches!(err, DocStoreError::WireProtocol { status: 500, .. }));
    assert_eq!(err.category(), ErrorCategory::Io);
    assert_eq!(err.to_string(), "Unhandled response code 500 body:shard failure");

    let io: std::io::Error = err.into();
    assert_eq!(io.kind(), std::io::ErrorKind::Other);
}

#[tokio::test]
async fn failure_find_list_bad_status() {
    let (transport, store) = setup();
    let order = order_type();
    transport.push_response(TransportResponse::new(400, "parse error"));

    let err = store.find_list(&SearchQuery::new(&order)).await.unwrap_err();
    assert!(matches!(err, DocStoreError::WireProtocol { status: 400, .. }));
}

#[tokio::test]
async fn failure_find_list_malformed_body() {
    let (transport, store) = setup();
    let order = order_type();
    transport.push_response(TransportResponse::ok("{\"hits\": 3}"));

    let err = store.find_list(&SearchQuery::new(&order)).await.unwrap_err();
    assert!(matches!(err, DocStoreError::MalformedResponse(_)));
}

#[tokio::test]
async fn failure_unknown_path_fails_before_any_call() {
    let (transport, store) = setup();
    let order = order_type();

    let err = store
        .find_list(&SearchQuery::new(&order).filter(FilterExpr::eq("nope", 1)))
        .await
        .unwrap_err();
    assert!(matches!(err, DocStoreError::Compilation(_)));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn failure_transport_error_propagates() {
    let (transport, store) = setup();
    let order = order_type();
    transport.push_failure("connection reset");

    let err = store.find_list(&SearchQuery::new(&order)).await.unwrap_err();
    assert!(matches!(err, DocStoreError::Transport(_)));
    assert_eq!(err.kind(), "transport");
}
