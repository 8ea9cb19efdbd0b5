// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query compiler: search request to engine query document.
//!
//! # Output
//!
//! ```text
//! {
//!   "from": 20, "size": 10,                        -- only when > 0
//!   "_source": {"include": ["lines.*"]},           -- many-path fetches
//!   "fields": ["status", "customer.name"],         -- root / one-path fetches
//!   "query": {"filtered": {"filter": <clause>}},   -- or {"match_all": {}}
//!   "sort": [{"customer.name.raw": {"order": "asc"}}]
//! }
//! ```
//!
//! # Nested grouping
//!
//! A leaf on a path under a many relation is wrapped in a `nested` clause
//! for its many root. Consecutive leaves in the same bool scope that share
//! a many root go into one `nested` clause:
//!
//! ```text
//! and(eq(lines.qty, 2), eq(lines.sku, "A"), eq(status, "NEW"))
//!
//! {"bool": {"must": [
//!     {"nested": {"path": "lines", "filter": {"bool": {"must": [
//!         {"term": {"lines.qty": 2}}, {"term": {"lines.sku": "A"}}
//!     ]}}}},
//!     {"term": {"status": "NEW"}}
//! ]}}
//! ```
//!
//! A nested scope closes when a leaf with a different (or no) many root
//! arrives, when a bool scope opens or closes, and at the end of the filter.
//! Interleaved roots (`lines`, `status`, `lines`) yield two `nested`
//! clauses for `lines`.

use serde_json::{json, Map, Value};
use tracing::debug;

use super::query::{FetchProperties, SearchQuery};
use super::query_builder::{FilterExpr, LikeType, QueryValue, RangeBound};
use super::scalar::ScalarWriter;
use crate::error::{DocStoreError, Result};
use crate::schema::{ExpressionPath, RecordType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Occur {
    Must,
    Should,
    MustNot,
}

impl Occur {
    fn as_str(self) -> &'static str {
        match self {
            Self::Must => "must",
            Self::Should => "should",
            Self::MustNot => "must_not",
        }
    }
}

fn bool_clause(occur: Occur, clauses: Vec<Value>) -> Value {
    let mut body = Map::new();
    body.insert(occur.as_str().to_string(), Value::Array(clauses));
    json!({ "bool": body })
}

fn field_clause(kind: &str, field: &str, value: Value) -> Value {
    let mut body = Map::new();
    body.insert(field.to_string(), value);
    let mut clause = Map::new();
    clause.insert(kind.to_string(), Value::Object(body));
    Value::Object(clause)
}

struct BoolScope {
    occur: Occur,
    clauses: Vec<Value>,
}

struct NestedScope {
    path: String,
    /// Occur of the enclosing bool scope, reused when the nested filter
    /// holds more than one clause.
    occur: Occur,
    clauses: Vec<Value>,
}

/// Compiles search requests for one record type.
pub struct QueryCompiler;

impl QueryCompiler {
    /// Compile a request to the engine JSON body.
    pub fn compile<R: RecordType>(query: &SearchQuery<'_, R>) -> Result<Vec<u8>> {
        let doc = Self::compile_value(query)?;
        let body = serde_json::to_vec(&doc)?;
        debug!(
            type_key = query.record_type().type_key(),
            bytes = body.len(),
            "Compiled search query"
        );
        crate::metrics::record_query_bytes(body.len());
        Ok(body)
    }

    /// Compile a request to a JSON value.
    pub fn compile_value<R: RecordType>(query: &SearchQuery<'_, R>) -> Result<Value> {
        let record_type = query.record_type();
        let mut doc = Map::new();

        if query.first_row_value() > 0 {
            doc.insert("from".into(), json!(query.first_row_value()));
        }
        if query.max_rows_value() > 0 {
            doc.insert("size".into(), json!(query.max_rows_value()));
        }

        Self::write_selection(query, &mut doc);

        let query_clause = match (query.id_value(), query.filter_expr()) {
            (None, None) => json!({ "match_all": {} }),
            (id, filter) => {
                let filter = FilterContext::new(record_type).compile(id, filter)?;
                json!({ "filtered": { "filter": filter } })
            }
        };
        doc.insert("query".into(), query_clause);

        if !query.order_by_list().is_empty() {
            let sort: Vec<Value> = query
                .order_by_list()
                .iter()
                .map(|order| {
                    let raw = record_type.doc_mapping().raw_property(&order.path);
                    let direction = if order.ascending { "asc" } else { "desc" };
                    let mut key = Map::new();
                    key.insert(raw.to_string(), json!({ "order": direction }));
                    Value::Object(key)
                })
                .collect();
            doc.insert("sort".into(), Value::Array(sort));
        }

        Ok(Value::Object(doc))
    }

    fn write_selection<R: RecordType>(query: &SearchQuery<'_, R>, doc: &mut Map<String, Value>) {
        let selection = query.selection();
        if selection.is_empty() {
            return;
        }

        let record_type = query.record_type();
        let mut includes: Vec<String> = Vec::new();
        let mut fields: Vec<String> = Vec::new();
        let push_unique = |list: &mut Vec<String>, value: String| {
            if !list.contains(&value) {
                list.push(value);
            }
        };

        for fetch in &selection.fetches {
            match &fetch.properties {
                FetchProperties::All => push_unique(&mut includes, format!("{}.*", fetch.path)),
                FetchProperties::Only(props) => {
                    let many = record_type.contains_many(&fetch.path);
                    for prop in props {
                        let full = format!("{}.{}", fetch.path, prop);
                        if many {
                            push_unique(&mut includes, full);
                        } else {
                            push_unique(&mut fields, full);
                        }
                    }
                }
            }
        }
        for prop in &selection.root {
            push_unique(&mut fields, prop.clone());
        }

        if !includes.is_empty() {
            doc.insert("_source".into(), json!({ "include": includes }));
        }
        if !fields.is_empty() {
            doc.insert("fields".into(), json!(fields));
        }
    }
}

/// Per-query compilation state: a stack of open bool scopes plus at most
/// one open nested scope.
struct FilterContext<'a, R: RecordType> {
    record_type: &'a R,
    scopes: Vec<BoolScope>,
    nested: Option<NestedScope>,
    root: Vec<Value>,
}

impl<'a, R: RecordType> FilterContext<'a, R> {
    fn new(record_type: &'a R) -> Self {
        Self {
            record_type,
            scopes: Vec::new(),
            nested: None,
            root: Vec::new(),
        }
    }

    fn compile(mut self, id: Option<&QueryValue>, filter: Option<&FilterExpr>) -> Result<Value> {
        match (id, filter) {
            (Some(id), Some(filter)) => {
                // id and where clause share one must scope
                self.start_bool(Occur::Must);
                self.write_ids(std::slice::from_ref(id))?;
                match filter {
                    FilterExpr::And(children) => {
                        for child in children {
                            self.write_expr(child)?;
                        }
                    }
                    other => self.write_expr(other)?,
                }
                self.end_bool()?;
            }
            (Some(id), None) => self.write_ids(std::slice::from_ref(id))?,
            (None, Some(filter)) => self.write_expr(filter)?,
            (None, None) => {}
        }
        self.finish()
    }

    fn finish(mut self) -> Result<Value> {
        self.end_nested();
        if !self.scopes.is_empty() {
            return Err(DocStoreError::Compilation(format!(
                "{} bool scope(s) left open",
                self.scopes.len()
            )));
        }
        match self.root.len() {
            1 => self.root.pop().ok_or_else(|| DocStoreError::Compilation("empty filter".into())),
            0 => Err(DocStoreError::Compilation("filter produced no clause".into())),
            n => Err(DocStoreError::Compilation(format!(
                "filter produced {} top-level clauses",
                n
            ))),
        }
    }

    fn current_occur(&self) -> Occur {
        self.scopes.last().map_or(Occur::Must, |scope| scope.occur)
    }

    /// Append to the innermost bool scope, bypassing any nested scope.
    fn push_clause(&mut self, clause: Value) {
        match self.scopes.last_mut() {
            Some(scope) => scope.clauses.push(clause),
            None => self.root.push(clause),
        }
    }

    /// Append a leaf clause, inside the open nested scope if any.
    fn emit(&mut self, clause: Value) {
        match self.nested.as_mut() {
            Some(nested) => nested.clauses.push(clause),
            None => self.push_clause(clause),
        }
    }

    fn start_bool(&mut self, occur: Occur) {
        self.end_nested();
        self.scopes.push(BoolScope {
            occur,
            clauses: Vec::new(),
        });
    }

    fn end_bool(&mut self) -> Result<()> {
        self.end_nested();
        let scope = self.scopes.pop().ok_or_else(|| {
            DocStoreError::Compilation("bool scope closed without a matching open".into())
        })?;
        self.push_clause(bool_clause(scope.occur, scope.clauses));
        Ok(())
    }

    fn start_nested(&mut self, path: &str) {
        if self.nested.as_ref().is_some_and(|n| n.path == path) {
            return;
        }
        self.end_nested();
        self.nested = Some(NestedScope {
            path: path.to_string(),
            occur: self.current_occur(),
            clauses: Vec::new(),
        });
    }

    fn end_nested(&mut self) {
        let Some(mut scope) = self.nested.take() else {
            return;
        };
        let filter = match scope.clauses.len() {
            0 => return,
            1 => scope.clauses.remove(0),
            _ => bool_clause(scope.occur, scope.clauses),
        };
        self.push_clause(json!({ "nested": { "path": scope.path, "filter": filter } }));
    }

    fn resolve(&self, path: &str) -> Result<ExpressionPath> {
        self.record_type.expression_path(path).ok_or_else(|| {
            DocStoreError::Compilation(format!(
                "unknown property path '{}' on type '{}'",
                path,
                self.record_type.type_key()
            ))
        })
    }

    /// Open, continue or close the nested scope for a leaf on `path`.
    fn prepare_nested(&mut self, path: &ExpressionPath) {
        match path.many_root_path.as_deref() {
            Some(root) if path.contains_many => self.start_nested(root),
            _ => self.end_nested(),
        }
    }

    fn write_expr(&mut self, expr: &FilterExpr) -> Result<()> {
        match expr {
            FilterExpr::And(children) => self.write_junction(Occur::Must, children),
            FilterExpr::Or(children) => self.write_junction(Occur::Should, children),
            FilterExpr::Not(child) => {
                self.start_bool(Occur::MustNot);
                self.write_expr(child)?;
                self.end_bool()
            }
            FilterExpr::Equals { path, value } => self.write_equal_to(path, value),
            FilterExpr::NotEquals { path, value } => {
                self.start_bool(Occur::MustNot);
                self.write_equal_to(path, value)?;
                self.end_bool()
            }
            FilterExpr::AllEquals(pairs) => {
                self.start_bool(Occur::Must);
                for (path, value) in pairs {
                    self.write_equal_to(path, value)?;
                }
                self.end_bool()
            }
            FilterExpr::Range { path, range } => self.write_range(path, range),
            FilterExpr::In {
                path,
                values,
                negated,
            } => self.write_in(path, values, *negated),
            FilterExpr::Ids(values) => self.write_ids(values),
            FilterExpr::Like {
                path,
                value,
                like_type,
                case_insensitive,
            } => self.write_like(path, value, *like_type, *case_insensitive),
            FilterExpr::Exists { path, must_exist } => self.write_exists(path, *must_exist),
        }
    }

    fn write_junction(&mut self, occur: Occur, children: &[FilterExpr]) -> Result<()> {
        if let [only] = children {
            return self.write_expr(only);
        }
        self.start_bool(occur);
        for child in children {
            self.write_expr(child)?;
        }
        self.end_bool()
    }

    fn write_equal_to(&mut self, path: &str, value: &QueryValue) -> Result<()> {
        if matches!(value, QueryValue::Null) {
            return self.write_exists(path, false);
        }
        let resolved = self.resolve(path)?;
        let value = ScalarWriter::write(value)?;
        self.prepare_nested(&resolved);
        self.emit(field_clause("term", &resolved.raw_field_name, value));
        Ok(())
    }

    fn write_range(&mut self, path: &str, range: &RangeBound) -> Result<()> {
        let resolved = self.resolve(path)?;
        let mut bounds = Map::new();
        match range {
            RangeBound::Single { op, value } => {
                bounds.insert(op.doc_exp().into(), ScalarWriter::write(value)?);
            }
            RangeBound::Between {
                low_op,
                low,
                high_op,
                high,
            } => {
                if !low_op.is_lower() || high_op.is_lower() {
                    return Err(DocStoreError::Compilation(format!(
                        "invalid between operators {} / {} on '{}'",
                        low_op.doc_exp(),
                        high_op.doc_exp(),
                        path
                    )));
                }
                bounds.insert(low_op.doc_exp().into(), ScalarWriter::write(low)?);
                bounds.insert(high_op.doc_exp().into(), ScalarWriter::write(high)?);
            }
        }
        self.prepare_nested(&resolved);
        self.emit(field_clause("range", &resolved.raw_field_name, Value::Object(bounds)));
        Ok(())
    }

    fn write_in(&mut self, path: &str, values: &[QueryValue], negated: bool) -> Result<()> {
        let resolved = self.resolve(path)?;
        let values = ScalarWriter::write_all(values)?;
        if negated {
            self.start_bool(Occur::MustNot);
        }
        self.prepare_nested(&resolved);
        self.emit(field_clause("terms", &resolved.raw_field_name, Value::Array(values)));
        if negated {
            self.end_bool()?;
        }
        Ok(())
    }

    fn write_ids(&mut self, values: &[QueryValue]) -> Result<()> {
        let values = ScalarWriter::write_all(values)?;
        self.end_nested();
        self.emit(json!({ "ids": { "values": values } }));
        Ok(())
    }

    fn write_exists(&mut self, path: &str, must_exist: bool) -> Result<()> {
        let resolved = self.resolve(path)?;
        if !must_exist {
            self.start_bool(Occur::MustNot);
        }
        self.prepare_nested(&resolved);
        self.emit(json!({ "exists": { "field": path } }));
        if !must_exist {
            self.end_bool()?;
        }
        Ok(())
    }

    fn write_like(
        &mut self,
        path: &str,
        value: &str,
        like_type: LikeType,
        case_insensitive: bool,
    ) -> Result<()> {
        let resolved = self.resolve(path)?;
        if !resolved.property_type.is_text() {
            return Err(DocStoreError::Compilation(format!(
                "like on non-text property '{}' ({:?})",
                path, resolved.property_type
            )));
        }

        // Pattern matches run against the analysed (lowercased) field
        let lower = value.to_lowercase();
        let (kind, pattern) = match like_type {
            LikeType::Raw => ("wildcard", lower.replace('_', "?").replace('%', "*")),
            LikeType::StartsWith => ("prefix", lower),
            LikeType::EndsWith => ("wildcard", format!("*{}", lower)),
            LikeType::Contains => ("wildcard", format!("*{}*", lower)),
            LikeType::EqualTo if case_insensitive => return self.write_iequal_to(&resolved, path, &lower),
            LikeType::EqualTo => return self.write_equal_to(path, &QueryValue::Text(value.to_string())),
        };
        self.prepare_nested(&resolved);
        self.emit(field_clause(kind, path, Value::String(pattern)));
        Ok(())
    }

    /// Case-insensitive equality as analysed `match` clauses, one per token.
    fn write_iequal_to(&mut self, resolved: &ExpressionPath, path: &str, lower: &str) -> Result<()> {
        let tokens: Vec<&str> = lower.split_whitespace().collect();
        if tokens.len() <= 1 {
            let token = tokens.first().copied().unwrap_or("");
            self.prepare_nested(resolved);
            self.emit(field_clause("match", path, Value::String(token.to_string())));
            return Ok(());
        }

        self.start_bool(Occur::Must);
        for token in tokens {
            self.prepare_nested(resolved);
            self.emit(field_clause("match", path, Value::String(token.to_string())));
        }
        self.end_bool()
    }
}
