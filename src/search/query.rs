//! Search requests against one record type.

use super::query_builder::{FilterExpr, QueryValue};
use crate::schema::RecordType;

/// Sort key on a property path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub path: String,
    pub ascending: bool,
}

/// Properties requested under a fetch path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchProperties {
    All,
    Only(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPath {
    pub path: String,
    pub properties: FetchProperties,
}

/// Partial selection of root properties and related paths.
///
/// An empty selection fetches the full `_source` of every hit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub root: Vec<String>,
    pub fetches: Vec<FetchPath>,
}

impl Selection {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty() && self.fetches.is_empty()
    }
}

/// A search request: optional id, filter tree, ordering, paging window
/// and property selection.
///
/// Zero for `first_row` or `max_rows` means "not set".
#[derive(Debug, Clone)]
pub struct SearchQuery<'a, R: RecordType> {
    record_type: &'a R,
    id: Option<QueryValue>,
    filter: Option<FilterExpr>,
    order_by: Vec<OrderBy>,
    first_row: usize,
    max_rows: usize,
    selection: Selection,
}

impl<'a, R: RecordType> SearchQuery<'a, R> {
    pub fn new(record_type: &'a R) -> Self {
        Self {
            record_type,
            id: None,
            filter: None,
            order_by: Vec::new(),
            first_row: 0,
            max_rows: 0,
            selection: Selection::default(),
        }
    }

    /// Restrict to a single document id.
    pub fn id(mut self, id: impl Into<QueryValue>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the filter, replacing any previous one.
    pub fn filter(mut self, filter: FilterExpr) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Set the filter from an optional expression (builders yield `None`
    /// for an empty junction).
    pub fn filter_opt(mut self, filter: Option<FilterExpr>) -> Self {
        self.filter = filter;
        self
    }

    pub fn order_by_asc(self, path: impl Into<String>) -> Self {
        self.order_by(path, true)
    }

    pub fn order_by_desc(self, path: impl Into<String>) -> Self {
        self.order_by(path, false)
    }

    pub fn order_by(mut self, path: impl Into<String>, ascending: bool) -> Self {
        self.order_by.push(OrderBy {
            path: path.into(),
            ascending,
        });
        self
    }

    pub fn first_row(mut self, first_row: usize) -> Self {
        self.first_row = first_row;
        self
    }

    pub fn max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Select root properties.
    pub fn select<S: Into<String>>(mut self, paths: impl IntoIterator<Item = S>) -> Self {
        self.selection.root.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Fetch every property under a related path.
    pub fn fetch_all(mut self, path: impl Into<String>) -> Self {
        self.selection.fetches.push(FetchPath {
            path: path.into(),
            properties: FetchProperties::All,
        });
        self
    }

    /// Fetch named properties under a related path.
    pub fn fetch<S: Into<String>>(mut self, path: impl Into<String>, properties: impl IntoIterator<Item = S>) -> Self {
        self.selection.fetches.push(FetchPath {
            path: path.into(),
            properties: FetchProperties::Only(properties.into_iter().map(Into::into).collect()),
        });
        self
    }

    #[must_use]
    pub fn record_type(&self) -> &'a R {
        self.record_type
    }

    #[must_use]
    pub fn id_value(&self) -> Option<&QueryValue> {
        self.id.as_ref()
    }

    #[must_use]
    pub fn filter_expr(&self) -> Option<&FilterExpr> {
        self.filter.as_ref()
    }

    #[must_use]
    pub fn order_by_list(&self) -> &[OrderBy] {
        &self.order_by
    }

    #[must_use]
    pub fn first_row_value(&self) -> usize {
        self.first_row
    }

    #[must_use]
    pub fn max_rows_value(&self) -> usize {
        self.max_rows
    }

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Whether hits carry sparse `fields` rather than a full `_source`.
    #[must_use]
    pub fn selects_fields(&self) -> bool {
        !self.selection.is_empty()
    }
}
