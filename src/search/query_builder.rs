// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Filter Builder - expression tree for document store queries
//!
//! Provides a type-safe way to build boolean filter trees over record
//! property paths. The tree is compiled to the engine's query DSL by
//! [`super::QueryCompiler`].
//!
//! # Example
//!
//! ```rust
//! use elastic_docstore::search::{FilterBuilder, FilterExpr};
//!
//! // Simple equality
//! let filter = FilterExpr::eq("status", "NEW");
//!
//! // Conjunction with builder
//! let filter = FilterBuilder::new()
//!     .eq("status", "NEW")
//!     .between("lines.qty", 1, 10)
//!     .build_and();
//!
//! // Boolean combinations
//! let filter = FilterExpr::eq("status", "NEW")
//!     .or(FilterExpr::eq("status", "ACTIVE"))
//!     .negate();
//! ```

use serde::{Deserialize, Serialize};

/// Scalar value carried by filter leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Numeric(f64),
    Text(String),
    /// Epoch milliseconds
    Timestamp(i64),
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        Self::Numeric(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Range comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeOp {
    Gt,
    Ge,
    Lt,
    Le,
}

impl RangeOp {
    /// Engine DSL keyword
    #[must_use]
    pub fn doc_exp(&self) -> &'static str {
        match self {
            Self::Gt => "gt",
            Self::Ge => "gte",
            Self::Lt => "lt",
            Self::Le => "lte",
        }
    }

    #[must_use]
    pub fn is_lower(&self) -> bool {
        matches!(self, Self::Gt | Self::Ge)
    }
}

/// Single or double bounded range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RangeBound {
    Single {
        op: RangeOp,
        value: QueryValue,
    },
    Between {
        low_op: RangeOp,
        low: QueryValue,
        high_op: RangeOp,
        high: QueryValue,
    },
}

/// Flavour of a LIKE expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LikeType {
    /// SQL wildcards: `_` single char, `%` any run
    Raw,
    StartsWith,
    EndsWith,
    Contains,
    EqualTo,
}

/// Boolean filter tree over property paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterExpr {
    And(Vec<FilterExpr>),
    Or(Vec<FilterExpr>),
    Not(Box<FilterExpr>),
    Equals {
        path: String,
        value: QueryValue,
    },
    NotEquals {
        path: String,
        value: QueryValue,
    },
    /// Conjunction of equalities; a null value means "does not exist"
    AllEquals(Vec<(String, QueryValue)>),
    Range {
        path: String,
        range: RangeBound,
    },
    In {
        path: String,
        values: Vec<QueryValue>,
        negated: bool,
    },
    Ids(Vec<QueryValue>),
    Like {
        path: String,
        value: String,
        like_type: LikeType,
        case_insensitive: bool,
    },
    Exists {
        path: String,
        must_exist: bool,
    },
}

impl FilterExpr {
    pub fn eq(path: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        Self::Equals {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn ne(path: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        Self::NotEquals {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn all_eq<P, V>(pairs: impl IntoIterator<Item = (P, V)>) -> Self
    where
        P: Into<String>,
        V: Into<QueryValue>,
    {
        Self::AllEquals(pairs.into_iter().map(|(p, v)| (p.into(), v.into())).collect())
    }

    fn single(path: impl Into<String>, op: RangeOp, value: impl Into<QueryValue>) -> Self {
        Self::Range {
            path: path.into(),
            range: RangeBound::Single {
                op,
                value: value.into(),
            },
        }
    }

    pub fn gt(path: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        Self::single(path, RangeOp::Gt, value)
    }

    pub fn ge(path: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        Self::single(path, RangeOp::Ge, value)
    }

    pub fn lt(path: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        Self::single(path, RangeOp::Lt, value)
    }

    pub fn le(path: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        Self::single(path, RangeOp::Le, value)
    }

    /// Inclusive range: `low <= path <= high`
    pub fn between(
        path: impl Into<String>,
        low: impl Into<QueryValue>,
        high: impl Into<QueryValue>,
    ) -> Self {
        Self::Range {
            path: path.into(),
            range: RangeBound::Between {
                low_op: RangeOp::Ge,
                low: low.into(),
                high_op: RangeOp::Le,
                high: high.into(),
            },
        }
    }

    pub fn in_list<V: Into<QueryValue>>(path: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self::In {
            path: path.into(),
            values: values.into_iter().map(Into::into).collect(),
            negated: false,
        }
    }

    pub fn not_in<V: Into<QueryValue>>(path: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self::In {
            path: path.into(),
            values: values.into_iter().map(Into::into).collect(),
            negated: true,
        }
    }

    pub fn id_in<V: Into<QueryValue>>(ids: impl IntoIterator<Item = V>) -> Self {
        Self::Ids(ids.into_iter().map(Into::into).collect())
    }

    pub fn like_type(
        path: impl Into<String>,
        value: impl Into<String>,
        like_type: LikeType,
        case_insensitive: bool,
    ) -> Self {
        Self::Like {
            path: path.into(),
            value: value.into(),
            like_type,
            case_insensitive,
        }
    }

    /// SQL style LIKE with `%` and `_` wildcards
    pub fn like(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self::like_type(path, value, LikeType::Raw, false)
    }

    pub fn starts_with(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self::like_type(path, value, LikeType::StartsWith, false)
    }

    pub fn ends_with(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self::like_type(path, value, LikeType::EndsWith, false)
    }

    pub fn contains(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self::like_type(path, value, LikeType::Contains, false)
    }

    /// Case-insensitive equality on the analysed field
    pub fn ieq(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self::like_type(path, value, LikeType::EqualTo, true)
    }

    pub fn is_not_null(path: impl Into<String>) -> Self {
        Self::Exists {
            path: path.into(),
            must_exist: true,
        }
    }

    pub fn is_null(path: impl Into<String>) -> Self {
        Self::Exists {
            path: path.into(),
            must_exist: false,
        }
    }

    /// Combine with AND
    pub fn and(self, other: FilterExpr) -> Self {
        Self::And(vec![self, other])
    }

    /// Combine with OR
    pub fn or(self, other: FilterExpr) -> Self {
        Self::Or(vec![self, other])
    }

    /// Negate expression
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }
}

/// Builder for flat junctions of expressions
#[derive(Debug, Default)]
pub struct FilterBuilder {
    exprs: Vec<FilterExpr>,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self { exprs: Vec::new() }
    }

    /// Add any expression
    pub fn add(mut self, expr: FilterExpr) -> Self {
        self.exprs.push(expr);
        self
    }

    pub fn eq(self, path: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.add(FilterExpr::eq(path, value))
    }

    pub fn ne(self, path: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.add(FilterExpr::ne(path, value))
    }

    pub fn gt(self, path: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.add(FilterExpr::gt(path, value))
    }

    pub fn ge(self, path: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.add(FilterExpr::ge(path, value))
    }

    pub fn lt(self, path: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.add(FilterExpr::lt(path, value))
    }

    pub fn le(self, path: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.add(FilterExpr::le(path, value))
    }

    pub fn between(
        self,
        path: impl Into<String>,
        low: impl Into<QueryValue>,
        high: impl Into<QueryValue>,
    ) -> Self {
        self.add(FilterExpr::between(path, low, high))
    }

    pub fn in_list<V: Into<QueryValue>>(self, path: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        self.add(FilterExpr::in_list(path, values))
    }

    pub fn starts_with(self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(FilterExpr::starts_with(path, value))
    }

    pub fn contains(self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(FilterExpr::contains(path, value))
    }

    pub fn ieq(self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(FilterExpr::ieq(path, value))
    }

    pub fn is_not_null(self, path: impl Into<String>) -> Self {
        self.add(FilterExpr::is_not_null(path))
    }

    pub fn is_null(self, path: impl Into<String>) -> Self {
        self.add(FilterExpr::is_null(path))
    }

    /// Build with AND semantics. An empty builder yields no filter (match all).
    pub fn build_and(self) -> Option<FilterExpr> {
        Self::junction(self.exprs, FilterExpr::And)
    }

    /// Build with OR semantics. An empty builder yields no filter (match all).
    pub fn build_or(self) -> Option<FilterExpr> {
        Self::junction(self.exprs, FilterExpr::Or)
    }

    fn junction(mut exprs: Vec<FilterExpr>, join: fn(Vec<FilterExpr>) -> FilterExpr) -> Option<FilterExpr> {
        match exprs.len() {
            0 => None,
            1 => exprs.pop(),
            _ => Some(join(exprs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_equals() {
        let expr = FilterExpr::eq("status", "NEW");
        assert_eq!(
            expr,
            FilterExpr::Equals {
                path: "status".to_string(),
                value: QueryValue::Text("NEW".to_string()),
            }
        );
    }

    #[test]
    fn test_and_expr() {
        let expr = FilterExpr::eq("status", "NEW").and(FilterExpr::gt("qty", 5));
        match expr {
            FilterExpr::And(children) => assert_eq!(children.len(), 2),
            _ => panic!("Expected And node"),
        }
    }

    #[test]
    fn test_or_expr() {
        let expr = FilterExpr::eq("status", "NEW").or(FilterExpr::eq("status", "ACTIVE"));
        match expr {
            FilterExpr::Or(children) => assert_eq!(children.len(), 2),
            _ => panic!("Expected Or node"),
        }
    }

    #[test]
    fn test_not_expr() {
        let expr = FilterExpr::eq("deleted", true).negate();
        assert!(matches!(expr, FilterExpr::Not(_)));
    }

    #[test]
    fn test_between_is_inclusive() {
        match FilterExpr::between("qty", 1, 10) {
            FilterExpr::Range {
                range: RangeBound::Between { low_op, high_op, .. },
                ..
            } => {
                assert_eq!(low_op, RangeOp::Ge);
                assert_eq!(high_op, RangeOp::Le);
            }
            _ => panic!("Expected Between range"),
        }
    }

    #[test]
    fn test_range_op_doc_exp() {
        assert_eq!(RangeOp::Gt.doc_exp(), "gt");
        assert_eq!(RangeOp::Ge.doc_exp(), "gte");
        assert_eq!(RangeOp::Lt.doc_exp(), "lt");
        assert_eq!(RangeOp::Le.doc_exp(), "lte");
        assert!(RangeOp::Ge.is_lower());
        assert!(!RangeOp::Lt.is_lower());
    }

    #[test]
    fn test_not_in_is_negated() {
        match FilterExpr::not_in("status", ["A", "B"]) {
            FilterExpr::In { values, negated, .. } => {
                assert!(negated);
                assert_eq!(values.len(), 2);
            }
            _ => panic!("Expected In node"),
        }
    }

    #[test]
    fn test_option_value_maps_none_to_null() {
        assert_eq!(QueryValue::from(None::<i64>), QueryValue::Null);
        assert_eq!(QueryValue::from(Some(3)), QueryValue::Integer(3));
    }

    #[test]
    fn test_builder_and() {
        let expr = FilterBuilder::new()
            .eq("status", "NEW")
            .between("qty", 1, 10)
            .is_not_null("customer.name")
            .build_and()
            .unwrap();
        match expr {
            FilterExpr::And(children) => assert_eq!(children.len(), 3),
            _ => panic!("Expected And node"),
        }
    }

    #[test]
    fn test_builder_single_collapses() {
        let expr = FilterBuilder::new().eq("status", "NEW").build_or().unwrap();
        assert!(matches!(expr, FilterExpr::Equals { .. }));
    }

    #[test]
    fn test_empty_builder_is_match_all() {
        assert!(FilterBuilder::new().build_and().is_none());
        assert!(FilterBuilder::new().build_or().is_none());
    }
}
