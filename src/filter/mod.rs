//! Region filtering for prepared tables
//!
//! A region is described declaratively by a [`FilterSpec`]: a mapping from
//! column name to the values that column must take. Specs are compiled into
//! [`Expr`] trees and evaluated with vectorized Arrow kernels.

pub mod core;
pub mod expr;

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

pub use self::core::{BatchFilter, RegionFilterEngine, filter_record_batch};
pub use self::expr::{Expr, evaluate_expr};

/// A literal value that can be matched against a column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
}

impl LiteralValue {
    /// Numeric view of the literal, if it is a number
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Self::Int(n) => Some(*n as f64),
            Self::Float(x) => Some(*x),
            Self::String(_) => None,
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => write!(f, "'{s}'"),
        }
    }
}

impl From<i64> for LiteralValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for LiteralValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// Condition on a single column
///
/// In JSON, `null` means no filter, a list is a membership test and any
/// other scalar is an equality test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Pass every row through
    Any,
    /// Keep rows whose value is one of these
    OneOf(Vec<LiteralValue>),
    /// Keep rows whose value equals this
    Equals(LiteralValue),
}

/// Column conditions combined with logical AND
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSpec {
    conditions: BTreeMap<String, FilterValue>,
}

impl FilterSpec {
    /// An empty spec that keeps every row
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `column` to equal `value`
    #[must_use]
    pub fn equals(mut self, column: impl Into<String>, value: impl Into<LiteralValue>) -> Self {
        self.conditions
            .insert(column.into(), FilterValue::Equals(value.into()));
        self
    }

    /// Require `column` to be one of `values`
    #[must_use]
    pub fn one_of<V, I>(mut self, column: impl Into<String>, values: I) -> Self
    where
        V: Into<LiteralValue>,
        I: IntoIterator<Item = V>,
    {
        self.conditions.insert(
            column.into(),
            FilterValue::OneOf(values.into_iter().map(Into::into).collect()),
        );
        self
    }

    /// Name `column` without restricting it
    #[must_use]
    pub fn any(mut self, column: impl Into<String>) -> Self {
        self.conditions.insert(column.into(), FilterValue::Any);
        self
    }

    /// Iterate over the conditions in column order
    pub fn conditions(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.conditions.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// Whether no condition restricts any row
    #[must_use]
    pub fn is_pass_through(&self) -> bool {
        self.conditions.values().all(|v| matches!(v, FilterValue::Any))
    }

    /// Every column the spec names, including pass-through ones
    #[must_use]
    pub fn referenced_columns(&self) -> HashSet<String> {
        self.conditions.keys().cloned().collect()
    }

    /// Compile into a filter expression
    #[must_use]
    pub fn to_expr(&self) -> Expr {
        let exprs: Vec<Expr> = self
            .conditions
            .iter()
            .filter_map(|(column, value)| match value {
                FilterValue::Any => None,
                FilterValue::Equals(v) => Some(Expr::Eq(column.clone(), v.clone())),
                FilterValue::OneOf(vs) => Some(Expr::In(column.clone(), vs.clone())),
            })
            .collect();

        match exprs.len() {
            0 => Expr::AlwaysTrue,
            1 => exprs.into_iter().next().unwrap_or(Expr::AlwaysTrue),
            _ => Expr::And(exprs),
        }
    }
}
