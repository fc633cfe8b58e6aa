//! Filter expressions and their evaluation against record batches

use std::collections::HashSet;

use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, StringArray};
use arrow::compute::kernels::cmp::eq;
use arrow::compute::{and, cast, or};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;

use super::LiteralValue;
use crate::error::{PipelineError, Result};

/// Represents a filter expression over the columns of a batch
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column equals a literal value
    Eq(String, LiteralValue),

    /// Column is in a set of values
    In(String, Vec<LiteralValue>),

    /// Logical AND of expressions
    And(Vec<Expr>),

    /// Always evaluates to true
    AlwaysTrue,
}

impl Expr {
    /// Returns a set of all column names required by this expression
    #[must_use]
    pub fn required_columns(&self) -> HashSet<String> {
        let mut columns = HashSet::new();
        self.collect_required_columns(&mut columns);
        columns
    }

    fn collect_required_columns(&self, columns: &mut HashSet<String>) {
        match self {
            Self::Eq(col, _) | Self::In(col, _) => {
                columns.insert(col.clone());
            }
            Self::And(exprs) => {
                for expr in exprs {
                    expr.collect_required_columns(columns);
                }
            }
            Self::AlwaysTrue => {}
        }
    }
}

/// Evaluates a filter expression against a record batch
///
/// Rows whose tested value is null evaluate to null, which the row filter
/// treats as "drop".
pub fn evaluate_expr(batch: &RecordBatch, expr: &Expr) -> Result<BooleanArray> {
    match expr {
        Expr::AlwaysTrue => Ok(BooleanArray::from(vec![true; batch.num_rows()])),
        Expr::And(exprs) => evaluate_and_expression(batch, exprs),
        Expr::Eq(col_name, literal) => {
            let column = column_by_name(batch, col_name)?;
            evaluate_eq(column, col_name, literal)
        }
        Expr::In(col_name, literals) => {
            let column = column_by_name(batch, col_name)?;
            evaluate_in(column, col_name, literals)
        }
    }
}

fn column_by_name<'a>(batch: &'a RecordBatch, col_name: &str) -> Result<&'a ArrayRef> {
    let idx = batch
        .schema()
        .index_of(col_name)
        .map_err(|_| PipelineError::filter(format!("Column {col_name} not found in batch")))?;
    Ok(batch.column(idx))
}

fn evaluate_and_expression(batch: &RecordBatch, exprs: &[Expr]) -> Result<BooleanArray> {
    let Some((first, rest)) = exprs.split_first() else {
        return Ok(BooleanArray::from(vec![true; batch.num_rows()]));
    };

    let mut result = evaluate_expr(batch, first)?;
    for expr in rest {
        let mask = evaluate_expr(batch, expr)?;
        result = and(&result, &mask)?;
    }
    Ok(result)
}

fn evaluate_in(column: &ArrayRef, col_name: &str, literals: &[LiteralValue]) -> Result<BooleanArray> {
    let Some((first, rest)) = literals.split_first() else {
        return Ok(BooleanArray::from(vec![false; column.len()]));
    };

    let mut result = evaluate_eq(column, col_name, first)?;
    for literal in rest {
        let mask = evaluate_eq(column, col_name, literal)?;
        result = or(&result, &mask)?;
    }
    Ok(result)
}

/// Equality of a column against one literal
///
/// Numeric literals match any numeric column type after widening to `f64`;
/// string literals match string columns.
fn evaluate_eq(column: &ArrayRef, col_name: &str, literal: &LiteralValue) -> Result<BooleanArray> {
    let data_type = column.data_type();

    match literal {
        LiteralValue::String(s) if is_string_type(data_type) => {
            let values = cast(column, &DataType::Utf8)?;
            Ok(eq(&values, &StringArray::new_scalar(s.as_str()))?)
        }
        LiteralValue::Int(_) | LiteralValue::Float(_) if data_type.is_numeric() => {
            let target = literal.as_f64().unwrap_or(f64::NAN);
            let values = cast(column, &DataType::Float64)?;
            Ok(eq(&values, &Float64Array::new_scalar(target))?)
        }
        _ => Err(PipelineError::filter(format!(
            "Column '{col_name}' of type {data_type} cannot be compared with {literal}"
        ))),
    }
}

const fn is_string_type(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View
    )
}
