//! Core filtering functionality for prepared tables
//!
//! Defines the batch filter trait and the region filter engine that turns a
//! [`FilterSpec`] into a region-scoped subset of a table.

use std::collections::HashSet;

use arrow::array::{ArrayRef, BooleanArray};
use arrow::compute::filter as arrow_filter;
use arrow::record_batch::RecordBatch;

use super::FilterSpec;
use super::expr::evaluate_expr;
use crate::error::{PipelineError, Result};
use crate::table::Table;

/// Filter a record batch based on a boolean mask
///
/// Returns a new record batch with only rows where mask is true; null mask
/// entries drop the row.
pub fn filter_record_batch(batch: &RecordBatch, mask: &BooleanArray) -> Result<RecordBatch> {
    if batch.num_rows() != mask.len() {
        return Err(PipelineError::filter(format!(
            "Mask length ({}) doesn't match batch row count ({})",
            mask.len(),
            batch.num_rows()
        )));
    }

    let filtered_columns: Vec<ArrayRef> = batch
        .columns()
        .iter()
        .map(|col| arrow_filter(col, mask))
        .collect::<std::result::Result<_, _>>()?;

    Ok(RecordBatch::try_new(batch.schema(), filtered_columns)?)
}

/// Trait for objects that can filter tables
pub trait BatchFilter: std::fmt::Debug {
    /// Filter a table, returning a new table with the kept rows
    fn filter(&self, table: &Table) -> Result<Table>;

    /// Returns the set of column names required by this filter
    fn required_columns(&self) -> HashSet<String>;
}

impl BatchFilter for FilterSpec {
    fn filter(&self, table: &Table) -> Result<Table> {
        RegionFilterEngine::apply(table, self)
    }

    fn required_columns(&self) -> HashSet<String> {
        self.referenced_columns()
    }
}

/// Applies region filter specs to tables
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionFilterEngine;

impl RegionFilterEngine {
    /// Keep the rows of `table` that satisfy every condition of `spec`
    ///
    /// Every column the spec names must exist, including pass-through ones.
    /// The input table is left untouched.
    pub fn apply(table: &Table, spec: &FilterSpec) -> Result<Table> {
        let mut columns: Vec<String> = spec.referenced_columns().into_iter().collect();
        columns.sort();
        table.require_columns(columns.iter().map(String::as_str))?;

        if spec.is_pass_through() {
            return Ok(table.clone());
        }

        let expr = spec.to_expr();
        let mask = evaluate_expr(table.batch(), &expr).map_err(|e| match e {
            PipelineError::Filter(msg) => {
                PipelineError::filter(format!("{msg} (table '{}')", table.name()))
            }
            other => other,
        })?;
        let batch = filter_record_batch(table.batch(), &mask)?;

        log::debug!(
            "Filter on table '{}' kept {} of {} rows",
            table.name(),
            batch.num_rows(),
            table.num_rows()
        );

        Ok(Table::new(table.name(), batch))
    }
}
