//! Named tabular datasets
//!
//! A [`Table`] is a single Arrow record batch together with the identity used
//! in error messages, so a missing column can be traced back to the input it
//! was expected in.

use std::collections::BTreeSet;

use arrow::array::{Array, ArrayRef, Float64Array};
use arrow::compute::{cast, concat_batches};
use arrow::datatypes::{DataType, SchemaRef};
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};

use crate::config::SourceDefinition;
use crate::error::{PipelineError, Result};

/// A named, immutable table
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    batch: RecordBatch,
}

impl Table {
    /// Wrap a record batch under a name
    pub fn new(name: impl Into<String>, batch: RecordBatch) -> Self {
        Self {
            name: name.into(),
            batch,
        }
    }

    /// Combine several batches sharing one schema into a single table
    pub fn from_batches(name: impl Into<String>, schema: SchemaRef, batches: &[RecordBatch]) -> Result<Self> {
        let batch = concat_batches(&schema, batches)?;
        Ok(Self::new(name, batch))
    }

    /// Table identity used in diagnostics
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying record batch
    #[must_use]
    pub const fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Number of rows
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Names of all columns, in schema order
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Look up a column by name, failing with a schema error if it is absent
    pub fn column(&self, name: &str) -> Result<&ArrayRef> {
        let idx = self
            .batch
            .schema()
            .index_of(name)
            .map_err(|_| PipelineError::missing_column(&self.name, name))?;
        Ok(self.batch.column(idx))
    }

    /// Fail with a schema error naming the first missing column, if any
    pub fn require_columns<'a, I>(&self, columns: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let schema = self.batch.schema();
        // Sorted so the reported column does not depend on hash order
        let missing: BTreeSet<&str> = columns
            .into_iter()
            .filter(|c| schema.index_of(c).is_err())
            .collect();

        match missing.into_iter().next() {
            Some(column) => Err(PipelineError::missing_column(&self.name, column)),
            None => Ok(()),
        }
    }

    /// Sum a numeric column as floating point; nulls are skipped
    pub fn sum_column(&self, name: &str) -> Result<f64> {
        let column = self.column(name)?;
        if !column.data_type().is_numeric() {
            return Err(PipelineError::filter(format!(
                "Column '{name}' in table '{}' is not numeric ({})",
                self.name,
                column.data_type()
            )));
        }
        let values = cast(column, &DataType::Float64)?;
        let values = values
            .as_any()
            .downcast_ref::<Float64Array>()
            .ok_or_else(|| PipelineError::filter(format!("Failed to read column '{name}' as float")))?;
        Ok(arrow::compute::sum(values).unwrap_or(0.0))
    }

    /// Describe the shape of this table
    #[must_use]
    pub fn metadata(&self) -> TableMetadata {
        let columns = self.column_names();
        TableMetadata {
            table: self.name.clone(),
            rows: self.num_rows(),
            column_count: columns.len(),
            columns,
        }
    }
}

/// A loaded prepared table together with the definition it was read for
#[derive(Debug, Clone)]
pub struct PreparedSource {
    /// How to read regions out of the table
    pub definition: SourceDefinition,
    /// The prepared data
    pub table: Table,
}

impl PreparedSource {
    /// Pair a definition with its table
    #[must_use]
    pub const fn new(definition: SourceDefinition, table: Table) -> Self {
        Self { definition, table }
    }

    /// Fail with a schema error if the table lacks a column the definition uses
    pub fn validate(&self) -> Result<()> {
        let required = self.definition.required_columns();
        self.table.require_columns(required.iter().map(String::as_str))
    }
}

/// Shape of a prepared input table, written next to the outputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Table identity
    pub table: String,
    /// Number of rows
    pub rows: usize,
    /// Number of columns
    pub column_count: usize,
    /// Column names in schema order
    pub columns: Vec<String>,
}
