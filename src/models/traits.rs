//! Arrow conversion for row types
//!
//! Output tables are handed to writers as Arrow record batches. Each row type
//! declares its schema explicitly so column order and nullability stay stable
//! regardless of the data in a given run.

use std::sync::Arc;

use arrow_schema::{DataType, Field, FieldRef, Schema};
use arrow::record_batch::RecordBatch;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::models::records::{IndicatorRow, ProjectionModel, SeriesRow, SummaryRow};

/// A trait for models that can be converted to and from Arrow `RecordBatch`.
pub trait ArrowSchema: Sized + Serialize + DeserializeOwned {
    /// Get the Arrow schema for this model
    fn schema() -> Schema;

    /// Convert a `RecordBatch` to a vector of this model
    fn from_record_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        Ok(serde_arrow::from_record_batch(batch)?)
    }

    /// Convert a slice of this model to a `RecordBatch`
    fn to_record_batch(models: &[Self]) -> Result<RecordBatch> {
        let schema = Self::schema();
        let fields: Vec<FieldRef> = schema.fields().iter().map(Arc::clone).collect();
        Ok(serde_arrow::to_record_batch(&fields, &models)?)
    }

    /// Get the schema as Arc<Schema>
    fn schema_ref() -> Arc<Schema> {
        Arc::new(Self::schema())
    }
}

fn count_fields() -> Vec<Field> {
    vec![
        Field::new("region", DataType::Utf8, false),
        Field::new("year", DataType::Int32, false),
        Field::new("population_total", DataType::Float64, false),
        Field::new("male_adult", DataType::Float64, false),
        Field::new("female_adult", DataType::Float64, false),
        Field::new("pct_male", DataType::Float64, true),
        Field::new("pct_female", DataType::Float64, true),
    ]
}

impl ArrowSchema for SummaryRow {
    fn schema() -> Schema {
        Schema::new(count_fields())
    }
}

impl ArrowSchema for SeriesRow {
    fn schema() -> Schema {
        let mut fields = count_fields();
        fields.push(Field::new("period_kind", DataType::Utf8, false));
        Schema::new(fields)
    }
}

impl ArrowSchema for IndicatorRow {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("region", DataType::Utf8, false),
            Field::new("year", DataType::Int32, false),
            Field::new("period_kind", DataType::Utf8, false),
            Field::new("growth_rate", DataType::Float64, true),
            Field::new("relative_density", DataType::Float64, true),
            Field::new("femininity_index", DataType::Float64, true),
        ])
    }
}

impl ArrowSchema for ProjectionModel {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("region", DataType::Utf8, false),
            Field::new("metric", DataType::Utf8, false),
            Field::new("slope", DataType::Float64, false),
            Field::new("intercept", DataType::Float64, false),
            Field::new("r2", DataType::Float64, false),
            Field::new("mse", DataType::Float64, false),
        ])
    }
}
