//! Reading prepared tables from CSV or Parquet files

use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::util::safe_open_file;
use crate::error::{PipelineError, Result};
use crate::table::Table;
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Rows per record batch when reading
pub const DEFAULT_BATCH_SIZE: usize = 16384;

/// Rows inspected when inferring a CSV schema
pub const SCHEMA_INFERENCE_ROWS: usize = 1000;

/// On-disk format of a prepared table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Comma-separated values with a header row
    Csv,
    /// Apache Parquet
    Parquet,
}

impl TableFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("csv") => Ok(Self::Csv),
            Some("parquet") => Ok(Self::Parquet),
            _ => Err(PipelineError::config(format!(
                "Unsupported table format: {}",
                path.display()
            ))),
        }
    }
}

/// Read a prepared table, picking the reader from the file extension
pub fn read_table(path: &Path, name: &str) -> Result<Table> {
    match TableFormat::from_path(path)? {
        TableFormat::Csv => read_csv(path, name),
        TableFormat::Parquet => read_parquet(path, name),
    }
}

/// Read a CSV file with a header row, inferring column types
pub fn read_csv(path: &Path, name: &str) -> Result<Table> {
    let start = Instant::now();
    log_operation_start("Reading CSV file", path);

    let mut file = safe_open_file(path, "prepared table")?;
    let format = Format::default().with_header(true);
    let (schema, _) = format.infer_schema(BufReader::new(&mut file), Some(SCHEMA_INFERENCE_ROWS))?;
    file.seek(SeekFrom::Start(0))?;

    let schema = Arc::new(schema);
    let reader = ReaderBuilder::new(Arc::clone(&schema))
        .with_format(format)
        .with_batch_size(DEFAULT_BATCH_SIZE)
        .build(BufReader::new(file))?;
    let batches = reader.collect::<std::result::Result<Vec<RecordBatch>, _>>()?;

    let table = Table::from_batches(name, schema, &batches)?;
    log_operation_complete("read", path, table.num_rows(), Some(start.elapsed()));
    Ok(table)
}

/// Read a Parquet file into a single table
pub fn read_parquet(path: &Path, name: &str) -> Result<Table> {
    let start = Instant::now();
    log_operation_start("Reading parquet file", path);

    let file = safe_open_file(path, "prepared table")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?.with_batch_size(DEFAULT_BATCH_SIZE);
    let schema = Arc::clone(builder.schema());
    let reader = builder.build()?;
    let batches = reader.collect::<std::result::Result<Vec<RecordBatch>, _>>()?;

    let table = Table::from_batches(name, schema, &batches)?;
    log_operation_complete("read", path, table.num_rows(), Some(start.elapsed()));
    Ok(table)
}
