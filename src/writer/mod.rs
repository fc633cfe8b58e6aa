//! Writing output tables and JSON documents

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use arrow::csv::WriterBuilder;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde::Serialize;

use crate::error::Result;
use crate::error::util::safe_create_file;
use crate::models::ArrowSchema;

/// Write a batch as CSV with a header row
pub fn write_csv(batch: &RecordBatch, path: &Path) -> Result<()> {
    let file = safe_create_file(path, "CSV output")?;
    let mut writer = WriterBuilder::new().with_header(true).build(BufWriter::new(file));
    writer.write(batch)?;
    writer.into_inner().flush()?;
    log::debug!("Wrote {} rows to {}", batch.num_rows(), path.display());
    Ok(())
}

/// Write a batch as Snappy-compressed Parquet
pub fn write_parquet(batch: &RecordBatch, path: &Path) -> Result<()> {
    let file = safe_create_file(path, "Parquet output")?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(batch)?;
    writer.close()?;
    log::debug!("Wrote {} rows to {}", batch.num_rows(), path.display());
    Ok(())
}

/// Write any serializable value as pretty-printed JSON
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let file = safe_create_file(path, "JSON output")?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}

/// Write rows as `<stem>.csv` and `<stem>.parquet` under `dir`
///
/// Returns the paths written.
pub fn write_rows<T: ArrowSchema>(rows: &[T], dir: &Path, stem: &str) -> Result<Vec<PathBuf>> {
    let batch = T::to_record_batch(rows)?;
    let csv_path = dir.join(format!("{stem}.csv"));
    let parquet_path = dir.join(format!("{stem}.parquet"));
    write_csv(&batch, &csv_path)?;
    write_parquet(&batch, &parquet_path)?;
    log::info!("Wrote {} rows of {stem} to {}", rows.len(), dir.display());
    Ok(vec![csv_path, parquet_path])
}
