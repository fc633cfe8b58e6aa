//! Concurrent loader for the source catalog

use std::time::Instant;

use futures::future::try_join_all;

use crate::config::{SourceCatalog, SourceDefinition};
use crate::error::{PipelineError, Result};
use crate::reader::read_table;
use crate::table::PreparedSource;
use crate::utils::logging::log_warning;

/// Load one source's prepared table on the blocking pool
pub async fn load_source_async(catalog: &SourceCatalog, definition: &SourceDefinition) -> Result<PreparedSource> {
    let path = catalog.prepared_path(definition);
    let definition = definition.clone();

    tokio::task::spawn_blocking(move || {
        let table = read_table(&path, definition.id.name())?;
        if table.num_rows() == 0 {
            log_warning("Prepared table is empty", Some(&path));
        }
        let source = PreparedSource::new(definition, table);
        source.validate()?;
        Ok(source)
    })
    .await
    .map_err(|e| PipelineError::Task(format!("Loading source failed to complete: {e}")))?
}

/// Load every source of the catalog concurrently, in catalog order
///
/// Fails on the first source that cannot be read or lacks a required column.
pub async fn load_sources_async(catalog: &SourceCatalog) -> Result<Vec<PreparedSource>> {
    let start = Instant::now();
    log::info!(
        "Loading {} prepared sources from {}",
        catalog.sources.len(),
        catalog.data_dir.display()
    );

    let futures = catalog
        .sources
        .iter()
        .map(|definition| load_source_async(catalog, definition));
    let sources = try_join_all(futures).await?;

    for source in &sources {
        log::info!(
            "{}: {} rows, {} columns",
            source.definition.id,
            source.table.num_rows(),
            source.table.metadata().column_count
        );
    }
    log::info!("Loaded {} sources in {:?}", sources.len(), start.elapsed());
    Ok(sources)
}
