//! Logging helpers
//!
//! Consistent wording for file operations and pipeline stages.

use std::path::Path;
use std::time::Duration;

use crate::report::Stage;

/// Log the start of a file operation
///
/// # Arguments
/// * `operation` - Description of the operation
/// * `path` - Path of the file or directory being operated on
pub fn log_operation_start(operation: &str, path: &Path) {
    log::info!("{} {}", operation, path.display());
}

/// Log the completion of a file operation
///
/// # Arguments
/// * `operation` - Past-tense verb for the operation
/// * `path` - Path of the file or directory that was operated on
/// * `items` - Number of rows processed
/// * `elapsed` - Optional elapsed time
pub fn log_operation_complete(operation: &str, path: &Path, items: usize, elapsed: Option<Duration>) {
    match elapsed {
        Some(duration) => log::info!(
            "Successfully {} {} rows from {} in {:?}",
            operation,
            items,
            path.display(),
            duration
        ),
        None => log::info!("Successfully {} {} rows from {}", operation, items, path.display()),
    }
}

/// Log a warning, optionally tied to a path
pub fn log_warning(message: &str, path: Option<&Path>) {
    if let Some(path) = path {
        log::warn!("{}: {}", message, path.display());
    } else {
        log::warn!("{message}");
    }
}

/// Log the start of a pipeline stage
pub fn log_stage_start(stage: Stage, inputs: usize) {
    log::info!("Starting {stage} stage on {inputs} rows");
}

/// Log the end of a pipeline stage
pub fn log_stage_complete(stage: Stage, outputs: usize, elapsed: Duration) {
    log::info!("Finished {stage} stage: {outputs} rows in {elapsed:?}");
}
