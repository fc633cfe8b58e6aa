//! Utility functions for error handling
//!
//! Helpers that attach the path and purpose of a file operation to the
//! resulting error, so a failed run says which input or output it was touching.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{PipelineError, Result};

/// Open a file for reading, reporting the purpose on failure
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (for error context)
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<fs::File> {
    if !path.exists() {
        return Err(PipelineError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("File not found: {} (needed for: {purpose})", path.display()),
        )));
    }

    if !path.is_file() {
        return Err(PipelineError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Path is not a file: {} (expected a file for: {purpose})", path.display()),
        )));
    }

    fs::File::open(path).map_err(|e| {
        let context = match e.kind() {
            io::ErrorKind::PermissionDenied => "Permission denied - check file permissions".to_string(),
            _ => format!("Failed to open file for: {purpose}"),
        };
        PipelineError::Io(io::Error::new(
            e.kind(),
            format!("{context}: {} ({e})", path.display()),
        ))
    })
}

/// Create a file for writing, creating missing parent directories first
pub fn safe_create_file(path: &Path, purpose: &str) -> Result<fs::File> {
    if let Some(parent) = path.parent() {
        ensure_directory(parent, purpose)?;
    }

    fs::File::create(path).map_err(|e| {
        PipelineError::Io(io::Error::new(
            e.kind(),
            format!("Failed to create {} for: {purpose} ({e})", path.display()),
        ))
    })
}

/// Make sure a directory exists, creating it if needed
pub fn ensure_directory(path: &Path, purpose: &str) -> Result<()> {
    if path.as_os_str().is_empty() || path.is_dir() {
        return Ok(());
    }

    if path.exists() {
        return Err(PipelineError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Path is not a directory: {} (needed for: {purpose})", path.display()),
        )));
    }

    fs::create_dir_all(path).map_err(|e| {
        PipelineError::Io(io::Error::new(
            e.kind(),
            format!("Failed to create directory {} for: {purpose} ({e})", path.display()),
        ))
    })
}
