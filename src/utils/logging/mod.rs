//! Logging utilities for stage tracking and progress reporting

pub mod log;
pub mod progress;

pub use self::log::{log_operation_complete, log_operation_start, log_stage_complete, log_stage_start, log_warning};
pub use self::progress::{create_main_progress_bar, create_spinner, finish_progress_bar, hidden_progress_bar};
