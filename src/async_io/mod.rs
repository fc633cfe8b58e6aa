//! Async loading of prepared source tables
//!
//! Reading and parsing is blocking work, so each source is read on tokio's
//! blocking pool and the futures are joined.

pub mod loader;

pub use loader::{load_source_async, load_sources_async};
