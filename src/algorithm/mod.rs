//! Pipeline stages
//!
//! Each stage is a plain synchronous transformation over row types from
//! [`crate::models`]; per-region problems are recorded in a
//! [`crate::report::BatchReport`] instead of failing the stage.

pub mod classifier;
pub mod historical;
pub mod indicators;
pub mod projection;
pub mod statistics;
pub mod summary;

pub use classifier::{ClassifierReport, GenderMajorityClassifier};
pub use historical::HistoricalSeriesBuilder;
pub use indicators::IndicatorCalculator;
pub use projection::{ProjectionEngine, ProjectionOutput};
pub use summary::SummaryBuilder;
