//! Demographic series pipeline: regional summaries of survey extracts,
//! interpolated historical series, linear projections and derived indicators.

pub mod algorithm;
pub mod async_io;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod pipeline;
pub mod reader;
pub mod report;
pub mod table;
pub mod utils;
pub mod writer;

// Core types
pub use config::{ConfigFile, PipelineConfig, SourceCatalog, SourceDefinition, SourceId, TotalSpec, ZeroDenominatorPolicy};
pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, PipelineOutput};
pub use table::{PreparedSource, Table, TableMetadata};

// Stages
pub use algorithm::{
    ClassifierReport, GenderMajorityClassifier, HistoricalSeriesBuilder, IndicatorCalculator,
    ProjectionEngine, ProjectionOutput, SummaryBuilder,
};

// Records and filtering
pub use filter::{FilterSpec, FilterValue, LiteralValue, RegionFilterEngine};
pub use models::{ArrowSchema, IndicatorRow, Metric, PeriodKind, ProjectionModel, SeriesRow, SummaryRow, YearlyRecord};
pub use report::{BatchReport, IssueKind, RegionIssue, RegionOutcome, Stage};

// I/O
pub use async_io::load_sources_async;
pub use reader::read_table;

// Arrow types
pub use arrow::record_batch::RecordBatch;
