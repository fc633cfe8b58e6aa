//! Record types flowing between pipeline stages
//!
//! Every stage consumes and produces plain row structs; conversion to and from
//! Arrow record batches goes through the [`ArrowSchema`] trait.

pub mod records;
pub mod traits;

pub use records::{
    IndicatorRow, Metric, PeriodKind, ProjectionModel, SeriesRow, SummaryRow, YearlyRecord,
};
pub use traits::ArrowSchema;
