//! Linear trend projection per region and metric
//!
//! Each (region, metric) pair gets its own ordinary least squares line of
//! value on year, fitted over the historical window and extended to the end
//! of the projection horizon. Regions are independent, so they are fitted on
//! a rayon pool and collected back in region order.

use std::collections::BTreeMap;

use indicatif::ProgressBar;
use rayon::prelude::*;

use crate::algorithm::statistics::{
    LinearFit, fit_line, mean, mean_squared_error, percent, population_std, r2_score, round_count,
};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::models::{Metric, PeriodKind, ProjectionModel, SeriesRow, YearlyRecord};
use crate::report::{BatchReport, IssueKind, Stage};

/// Fitted trends and the rows they produce
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectionOutput {
    /// One model per (region, metric), ordered by region then metric
    pub models: Vec<ProjectionModel>,
    /// Projected rows, ordered by region then year
    pub rows: Vec<SeriesRow>,
}

struct RegionProjection {
    models: Vec<ProjectionModel>,
    rows: Vec<SeriesRow>,
    report: BatchReport,
}

/// Fits and extends the per-region trends
pub struct ProjectionEngine<'a> {
    config: &'a PipelineConfig,
    progress: Option<ProgressBar>,
}

impl<'a> ProjectionEngine<'a> {
    /// Create an engine for the configured horizon
    #[must_use]
    pub const fn new(config: &'a PipelineConfig) -> Self {
        Self {
            config,
            progress: None,
        }
    }

    /// Advance `progress` once per finished region
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Fit every region of the historical series and project it forward
    ///
    /// Projected rows are never fed back into a fit; only historical rows of
    /// `series` are read.
    pub fn project(&self, series: &[SeriesRow], report: &mut BatchReport) -> Result<ProjectionOutput> {
        let mut by_region: BTreeMap<&str, Vec<&SeriesRow>> = BTreeMap::new();
        for row in series.iter().filter(|r| r.period_kind.is_historical()) {
            by_region.entry(row.region.as_str()).or_default().push(row);
        }
        let regions: Vec<(&str, Vec<&SeriesRow>)> = by_region.into_iter().collect();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.worker_threads())
            .build()
            .map_err(|e| PipelineError::Task(format!("Failed to build projection pool: {e}")))?;

        let results: Vec<RegionProjection> = pool.install(|| {
            regions
                .par_iter()
                .map(|(region, rows)| {
                    let projection = self.project_region(region, rows);
                    if let Some(pb) = &self.progress {
                        pb.inc(1);
                    }
                    projection
                })
                .collect()
        });

        let mut output = ProjectionOutput::default();
        for result in results {
            output.models.extend(result.models);
            output.rows.extend(result.rows);
            report.extend(result.report);
        }

        log::info!(
            "Fitted {} trends and projected {} rows up to {}",
            output.models.len(),
            output.rows.len(),
            self.config.projection_end
        );
        Ok(output)
    }

    fn project_region(&self, region: &str, history: &[&SeriesRow]) -> RegionProjection {
        let mut report = BatchReport::new();
        let xs: Vec<f64> = history.iter().map(|r| f64::from(r.year)).collect();

        let mut projected: Vec<YearlyRecord> = self
            .config
            .projection_years()
            .map(|year| YearlyRecord::new(region, year, 0.0, 0.0, 0.0))
            .collect();
        let mut models = Vec::with_capacity(Metric::ALL.len());

        for metric in Metric::ALL {
            let ys: Vec<f64> = history.iter().map(|r| metric.value(&r.record())).collect();
            let fit = fit_metric(&xs, &ys);

            if population_std(&ys) == Some(0.0) {
                report.record(region, None, Stage::Projection, IssueKind::DegenerateFit { metric });
            }

            let fitted: Vec<f64> = xs.iter().map(|&x| fit.predict(x)).collect();
            let model = ProjectionModel {
                region: region.to_string(),
                metric,
                slope: fit.slope,
                intercept: fit.intercept,
                r2: r2_score(&ys, &fitted),
                mse: mean_squared_error(&ys, &fitted),
            };
            log::debug!(
                "{region} {metric}: slope {:.3}, r2 {:.4}",
                model.slope,
                model.r2
            );

            let mut clamped_from = None;
            for record in &mut projected {
                let mut value = round_count(model.predict(record.year));
                if value <= 0.0 {
                    if value < 0.0 && clamped_from.is_none() {
                        clamped_from = Some(record.year);
                    }
                    value = 0.0;
                }
                metric.set(record, value);
            }
            if let Some(year) = clamped_from {
                report.record(
                    region,
                    Some(year),
                    Stage::Projection,
                    IssueKind::NegativeProjection { metric },
                );
            }

            models.push(model);
        }

        let rows = projected
            .into_iter()
            .map(|record| self.projected_row(record, &mut report))
            .collect();

        RegionProjection {
            models,
            rows,
            report,
        }
    }

    fn projected_row(&self, record: YearlyRecord, report: &mut BatchReport) -> SeriesRow {
        let adults = record.adult_sum();
        let pct_male = percent(record.male_adult, adults, self.config.zero_denominator);
        let pct_female = percent(record.female_adult, adults, self.config.zero_denominator);
        if pct_male.zero_denominator {
            report.record(
                &record.region,
                Some(record.year),
                Stage::Projection,
                IssueKind::DivisionPolicy {
                    quantity: "pct_male/pct_female".to_string(),
                },
            );
        }

        SeriesRow {
            region: record.region,
            year: record.year,
            population_total: record.population_total,
            male_adult: record.male_adult,
            female_adult: record.female_adult,
            pct_male: pct_male.value,
            pct_female: pct_female.value,
            period_kind: PeriodKind::Projected,
        }
    }
}

/// Fit a line, falling back to a flat one through the mean
fn fit_metric(xs: &[f64], ys: &[f64]) -> LinearFit {
    fit_line(xs, ys).unwrap_or_else(|| LinearFit {
        slope: 0.0,
        intercept: mean(ys).unwrap_or(0.0),
    })
}
