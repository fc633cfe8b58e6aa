//! Contiguous yearly series from sparse observations
//!
//! Survey extracts exist for a handful of years only. This stage removes
//! population outliers, reindexes each region onto every year of the
//! historical window and fills the gaps by linear interpolation.

use std::collections::BTreeMap;

use crate::algorithm::statistics::{abs_z_scores, interpolate, percent, round_count};
use crate::config::PipelineConfig;
use crate::models::{Metric, PeriodKind, SeriesRow, SummaryRow, YearlyRecord};
use crate::report::{BatchReport, IssueKind, Stage};

/// Builds the historical series of every region
#[derive(Debug, Clone)]
pub struct HistoricalSeriesBuilder<'a> {
    config: &'a PipelineConfig,
}

impl<'a> HistoricalSeriesBuilder<'a> {
    /// Create a builder for the configured historical window
    #[must_use]
    pub const fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    /// Build the series from summary rows
    pub fn build_from_summary(&self, summary: &[SummaryRow], report: &mut BatchReport) -> Vec<SeriesRow> {
        let records: Vec<YearlyRecord> = summary.iter().map(SummaryRow::record).collect();
        self.build(&records, report)
    }

    /// Build the series from yearly records
    ///
    /// Every region that keeps at least two observations yields exactly one
    /// row per year of the window, ordered by region and then year. Regions
    /// with fewer observations are left out and reported as skipped.
    pub fn build(&self, records: &[YearlyRecord], report: &mut BatchReport) -> Vec<SeriesRow> {
        let kept = self.remove_outliers(records, report);

        let mut by_region: BTreeMap<&str, Vec<&YearlyRecord>> = BTreeMap::new();
        for record in kept {
            by_region.entry(record.region.as_str()).or_default().push(record);
        }

        let mut series = Vec::with_capacity(by_region.len() * self.config.history_len());
        for (region, observations) in by_region {
            series.extend(self.region_series(region, observations, report));
        }

        log::info!(
            "Historical series has {} rows over {}-{}",
            series.len(),
            self.config.history_start,
            self.config.history_end
        );
        series
    }

    fn remove_outliers<'r>(&self, records: &'r [YearlyRecord], report: &mut BatchReport) -> Vec<&'r YearlyRecord> {
        let totals: Vec<f64> = records.iter().map(|r| r.population_total).collect();
        let scores = abs_z_scores(&totals);

        records
            .iter()
            .zip(scores)
            .filter_map(|(record, z)| {
                if z < self.config.outlier_z_threshold {
                    return Some(record);
                }
                report.record(
                    &record.region,
                    Some(record.year),
                    Stage::Historical,
                    IssueKind::OutlierRemoved {
                        population_total: record.population_total,
                        z_score: z,
                    },
                );
                None
            })
            .collect()
    }

    fn region_series(&self, region: &str, mut observations: Vec<&YearlyRecord>, report: &mut BatchReport) -> Vec<SeriesRow> {
        let (start, end) = (self.config.history_start, self.config.history_end);

        observations.retain(|r| (start..=end).contains(&r.year));
        observations.sort_by_key(|r| r.year);
        observations.dedup_by_key(|r| r.year);

        if observations.len() < 2 {
            report.record(
                region,
                None,
                Stage::Historical,
                IssueKind::InsufficientHistory {
                    observed_points: observations.len(),
                },
            );
            return Vec::new();
        }

        let first = observations[0];
        let last = observations[observations.len() - 1];
        let mut edge_years = Vec::new();
        let mut rows = Vec::with_capacity(self.config.history_len());

        for year in self.config.history_years() {
            let (record, period_kind) = if year < first.year {
                edge_years.push(year);
                (with_year(first, year), PeriodKind::Interpolated)
            } else if year > last.year {
                edge_years.push(year);
                (with_year(last, year), PeriodKind::Interpolated)
            } else {
                match observations.binary_search_by_key(&year, |r| r.year) {
                    Ok(idx) => (observations[idx].clone(), PeriodKind::Observed),
                    Err(idx) => (
                        interpolate_between(observations[idx - 1], observations[idx], year),
                        PeriodKind::Interpolated,
                    ),
                }
            };
            rows.push(self.series_row(record, period_kind, report));
        }

        if !edge_years.is_empty() {
            report.record(
                region,
                None,
                Stage::Historical,
                IssueKind::EdgeFill { years: edge_years },
            );
        }
        rows
    }

    fn series_row(&self, record: YearlyRecord, period_kind: PeriodKind, report: &mut BatchReport) -> SeriesRow {
        let adults = record.adult_sum();
        let pct_male = percent(record.male_adult, adults, self.config.zero_denominator);
        let pct_female = percent(record.female_adult, adults, self.config.zero_denominator);

        // observed years were already reported by the summary stage
        if pct_male.zero_denominator && period_kind != PeriodKind::Observed {
            report.record(
                &record.region,
                Some(record.year),
                Stage::Historical,
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
            period_kind,
        }
    }
}

fn with_year(record: &YearlyRecord, year: i32) -> YearlyRecord {
    YearlyRecord {
        year,
        ..record.clone()
    }
}

fn interpolate_between(before: &YearlyRecord, after: &YearlyRecord, year: i32) -> YearlyRecord {
    let mut record = with_year(before, year);
    for metric in Metric::ALL {
        let value = interpolate(
            f64::from(before.year),
            metric.value(before),
            f64::from(after.year),
            metric.value(after),
            f64::from(year),
        );
        metric.set(&mut record, round_count(value));
    }
    record
}
