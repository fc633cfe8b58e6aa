//! Growth, relative density and femininity indicators

use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::algorithm::statistics::{Ratio, percent};
use crate::config::ZeroDenominatorPolicy;
use crate::models::{IndicatorRow, SeriesRow};
use crate::report::{BatchReport, IssueKind, Stage};

/// Derives per-row indicators from the combined series
#[derive(Debug, Clone)]
pub struct IndicatorCalculator {
    baseline: String,
    policy: ZeroDenominatorPolicy,
}

impl IndicatorCalculator {
    /// Create a calculator measuring density against `baseline`
    pub fn new(baseline: impl Into<String>, policy: ZeroDenominatorPolicy) -> Self {
        Self {
            baseline: baseline.into(),
            policy,
        }
    }

    /// Indicators for every row, ordered by region then year
    pub fn calculate(&self, rows: &[SeriesRow], report: &mut BatchReport) -> Vec<IndicatorRow> {
        let mut sorted: Vec<&SeriesRow> = rows.iter().collect();
        sorted.sort_by(|a, b| a.region.cmp(&b.region).then(a.year.cmp(&b.year)));

        let baseline: FxHashMap<i32, f64> = sorted
            .iter()
            .filter(|r| r.region == self.baseline)
            .map(|r| (r.year, r.population_total))
            .collect();

        let mut indicators = Vec::with_capacity(sorted.len());
        for (region, group) in &sorted.iter().chunk_by(|r| r.region.clone()) {
            let mut previous: Option<f64> = None;
            for row in group {
                let growth_rate = previous.and_then(|prev| {
                    let ratio = self.ratio(row.population_total - prev, prev, row, "growth_rate", report);
                    ratio.value
                });
                previous = Some(row.population_total);

                let relative_density = self.relative_density(&region, row, &baseline, report);
                let femininity_index = self
                    .ratio(row.female_adult, row.male_adult, row, "femininity_index", report)
                    .value;

                indicators.push(IndicatorRow {
                    region: row.region.clone(),
                    year: row.year,
                    period_kind: row.period_kind,
                    growth_rate,
                    relative_density,
                    femininity_index,
                });
            }
        }

        log::info!(
            "Computed indicators for {} rows against baseline '{}'",
            indicators.len(),
            self.baseline
        );
        indicators
    }

    fn relative_density(
        &self,
        region: &str,
        row: &SeriesRow,
        baseline: &FxHashMap<i32, f64>,
        report: &mut BatchReport,
    ) -> Option<f64> {
        if region == self.baseline {
            return Some(100.0);
        }
        match baseline.get(&row.year) {
            Some(&base) => self
                .ratio(row.population_total, base, row, "relative_density", report)
                .value,
            None => {
                report.record(
                    region,
                    Some(row.year),
                    Stage::Indicators,
                    IssueKind::BaselineMissing {
                        baseline: self.baseline.clone(),
                    },
                );
                None
            }
        }
    }

    fn ratio(&self, numerator: f64, denominator: f64, row: &SeriesRow, quantity: &str, report: &mut BatchReport) -> Ratio {
        let ratio = percent(numerator, denominator, self.policy);
        if ratio.zero_denominator {
            report.record(
                &row.region,
                Some(row.year),
                Stage::Indicators,
                IssueKind::DivisionPolicy {
                    quantity: quantity.to_string(),
                },
            );
        }
        ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PeriodKind;

    fn row(region: &str, year: i32, total: f64, male: f64, female: f64) -> SeriesRow {
        SeriesRow {
            region: region.to_string(),
            year,
            population_total: total,
            male_adult: male,
            female_adult: female,
            pct_male: None,
            pct_female: None,
            period_kind: PeriodKind::Observed,
        }
    }

    #[test]
    fn baseline_density_is_exactly_one_hundred() {
        let rows = vec![
            row("ZMG", 2015, 500.0, 250.0, 250.0),
            row("Jalisco", 2016, 1100.0, 500.0, 600.0),
            row("Jalisco", 2015, 1000.0, 600.0, 400.0),
            row("ZMG", 2016, 550.0, 250.0, 300.0),
        ];
        let mut report = BatchReport::new();
        let indicators = IndicatorCalculator::new("Jalisco", ZeroDenominatorPolicy::Null).calculate(&rows, &mut report);

        let keys: Vec<(&str, i32)> = indicators.iter().map(|r| (r.region.as_str(), r.year)).collect();
        assert_eq!(keys, vec![("Jalisco", 2015), ("Jalisco", 2016), ("ZMG", 2015), ("ZMG", 2016)]);

        assert!(indicators[..2].iter().all(|r| r.relative_density == Some(100.0)));
        assert_eq!(indicators[0].growth_rate, None);
        assert_eq!(indicators[1].growth_rate, Some(10.0));
        assert_eq!(indicators[2].growth_rate, None);
        assert_eq!(indicators[2].relative_density, Some(50.0));
        assert_eq!(indicators[0].femininity_index, Some(66.7));
        assert!(report.issues().is_empty());
    }

    #[test]
    fn zero_denominators_only_affect_their_row() {
        let rows = vec![
            row("Jalisco", 2015, 0.0, 0.0, 0.0),
            row("Jalisco", 2016, 100.0, 50.0, 50.0),
            row("Lagos", 2015, 10.0, 5.0, 5.0),
        ];
        let mut report = BatchReport::new();
        let indicators = IndicatorCalculator::new("Jalisco", ZeroDenominatorPolicy::Null).calculate(&rows, &mut report);

        assert_eq!(indicators[0].femininity_index, None);
        assert_eq!(indicators[1].growth_rate, None);
        assert_eq!(indicators[1].femininity_index, Some(100.0));
        assert_eq!(indicators[2].relative_density, None);
        assert_eq!(indicators[2].femininity_index, Some(100.0));
        assert_eq!(
            report
                .issues()
                .iter()
                .filter(|i| matches!(i.issue, IssueKind::DivisionPolicy { .. }))
                .count(),
            3
        );
    }

    #[test]
    fn missing_baseline_year_is_reported() {
        let rows = vec![row("Jalisco", 2015, 1000.0, 500.0, 500.0), row("ZMG", 2016, 500.0, 250.0, 250.0)];
        let mut report = BatchReport::new();
        let indicators = IndicatorCalculator::new("Jalisco", ZeroDenominatorPolicy::Zero).calculate(&rows, &mut report);

        assert_eq!(indicators[1].relative_density, None);
        assert!(report.issues_for("ZMG").any(|i| matches!(i.issue, IssueKind::BaselineMissing { .. })));
    }
}
