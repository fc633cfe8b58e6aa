//! Yearly summaries per region
//!
//! Reduces each prepared source table to one row per region: adult men and
//! women summed over the region's rows, the total adult population and the
//! percentage shares of each sex.

use crate::algorithm::statistics::percent;
use crate::config::{TotalSpec, ZeroDenominatorPolicy};
use crate::error::Result;
use crate::filter::RegionFilterEngine;
use crate::models::SummaryRow;
use crate::report::{BatchReport, IssueKind, Stage};
use crate::table::PreparedSource;

/// Builds the unified summary table from prepared sources
#[derive(Debug, Clone, Copy)]
pub struct SummaryBuilder {
    policy: ZeroDenominatorPolicy,
}

impl SummaryBuilder {
    /// Create a builder applying `policy` to undefined shares
    #[must_use]
    pub const fn new(policy: ZeroDenominatorPolicy) -> Self {
        Self { policy }
    }

    /// Summarize every source, ordered by year and then region name
    ///
    /// A source missing a column it is configured to read fails the whole
    /// build with a schema error.
    pub fn build(&self, sources: &[PreparedSource], report: &mut BatchReport) -> Result<Vec<SummaryRow>> {
        let mut ordered: Vec<&PreparedSource> = sources.iter().collect();
        ordered.sort_by_key(|s| s.definition.year);

        let mut rows = Vec::new();
        for source in ordered {
            rows.extend(self.summarize_source(source, report)?);
        }

        log::info!(
            "Built summary with {} rows from {} sources",
            rows.len(),
            sources.len()
        );
        Ok(rows)
    }

    /// One summary row per region defined for this source
    pub fn summarize_source(&self, source: &PreparedSource, report: &mut BatchReport) -> Result<Vec<SummaryRow>> {
        source.validate()?;

        let definition = &source.definition;
        let year = definition.year;
        let base = RegionFilterEngine::apply(&source.table, &definition.base_filter)?;

        let mut rows = Vec::with_capacity(definition.regions.len());
        for (region, spec) in &definition.regions {
            let subset = RegionFilterEngine::apply(&base, spec)?;
            if subset.num_rows() == 0 {
                report.record(region, Some(year), Stage::Summary, IssueKind::EmptyRegion);
            }

            let male_adult = subset.sum_column(&definition.male_column)?;
            let female_adult = subset.sum_column(&definition.female_column)?;
            let population_total = match &definition.total {
                TotalSpec::Column { name } => subset.sum_column(name)?,
                TotalSpec::SumOfSexes => male_adult + female_adult,
            };

            let adults = male_adult + female_adult;
            let pct_male = percent(male_adult, adults, self.policy);
            let pct_female = percent(female_adult, adults, self.policy);
            if pct_male.zero_denominator {
                report.record(
                    region,
                    Some(year),
                    Stage::Summary,
                    IssueKind::DivisionPolicy {
                        quantity: "pct_male/pct_female".to_string(),
                    },
                );
            }

            log::debug!(
                "{} {region}: {} rows, men {male_adult}, women {female_adult}",
                definition.id,
                subset.num_rows()
            );

            rows.push(SummaryRow {
                region: region.clone(),
                year,
                population_total,
                male_adult,
                female_adult,
                pct_male: pct_male.value,
                pct_female: pct_female.value,
            });
        }

        Ok(rows)
    }
}
