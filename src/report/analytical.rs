//! Plain-text analytical report over the observed summary

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::algorithm::classifier::ClassifierReport;
use crate::error::Result;
use crate::error::util::safe_create_file;
use crate::models::SummaryRow;

const RULE_WIDTH: usize = 70;

/// Percent change from `start` to `end`; 0.0 when `start` is zero
#[must_use]
pub fn growth_rate(end: f64, start: f64) -> f64 {
    if start == 0.0 {
        return 0.0;
    }
    (end - start) / start * 100.0
}

/// Render a count with thousands separators
fn format_count(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn format_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.1}%"))
}

/// Key findings of a run, written as text next to the output tables
#[derive(Debug, Clone)]
pub struct AnalyticalReport<'a> {
    summary: &'a [SummaryRow],
    baseline: &'a str,
    classifier: Option<&'a ClassifierReport>,
    generated_at: DateTime<Utc>,
}

impl<'a> AnalyticalReport<'a> {
    /// Report over the observed summary rows
    #[must_use]
    pub fn new(summary: &'a [SummaryRow], baseline: &'a str) -> Self {
        Self {
            summary,
            baseline,
            classifier: None,
            generated_at: Utc::now(),
        }
    }

    /// Include the classifier result
    #[must_use]
    pub const fn with_classifier(mut self, classifier: &'a ClassifierReport) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Override the generation timestamp
    #[must_use]
    pub const fn generated_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.generated_at = timestamp;
        self
    }

    fn lookup(&self) -> BTreeMap<(&'a str, i32), &'a SummaryRow> {
        self.summary
            .iter()
            .map(|r| ((r.region.as_str(), r.year), r))
            .collect()
    }

    /// Render the report
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Write the rendered report to `path`
    pub fn write(&self, path: &Path) -> Result<()> {
        use std::io::Write as _;

        let mut file = safe_create_file(path, "analytical report")?;
        file.write_all(self.render().as_bytes())?;
        log::info!("Analytical report written to {}", path.display());
        Ok(())
    }
}

impl fmt::Display for AnalyticalReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.lookup();
        let mut years: Vec<i32> = self.summary.iter().map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();
        let mut regions: Vec<&str> = self.summary.iter().map(|r| r.region.as_str()).collect();
        regions.sort_unstable();
        regions.dedup();

        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);

        writeln!(f, "{heavy}")?;
        writeln!(f, "ANALYTICAL REPORT: ADULT POPULATION OF {}", self.baseline.to_uppercase())?;
        writeln!(f, "Generated {}", self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(f, "{heavy}")?;
        writeln!(f)?;

        let (Some(&first), Some(&last)) = (years.first(), years.last()) else {
            return writeln!(f, "No observed data.");
        };

        writeln!(f, "1. POPULATION GROWTH ({first}-{last})")?;
        writeln!(f, "{light}")?;
        match (rows.get(&(self.baseline, first)), rows.get(&(self.baseline, last))) {
            (Some(start), Some(end)) => {
                writeln!(
                    f,
                    "* Adult population of {} grew from {} ({first}) to {} ({last})",
                    self.baseline,
                    format_count(start.population_total),
                    format_count(end.population_total)
                )?;
                writeln!(
                    f,
                    "* Cumulative growth rate: {:.1}%",
                    growth_rate(end.population_total, start.population_total)
                )?;
            }
            _ => {
                writeln!(f, "* No {} data for {first} and {last}", self.baseline)?;
            }
        }
        writeln!(f)?;

        writeln!(f, "Growth by region ({first}-{last}):")?;
        for region in regions.iter().filter(|r| **r != self.baseline) {
            if let (Some(start), Some(end)) = (rows.get(&(*region, first)), rows.get(&(*region, last))) {
                writeln!(
                    f,
                    "  - {region}: {:.1}% ({} -> {})",
                    growth_rate(end.population_total, start.population_total),
                    format_count(start.population_total),
                    format_count(end.population_total)
                )?;
            }
        }
        writeln!(f)?;

        writeln!(f, "2. GENDER DISTRIBUTION ({last})")?;
        writeln!(f, "{light}")?;
        for region in &regions {
            let Some(row) = rows.get(&(*region, last)) else {
                continue;
            };
            let femininity = (row.male_adult != 0.0).then(|| row.female_adult / row.male_adult * 100.0);
            writeln!(f, "* {region}:")?;
            writeln!(
                f,
                "  - Men: {} ({})",
                format_pct(row.pct_male),
                format_count(row.male_adult)
            )?;
            writeln!(
                f,
                "  - Women: {} ({})",
                format_pct(row.pct_female),
                format_count(row.female_adult)
            )?;
            writeln!(f, "  - Femininity index: {}", format_pct(femininity))?;
        }
        writeln!(f)?;

        writeln!(f, "3. GROWTH BY PERIOD")?;
        writeln!(f, "{light}")?;
        for pair in years.windows(2) {
            let (start_year, end_year) = (pair[0], pair[1]);
            writeln!(f, "Period {start_year}-{end_year}:")?;
            for region in &regions {
                if let (Some(start), Some(end)) =
                    (rows.get(&(*region, start_year)), rows.get(&(*region, end_year)))
                {
                    writeln!(
                        f,
                        "  - {region}: {:.1}%",
                        growth_rate(end.population_total, start.population_total)
                    )?;
                }
            }
            writeln!(f)?;
        }

        if let Some(classifier) = self.classifier {
            writeln!(f, "4. GENDER-MAJORITY CLASSIFIER")?;
            writeln!(f, "{light}")?;
            match classifier.accuracy {
                Some(accuracy) => {
                    writeln!(
                        f,
                        "* Held-out accuracy: {:.1}% ({} train / {} test rows)",
                        accuracy * 100.0,
                        classifier.train_size,
                        classifier.test_size
                    )?;
                }
                None => {
                    writeln!(f, "* Not enough rows to score the classifier")?;
                }
            }
        }

        Ok(())
    }
}
