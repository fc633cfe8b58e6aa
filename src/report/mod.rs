//! Batch report of per-region outcomes
//!
//! Stages never abort a run because one region misbehaves. Instead they
//! record a [`RegionIssue`] here and carry on with the remaining regions; the
//! report then tells which regions were processed cleanly, which were
//! flagged and which were skipped, and why.

pub mod analytical;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::Metric;

/// Pipeline stage an issue was raised in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Aggregation of source tables into yearly rows
    Summary,
    /// Outlier removal, reindexing and interpolation
    Historical,
    /// Trend fitting and forecasting
    Projection,
    /// Growth, density and femininity indicators
    Indicators,
    /// Gender-majority classification
    Classifier,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Summary => "summary",
            Self::Historical => "historical",
            Self::Projection => "projection",
            Self::Indicators => "indicators",
            Self::Classifier => "classifier",
        };
        f.write_str(name)
    }
}

/// What went wrong for a region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    /// The region filter matched no rows of a source
    EmptyRegion,
    /// A ratio had a zero denominator and the configured policy was applied
    DivisionPolicy {
        /// Name of the ratio
        quantity: String,
    },
    /// A row was dropped by the z-score outlier filter
    OutlierRemoved {
        /// Population of the dropped row
        population_total: f64,
        /// Its absolute z-score
        z_score: f64,
    },
    /// Years outside the observed span were filled with the nearest observation
    EdgeFill {
        /// The filled years
        years: Vec<i32>,
    },
    /// Fewer than two observed points; the region cannot be interpolated
    InsufficientHistory {
        /// Observed points that survived outlier removal
        observed_points: usize,
    },
    /// The metric does not vary over the window; the trend is flat
    DegenerateFit {
        /// Affected metric
        metric: Metric,
    },
    /// A negative forecast was clamped to zero
    NegativeProjection {
        /// Affected metric
        metric: Metric,
    },
    /// The baseline region has no row for the year
    BaselineMissing {
        /// Configured baseline region
        baseline: String,
    },
}

impl IssueKind {
    /// Whether the issue removes the region from downstream stages
    #[must_use]
    pub const fn is_skip(&self) -> bool {
        matches!(self, Self::InsufficientHistory { .. })
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRegion => write!(f, "region filter matched no rows"),
            Self::DivisionPolicy { quantity } => {
                write!(f, "zero denominator in {quantity}, policy applied")
            }
            Self::OutlierRemoved {
                population_total,
                z_score,
            } => write!(
                f,
                "population {population_total} removed as outlier (z = {z_score:.2})"
            ),
            Self::EdgeFill { years } => {
                write!(f, "years {years:?} filled with nearest observation")
            }
            Self::InsufficientHistory { observed_points } => write!(
                f,
                "only {observed_points} observed point(s), at least 2 required"
            ),
            Self::DegenerateFit { metric } => write!(f, "{metric} is constant, flat trend"),
            Self::NegativeProjection { metric } => {
                write!(f, "negative {metric} forecast clamped to 0")
            }
            Self::BaselineMissing { baseline } => {
                write!(f, "baseline region '{baseline}' has no row")
            }
        }
    }
}

/// One recorded issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionIssue {
    /// Affected region
    pub region: String,
    /// Affected year, when the issue concerns a single year
    pub year: Option<i32>,
    /// Stage that raised it
    pub stage: Stage,
    /// What happened
    pub issue: IssueKind,
}

impl fmt::Display for RegionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(year) => write!(f, "[{}] {} {}: {}", self.stage, self.region, year, self.issue),
            None => write!(f, "[{}] {}: {}", self.stage, self.region, self.issue),
        }
    }
}

/// Final status of a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionOutcome {
    /// Every stage ran without issues
    Processed,
    /// Results were produced but carry issues
    Flagged,
    /// The region was dropped before projection
    Skipped,
}

/// Issues collected over a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    issues: Vec<RegionIssue>,
}

impl BatchReport {
    /// An empty report
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue and log it as a warning
    pub fn record(&mut self, region: &str, year: Option<i32>, stage: Stage, issue: IssueKind) {
        let issue = RegionIssue {
            region: region.to_string(),
            year,
            stage,
            issue,
        };
        log::warn!("{issue}");
        self.issues.push(issue);
    }

    /// Append every issue of another report
    pub fn extend(&mut self, other: Self) {
        self.issues.extend(other.issues);
    }

    /// All issues in the order they were recorded
    #[must_use]
    pub fn issues(&self) -> &[RegionIssue] {
        &self.issues
    }

    /// Issues of one region
    pub fn issues_for<'a>(&'a self, region: &'a str) -> impl Iterator<Item = &'a RegionIssue> {
        self.issues.iter().filter(move |i| i.region == region)
    }

    /// Whether a region was dropped from the series
    #[must_use]
    pub fn is_skipped(&self, region: &str) -> bool {
        self.issues_for(region).any(|i| i.issue.is_skip())
    }

    /// Outcome of a region
    #[must_use]
    pub fn outcome(&self, region: &str) -> RegionOutcome {
        let mut issues = self.issues_for(region).peekable();
        if issues.peek().is_none() {
            RegionOutcome::Processed
        } else if issues.any(|i| i.issue.is_skip()) {
            RegionOutcome::Skipped
        } else {
            RegionOutcome::Flagged
        }
    }

    /// Outcome of each named region
    pub fn outcomes<'a, I>(&self, regions: I) -> BTreeMap<String, RegionOutcome>
    where
        I: IntoIterator<Item = &'a str>,
    {
        regions
            .into_iter()
            .map(|r| (r.to_string(), self.outcome(r)))
            .collect()
    }

    /// Regions that were dropped from the series
    #[must_use]
    pub fn skipped_regions(&self) -> BTreeSet<String> {
        self.issues
            .iter()
            .filter(|i| i.issue.is_skip())
            .map(|i| i.region.clone())
            .collect()
    }
}
