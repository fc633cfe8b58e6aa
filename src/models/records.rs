//! Row types for summaries, series, projections and indicators.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A population metric tracked per region and year
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum Metric {
    /// Total adult population
    PopulationTotal,
    /// Male population aged 18 or older
    MaleAdult,
    /// Female population aged 18 or older
    FemaleAdult,
}

impl Metric {
    /// All tracked metrics in output order
    pub const ALL: [Self; 3] = [Self::PopulationTotal, Self::MaleAdult, Self::FemaleAdult];

    /// Column name used in output tables
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::PopulationTotal => "population_total",
            Self::MaleAdult => "male_adult",
            Self::FemaleAdult => "female_adult",
        }
    }

    /// Read this metric from a record
    #[must_use]
    pub const fn value(self, record: &YearlyRecord) -> f64 {
        match self {
            Self::PopulationTotal => record.population_total,
            Self::MaleAdult => record.male_adult,
            Self::FemaleAdult => record.female_adult,
        }
    }

    /// Write this metric into a record
    pub fn set(self, record: &mut YearlyRecord, value: f64) {
        match self {
            Self::PopulationTotal => record.population_total = value,
            Self::MaleAdult => record.male_adult = value,
            Self::FemaleAdult => record.female_adult = value,
        }
    }
}

impl From<Metric> for &'static str {
    fn from(metric: Metric) -> Self {
        metric.column_name()
    }
}

impl TryFrom<String> for Metric {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|metric| metric.column_name() == name)
            .ok_or_else(|| format!("unknown metric '{name}'"))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// One region's adult population in one year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyRecord {
    /// Region name
    pub region: String,
    /// Calendar year
    pub year: i32,
    /// Total adult population
    pub population_total: f64,
    /// Male population aged 18 or older
    pub male_adult: f64,
    /// Female population aged 18 or older
    pub female_adult: f64,
}

impl YearlyRecord {
    /// Create a new record
    pub fn new(
        region: impl Into<String>,
        year: i32,
        population_total: f64,
        male_adult: f64,
        female_adult: f64,
    ) -> Self {
        Self {
            region: region.into(),
            year,
            population_total,
            male_adult,
            female_adult,
        }
    }

    /// Combined adult population of both sexes
    #[must_use]
    pub fn adult_sum(&self) -> f64 {
        self.male_adult + self.female_adult
    }
}

/// A row of the unified yearly summary table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    /// Region name
    pub region: String,
    /// Source year
    pub year: i32,
    /// Total adult population
    pub population_total: f64,
    /// Male population aged 18 or older
    pub male_adult: f64,
    /// Female population aged 18 or older
    pub female_adult: f64,
    /// Male share of the adult population in percent
    pub pct_male: Option<f64>,
    /// Female share of the adult population in percent
    pub pct_female: Option<f64>,
}

impl SummaryRow {
    /// The population counts of this row
    #[must_use]
    pub fn record(&self) -> YearlyRecord {
        YearlyRecord::new(
            self.region.clone(),
            self.year,
            self.population_total,
            self.male_adult,
            self.female_adult,
        )
    }
}

/// Where a series row comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodKind {
    /// Year present in a source extract
    Observed,
    /// Year filled in by linear interpolation
    Interpolated,
    /// Year beyond the historical window, produced by the trend model
    Projected,
}

impl PeriodKind {
    /// Tag written to output tables
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Observed => "observed",
            Self::Interpolated => "interpolated",
            Self::Projected => "projected",
        }
    }

    /// Whether the row belongs to the historical window
    #[must_use]
    pub const fn is_historical(self) -> bool {
        !matches!(self, Self::Projected)
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PeriodKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PeriodKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        match tag.as_str() {
            "observed" => Ok(Self::Observed),
            "interpolated" => Ok(Self::Interpolated),
            "projected" => Ok(Self::Projected),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["observed", "interpolated", "projected"],
            )),
        }
    }
}

/// A row of the historical + projected series table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRow {
    /// Region name
    pub region: String,
    /// Calendar year
    pub year: i32,
    /// Total adult population
    pub population_total: f64,
    /// Male population aged 18 or older
    pub male_adult: f64,
    /// Female population aged 18 or older
    pub female_adult: f64,
    /// Male share of the adult population in percent
    pub pct_male: Option<f64>,
    /// Female share of the adult population in percent
    pub pct_female: Option<f64>,
    /// Observed, interpolated or projected
    pub period_kind: PeriodKind,
}

impl SeriesRow {
    /// The population counts of this row
    #[must_use]
    pub fn record(&self) -> YearlyRecord {
        YearlyRecord::new(
            self.region.clone(),
            self.year,
            self.population_total,
            self.male_adult,
            self.female_adult,
        )
    }
}

/// Fitted linear trend for one (region, metric) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionModel {
    /// Region name
    pub region: String,
    /// Metric the trend was fitted on
    pub metric: Metric,
    /// Change per year
    pub slope: f64,
    /// Value at year zero
    pub intercept: f64,
    /// In-sample coefficient of determination
    pub r2: f64,
    /// In-sample mean squared error
    pub mse: f64,
}

impl ProjectionModel {
    /// Evaluate the trend at a year
    #[must_use]
    pub fn predict(&self, year: i32) -> f64 {
        self.slope * f64::from(year) + self.intercept
    }
}

/// Derived indicators for one (region, year)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    /// Region name
    pub region: String,
    /// Calendar year
    pub year: i32,
    /// Observed, interpolated or projected
    pub period_kind: PeriodKind,
    /// Percent change of the total population against the previous year
    pub growth_rate: Option<f64>,
    /// Total population as a percent of the baseline region's
    pub relative_density: Option<f64>,
    /// Women per hundred men among adults
    pub femininity_index: Option<f64>,
}
