//! Configuration for the demographic series pipeline.

pub mod sources;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::error::util::safe_open_file;

pub use sources::{SourceCatalog, SourceDefinition, SourceId, TotalSpec};

/// Environment variable pointing at a JSON configuration file
pub const CONFIG_ENV_VAR: &str = "POPSERIES_CONFIG";

/// How ratios with a zero denominator are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroDenominatorPolicy {
    /// Leave the value missing
    #[default]
    Null,
    /// Report the value as 0.0
    Zero,
}

impl ZeroDenominatorPolicy {
    /// The value reported in place of an undefined ratio
    #[must_use]
    pub const fn fallback(self) -> Option<f64> {
        match self {
            Self::Null => None,
            Self::Zero => Some(0.0),
        }
    }
}

/// Configuration for a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// First year of the historical window
    pub history_start: i32,
    /// Last year of the historical window
    pub history_end: i32,
    /// Last projected year
    pub projection_end: i32,
    /// Rows with a population z-score at or above this are dropped
    pub outlier_z_threshold: f64,
    /// Region every other region's relative density is measured against
    pub baseline_region: String,
    /// Share of rows held out when scoring the gender-majority classifier
    pub test_fraction: f64,
    /// Seed for the train/test shuffle
    pub random_seed: u64,
    /// Policy for ratios with a zero denominator
    pub zero_denominator: ZeroDenominatorPolicy,
    /// Worker threads for per-region projection (defaults to CPU count)
    pub worker_threads: Option<usize>,
    /// Show progress bars while stages run
    pub show_progress: bool,
    /// Directory output tables are written to
    pub output_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            history_start: 2015,
            history_end: 2025,
            projection_end: 2035,
            outlier_z_threshold: 3.0,
            baseline_region: "Jalisco".to_string(),
            test_fraction: 0.2,
            random_seed: 42,
            zero_denominator: ZeroDenominatorPolicy::Null,
            worker_threads: None,
            show_progress: true,
            output_dir: PathBuf::from("output/abstract"),
        }
    }
}

impl PipelineConfig {
    /// Number of years in the historical window
    #[must_use]
    pub fn history_len(&self) -> usize {
        usize::try_from(i64::from(self.history_end) - i64::from(self.history_start) + 1).unwrap_or(0)
    }

    /// Years of the historical window
    pub fn history_years(&self) -> impl Iterator<Item = i32> {
        self.history_start..=self.history_end
    }

    /// Years of the projection horizon
    pub fn projection_years(&self) -> impl Iterator<Item = i32> {
        (self.history_end + 1)..=self.projection_end
    }

    /// Worker threads to use for parallel stages
    #[must_use]
    pub fn worker_threads(&self) -> usize {
        self.worker_threads.unwrap_or_else(num_cpus::get).max(1)
    }

    /// Check that the configured ranges and fractions make sense
    pub fn validate(&self) -> Result<()> {
        if self.history_end <= self.history_start {
            return Err(PipelineError::config(format!(
                "history_end ({}) must be after history_start ({})",
                self.history_end, self.history_start
            )));
        }
        if self.projection_end <= self.history_end {
            return Err(PipelineError::config(format!(
                "projection_end ({}) must be after history_end ({})",
                self.projection_end, self.history_end
            )));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(PipelineError::config(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if !(self.outlier_z_threshold > 0.0) {
            return Err(PipelineError::config(format!(
                "outlier_z_threshold must be positive, got {}",
                self.outlier_z_threshold
            )));
        }
        if self.baseline_region.trim().is_empty() {
            return Err(PipelineError::config("baseline_region must not be empty"));
        }
        Ok(())
    }
}

impl fmt::Display for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pipeline Configuration:")?;
        writeln!(f, "  Historical Window: {}-{}", self.history_start, self.history_end)?;
        writeln!(f, "  Projection Horizon: {}-{}", self.history_end + 1, self.projection_end)?;
        writeln!(f, "  Outlier Threshold (z): {}", self.outlier_z_threshold)?;
        writeln!(f, "  Baseline Region: {}", self.baseline_region)?;
        writeln!(f, "  Test Fraction: {}", self.test_fraction)?;
        writeln!(f, "  Random Seed: {}", self.random_seed)?;
        writeln!(f, "  Zero Denominator Policy: {:?}", self.zero_denominator)?;
        writeln!(f, "  Worker Threads: {}", self.worker_threads())?;
        writeln!(f, "  Output Directory: {}", self.output_dir.display())?;
        Ok(())
    }
}

/// Top-level configuration file: run settings plus the source catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Run settings
    pub pipeline: PipelineConfig,
    /// Prepared sources and their region definitions
    pub sources: SourceCatalog,
}

impl ConfigFile {
    /// Load a configuration file from JSON
    pub fn load(path: &Path) -> Result<Self> {
        let file = safe_open_file(path, "pipeline configuration")?;
        let config: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.pipeline.validate()?;
        config.sources.validate()?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from the path in `POPSERIES_CONFIG`, or fall back to defaults
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) => Self::load(Path::new(&path)),
            Err(_) => {
                log::info!("{CONFIG_ENV_VAR} not set, using default configuration");
                Ok(Self::default())
            }
        }
    }
}
