//! End-to-end pipeline run
//!
//! Runs the stages in order over already loaded sources and collects every
//! output table together with the batch report. Only schema-level problems
//! abort a run; everything else ends up in the report.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;

use crate::algorithm::{
    ClassifierReport, GenderMajorityClassifier, HistoricalSeriesBuilder, IndicatorCalculator,
    ProjectionEngine, SummaryBuilder,
};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::{IndicatorRow, ProjectionModel, SeriesRow, SummaryRow};
use crate::report::analytical::AnalyticalReport;
use crate::report::{BatchReport, RegionIssue, RegionOutcome, Stage};
use crate::table::{PreparedSource, TableMetadata};
use crate::utils::logging::{
    create_main_progress_bar, finish_progress_bar, hidden_progress_bar, log_stage_complete,
    log_stage_start,
};
use crate::writer::{write_json, write_rows};

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// One row per (source year, region)
    pub summary: Vec<SummaryRow>,
    /// Historical and projected rows, ordered by region then year
    pub series: Vec<SeriesRow>,
    /// Fitted trends per (region, metric)
    pub models: Vec<ProjectionModel>,
    /// Indicators for every series row
    pub indicators: Vec<IndicatorRow>,
    /// Gender-majority classifier result
    pub classifier: ClassifierReport,
    /// Issues raised by any stage
    pub report: BatchReport,
    /// Shape of each input table
    pub metadata: Vec<TableMetadata>,
}

/// Serialized form of the batch report
#[derive(Debug, Serialize)]
struct BatchReportDocument<'a> {
    outcomes: BTreeMap<String, RegionOutcome>,
    issues: &'a [RegionIssue],
}

impl PipelineOutput {
    /// Final status of every region seen in the summary
    #[must_use]
    pub fn outcomes(&self) -> BTreeMap<String, RegionOutcome> {
        self.report
            .outcomes(self.summary.iter().map(|r| r.region.as_str()))
    }

    /// Rows of the series that fall in the projection horizon
    pub fn projected(&self) -> impl Iterator<Item = &SeriesRow> {
        self.series.iter().filter(|r| !r.period_kind.is_historical())
    }

    /// Write every output under `dir`; returns the files written
    pub fn write(&self, dir: &Path, baseline: &str) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        written.extend(write_rows(&self.summary, dir, "summary")?);
        written.extend(write_rows(&self.series, dir, "series")?);
        written.extend(write_rows(&self.indicators, dir, "indicators")?);
        written.extend(write_rows(&self.models, dir, "projection_models")?);

        let classifier_path = dir.join("classifier.json");
        write_json(&self.classifier, &classifier_path)?;
        written.push(classifier_path);

        let report_path = dir.join("batch_report.json");
        let document = BatchReportDocument {
            outcomes: self.outcomes(),
            issues: self.report.issues(),
        };
        write_json(&document, &report_path)?;
        written.push(report_path);

        let metadata_path = dir.join("table_metadata.json");
        write_json(&self.metadata, &metadata_path)?;
        written.push(metadata_path);

        let text_path = dir.join("analytical_report.txt");
        AnalyticalReport::new(&self.summary, baseline)
            .with_classifier(&self.classifier)
            .write(&text_path)?;
        written.push(text_path);

        log::info!("Wrote {} output files to {}", written.len(), dir.display());
        Ok(written)
    }
}

/// Runs all stages with one configuration
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline after checking the configuration
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage over the loaded sources
    pub fn run(&self, sources: &[PreparedSource]) -> Result<PipelineOutput> {
        let config = &self.config;
        let started = Instant::now();
        log::info!("Running pipeline on {} sources\n{config}", sources.len());

        let progress = if config.show_progress {
            create_main_progress_bar(5, Some("Summarizing sources"))
        } else {
            hidden_progress_bar(5)
        };
        let mut report = BatchReport::new();

        let metadata: Vec<TableMetadata> = sources.iter().map(|s| s.table.metadata()).collect();

        let stage_start = Instant::now();
        log_stage_start(Stage::Summary, sources.iter().map(|s| s.table.num_rows()).sum());
        let summary = SummaryBuilder::new(config.zero_denominator).build(sources, &mut report)?;
        log_stage_complete(Stage::Summary, summary.len(), stage_start.elapsed());
        progress.inc(1);

        progress.set_message("Building historical series");
        let stage_start = Instant::now();
        log_stage_start(Stage::Historical, summary.len());
        let mut series = HistoricalSeriesBuilder::new(config).build_from_summary(&summary, &mut report);
        log_stage_complete(Stage::Historical, series.len(), stage_start.elapsed());
        progress.inc(1);

        progress.set_message("Projecting trends");
        let stage_start = Instant::now();
        log_stage_start(Stage::Projection, series.len());
        let regions = series
            .iter()
            .map(|r| r.region.as_str())
            .collect::<std::collections::BTreeSet<_>>()
            .len();
        let region_bar = if config.show_progress {
            create_main_progress_bar(regions as u64, Some("regions"))
        } else {
            hidden_progress_bar(regions as u64)
        };
        let projection = ProjectionEngine::new(config)
            .with_progress(region_bar.clone())
            .project(&series, &mut report)?;
        region_bar.finish_and_clear();
        log_stage_complete(Stage::Projection, projection.rows.len(), stage_start.elapsed());
        progress.inc(1);

        series.extend(projection.rows);
        series.sort_by(|a, b| a.region.cmp(&b.region).then(a.year.cmp(&b.year)));

        progress.set_message("Computing indicators");
        let stage_start = Instant::now();
        log_stage_start(Stage::Indicators, series.len());
        let indicators = IndicatorCalculator::new(config.baseline_region.clone(), config.zero_denominator)
            .calculate(&series, &mut report);
        log_stage_complete(Stage::Indicators, indicators.len(), stage_start.elapsed());
        progress.inc(1);

        progress.set_message("Scoring classifier");
        let stage_start = Instant::now();
        log_stage_start(Stage::Classifier, series.len());
        let classifier = GenderMajorityClassifier::new(config.test_fraction, config.random_seed).evaluate(&series);
        log_stage_complete(Stage::Classifier, classifier.test_size, stage_start.elapsed());
        progress.inc(1);

        finish_progress_bar(&progress, Some("Pipeline complete"));

        let skipped = report.skipped_regions();
        if !skipped.is_empty() {
            log::warn!("Skipped regions: {skipped:?}");
        }
        log::info!(
            "Pipeline finished in {:?} with {} issues",
            started.elapsed(),
            report.issues().len()
        );

        Ok(PipelineOutput {
            summary,
            series,
            models: projection.models,
            indicators,
            classifier,
            report,
            metadata,
        })
    }

    /// Run and write every output to the configured directory
    pub fn run_and_write(&self, sources: &[PreparedSource]) -> Result<PipelineOutput> {
        let output = self.run(sources)?;
        output.write(&self.config.output_dir, &self.config.baseline_region)?;
        write_json(self.config(), &self.config.output_dir.join("run_config.json"))?;
        Ok(output)
    }
}
