//! Reference scenarios for the series, projection and indicator stages

use popseries::{
    BatchReport, FilterSpec, HistoricalSeriesBuilder, IndicatorCalculator, Metric, PeriodKind,
    Pipeline, ProjectionEngine, RegionOutcome, SourceId, YearlyRecord, ZeroDenominatorPolicy,
};

use crate::utils::{catalog_with_constant_region, prepared_sources, test_config};

#[test]
fn scenario_a_midpoint_between_two_observations() {
    let config = test_config();
    let records = vec![
        YearlyRecord::new("A", 2015, 1000.0, 500.0, 500.0),
        YearlyRecord::new("A", 2025, 1200.0, 600.0, 600.0),
    ];
    let series = HistoricalSeriesBuilder::new(&config).build(&records, &mut BatchReport::new());

    let row_2020 = series.iter().find(|r| r.year == 2020).unwrap();
    assert_eq!(row_2020.population_total, 1100.0);
    assert_eq!(row_2020.period_kind, PeriodKind::Interpolated);
    assert!(series.iter().all(|r| r.pct_male.is_some()));
}

#[test]
fn scenario_b_shares_and_femininity() {
    let config = test_config();
    let records = vec![
        YearlyRecord::new("B", 2015, 1000.0, 600.0, 400.0),
        YearlyRecord::new("B", 2025, 1000.0, 600.0, 400.0),
    ];
    let mut report = BatchReport::new();
    let series = HistoricalSeriesBuilder::new(&config).build(&records, &mut report);
    assert!(series.iter().all(|r| r.pct_male == Some(60.0) && r.pct_female == Some(40.0)));

    let indicators = IndicatorCalculator::new("B", ZeroDenominatorPolicy::Null).calculate(&series, &mut report);
    assert!(indicators.iter().all(|r| r.femininity_index == Some(66.7)));
}

#[test]
fn scenario_c_constant_region_projects_flat() {
    let sources = prepared_sources(&catalog_with_constant_region());
    let output = Pipeline::new(test_config()).unwrap().run(&sources).unwrap();

    let models: Vec<_> = output.models.iter().filter(|m| m.region == "Constante").collect();
    assert_eq!(models.len(), 3);
    assert!(models.iter().all(|m| m.slope == 0.0 && m.r2 == 1.0));

    let projected: Vec<_> = output.projected().filter(|r| r.region == "Constante").collect();
    assert_eq!(projected.len(), 10);
    assert!(projected.iter().all(|r| r.population_total == 500.0));
    assert!(projected.iter().all(|r| r.male_adult == 250.0 && r.female_adult == 250.0));
}

#[test]
fn scenario_d_single_year_region_is_skipped() {
    let mut catalog = catalog_with_constant_region();
    for source in &mut catalog.sources {
        if source.id == SourceId::Ine2025 {
            source
                .regions
                .insert("Lagos".to_string(), FilterSpec::new().equals("clave_distrito", 1));
        }
    }
    let sources = prepared_sources(&catalog);
    let output = Pipeline::new(test_config()).unwrap().run(&sources).unwrap();

    assert!(output.summary.iter().any(|r| r.region == "Lagos" && r.year == 2025));
    assert!(output.series.iter().all(|r| r.region != "Lagos"));
    assert!(output.models.iter().all(|m| m.region != "Lagos"));
    assert!(output.indicators.iter().all(|r| r.region != "Lagos"));
    assert_eq!(output.outcomes()["Lagos"], RegionOutcome::Skipped);
    assert!(output.report.skipped_regions().contains("Lagos"));
}

#[test]
fn projection_reads_only_historical_rows() {
    let config = test_config();
    let records = vec![
        YearlyRecord::new("A", 2015, 1000.0, 500.0, 500.0),
        YearlyRecord::new("A", 2025, 1200.0, 600.0, 600.0),
    ];
    let mut report = BatchReport::new();
    let mut series = HistoricalSeriesBuilder::new(&config).build(&records, &mut report);
    let engine = ProjectionEngine::new(&config);
    let first = engine.project(&series, &mut report).unwrap();

    series.extend(first.rows.clone());
    let second = engine.project(&series, &mut report).unwrap();
    assert_eq!(first, second);

    let total = first
        .models
        .iter()
        .find(|m| m.metric == Metric::PopulationTotal)
        .unwrap();
    assert!((total.slope - 20.0).abs() < 1e-9);
    assert_eq!(first.rows.last().unwrap().population_total, 1400.0);
}
