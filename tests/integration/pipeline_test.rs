//! End-to-end runs over in-memory fixtures

use popseries::{
    FilterSpec, IssueKind, Metric, PeriodKind, Pipeline, PipelineError, PreparedSource,
    RegionOutcome, SourceCatalog, SourceId, Table,
};

use crate::utils::{catalog_with_constant_region, prepared_sources, test_config};

#[test]
fn every_kept_region_covers_history_and_horizon() {
    let sources = prepared_sources(&catalog_with_constant_region());
    let output = Pipeline::new(test_config()).unwrap().run(&sources).unwrap();

    assert_eq!(output.summary.len(), 12);
    for region in ["Constante", "GDL", "Jalisco", "ZMG"] {
        let years: Vec<i32> = output
            .series
            .iter()
            .filter(|r| r.region == region)
            .map(|r| r.year)
            .collect();
        assert_eq!(years, (2015..=2035).collect::<Vec<_>>(), "{region}");
    }
    assert_eq!(output.projected().count(), 4 * 10);
    assert_eq!(output.models.len(), 4 * Metric::ALL.len());
    assert_eq!(output.indicators.len(), output.series.len());
}

#[test]
fn summary_reads_each_vintage_with_its_own_columns() {
    let sources = prepared_sources(&SourceCatalog::default());
    let output = Pipeline::new(test_config()).unwrap().run(&sources).unwrap();

    let find = |region: &str, year: i32| {
        output
            .summary
            .iter()
            .find(|r| r.region == region && r.year == year)
            .unwrap()
    };

    let gdl_2015 = find("GDL", 2015);
    assert_eq!(gdl_2015.population_total, 500.0);
    assert_eq!(gdl_2015.pct_male, Some(60.0));
    assert_eq!(gdl_2015.pct_female, Some(40.0));

    // the 2020 total comes from its own column and excludes other states
    let gdl_2020 = find("GDL", 2020);
    assert_eq!(gdl_2020.population_total, 560.0);
    assert_eq!(gdl_2020.male_adult, 330.0);

    let zmg_2025 = find("ZMG", 2025);
    assert_eq!(zmg_2025.population_total, 840.0);

    let years: Vec<i32> = output.summary.iter().map(|r| r.year).collect();
    let mut sorted = years.clone();
    sorted.sort_unstable();
    assert_eq!(years, sorted);
}

#[test]
fn baseline_density_and_first_year_growth() {
    let sources = prepared_sources(&catalog_with_constant_region());
    let output = Pipeline::new(test_config()).unwrap().run(&sources).unwrap();

    assert!(output
        .indicators
        .iter()
        .filter(|r| r.region == "Jalisco")
        .all(|r| r.relative_density == Some(100.0)));

    for region in ["Constante", "GDL", "Jalisco", "ZMG"] {
        let first = output.indicators.iter().find(|r| r.region == region).unwrap();
        assert_eq!(first.year, 2015);
        assert_eq!(first.growth_rate, None);
    }

    let gdl_2016 = output
        .indicators
        .iter()
        .find(|r| r.region == "GDL" && r.year == 2016)
        .unwrap();
    assert_eq!(gdl_2016.period_kind, PeriodKind::Interpolated);
    assert_eq!(gdl_2016.growth_rate, Some(2.4));
}

#[test]
fn outcomes_separate_clean_and_flagged_regions() {
    let sources = prepared_sources(&catalog_with_constant_region());
    let output = Pipeline::new(test_config()).unwrap().run(&sources).unwrap();
    let outcomes = output.outcomes();

    assert_eq!(outcomes["GDL"], RegionOutcome::Processed);
    assert_eq!(outcomes["Jalisco"], RegionOutcome::Processed);
    assert_eq!(outcomes["ZMG"], RegionOutcome::Processed);
    assert_eq!(outcomes["Constante"], RegionOutcome::Flagged);
    assert!(output
        .report
        .issues_for("Constante")
        .all(|i| matches!(i.issue, IssueKind::DegenerateFit { .. })));
}

#[test]
fn runs_are_bit_identical() {
    let sources = prepared_sources(&catalog_with_constant_region());
    let sequential = Pipeline::new(popseries::PipelineConfig {
        worker_threads: Some(1),
        ..test_config()
    })
    .unwrap();
    let parallel = Pipeline::new(popseries::PipelineConfig {
        worker_threads: Some(4),
        ..test_config()
    })
    .unwrap();

    let a = sequential.run(&sources).unwrap();
    let b = parallel.run(&sources).unwrap();
    let c = parallel.run(&sources).unwrap();

    let bits = |rows: &[popseries::ProjectionModel]| {
        rows.iter()
            .map(|m| (m.region.clone(), m.metric, m.slope.to_bits(), m.intercept.to_bits(), m.r2.to_bits()))
            .collect::<Vec<_>>()
    };
    assert_eq!(bits(&a.models), bits(&b.models));
    assert_eq!(bits(&b.models), bits(&c.models));
    assert_eq!(a.series, b.series);
    assert_eq!(a.indicators, c.indicators);
    assert_eq!(a.classifier, c.classifier);
}

#[test]
fn missing_column_aborts_the_run() {
    let catalog = SourceCatalog::default();
    let mut sources = prepared_sources(&catalog);
    let definition = catalog.get(SourceId::Ine2025).unwrap().clone();
    let stripped = {
        let table = &sources[2].table;
        let batch = table.batch().project(&[0, 1, 2]).unwrap();
        Table::new("ine_2025", batch)
    };
    sources[2] = PreparedSource::new(definition, stripped);

    let err = Pipeline::new(test_config()).unwrap().run(&sources).unwrap_err();
    match err {
        PipelineError::Schema { table, column } => {
            assert_eq!(table, "ine_2025");
            assert_eq!(column, "padron_mujeres");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_filter_column_is_a_schema_error() {
    let mut catalog = SourceCatalog::default();
    catalog.sources[0]
        .regions
        .insert("Norte".to_string(), FilterSpec::new().equals("region_cod", 3));
    let sources = prepared_sources(&catalog);

    let err = Pipeline::new(test_config()).unwrap().run(&sources).unwrap_err();
    assert!(err.is_schema_level());
}
