//! Loading prepared CSV files and writing every output

use popseries::{
    ArrowSchema, Pipeline, PipelineConfig, SeriesRow, SourceCatalog, SummaryRow, TableMetadata,
    load_sources_async, read_table,
};

use crate::utils::{catalog_with_constant_region, prepared_sources, test_config, write_csv_fixtures};

#[tokio::test]
async fn csv_sources_give_the_same_summary_as_memory_fixtures() {
    let dir = tempfile::tempdir().unwrap();
    write_csv_fixtures(dir.path());

    let catalog = SourceCatalog {
        data_dir: dir.path().to_path_buf(),
        ..catalog_with_constant_region()
    };
    let loaded = load_sources_async(&catalog).await.unwrap();
    let pipeline = Pipeline::new(test_config()).unwrap();

    let from_disk = pipeline.run(&loaded).unwrap();
    let from_memory = pipeline.run(&prepared_sources(&catalog)).unwrap();
    assert_eq!(from_disk.summary, from_memory.summary);
    assert_eq!(from_disk.series, from_memory.series);
}

#[tokio::test]
async fn run_and_write_produces_every_output() {
    let data_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    write_csv_fixtures(data_dir.path());

    let catalog = SourceCatalog {
        data_dir: data_dir.path().to_path_buf(),
        ..SourceCatalog::default()
    };
    let sources = load_sources_async(&catalog).await.unwrap();
    let config = PipelineConfig {
        output_dir: out_dir.path().join("abstract"),
        ..test_config()
    };
    let output = Pipeline::new(config.clone()).unwrap().run_and_write(&sources).unwrap();

    for name in [
        "summary.csv",
        "summary.parquet",
        "series.csv",
        "series.parquet",
        "indicators.csv",
        "indicators.parquet",
        "projection_models.csv",
        "projection_models.parquet",
        "classifier.json",
        "batch_report.json",
        "table_metadata.json",
        "analytical_report.txt",
        "run_config.json",
    ] {
        assert!(config.output_dir.join(name).exists(), "{name} missing");
    }

    let series = read_table(&config.output_dir.join("series.parquet"), "series").unwrap();
    assert_eq!(SeriesRow::from_record_batch(series.batch()).unwrap(), output.series);

    let summary = read_table(&config.output_dir.join("summary.csv"), "summary").unwrap();
    assert_eq!(summary.num_rows(), output.summary.len());
    assert_eq!(summary.column_names(), SummaryRow::schema().fields().iter().map(|f| f.name().clone()).collect::<Vec<_>>());

    let metadata: Vec<TableMetadata> =
        serde_json::from_str(&std::fs::read_to_string(config.output_dir.join("table_metadata.json")).unwrap()).unwrap();
    assert_eq!(metadata.len(), 3);
    assert_eq!(metadata[0].table, "eige_2015");
    assert_eq!(metadata[0].columns, vec!["entidad", "distrito_cod", "hombres_18+", "mujeres_18+"]);

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(config.output_dir.join("batch_report.json")).unwrap()).unwrap();
    assert_eq!(report["outcomes"]["GDL"], "processed");

    let text = std::fs::read_to_string(config.output_dir.join("analytical_report.txt")).unwrap();
    assert!(text.contains("GROWTH BY PERIOD"));
    assert!(text.contains("Period 2020-2025:"));
}
