//! Configuration files

use std::io::Write;

use popseries::{ConfigFile, PipelineError, SourceId, ZeroDenominatorPolicy};

#[test]
fn partial_file_falls_back_to_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "pipeline": {{ "baseline_region": "ZMG", "zero_denominator": "zero" }} }}"#
    )
    .unwrap();

    let config = ConfigFile::load(file.path()).unwrap();
    assert_eq!(config.pipeline.baseline_region, "ZMG");
    assert_eq!(config.pipeline.zero_denominator, ZeroDenominatorPolicy::Zero);
    assert_eq!(config.pipeline.history_start, 2015);
    assert_eq!(config.pipeline.random_seed, 42);
    assert_eq!(config.sources.sources.len(), 3);
}

#[test]
fn custom_sources_are_read_from_json() {
    let json = r#"{
        "sources": {
            "data_dir": "prepared",
            "sources": [{
                "id": "ine_2025",
                "year": 2025,
                "file": "roll.parquet",
                "male_column": "men",
                "female_column": "women",
                "total": { "kind": "sum_of_sexes" },
                "regions": {
                    "North": { "district": [1, 2, 3] },
                    "All": { "district": null }
                }
            }]
        }
    }"#;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let config = ConfigFile::load(file.path()).unwrap();
    let source = config.sources.get(SourceId::Ine2025).unwrap();
    assert_eq!(source.regions.len(), 2);
    assert!(source.base_filter.is_pass_through());
    assert!(source.regions["All"].is_pass_through());
    assert!(source.required_columns().contains("district"));
    assert_eq!(
        config.sources.prepared_path(source),
        std::path::Path::new("prepared").join("roll.parquet")
    );
}

#[test]
fn invalid_ranges_are_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "pipeline": {{ "history_start": 2025, "history_end": 2015 }} }}"#).unwrap();
    let err = ConfigFile::load(file.path()).unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
}
