use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use popseries::{FilterSpec, PipelineConfig, PreparedSource, SourceCatalog, SourceId, Table};

/// District with the same population in every source
pub const CONSTANT_DISTRICT: i64 = 20;

/// Rows of (state, district, men, women) shared by the fixtures
const EIGE_2015: [(i64, i64, i64, i64); 4] = [
    (14, 8, 300, 200),
    (14, 7, 100, 100),
    (14, 1, 50, 50),
    (14, CONSTANT_DISTRICT, 250, 250),
];

const INE_2020: [(i64, i64, i64, i64); 5] = [
    (14, 8, 330, 220),
    (14, 7, 110, 110),
    (14, 1, 55, 55),
    (14, CONSTANT_DISTRICT, 250, 250),
    (13, 8, 5000, 5000),
];

const INE_2025: [(i64, i64, i64, i64); 4] = [
    (14, 8, 360, 240),
    (14, 7, 120, 120),
    (14, 1, 60, 60),
    (14, CONSTANT_DISTRICT, 250, 250),
];

fn int_column(values: impl Iterator<Item = i64>) -> ArrayRef {
    Arc::new(Int64Array::from(values.collect::<Vec<_>>()))
}

fn batch(names: &[&str], columns: Vec<ArrayRef>) -> RecordBatch {
    let fields: Vec<Field> = names
        .iter()
        .map(|name| Field::new(*name, DataType::Int64, false))
        .collect();
    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).unwrap()
}

/// 2015 survey: men, women, no total column
#[must_use]
pub fn eige_2015_table() -> Table {
    let rows = EIGE_2015;
    let batch = batch(
        &["entidad", "distrito_cod", "hombres_18+", "mujeres_18+"],
        vec![
            int_column(rows.iter().map(|r| r.0)),
            int_column(rows.iter().map(|r| r.1)),
            int_column(rows.iter().map(|r| r.2)),
            int_column(rows.iter().map(|r| r.3)),
        ],
    );
    Table::new("eige_2015", batch)
}

/// 2020 census: includes a total column ten above the sum of sexes
#[must_use]
pub fn ine_2020_table() -> Table {
    let rows = INE_2020;
    let batch = batch(
        &["entidad", "distrito_cod", "hombres_18+", "mujeres_18+", "p_18ymas"],
        vec![
            int_column(rows.iter().map(|r| r.0)),
            int_column(rows.iter().map(|r| r.1)),
            int_column(rows.iter().map(|r| r.2)),
            int_column(rows.iter().map(|r| r.3)),
            int_column(rows.iter().map(|r| {
                if r.1 == CONSTANT_DISTRICT {
                    r.2 + r.3
                } else {
                    r.2 + r.3 + 10
                }
            })),
        ],
    );
    Table::new("ine_2020", batch)
}

/// 2025 roll: different column names
#[must_use]
pub fn ine_2025_table() -> Table {
    let rows = INE_2025;
    let batch = batch(
        &["clave_entidad", "clave_distrito", "padron_hombres", "padron_mujeres"],
        vec![
            int_column(rows.iter().map(|r| r.0)),
            int_column(rows.iter().map(|r| r.1)),
            int_column(rows.iter().map(|r| r.2)),
            int_column(rows.iter().map(|r| r.3)),
        ],
    );
    Table::new("ine_2025", batch)
}

/// Default catalog plus a region that never changes
#[must_use]
pub fn catalog_with_constant_region() -> SourceCatalog {
    let mut catalog = SourceCatalog::default();
    for source in &mut catalog.sources {
        let column = match source.id {
            SourceId::Ine2025 => "clave_distrito",
            _ => "distrito_cod",
        };
        source.regions.insert(
            "Constante".to_string(),
            FilterSpec::new().equals(column, CONSTANT_DISTRICT),
        );
    }
    catalog
}

/// Pair each catalog definition with its in-memory fixture table
#[must_use]
pub fn prepared_sources(catalog: &SourceCatalog) -> Vec<PreparedSource> {
    catalog
        .sources
        .iter()
        .map(|definition| {
            let table = match definition.id {
                SourceId::Eige2015 => eige_2015_table(),
                SourceId::Ine2020 => ine_2020_table(),
                SourceId::Ine2025 => ine_2025_table(),
            };
            PreparedSource::new(definition.clone(), table)
        })
        .collect()
}

/// Write the fixtures as prepared CSV files into `dir`
pub fn write_csv_fixtures(dir: &Path) {
    let mut eige = String::from("entidad,distrito_cod,hombres_18+,mujeres_18+\n");
    for (state, district, men, women) in EIGE_2015 {
        eige.push_str(&format!("{state},{district},{men},{women}\n"));
    }
    std::fs::write(dir.join("eige_2015_prepared.csv"), eige).unwrap();

    let mut ine_2020 = String::from("entidad,distrito_cod,hombres_18+,mujeres_18+,p_18ymas\n");
    for (state, district, men, women) in INE_2020 {
        let total = if district == CONSTANT_DISTRICT {
            men + women
        } else {
            men + women + 10
        };
        ine_2020.push_str(&format!("{state},{district},{men},{women},{total}\n"));
    }
    std::fs::write(dir.join("ine_2020_prepared.csv"), ine_2020).unwrap();

    let mut ine_2025 = String::from("clave_entidad,clave_distrito,padron_hombres,padron_mujeres\n");
    for (state, district, men, women) in INE_2025 {
        ine_2025.push_str(&format!("{state},{district},{men},{women}\n"));
    }
    std::fs::write(dir.join("ine_2025_prepared.csv"), ine_2025).unwrap();
}

/// Quiet configuration for tests
#[must_use]
pub fn test_config() -> PipelineConfig {
    PipelineConfig {
        show_progress: false,
        ..PipelineConfig::default()
    }
}
