//! Region filters over generated tables

use std::sync::Arc;

use arrow::array::{Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use popseries::{FilterSpec, PipelineError, RegionFilterEngine, Table};
use rand::prelude::*;

fn random_table(rows: usize, seed: u64) -> Table {
    let mut rng = StdRng::seed_from_u64(seed);
    let states: Vec<i64> = (0..rows).map(|_| rng.random_range(13..=15)).collect();
    let districts: Vec<f64> = (0..rows).map(|_| f64::from(rng.random_range(1..=20_i32))).collect();
    let names: Vec<&str> = (0..rows)
        .map(|_| if rng.random_bool(0.5) { "urbano" } else { "rural" })
        .collect();

    let schema = Arc::new(Schema::new(vec![
        Field::new("entidad", DataType::Int64, false),
        Field::new("distrito_cod", DataType::Float64, false),
        Field::new("tipo", DataType::Utf8, false),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from(states)),
            Arc::new(Float64Array::from(districts)),
            Arc::new(StringArray::from(names)),
        ],
    )
    .unwrap();
    Table::new("generated", batch)
}

fn column<'a, T: 'static>(table: &'a Table, name: &str) -> &'a T {
    table.column(name).unwrap().as_any().downcast_ref::<T>().unwrap()
}

#[test]
fn filtered_rows_satisfy_every_condition() {
    let districts = [7_i64, 8, 9, 11, 12, 13, 14, 15, 16];
    let spec = FilterSpec::new()
        .equals("entidad", 14)
        .one_of("distrito_cod", districts)
        .equals("tipo", "urbano");

    for seed in 0..10 {
        let table = random_table(500, seed);
        let subset = RegionFilterEngine::apply(&table, &spec).unwrap();
        assert!(subset.num_rows() <= table.num_rows());

        let states = column::<Int64Array>(&subset, "entidad");
        let codes = column::<Float64Array>(&subset, "distrito_cod");
        let kinds = column::<StringArray>(&subset, "tipo");
        for i in 0..subset.num_rows() {
            assert_eq!(states.value(i), 14);
            assert!(districts.iter().any(|d| *d as f64 == codes.value(i)));
            assert_eq!(kinds.value(i), "urbano");
        }
    }
}

#[test]
fn filter_keeps_exactly_the_matching_rows() {
    let table = random_table(300, 7);
    let spec = FilterSpec::new().equals("entidad", 14);
    let subset = RegionFilterEngine::apply(&table, &spec).unwrap();

    let states = column::<Int64Array>(&table, "entidad");
    let expected = (0..states.len()).filter(|&i| states.value(i) == 14).count();
    assert_eq!(subset.num_rows(), expected);
    assert_eq!(table.num_rows(), 300);
}

#[test]
fn any_condition_passes_every_row_through() {
    let table = random_table(50, 3);
    let subset = RegionFilterEngine::apply(&table, &FilterSpec::new().any("distrito_cod")).unwrap();
    assert_eq!(subset.num_rows(), 50);
}

#[test]
fn unknown_column_names_the_table() {
    let table = random_table(10, 1);
    let err = RegionFilterEngine::apply(&table, &FilterSpec::new().equals("seccion", 3)).unwrap_err();
    match err {
        PipelineError::Schema { table, column } => {
            assert_eq!(table, "generated");
            assert_eq!(column, "seccion");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn string_literal_against_numeric_column_is_rejected() {
    let table = random_table(10, 2);
    let result = RegionFilterEngine::apply(&table, &FilterSpec::new().equals("entidad", "14"));
    assert!(matches!(result, Err(PipelineError::Filter(_))));
}
