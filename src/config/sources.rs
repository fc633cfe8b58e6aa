//! Source catalog: prepared survey extracts and their region definitions
//!
//! Each survey vintage names its columns differently. A [`SourceDefinition`]
//! maps one vintage onto the common vocabulary (male adults, female adults,
//! total) and carries the [`FilterSpec`] that carves each region out of it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::filter::FilterSpec;

/// Identifier of a survey vintage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    /// Intercensal geo-electoral survey, 2015
    Eige2015,
    /// Electoral-district census tabulation, 2020
    Ine2020,
    /// Electoral roll extract, 2025
    Ine2025,
}

impl SourceId {
    /// Dataset name used for file naming
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Eige2015 => "eige_2015",
            Self::Ine2020 => "ine_2020",
            Self::Ine2025 => "ine_2025",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the total adult population of a region is obtained
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TotalSpec {
    /// Sum of a dedicated column
    Column {
        /// Column holding the adult population
        name: String,
    },
    /// Male plus female adults
    SumOfSexes,
}

/// One prepared source table and how to read regions out of it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDefinition {
    /// Survey vintage
    pub id: SourceId,
    /// Year the extract describes
    pub year: i32,
    /// Prepared file, relative to the catalog's data directory
    pub file: PathBuf,
    /// Column with male adults
    pub male_column: String,
    /// Column with female adults
    pub female_column: String,
    /// Source of the total adult population
    pub total: TotalSpec,
    /// Filter applied to the whole table before any region filter
    #[serde(default)]
    pub base_filter: FilterSpec,
    /// Region name to region filter
    pub regions: BTreeMap<String, FilterSpec>,
}

impl SourceDefinition {
    /// Columns the prepared table must provide
    #[must_use]
    pub fn required_columns(&self) -> BTreeSet<String> {
        let mut columns: BTreeSet<String> = [self.male_column.clone(), self.female_column.clone()]
            .into_iter()
            .collect();
        if let TotalSpec::Column { name } = &self.total {
            columns.insert(name.clone());
        }
        columns.extend(self.base_filter.referenced_columns());
        for spec in self.regions.values() {
            columns.extend(spec.referenced_columns());
        }
        columns
    }
}

/// All sources of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceCatalog {
    /// Directory holding the prepared files
    pub data_dir: PathBuf,
    /// Source definitions
    pub sources: Vec<SourceDefinition>,
}

impl SourceCatalog {
    /// Full path of a source's prepared file
    #[must_use]
    pub fn prepared_path(&self, source: &SourceDefinition) -> PathBuf {
        self.data_dir.join(&source.file)
    }

    /// Look up a source by id
    #[must_use]
    pub fn get(&self, id: SourceId) -> Option<&SourceDefinition> {
        self.sources.iter().find(|s| s.id == id)
    }

    /// Every region named by any source, sorted
    #[must_use]
    pub fn region_names(&self) -> BTreeSet<String> {
        self.sources
            .iter()
            .flat_map(|s| s.regions.keys().cloned())
            .collect()
    }

    /// Reject duplicate ids or years and sources without regions
    pub fn validate(&self) -> Result<()> {
        let mut ids = BTreeSet::new();
        let mut years = BTreeSet::new();
        for source in &self.sources {
            if !ids.insert(source.id) {
                return Err(PipelineError::config(format!("duplicate source '{}'", source.id)));
            }
            if !years.insert(source.year) {
                return Err(PipelineError::config(format!(
                    "year {} is described by more than one source",
                    source.year
                )));
            }
            if source.regions.is_empty() {
                return Err(PipelineError::config(format!(
                    "source '{}' defines no regions",
                    source.id
                )));
            }
        }
        Ok(())
    }
}

const ZMG_DISTRICTS: [i64; 9] = [7, 8, 9, 11, 12, 13, 14, 15, 16];
const GDL_DISTRICTS: [i64; 4] = [8, 9, 11, 14];

impl Default for SourceCatalog {
    fn default() -> Self {
        let regions = |state: FilterSpec, district_column: &str| {
            BTreeMap::from([
                ("Jalisco".to_string(), state),
                (
                    "ZMG".to_string(),
                    FilterSpec::new().one_of(district_column, ZMG_DISTRICTS),
                ),
                (
                    "GDL".to_string(),
                    FilterSpec::new().one_of(district_column, GDL_DISTRICTS),
                ),
            ])
        };

        Self {
            data_dir: PathBuf::from("data/prepared"),
            sources: vec![
                SourceDefinition {
                    id: SourceId::Eige2015,
                    year: 2015,
                    file: PathBuf::from("eige_2015_prepared.csv"),
                    male_column: "hombres_18+".to_string(),
                    female_column: "mujeres_18+".to_string(),
                    total: TotalSpec::SumOfSexes,
                    base_filter: FilterSpec::new(),
                    regions: regions(FilterSpec::new().equals("entidad", 14), "distrito_cod"),
                },
                SourceDefinition {
                    id: SourceId::Ine2020,
                    year: 2020,
                    file: PathBuf::from("ine_2020_prepared.csv"),
                    male_column: "hombres_18+".to_string(),
                    female_column: "mujeres_18+".to_string(),
                    total: TotalSpec::Column {
                        name: "p_18ymas".to_string(),
                    },
                    base_filter: FilterSpec::new().equals("entidad", 14),
                    regions: regions(FilterSpec::new().any("distrito_cod"), "distrito_cod"),
                },
                SourceDefinition {
                    id: SourceId::Ine2025,
                    year: 2025,
                    file: PathBuf::from("ine_2025_prepared.csv"),
                    male_column: "padron_hombres".to_string(),
                    female_column: "padron_mujeres".to_string(),
                    total: TotalSpec::SumOfSexes,
                    base_filter: FilterSpec::new(),
                    regions: regions(
                        FilterSpec::new().equals("clave_entidad", 14),
                        "clave_distrito",
                    ),
                },
            ],
        }
    }
}
