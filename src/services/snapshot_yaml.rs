use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::cohort::{CohortBand, CohortBands};
use crate::domain::entity::{AtzTerm, ContractState, Entity};
use crate::domain::error::ConfigurationError;

#[derive(Error, Debug)]
pub enum SnapshotYamlError {
    #[error("failed to read snapshot yaml file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: io::Error,
    },
    #[error("failed to parse snapshot yaml file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid cohort bands in {path}: {source}")]
    InvalidCohorts {
        path: PathBuf,
        source: ConfigurationError,
    },
    #[error("duplicate entity id in {path}: {id}")]
    DuplicateId { path: PathBuf, id: String },
    #[error("invalid state for {id} in {path}: {value}")]
    InvalidState {
        path: PathBuf,
        id: String,
        value: String,
    },
    #[error("entity {id} in {path} has no age")]
    MissingAge { path: PathBuf, id: String },
    #[error("entity {id} in {path} has invalid {field}: {value}")]
    InvalidNumber {
        path: PathBuf,
        id: String,
        field: &'static str,
        value: f64,
    },
    #[error("entity {id} in {path} needs both atz_start_year and atz_end_year, start before end")]
    InvalidAtzTerm { path: PathBuf, id: String },
}

/// Present-day population plus the cohort bands it is classified with.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub bands: CohortBands,
    pub entities: Vec<Entity>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotRecord {
    cohorts: Option<CohortsRecord>,
    #[serde(default)]
    entities: Vec<EntityRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CohortsRecord {
    #[serde(default = "default_cohort_version")]
    version: u32,
    bands: Vec<CohortBand>,
}

fn default_cohort_version() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntityRecord {
    id: String,
    age: Option<f64>,
    org_unit: String,
    #[serde(default = "default_fte")]
    fte: f64,
    annual_cost: f64,
    state: Option<String>,
    atz_start_year: Option<i32>,
    atz_end_year: Option<i32>,
}

fn default_fte() -> f64 {
    1.0
}

/// Loads a snapshot file. Without a `cohorts` section the standard bands
/// are used.
///
/// # Errors
/// - Returns an error on I/O or parse failures.
/// - Returns an error when bands or entity records are invalid.
pub fn load_snapshot_from_yaml_file<P: AsRef<Path>>(
    path: P,
) -> Result<Snapshot, SnapshotYamlError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| SnapshotYamlError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    deserialize_snapshot_from_yaml_str(&contents, path)
}

pub fn deserialize_snapshot_from_yaml_str(
    input: &str,
    origin_path: &Path,
) -> Result<Snapshot, SnapshotYamlError> {
    let record: SnapshotRecord =
        serde_yaml::from_str(input).map_err(|source| SnapshotYamlError::Parse {
            path: origin_path.to_path_buf(),
            source,
        })?;

    let bands = match record.cohorts {
        Some(cohorts) => CohortBands::new(cohorts.version, cohorts.bands).map_err(|source| {
            SnapshotYamlError::InvalidCohorts {
                path: origin_path.to_path_buf(),
                source,
            }
        })?,
        None => CohortBands::standard(),
    };

    let mut seen = BTreeSet::new();
    let mut entities = Vec::with_capacity(record.entities.len());
    for value in record.entities {
        if !seen.insert(value.id.clone()) {
            return Err(SnapshotYamlError::DuplicateId {
                path: origin_path.to_path_buf(),
                id: value.id,
            });
        }
        entities.push(entity_from_record(value, origin_path)?);
    }

    Ok(Snapshot { bands, entities })
}

fn entity_from_record(value: EntityRecord, origin_path: &Path) -> Result<Entity, SnapshotYamlError> {
    let state = match value.state.as_deref() {
        None => ContractState::Active,
        Some(state) => parse_state(state).ok_or_else(|| SnapshotYamlError::InvalidState {
            path: origin_path.to_path_buf(),
            id: value.id.clone(),
            value: state.to_string(),
        })?,
    };

    let invalid_number = |field: &'static str, number: f64| SnapshotYamlError::InvalidNumber {
        path: origin_path.to_path_buf(),
        id: value.id.clone(),
        field,
        value: number,
    };
    if !value.fte.is_finite() || value.fte < 0.0 {
        return Err(invalid_number("fte", value.fte));
    }
    if !value.annual_cost.is_finite() || value.annual_cost < 0.0 {
        return Err(invalid_number("annual_cost", value.annual_cost));
    }

    if state == ContractState::Vacant {
        return Ok(Entity::vacancy(
            &value.id,
            &value.org_unit,
            value.fte,
            value.annual_cost,
        ));
    }

    let age = value.age.ok_or_else(|| SnapshotYamlError::MissingAge {
        path: origin_path.to_path_buf(),
        id: value.id.clone(),
    })?;
    if age < 0.0 {
        return Err(invalid_number("age", age));
    }

    let atz = match (value.atz_start_year, value.atz_end_year) {
        (None, None) => None,
        (Some(start_year), Some(end_year)) if start_year < end_year => Some(AtzTerm {
            start_year,
            end_year,
        }),
        _ => {
            return Err(SnapshotYamlError::InvalidAtzTerm {
                path: origin_path.to_path_buf(),
                id: value.id,
            });
        }
    };

    let mut entity = Entity::new(&value.id, age, &value.org_unit, value.fte, value.annual_cost);
    entity.state = state;
    entity.atz = atz;
    Ok(entity)
}

fn parse_state(value: &str) -> Option<ContractState> {
    match value.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
        "active" => Some(ContractState::Active),
        "atz_work_phase" | "atz_work" => Some(ContractState::AtzWorkPhase),
        "atz_release_phase" | "atz_release" => Some(ContractState::AtzReleasePhase),
        "vacant" | "vacancy" => Some(ContractState::Vacant),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_fs::prelude::*;

    const SNAPSHOT: &str = r#"
cohorts:
  version: 3
  bands:
    - { label: Junior, lower: 16, upper: 34 }
    - { label: Senior, lower: 35, upper: 70 }
entities:
  - { id: E-1, age: 31.5, org_unit: Sales, fte: 0.8, annual_cost: 52000 }
  - { id: E-2, age: 59, org_unit: Ops, annual_cost: 61000, state: atz_work_phase, atz_start_year: -1, atz_end_year: 3 }
  - { id: V-1, org_unit: Ops, annual_cost: 48000, state: vacant }
"#;

    fn parse(input: &str) -> Result<Snapshot, SnapshotYamlError> {
        deserialize_snapshot_from_yaml_str(input, Path::new("snapshot.yaml"))
    }

    #[test]
    fn parses_bands_and_entities() {
        let snapshot = parse(SNAPSHOT).unwrap();
        assert_eq!(snapshot.bands.version, 3);
        assert_eq!(snapshot.bands.labels().collect::<Vec<_>>(), vec!["Junior", "Senior"]);
        assert_eq!(snapshot.entities.len(), 3);

        let first = &snapshot.entities[0];
        assert_eq!(first.fte, 0.8);
        assert_eq!(first.state, ContractState::Active);

        let atz = &snapshot.entities[1];
        assert_eq!(atz.fte, 1.0);
        assert_eq!(atz.state, ContractState::AtzWorkPhase);
        assert_eq!(atz.atz, Some(AtzTerm { start_year: -1, end_year: 3 }));

        assert_eq!(snapshot.entities[2].state, ContractState::Vacant);
    }

    #[test]
    fn missing_cohorts_fall_back_to_standard_bands() {
        let snapshot = parse("entities: []\n").unwrap();
        assert_eq!(snapshot.bands, CohortBands::standard());
        assert!(snapshot.entities.is_empty());
    }

    #[test]
    fn rejects_overlapping_bands() {
        let input = "cohorts:\n  bands:\n    - { label: A, lower: 16, upper: 40 }\n    - { label: B, lower: 30, upper: 60 }\n";
        let err = parse(input).unwrap_err();
        assert!(matches!(
            err,
            SnapshotYamlError::InvalidCohorts {
                source: ConfigurationError::OverlappingCohortBands { .. },
                ..
            }
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let input = "entities:\n  - { id: E-1, age: 30, org_unit: A, annual_cost: 1 }\n  - { id: E-1, age: 31, org_unit: A, annual_cost: 1 }\n";
        let err = parse(input).unwrap_err();
        assert!(matches!(err, SnapshotYamlError::DuplicateId { id, .. } if id == "E-1"));
    }

    #[test]
    fn rejects_unknown_state_and_missing_age() {
        let input = "entities:\n  - { id: E-1, age: 30, org_unit: A, annual_cost: 1, state: retired }\n";
        assert!(matches!(parse(input).unwrap_err(), SnapshotYamlError::InvalidState { .. }));

        let input = "entities:\n  - { id: E-1, org_unit: A, annual_cost: 1 }\n";
        assert!(matches!(parse(input).unwrap_err(), SnapshotYamlError::MissingAge { .. }));
    }

    #[test]
    fn rejects_negative_fte_and_half_atz_terms() {
        let input = "entities:\n  - { id: E-1, age: 30, org_unit: A, fte: -1, annual_cost: 1 }\n";
        assert!(matches!(
            parse(input).unwrap_err(),
            SnapshotYamlError::InvalidNumber { field: "fte", .. }
        ));

        let input = "entities:\n  - { id: E-1, age: 58, org_unit: A, annual_cost: 1, state: atz_work_phase, atz_start_year: 0 }\n";
        assert!(matches!(parse(input).unwrap_err(), SnapshotYamlError::InvalidAtzTerm { .. }));
    }

    #[test]
    fn returns_error_when_file_is_missing() {
        let temp = assert_fs::TempDir::new().unwrap();
        let missing = temp.path().join("snapshot.yaml");
        let err = load_snapshot_from_yaml_file(&missing).unwrap_err();
        assert!(matches!(err, SnapshotYamlError::ReadFile { path, .. } if path == missing));
    }

    #[test]
    fn loads_snapshot_from_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("snapshot.yaml");
        file.write_str(SNAPSHOT).unwrap();
        let snapshot = load_snapshot_from_yaml_file(file.path()).unwrap();
        assert_eq!(snapshot.entities.len(), 3);
    }
}
