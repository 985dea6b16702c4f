use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::parameters::SimulationParameters;
use crate::services::comparison::Scenario;

#[derive(Error, Debug)]
pub enum ScenarioYamlError {
    #[error("failed to read scenario yaml file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: io::Error,
    },
    #[error("failed to parse scenario yaml file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("scenario name in {0} must not be empty")]
    EmptyName(PathBuf),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioRecord {
    name: Option<String>,
    #[serde(default)]
    parameters: SimulationParameters,
}

/// Loads a named parameter set. Parameters not present in the file keep
/// their defaults; a missing name falls back to the file stem.
///
/// # Errors
/// Returns an error on I/O or parse failures, or an empty name.
pub fn load_scenario_from_yaml_file<P: AsRef<Path>>(
    path: P,
) -> Result<Scenario, ScenarioYamlError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| ScenarioYamlError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    deserialize_scenario_from_yaml_str(&contents, path)
}

pub fn deserialize_scenario_from_yaml_str(
    input: &str,
    origin_path: &Path,
) -> Result<Scenario, ScenarioYamlError> {
    // An empty document is a scenario with every default.
    let record: ScenarioRecord = if input.trim().is_empty() {
        ScenarioRecord {
            name: None,
            parameters: SimulationParameters::default(),
        }
    } else {
        serde_yaml::from_str(input).map_err(|source| ScenarioYamlError::Parse {
            path: origin_path.to_path_buf(),
            source,
        })?
    };

    let name = match record.name {
        Some(name) => name,
        None => scenario_name_from_path(origin_path),
    };
    if name.trim().is_empty() {
        return Err(ScenarioYamlError::EmptyName(origin_path.to_path_buf()));
    }
    Ok(Scenario::new(&name, record.parameters))
}

fn scenario_name_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_string()
}
