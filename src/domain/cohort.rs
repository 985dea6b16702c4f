use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigurationError;

/// Label reported for ages that no band covers.
pub const UNCLASSIFIED: &str = "Unclassified";

/// One named age band. Both bounds are inclusive and compared against
/// completed years of age.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortBand {
    pub label: String,
    pub lower: f64,
    pub upper: f64,
}

impl CohortBand {
    pub fn new(label: &str, lower: f64, upper: f64) -> Self {
        Self {
            label: label.to_string(),
            lower,
            upper,
        }
    }

    fn contains(&self, completed_years: f64) -> bool {
        completed_years >= self.lower && completed_years <= self.upper
    }
}

/// An immutable, versioned set of disjoint age bands.
///
/// Bands are handed to every simulation call explicitly and are never
/// changed while a run is in progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortBands {
    pub version: u32,
    bands: Vec<CohortBand>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CohortLabel {
    Named(String),
    Unclassified,
}

impl Serialize for CohortLabel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl CohortLabel {
    pub fn name(&self) -> Option<&str> {
        match self {
            CohortLabel::Named(name) => Some(name),
            CohortLabel::Unclassified => None,
        }
    }

    pub fn is_unclassified(&self) -> bool {
        matches!(self, CohortLabel::Unclassified)
    }
}

impl fmt::Display for CohortLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CohortLabel::Named(name) => write!(f, "{name}"),
            CohortLabel::Unclassified => write!(f, "{UNCLASSIFIED}"),
        }
    }
}

impl CohortBands {
    /// Builds a validated band set.
    ///
    /// # Errors
    /// Returns [`ConfigurationError`] for empty or duplicate labels, the
    /// reserved `Unclassified` label, inverted bounds and overlapping bands.
    pub fn new(version: u32, bands: Vec<CohortBand>) -> Result<Self, ConfigurationError> {
        for (idx, band) in bands.iter().enumerate() {
            if band.label.trim().is_empty() {
                return Err(ConfigurationError::EmptyCohortLabel);
            }
            if band.label == UNCLASSIFIED {
                return Err(ConfigurationError::ReservedCohortLabel);
            }
            if !(band.lower <= band.upper) {
                return Err(ConfigurationError::InvertedCohortBand {
                    label: band.label.clone(),
                    lower: band.lower,
                    upper: band.upper,
                });
            }
            for other in &bands[..idx] {
                if other.label == band.label {
                    return Err(ConfigurationError::DuplicateCohortLabel(band.label.clone()));
                }
                if band.lower <= other.upper && other.lower <= band.upper {
                    return Err(ConfigurationError::OverlappingCohortBands {
                        first: other.label.clone(),
                        second: band.label.clone(),
                    });
                }
            }
        }
        Ok(Self { version, bands })
    }

    /// Age bands used by the HR dashboard when no configuration is supplied.
    pub fn standard() -> Self {
        Self {
            version: 1,
            bands: vec![
                CohortBand::new("Azubis", 16.0, 19.0),
                CohortBand::new("Young Professionals", 20.0, 29.0),
                CohortBand::new("Mid Career", 30.0, 44.0),
                CohortBand::new("Senior", 45.0, 54.0),
                CohortBand::new("Pre-Retirement", 55.0, 62.0),
                CohortBand::new("Retirement Ready", 63.0, 99.0),
            ],
        }
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.bands.iter().map(|band| band.label.as_str())
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.bands.iter().any(|band| band.label == label)
    }

    /// Maps an age to its band. Never fails: ages outside every band (and
    /// NaN) are [`CohortLabel::Unclassified`].
    pub fn classify(&self, age: f64) -> CohortLabel {
        if age.is_nan() {
            return CohortLabel::Unclassified;
        }
        let completed_years = age.floor();
        self.bands
            .iter()
            .find(|band| band.contains(completed_years))
            .map(|band| CohortLabel::Named(band.label.clone()))
            .unwrap_or(CohortLabel::Unclassified)
    }
}
