use serde::Serialize;

use crate::domain::error::ReconciliationError;

/// Mismatch always accepted between the observed end headcount and the sum
/// of drivers.
pub const RECONCILIATION_TOLERANCE: f64 = 1e-6;
/// Accepted mismatch per unit of the largest headcount involved. Summation
/// error over weighted records grows with the population.
pub const RELATIVE_RECONCILIATION_TOLERANCE: f64 = 1e-9;

/// One year's headcount change split into its drivers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverWaterfall {
    pub year: u32,
    pub start_headcount: f64,
    pub hires: f64,
    pub retirements: f64,
    pub attritions: f64,
    pub atz_exits: f64,
    pub end_headcount: f64,
}

impl DriverWaterfall {
    pub fn net_change(&self) -> f64 {
        self.hires - self.retirements - self.attritions - self.atz_exits
    }

    /// Largest mismatch accepted for this year's magnitudes.
    pub fn tolerance(&self) -> f64 {
        let flows = self.hires + self.retirements + self.attritions + self.atz_exits;
        let scale = self
            .start_headcount
            .abs()
            .max(self.end_headcount.abs())
            .max(flows.abs())
            .max(1.0);
        RECONCILIATION_TOLERANCE.max(RELATIVE_RECONCILIATION_TOLERANCE * scale)
    }

    /// Verifies `start + hires - retirements - attritions - atz_exits == end`
    /// up to floating point summation error.
    pub fn reconcile(&self, scenario: &str) -> Result<(), ReconciliationError> {
        let expected_end = self.start_headcount + self.net_change();
        if (expected_end - self.end_headcount).abs() <= self.tolerance() {
            return Ok(());
        }
        Err(ReconciliationError {
            scenario: scenario.to_string(),
            year: self.year,
            start: self.start_headcount,
            hires: self.hires,
            retirements: self.retirements,
            attritions: self.attritions,
            atz_exits: self.atz_exits,
            end: self.end_headcount,
        })
    }
}
