use serde::Serialize;

use crate::domain::cohort::CohortLabel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractState {
    Active,
    AtzWorkPhase,
    AtzReleasePhase,
    Exited,
    /// Open position without a person.
    Vacant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    Retirement,
    EarlyRetirement,
    Attrition,
    AtzCompletion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExitRecord {
    pub year: u32,
    pub reason: ExitReason,
    /// Headcount weight that left with this exit.
    pub weight: f64,
}

/// Year offsets of an ATZ arrangement relative to the simulation start.
/// The work phase spans `start_year..release_year`, the release phase
/// `release_year..end_year`. Snapshot arrangements may start before year 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AtzTerm {
    pub start_year: i32,
    pub end_year: i32,
}

impl AtzTerm {
    pub fn starting(start_year: i32, phase_length: u32) -> Self {
        Self {
            start_year,
            end_year: start_year + 2 * phase_length as i32,
        }
    }

    pub fn release_year(&self) -> i32 {
        self.start_year + (self.end_year - self.start_year) / 2
    }
}

/// One simulated person or open position.
///
/// `fte` and `annual_cost` are per head; `weight` is the headcount the record
/// stands for. Metrics always use `weight * fte` and `weight * annual_cost`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    pub id: String,
    pub age: f64,
    pub org_unit: String,
    pub fte: f64,
    pub annual_cost: f64,
    pub state: ContractState,
    pub atz: Option<AtzTerm>,
    pub cohort: CohortLabel,
    pub weight: f64,
    pub exit: Option<ExitRecord>,
    /// Year the record was spawned by hiring; `None` for snapshot records.
    pub hired_in: Option<u32>,
}

impl Entity {
    pub fn new(id: &str, age: f64, org_unit: &str, fte: f64, annual_cost: f64) -> Self {
        Self {
            id: id.to_string(),
            age,
            org_unit: org_unit.to_string(),
            fte,
            annual_cost,
            state: ContractState::Active,
            atz: None,
            cohort: CohortLabel::Unclassified,
            weight: 1.0,
            exit: None,
            hired_in: None,
        }
    }

    pub fn vacancy(id: &str, org_unit: &str, fte: f64, annual_cost: f64) -> Self {
        Self {
            state: ContractState::Vacant,
            ..Self::new(id, f64::NAN, org_unit, fte, annual_cost)
        }
    }

    /// Employed, in any phase. Vacancies and exited records are not.
    pub fn is_in_service(&self) -> bool {
        matches!(
            self.state,
            ContractState::Active | ContractState::AtzWorkPhase | ContractState::AtzReleasePhase
        )
    }

    pub fn is_exited(&self) -> bool {
        self.state == ContractState::Exited
    }

    pub fn headcount(&self) -> f64 {
        if self.is_in_service() { self.weight } else { 0.0 }
    }

    /// Released ATZ staff stay on the payroll but provide no capacity.
    pub fn capacity(&self) -> f64 {
        match self.state {
            ContractState::Active | ContractState::AtzWorkPhase => self.weight * self.fte,
            _ => 0.0,
        }
    }

    pub fn cost(&self) -> f64 {
        if self.is_in_service() {
            self.weight * self.annual_cost
        } else {
            0.0
        }
    }

    /// Marks the record as exited and returns the headcount weight that left.
    pub fn exit(&mut self, year: u32, reason: ExitReason) -> f64 {
        let weight = self.weight;
        self.state = ContractState::Exited;
        self.exit = Some(ExitRecord {
            year,
            reason,
            weight,
        });
        weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exited_entity_contributes_nothing() {
        let mut entity = Entity::new("E-1", 40.0, "Sales", 0.8, 50_000.0);
        assert_eq!(entity.headcount(), 1.0);
        assert!((entity.capacity() - 0.8).abs() < 1e-12);

        let weight = entity.exit(3, ExitReason::Attrition);
        assert_eq!(weight, 1.0);
        assert_eq!(entity.headcount(), 0.0);
        assert_eq!(entity.capacity(), 0.0);
        assert_eq!(entity.cost(), 0.0);
        assert_eq!(entity.exit.as_ref().map(|exit| exit.year), Some(3));
    }

    #[test]
    fn released_atz_staff_keep_cost_but_no_capacity() {
        let mut entity = Entity::new("E-2", 60.0, "Ops", 1.0, 60_000.0);
        entity.state = ContractState::AtzReleasePhase;
        assert_eq!(entity.headcount(), 1.0);
        assert_eq!(entity.capacity(), 0.0);
        assert_eq!(entity.cost(), 60_000.0);
    }

    #[test]
    fn vacancy_is_not_in_service() {
        let vacancy = Entity::vacancy("V-1", "Ops", 1.0, 55_000.0);
        assert!(!vacancy.is_in_service());
        assert_eq!(vacancy.headcount(), 0.0);
        assert_eq!(vacancy.cost(), 0.0);
    }

    #[test]
    fn weighted_entity_scales_contributions() {
        let mut entity = Entity::new("E-3", 35.0, "Ops", 0.5, 40_000.0);
        entity.weight = 0.9;
        assert!((entity.headcount() - 0.9).abs() < 1e-12);
        assert!((entity.capacity() - 0.45).abs() < 1e-12);
        assert!((entity.cost() - 36_000.0).abs() < 1e-9);
    }

    #[test]
    fn atz_term_release_year_is_midpoint() {
        let term = AtzTerm::starting(2, 3);
        assert_eq!(term.end_year, 8);
        assert_eq!(term.release_year(), 5);
    }
}
