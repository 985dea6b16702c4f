use std::sync::Arc;

use crate::domain::cohort::CohortBands;
use crate::domain::entity::Entity;
use crate::services::transition::PopulationState;

pub const DEFAULT_ANNUAL_COST: f64 = 60_000.0;

/// Full-time active employee, classified against the standard bands.
pub fn build_employee(id: &str, age: f64, org_unit: &str) -> Entity {
    let mut entity = Entity::new(id, age, org_unit, 1.0, DEFAULT_ANNUAL_COST);
    entity.cohort = CohortBands::standard().classify(age);
    entity
}

pub fn uniform_population(count: usize, age: f64, org_unit: &str) -> Vec<Entity> {
    (0..count)
        .map(|idx| build_employee(&format!("{org_unit}-{idx:04}"), age, org_unit))
        .collect()
}

pub fn state_of(entities: Vec<Entity>) -> PopulationState {
    PopulationState {
        population: entities.into_iter().map(Arc::new).collect(),
        pending_hires: Vec::new(),
    }
}
