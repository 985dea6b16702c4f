use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::cohort::CohortBands;
use crate::domain::entity::{AtzTerm, ContractState, Entity, ExitReason};
use crate::domain::parameters::SimulationParameters;
use crate::services::draws::{Selection, TransitionDraws};
use crate::services::simulation_types::YearFlows;

/// Weight below which a partially departed record counts as fully exited.
const EXIT_EPSILON: f64 = 1e-12;

/// A backfill for a vacated position, carrying the position's attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct HireRequest {
    pub org_unit: String,
    pub fte: f64,
    pub annual_cost: f64,
    pub weight: f64,
}

impl HireRequest {
    fn for_position(entity: &Entity, weight: f64) -> Self {
        Self {
            org_unit: entity.org_unit.clone(),
            fte: entity.fte,
            annual_cost: entity.annual_cost,
            weight,
        }
    }
}

/// Population and hiring pipeline carried from one year into the next.
#[derive(Debug, Clone, Default)]
pub struct PopulationState {
    pub population: Vec<Arc<Entity>>,
    pub pending_hires: Vec<HireRequest>,
}

pub struct YearOutcome {
    pub state: PopulationState,
    pub flows: YearFlows,
}

/// Advances the population by one year.
///
/// Rules run in a fixed order so that a record leaving under an earlier rule
/// is never processed again by a later one in the same year:
/// aging, retirement, ATZ progression and enrollment, voluntary attrition,
/// hiring. Untouched records keep sharing their allocation with `previous`.
pub fn advance_year<D: TransitionDraws>(
    previous: &PopulationState,
    year: u32,
    params: &SimulationParameters,
    bands: &CohortBands,
    draws: &mut D,
) -> YearOutcome {
    let mut population = previous.population.clone();
    let mut flows = YearFlows {
        start_headcount: population.iter().map(|entity| entity.headcount()).sum(),
        ..YearFlows::default()
    };
    let mut vacated = Vec::new();

    age_population(&mut population, bands);
    apply_retirements(&mut population, year, params, draws, &mut flows, &mut vacated);
    apply_atz_progression(&mut population, year, &mut flows, &mut vacated);
    enroll_atz(&mut population, year, params, draws, &mut flows);
    apply_attrition(&mut population, year, params, draws, &mut flows, &mut vacated);

    let pending_hires = apply_hiring(
        &mut population,
        &previous.pending_hires,
        vacated,
        year,
        params,
        bands,
        draws,
        &mut flows,
    );
    flows.pending_hires = pending_hires.iter().map(|request| request.weight).sum();

    YearOutcome {
        state: PopulationState {
            population,
            pending_hires,
        },
        flows,
    }
}

fn age_population(population: &mut [Arc<Entity>], bands: &CohortBands) {
    for entity in population.iter_mut().filter(|entity| entity.is_in_service()) {
        let entity = Arc::make_mut(entity);
        entity.age += 1.0;
        entity.cohort = bands.classify(entity.age);
    }
}

fn apply_retirements<D: TransitionDraws>(
    population: &mut [Arc<Entity>],
    year: u32,
    params: &SimulationParameters,
    draws: &mut D,
    flows: &mut YearFlows,
    vacated: &mut Vec<HireRequest>,
) {
    for entity in population.iter_mut() {
        if !entity.is_in_service() {
            continue;
        }
        if entity.age >= params.retirement_age {
            let entity = Arc::make_mut(entity);
            let weight = entity.exit(year, ExitReason::Retirement);
            flows.retirements += weight;
            vacated.push(HireRequest::for_position(entity, weight));
            continue;
        }
        if entity.state == ContractState::Active
            && params.early_retirement_rate > 0.0
            && entity.age >= params.early_retirement_age
        {
            let leaving = draws.share(entity.weight, params.early_retirement_rate);
            if leaving > 0.0 {
                let entity = Arc::make_mut(entity);
                let leaving = depart(entity, leaving, year, ExitReason::EarlyRetirement);
                flows.retirements += leaving;
                flows.early_retirements += leaving;
                vacated.push(HireRequest::for_position(entity, leaving));
            }
        }
    }
}

fn apply_atz_progression(
    population: &mut [Arc<Entity>],
    year: u32,
    flows: &mut YearFlows,
    vacated: &mut Vec<HireRequest>,
) {
    let year_offset = year as i32;
    for entity in population.iter_mut() {
        let (Some(term), state) = (entity.atz, entity.state) else {
            continue;
        };
        match state {
            ContractState::AtzWorkPhase if year_offset >= term.end_year => {
                // A term too short to have a release phase ends directly.
                let entity = Arc::make_mut(entity);
                let weight = entity.exit(year, ExitReason::AtzCompletion);
                flows.atz_exits += weight;
                vacated.push(HireRequest::for_position(entity, weight));
            }
            ContractState::AtzWorkPhase if year_offset >= term.release_year() => {
                Arc::make_mut(entity).state = ContractState::AtzReleasePhase;
            }
            ContractState::AtzReleasePhase if year_offset >= term.end_year => {
                let entity = Arc::make_mut(entity);
                let weight = entity.exit(year, ExitReason::AtzCompletion);
                flows.atz_exits += weight;
                vacated.push(HireRequest::for_position(entity, weight));
            }
            _ => {}
        }
    }
}

fn enroll_atz<D: TransitionDraws>(
    population: &mut Vec<Arc<Entity>>,
    year: u32,
    params: &SimulationParameters,
    draws: &mut D,
    flows: &mut YearFlows,
) {
    if params.atz_enrollment_rate <= 0.0 {
        return;
    }
    let term_years = 2.0 * f64::from(params.atz_phase_length_years);
    let mut eligible: Vec<usize> = population
        .iter()
        .enumerate()
        .filter(|(_, entity)| {
            entity.state == ContractState::Active
                && entity.age >= params.atz_min_age
                && entity.age + term_years < params.retirement_age
                && params.is_atz_eligible_cohort(&entity.cohort)
        })
        .map(|(idx, _)| idx)
        .collect();
    // Oldest first, ties by id, so the expected-value path is stable.
    eligible.sort_by(|a, b| {
        let (a, b) = (&population[*a], &population[*b]);
        b.age
            .partial_cmp(&a.age)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    let weights: Vec<f64> = eligible.iter().map(|idx| population[*idx].weight).collect();
    let picks = draws.select(Selection::AtzEnrollment, &weights, params.atz_enrollment_rate);
    for (pick, taken) in picks {
        let idx = split_off(population, eligible[pick], taken, &format!("atz-{year}"));
        let entity = Arc::make_mut(&mut population[idx]);
        entity.state = ContractState::AtzWorkPhase;
        entity.atz = Some(AtzTerm::starting(year as i32, params.atz_phase_length_years));
        flows.atz_enrollments += entity.weight;
    }
}

fn apply_attrition<D: TransitionDraws>(
    population: &mut [Arc<Entity>],
    year: u32,
    params: &SimulationParameters,
    draws: &mut D,
    flows: &mut YearFlows,
    vacated: &mut Vec<HireRequest>,
) {
    for entity in population.iter_mut() {
        if entity.state != ContractState::Active {
            continue;
        }
        let rate = params.attrition_rate(&entity.cohort);
        if rate <= 0.0 {
            continue;
        }
        let leaving = draws.share(entity.weight, rate);
        if leaving > 0.0 {
            let entity = Arc::make_mut(entity);
            let leaving = depart(entity, leaving, year, ExitReason::Attrition);
            flows.attritions += leaving;
            vacated.push(HireRequest::for_position(entity, leaving));
        }
    }
}

/// Removes `leaving` weight from an active record, exiting it when nothing
/// is left. Returns the weight that actually left.
fn depart(entity: &mut Entity, leaving: f64, year: u32, reason: ExitReason) -> f64 {
    if leaving >= entity.weight - EXIT_EPSILON {
        return entity.exit(year, reason);
    }
    entity.weight -= leaving;
    leaving
}

#[allow(clippy::too_many_arguments)]
fn apply_hiring<D: TransitionDraws>(
    population: &mut Vec<Arc<Entity>>,
    carried: &[HireRequest],
    vacated: Vec<HireRequest>,
    year: u32,
    params: &SimulationParameters,
    bands: &CohortBands,
    draws: &mut D,
    flows: &mut YearFlows,
) -> Vec<HireRequest> {
    let mut starting: Vec<HireRequest> = carried.to_vec();
    let mut pending = Vec::new();
    let pending_share = params.pending_hire_share();

    for request in vacated {
        let hired = draws.share(request.weight, params.replacement_ratio);
        if hired <= 0.0 {
            continue;
        }
        let delayed = if pending_share > 0.0 {
            draws.share(hired, pending_share)
        } else {
            0.0
        };
        if delayed > 0.0 {
            pending.push(HireRequest {
                weight: delayed,
                ..request.clone()
            });
        }
        if hired - delayed > 0.0 {
            starting.push(HireRequest {
                weight: hired - delayed,
                ..request
            });
        }
    }

    if draws.consolidates_hires() {
        starting = consolidate(starting);
        pending = consolidate(pending);
    }

    for (idx, request) in starting.into_iter().enumerate() {
        let age = draws.entry_age(&params.entry_age);
        let id = if draws.consolidates_hires() {
            format!("hire-{year}-{}", request.org_unit)
        } else {
            format!("hire-{year}-{idx:05}")
        };
        let mut hire = Entity::new(&id, age, &request.org_unit, request.fte, request.annual_cost);
        hire.weight = request.weight;
        hire.cohort = bands.classify(age);
        hire.hired_in = Some(year);
        flows.hires += hire.weight;
        population.push(Arc::new(hire));
    }

    fill_vacancies(population, year, params, bands, draws, flows);
    pending
}

fn fill_vacancies<D: TransitionDraws>(
    population: &mut Vec<Arc<Entity>>,
    year: u32,
    params: &SimulationParameters,
    bands: &CohortBands,
    draws: &mut D,
    flows: &mut YearFlows,
) {
    if params.vacancy_fill_rate <= 0.0 {
        return;
    }
    let open: Vec<usize> = population
        .iter()
        .enumerate()
        .filter(|(_, entity)| entity.state == ContractState::Vacant)
        .map(|(idx, _)| idx)
        .collect();

    let weights: Vec<f64> = open.iter().map(|idx| population[*idx].weight).collect();
    let picks = draws.select(Selection::VacancyFill, &weights, params.vacancy_fill_rate);
    for (pick, taken) in picks {
        let age = draws.entry_age(&params.entry_age);
        let idx = split_off(population, open[pick], taken, &format!("fill-{year}"));
        let entity = Arc::make_mut(&mut population[idx]);
        entity.state = ContractState::Active;
        entity.age = age;
        entity.cohort = bands.classify(age);
        entity.hired_in = Some(year);
        flows.hires += entity.weight;
        flows.vacancy_fills += entity.weight;
    }
}

/// Moves `taken` weight of a record into a new record when it is only part
/// of it. Returns the index of the record that carries `taken`.
fn split_off(population: &mut Vec<Arc<Entity>>, idx: usize, taken: f64, suffix: &str) -> usize {
    if taken >= population[idx].weight - EXIT_EPSILON {
        return idx;
    }
    let parent = Arc::make_mut(&mut population[idx]);
    parent.weight -= taken;
    let mut child = parent.clone();
    child.id = format!("{}-{suffix}", parent.id);
    child.weight = taken;
    population.push(Arc::new(child));
    population.len() - 1
}

/// Merges requests per org unit, keeping weighted per-head FTE and cost.
fn consolidate(requests: Vec<HireRequest>) -> Vec<HireRequest> {
    let mut by_unit: BTreeMap<String, (f64, f64, f64)> = BTreeMap::new();
    for request in requests {
        let totals = by_unit.entry(request.org_unit).or_default();
        totals.0 += request.weight;
        totals.1 += request.weight * request.fte;
        totals.2 += request.weight * request.annual_cost;
    }
    by_unit
        .into_iter()
        .filter(|(_, (weight, _, _))| *weight > 0.0)
        .map(|(org_unit, (weight, fte, cost))| HireRequest {
            org_unit,
            fte: fte / weight,
            annual_cost: cost / weight,
            weight,
        })
        .collect()
}
