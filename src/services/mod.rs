pub mod aggregation;
pub mod comparison;
pub mod draws;
pub mod monte_carlo;
pub mod percentiles;
pub mod projection;
pub mod report;
pub mod scenario;
pub mod scenario_yaml;
pub mod simulation_types;
pub mod snapshot_yaml;
pub mod transition;
pub mod trial_rng;
