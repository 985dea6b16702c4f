pub mod cohort;
pub mod entity;
pub mod error;
pub mod parameters;
pub mod waterfall;
