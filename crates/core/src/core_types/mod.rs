//! Core types: unit newtypes, bird records and run configuration

pub mod bird;
pub mod config;
pub mod units;

pub use bird::{Bird, BirdRecord, TaxonomicOrder};
pub use config::{
    BasalMetabolism, BasalMetabolismTable, FlightConfig, PhysicalConstants, SpeedControl,
    DEFAULT_MAX_STEPS,
};
pub use units::*;
