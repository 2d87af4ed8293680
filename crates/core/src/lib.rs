//! Bird Migration Flight Range Core Library
//!
//! Estimates how far a migrating bird can fly on its fat reserve, from body
//! mass, wing measurements, fat and flight muscle mass, and taxonomic order.
//!
//! ## Time-Marching Flight Simulation
//!
//! The range is found by stepping through the flight in fixed time steps:
//! - Mechanical power (parasite, profile, induced) from the bird's current mass
//! - Chemical power via muscle efficiency, basal metabolism and a respiration surcharge
//! - Fat burnt per step, with flight muscle held constant
//! - Two airspeed strategies: constant true airspeed or constant Vt/Vmp ratio
//! - A proportionally clipped final step so the fat reserve ends at exactly zero
//!
//! ```
//! use flight_range_core::{simulate_flight, Bird, FlightConfig, TaxonomicOrder};
//! use flight_range_core::core_types::{Kilograms, Meters, SquareMeters};
//!
//! let bird = Bird::new(
//!     Kilograms::new(0.020),
//!     Meters::new(0.18),
//!     SquareMeters::new(0.0065),
//!     Kilograms::new(0.004),
//!     Kilograms::new(0.003),
//!     TaxonomicOrder::Passerine,
//! );
//! let outcome = simulate_flight(&bird, &FlightConfig::default()).unwrap();
//! assert!(outcome.is_exhausted());
//! assert!(outcome.range_km() > 1000.0);
//! ```

// Core types: units, bird records, configuration
pub mod core_types;

pub mod error;
pub mod physics;
pub mod simulation;

// Re-export core types
pub use core_types::{
    Bird, BirdRecord, FlightConfig, PhysicalConstants, SpeedControl, TaxonomicOrder,
};

pub use error::FlightRangeError;

// Re-export simulation types
pub use simulation::{
    simulate_batch, simulate_batch_sequential, simulate_flight, simulate_record, simulate_records,
    BatchSummary, FlightOutcome, FlightSimulator, SimulationState, StepSample, StepTransition,
    TerminationReason,
};
