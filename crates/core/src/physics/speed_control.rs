//! Airspeed selection during cruise
//!
//! Two strategies, picked once per run from [`SpeedControl`]:
//! - constant ratio: `Vt = 1.2 × Vmp(m)` every step, so the bird slows down as
//!   it burns fat
//! - constant speed: `Vt = 1.2 × Vmp(m₀)` from the take-off mass, held for the
//!   whole flight

use crate::core_types::config::{PhysicalConstants, SpeedControl};
use crate::core_types::units::{Kilograms, MetersPerSecond};
use crate::physics::aerodynamics::Airframe;

/// Cruising airspeed as a multiple of the minimum power speed
pub const CRUISE_SPEED_RATIO: f64 = 1.2;

/// Resolved speed control for one flight
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeedController {
    /// Recompute from the current mass each step
    ConstantRatio,
    /// Airspeed fixed at take-off
    ConstantSpeed {
        /// The held airspeed
        airspeed: MetersPerSecond,
    },
}

impl SpeedController {
    /// Resolve a strategy for a bird taking off with `initial_mass`
    pub fn new(
        control: SpeedControl,
        airframe: &Airframe,
        initial_mass: Kilograms,
        constants: &PhysicalConstants,
    ) -> Self {
        match control {
            SpeedControl::ConstantRatio => Self::ConstantRatio,
            SpeedControl::ConstantSpeed => Self::ConstantSpeed {
                airspeed: cruise_speed(airframe.minimum_power_speed(initial_mass, constants)),
            },
        }
    }

    /// Strategy this controller was resolved from
    pub fn control(&self) -> SpeedControl {
        match self {
            Self::ConstantRatio => SpeedControl::ConstantRatio,
            Self::ConstantSpeed { .. } => SpeedControl::ConstantSpeed,
        }
    }

    /// True airspeed to fly at, given the current minimum power speed
    pub fn airspeed(&self, minimum_power_speed: MetersPerSecond) -> MetersPerSecond {
        match self {
            Self::ConstantRatio => cruise_speed(minimum_power_speed),
            Self::ConstantSpeed { airspeed } => *airspeed,
        }
    }
}

#[inline]
fn cruise_speed(minimum_power_speed: MetersPerSecond) -> MetersPerSecond {
    minimum_power_speed * CRUISE_SPEED_RATIO
}
