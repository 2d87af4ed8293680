//! Per-flight simulation state and step transitions
//!
//! A [`SimulationState`] is a value: each step produces a new one rather than
//! mutating the old, so individual transitions can be tested in isolation.

use crate::core_types::bird::Bird;
use crate::core_types::units::{Kilograms, Meters, MetersPerSecond, Seconds, Watts};
use crate::physics::aerodynamics::PowerBudget;
use serde::Serialize;
use std::fmt;

/// State of one bird's flight between steps
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationState {
    initial_body_mass: Kilograms,
    initial_fat_mass: Kilograms,
    muscle_mass: Kilograms,
    remaining_fat: Kilograms,
    distance: Meters,
    elapsed: Seconds,
    step_count: u32,
}

impl SimulationState {
    /// State at take-off: full fat reserve, nothing flown
    pub fn at_take_off(bird: &Bird) -> Self {
        Self {
            initial_body_mass: bird.body_mass,
            initial_fat_mass: bird.fat_mass,
            muscle_mass: bird.muscle_mass,
            remaining_fat: bird.fat_mass,
            distance: Meters::ZERO,
            elapsed: Seconds::ZERO,
            step_count: 0,
        }
    }

    /// Current all-up mass: take-off mass less the fat burnt so far
    #[inline]
    pub fn body_mass(&self) -> Kilograms {
        self.initial_body_mass - self.fat_consumed()
    }

    /// Fat burnt so far
    #[inline]
    pub fn fat_consumed(&self) -> Kilograms {
        self.initial_fat_mass - self.remaining_fat
    }

    /// Fat still available as fuel
    #[inline]
    pub fn remaining_fat(&self) -> Kilograms {
        self.remaining_fat
    }

    /// Flight muscle mass, the same at every step
    #[inline]
    pub fn muscle_mass(&self) -> Kilograms {
        self.muscle_mass
    }

    /// Distance flown so far
    #[inline]
    pub fn distance(&self) -> Meters {
        self.distance
    }

    /// Time in the air so far
    #[inline]
    pub fn elapsed(&self) -> Seconds {
        self.elapsed
    }

    /// Number of steps committed
    #[inline]
    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    /// The state after one more step
    pub(crate) fn advance(
        &self,
        remaining_fat: Kilograms,
        step_distance: Meters,
        duration: Seconds,
    ) -> Self {
        debug_assert!(remaining_fat >= Kilograms::ZERO);
        debug_assert!(remaining_fat <= self.remaining_fat);

        Self {
            remaining_fat,
            distance: self.distance + step_distance,
            elapsed: self.elapsed + duration,
            step_count: self.step_count + 1,
            ..*self
        }
    }
}

/// Quantity that can make a step unflyable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightQuantity {
    /// True airspeed
    Airspeed,
    /// Parasite power component
    ParasitePower,
    /// Profile power component
    ProfilePower,
    /// Induced power component
    InducedPower,
    /// Total mechanical power
    MechanicalPower,
    /// Chemical power drawn from fuel
    ChemicalPower,
}

impl fmt::Display for FlightQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Airspeed => "airspeed",
            Self::ParasitePower => "parasite power",
            Self::ProfilePower => "profile power",
            Self::InducedPower => "induced power",
            Self::MechanicalPower => "mechanical power",
            Self::ChemicalPower => "chemical power",
        };
        f.write_str(name)
    }
}

/// Everything computed during one step, recorded in the optional trace
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepSample {
    /// 1-based step index
    pub step: u32,
    /// All-up mass at the start of the step
    pub body_mass: Kilograms,
    /// Flight muscle mass
    pub muscle_mass: Kilograms,
    /// Fat left at the end of the step
    pub remaining_fat: Kilograms,
    /// Minimum power speed at this mass
    pub minimum_power_speed: MetersPerSecond,
    /// True airspeed flown
    pub airspeed: MetersPerSecond,
    /// Mechanical power components
    pub power: PowerBudget,
    /// Total mechanical power
    pub mechanical_power: Watts,
    /// Basal metabolic rate at this mass
    pub basal_metabolic_rate: Watts,
    /// Chemical power drawn from fuel
    pub chemical_power: Watts,
    /// Fat burnt in this step
    pub fat_burnt: Kilograms,
    /// Time flown in this step (shorter than Δt only for the final step)
    pub duration: Seconds,
    /// Distance flown in this step
    pub step_distance: Meters,
    /// Distance flown up to the end of this step
    pub distance: Meters,
}

/// Result of attempting one step from a running state
#[derive(Debug, Clone, PartialEq)]
pub enum StepTransition {
    /// A full step was flown and fuel remains
    Continue {
        /// State after the step
        state: SimulationState,
        /// What happened during it
        sample: StepSample,
    },
    /// The remaining fat ran out during this step
    Exhausted {
        /// Final state, with no fat left
        state: SimulationState,
        /// What happened during the (possibly partial) last step
        sample: StepSample,
    },
    /// The step could not be flown; the previous state stands
    Infeasible {
        /// 1-based index of the step that failed
        step: u32,
        /// Which quantity broke down
        quantity: FlightQuantity,
        /// The offending value
        value: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::bird::TaxonomicOrder;
    use crate::core_types::units::SquareMeters;

    fn bird() -> Bird {
        Bird::new(
            Kilograms::new(0.020),
            Meters::new(0.18),
            SquareMeters::new(0.0065),
            Kilograms::new(0.004),
            Kilograms::new(0.003),
            TaxonomicOrder::Passerine,
        )
    }

    #[test]
    fn test_take_off_state() {
        let state = SimulationState::at_take_off(&bird());
        assert_eq!(state.body_mass(), Kilograms::new(0.020));
        assert_eq!(state.remaining_fat(), Kilograms::new(0.004));
        assert_eq!(state.fat_consumed(), Kilograms::ZERO);
        assert_eq!(state.distance(), Meters::ZERO);
        assert_eq!(state.step_count(), 0);
    }

    #[test]
    fn test_advance_is_a_functional_update() {
        let start = SimulationState::at_take_off(&bird());
        let next = start.advance(
            Kilograms::new(0.0039),
            Meters::new(4320.0),
            Seconds::new(360.0),
        );

        // The original value is untouched
        assert_eq!(start.step_count(), 0);
        assert_eq!(start.remaining_fat(), Kilograms::new(0.004));

        assert_eq!(next.step_count(), 1);
        assert_eq!(next.distance(), Meters::new(4320.0));
        assert_eq!(next.elapsed(), Seconds::new(360.0));
        assert!((*next.body_mass() - 0.0199).abs() < 1e-12);
        assert_eq!(next.muscle_mass(), start.muscle_mass());
    }

    #[test]
    fn test_exhausted_state_sits_at_fat_free_mass() {
        let b = bird();
        let end = SimulationState::at_take_off(&b).advance(
            Kilograms::ZERO,
            Meters::new(100.0),
            Seconds::new(10.0),
        );
        assert_eq!(end.body_mass(), b.fat_free_mass());
        assert_eq!(end.fat_consumed(), b.fat_mass);
    }

    #[test]
    fn test_quantity_names() {
        assert_eq!(FlightQuantity::Airspeed.to_string(), "airspeed");
        assert_eq!(FlightQuantity::ChemicalPower.to_string(), "chemical power");
    }
}
