//! Time-marching flight simulation (constant muscle mass criterion)
//!
//! The flight is split into steps of fixed length Δt. At the start of each
//! step the aerodynamic and metabolic quantities are recomputed from the
//! bird's current mass:
//!
//! ```text
//! Vt    = SpeedController(Vmp(m))
//! Pmech = Ppar + Ppro + Pind
//! Pchem = 1.1 × (Pmech / η + Πm)
//! Δfat  = Pchem × Δt / e
//! Δd    = Vt × Δt
//! ```
//!
//! All chemical energy comes from fat; flight muscle is never drawn down. The
//! step that would overdraw the fat reserve is scaled back to the fraction of
//! Δt the remaining fat can pay for, so the reserve ends at exactly zero and
//! range is a continuous function of fat mass.
//!
//! Each flight is strictly sequential. Independent birds are run in parallel
//! by [`batch`].

pub mod batch;
pub mod state;

pub use batch::{
    simulate_batch, simulate_batch_sequential, simulate_record, simulate_records, BatchSummary,
};
pub use state::{FlightQuantity, SimulationState, StepSample, StepTransition};

use crate::core_types::bird::Bird;
use crate::core_types::config::{FlightConfig, SpeedControl};
use crate::core_types::units::{Kilograms, Kilometers, Meters, MetersPerSecond, Seconds};
use crate::error::FlightRangeError;
use crate::physics::aerodynamics::Airframe;
use crate::physics::metabolism::{basal_metabolic_rate, chemical_power};
use crate::physics::speed_control::SpeedController;
use serde::Serialize;
use tracing::{debug, info, trace, warn};

/// Why a flight stopped
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum TerminationReason {
    /// The fat reserve was used up
    Exhausted,
    /// A step produced a non-finite or non-positive speed or power
    Infeasible {
        /// 1-based index of the step that could not be flown
        step: u32,
        /// Which quantity broke down
        quantity: FlightQuantity,
        /// The offending value
        value: f64,
    },
    /// The configured step ceiling was reached with fat still left
    MaxStepsReached,
}

/// Result of simulating one bird's flight
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightOutcome {
    /// Label copied from the bird record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Range rounded to 0.1 km
    pub range: Kilometers,
    /// Unrounded distance flown
    pub distance: Meters,
    /// Number of steps committed (the last one possibly partial)
    pub step_count: u32,
    /// Why the flight stopped
    pub termination: TerminationReason,
    /// Time in the air
    pub flight_duration: Seconds,
    /// Fat burnt
    pub fat_consumed: Kilograms,
    /// Mass at take-off
    pub initial_body_mass: Kilograms,
    /// Mass when the flight stopped
    pub final_body_mass: Kilograms,
    /// Airspeed flown in the first step
    pub take_off_airspeed: MetersPerSecond,
    /// Speed control strategy used
    pub speed_control: SpeedControl,
    /// State when the flight stopped
    pub final_state: SimulationState,
    /// Per-step trace, present when the config asks for it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<StepSample>>,
}

impl FlightOutcome {
    /// Range in kilometres, rounded to one decimal place
    pub fn range_km(&self) -> f64 {
        *self.range
    }

    /// True when the flight ended because the fuel ran out
    pub fn is_exhausted(&self) -> bool {
        matches!(self.termination, TerminationReason::Exhausted)
    }

    /// Treat every termination other than fuel exhaustion as an error
    ///
    /// # Errors
    /// Returns `Infeasible` or `MaxStepsReached` matching the termination
    /// reason.
    pub fn into_result(self) -> Result<Self, FlightRangeError> {
        match self.termination {
            TerminationReason::Exhausted => Ok(self),
            TerminationReason::Infeasible {
                step,
                quantity,
                value,
            } => Err(FlightRangeError::Infeasible {
                step,
                quantity,
                value,
            }),
            TerminationReason::MaxStepsReached => Err(FlightRangeError::MaxStepsReached {
                steps: self.step_count,
            }),
        }
    }
}

/// Time-marching simulator for one bird
///
/// Holds the inputs and the quantities that stay fixed for the flight; the
/// evolving part lives in [`SimulationState`] values.
pub struct FlightSimulator<'a> {
    bird: &'a Bird,
    config: &'a FlightConfig,
    airframe: Airframe,
    controller: SpeedController,
    time_step: Seconds,
}

impl<'a> FlightSimulator<'a> {
    /// Validate the inputs and prepare a simulator
    ///
    /// # Errors
    /// Returns `InvalidInput` for a bad bird record and `InvalidConfig` for a
    /// bad configuration. No step has run when either is returned.
    pub fn new(bird: &'a Bird, config: &'a FlightConfig) -> Result<Self, FlightRangeError> {
        bird.validate()?;
        config.validate()?;

        let constants = &config.constants;
        let airframe = Airframe::from_bird(bird, constants);
        let controller =
            SpeedController::new(config.speed_control, &airframe, bird.body_mass, constants);

        debug!(
            "Prepared flight: mass={:.4}kg, fat={:.4}kg, AR={:.2}, X1={:.3}, control={:?}",
            *bird.body_mass,
            *bird.fat_mass,
            airframe.aspect_ratio(),
            airframe.profile_power_ratio(),
            config.speed_control
        );

        Ok(Self {
            bird,
            config,
            airframe,
            controller,
            time_step: Seconds::new(config.time_step_seconds),
        })
    }

    /// Invariant wing geometry
    pub fn airframe(&self) -> &Airframe {
        &self.airframe
    }

    /// Resolved speed controller
    pub fn controller(&self) -> SpeedController {
        self.controller
    }

    /// State before the first step
    pub fn initial_state(&self) -> SimulationState {
        SimulationState::at_take_off(self.bird)
    }

    /// Attempt one step from `state`
    ///
    /// Every quantity comes from the mass at the start of the step. A step
    /// whose fat demand meets or exceeds what is left is flown only for the
    /// fraction of Δt the remaining fat can pay for.
    pub fn step(&self, state: &SimulationState) -> StepTransition {
        let constants = &self.config.constants;
        let step = state.step_count() + 1;
        let mass = state.body_mass();

        let minimum_power_speed = self.airframe.minimum_power_speed(mass, constants);
        let airspeed = self.controller.airspeed(minimum_power_speed);
        if !is_positive_finite(*airspeed) {
            return infeasible(step, FlightQuantity::Airspeed, *airspeed);
        }

        let power = self.airframe.power_budget(mass, airspeed, constants);
        for (quantity, value) in [
            (FlightQuantity::ParasitePower, *power.parasite),
            (FlightQuantity::ProfilePower, *power.profile),
            (FlightQuantity::InducedPower, *power.induced),
        ] {
            if !value.is_finite() {
                return infeasible(step, quantity, value);
            }
        }

        let mechanical_power = power.total();
        if !is_positive_finite(*mechanical_power) {
            return infeasible(step, FlightQuantity::MechanicalPower, *mechanical_power);
        }

        let bmr = basal_metabolic_rate(mass, self.bird.order, constants);
        let chemical = chemical_power(mechanical_power, bmr, constants);
        if !is_positive_finite(*chemical) {
            return infeasible(step, FlightQuantity::ChemicalPower, *chemical);
        }

        let full_step_fat =
            Kilograms::new(*chemical * *self.time_step / constants.fat_energy_content);
        let remaining = state.remaining_fat();

        let exhausted = full_step_fat >= remaining;
        let (fat_burnt, duration, remaining_after) = if exhausted {
            let fraction = *remaining / *full_step_fat;
            (remaining, self.time_step * fraction, Kilograms::ZERO)
        } else {
            (full_step_fat, self.time_step, remaining - full_step_fat)
        };

        let step_distance = airspeed * duration;
        let next = state.advance(remaining_after, step_distance, duration);

        trace!(
            "Step {}: m={:.5}kg, Vt={:.3}m/s, Pmech={:.4}W, Pchem={:.4}W, fat_left={:.6}kg",
            step,
            *mass,
            *airspeed,
            *mechanical_power,
            *chemical,
            *remaining_after
        );

        let sample = StepSample {
            step,
            body_mass: mass,
            muscle_mass: state.muscle_mass(),
            remaining_fat: remaining_after,
            minimum_power_speed,
            airspeed,
            power,
            mechanical_power,
            basal_metabolic_rate: bmr,
            chemical_power: chemical,
            fat_burnt,
            duration,
            step_distance,
            distance: next.distance(),
        };

        if exhausted {
            StepTransition::Exhausted {
                state: next,
                sample,
            }
        } else {
            StepTransition::Continue {
                state: next,
                sample,
            }
        }
    }

    /// Fly until the fat runs out, a step is infeasible, or the step ceiling
    /// is reached
    pub fn run(&self) -> FlightOutcome {
        let constants = &self.config.constants;
        let take_off_airspeed = self
            .controller
            .airspeed(self.airframe.minimum_power_speed(self.bird.body_mass, constants));

        let mut trace = self.config.record_trace.then(Vec::new);
        let mut state = self.initial_state();

        let termination = loop {
            if state.step_count() >= self.config.max_steps {
                warn!(
                    "Step limit {} reached with {:.6}kg fat left",
                    self.config.max_steps,
                    *state.remaining_fat()
                );
                break TerminationReason::MaxStepsReached;
            }

            match self.step(&state) {
                StepTransition::Continue { state: next, sample } => {
                    if let Some(trace) = trace.as_mut() {
                        trace.push(sample);
                    }
                    state = next;
                }
                StepTransition::Exhausted { state: next, sample } => {
                    if let Some(trace) = trace.as_mut() {
                        trace.push(sample);
                    }
                    state = next;
                    break TerminationReason::Exhausted;
                }
                StepTransition::Infeasible {
                    step,
                    quantity,
                    value,
                } => {
                    warn!("Flight infeasible at step {}: {} = {}", step, quantity, value);
                    break TerminationReason::Infeasible {
                        step,
                        quantity,
                        value,
                    };
                }
            }
        };

        FlightOutcome {
            name: self.bird.name.clone(),
            range: state.distance().to_kilometers().round_to_tenth(),
            distance: state.distance(),
            step_count: state.step_count(),
            termination,
            flight_duration: state.elapsed(),
            fat_consumed: state.fat_consumed(),
            initial_body_mass: self.bird.body_mass,
            final_body_mass: state.body_mass(),
            take_off_airspeed,
            speed_control: self.controller.control(),
            final_state: state,
            trace,
        }
    }
}

/// Simulate one bird's flight
///
/// # Errors
/// Returns `InvalidInput` or `InvalidConfig` when the record or configuration
/// is rejected before the first step. Infeasible flights and flights that hit
/// the step ceiling are `Ok`, tagged through [`FlightOutcome::termination`].
pub fn simulate_flight(
    bird: &Bird,
    config: &FlightConfig,
) -> Result<FlightOutcome, FlightRangeError> {
    let outcome = FlightSimulator::new(bird, config)?.run();

    info!(
        "Flight {}: {:.1} km in {} steps ({:.1} h), termination={:?}",
        bird.name.as_deref().unwrap_or("<unnamed>"),
        outcome.range_km(),
        outcome.step_count,
        outcome.flight_duration.as_hours(),
        outcome.termination
    );

    Ok(outcome)
}

#[inline]
fn is_positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn infeasible(step: u32, quantity: FlightQuantity, value: f64) -> StepTransition {
    StepTransition::Infeasible {
        step,
        quantity,
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::bird::TaxonomicOrder;
    use crate::core_types::units::SquareMeters;
    use approx::assert_relative_eq;

    fn warbler(fat: f64) -> Bird {
        Bird::new(
            Kilograms::new(0.020),
            Meters::new(0.18),
            SquareMeters::new(0.0065),
            Kilograms::new(fat),
            Kilograms::new(0.003),
            TaxonomicOrder::Passerine,
        )
    }

    #[test]
    fn test_first_step_transition() {
        let bird = warbler(0.004);
        let config = FlightConfig::default();
        let sim = FlightSimulator::new(&bird, &config).unwrap();
        let start = sim.initial_state();

        let StepTransition::Continue { state, sample } = sim.step(&start) else {
            panic!("first step of a 4 g fat load should not exhaust the reserve");
        };

        assert_eq!(sample.step, 1);
        assert_eq!(sample.body_mass, Kilograms::new(0.020));
        assert_relative_eq!(*sample.airspeed, *sample.minimum_power_speed * 1.2, epsilon = 1e-12);
        assert_relative_eq!(
            *sample.fat_burnt,
            *sample.chemical_power * 360.0 / 3.9e7,
            epsilon = 1e-15
        );
        assert_relative_eq!(*sample.step_distance, *sample.airspeed * 360.0, epsilon = 1e-9);
        assert_eq!(state.step_count(), 1);
        assert_relative_eq!(
            *state.remaining_fat(),
            0.004 - *sample.fat_burnt,
            epsilon = 1e-15
        );
        assert!(state.body_mass() < start.body_mass());
    }

    #[test]
    fn test_final_step_is_clipped() {
        let bird = warbler(0.004);
        let config = FlightConfig::default();
        let sim = FlightSimulator::new(&bird, &config).unwrap();

        let mut state = sim.initial_state();
        let (last_state, last_sample) = loop {
            match sim.step(&state) {
                StepTransition::Continue { state: next, .. } => state = next,
                StepTransition::Exhausted { state, sample } => break (state, sample),
                StepTransition::Infeasible { .. } => panic!("default warbler is flyable"),
            }
        };

        assert_eq!(last_state.remaining_fat(), Kilograms::ZERO);
        assert!(last_sample.duration <= Seconds::new(360.0));
        assert_relative_eq!(
            *last_sample.step_distance,
            *last_sample.airspeed * *last_sample.duration,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_run_reports_exhaustion() {
        let bird = warbler(0.004);
        let outcome = simulate_flight(&bird, &FlightConfig::default()).unwrap();

        assert!(outcome.is_exhausted());
        assert!(outcome.step_count > 1);
        assert_eq!(outcome.final_state.remaining_fat(), Kilograms::ZERO);
        assert_eq!(outcome.final_body_mass, bird.fat_free_mass());
        assert_eq!(outcome.fat_consumed, bird.fat_mass);
        assert!(outcome.trace.is_none());
        assert!(outcome.into_result().is_ok());
    }

    #[test]
    fn test_trace_has_one_row_per_step() {
        let bird = warbler(0.004);
        let config = FlightConfig::default().with_trace(true);
        let outcome = simulate_flight(&bird, &config).unwrap();

        let trace = outcome.trace.as_ref().unwrap();
        assert_eq!(trace.len(), outcome.step_count as usize);
        assert_eq!(trace.last().unwrap().distance, outcome.distance);
        for (i, sample) in trace.iter().enumerate() {
            assert_eq!(sample.step as usize, i + 1);
        }
    }

    #[test]
    fn test_max_steps_ceiling() {
        let bird = warbler(0.004);
        let config = FlightConfig::default().with_max_steps(10);
        let outcome = simulate_flight(&bird, &config).unwrap();

        assert_eq!(outcome.termination, TerminationReason::MaxStepsReached);
        assert_eq!(outcome.step_count, 10);
        assert!(outcome.final_state.remaining_fat() > Kilograms::ZERO);
        assert_eq!(
            outcome.into_result().unwrap_err(),
            FlightRangeError::MaxStepsReached { steps: 10 }
        );
    }

    #[test]
    fn test_zero_induced_power_factor_is_infeasible() {
        let bird = warbler(0.004);
        let mut config = FlightConfig::default();
        config.constants.induced_power_factor = 0.0;

        let outcome = simulate_flight(&bird, &config).unwrap();
        assert!(matches!(
            outcome.termination,
            TerminationReason::Infeasible { step: 1, .. }
        ));
        assert_eq!(outcome.step_count, 0);
        assert_eq!(outcome.distance, Meters::ZERO);
        assert!(matches!(
            outcome.into_result(),
            Err(FlightRangeError::Infeasible { step: 1, .. })
        ));
    }

    #[test]
    fn test_invalid_record_runs_no_steps() {
        let bird = warbler(0.0);
        let err = simulate_flight(&bird, &FlightConfig::default()).unwrap_err();
        assert!(matches!(err, FlightRangeError::InvalidInput { .. }));
    }
}
