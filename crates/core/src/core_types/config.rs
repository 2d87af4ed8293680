//! Physical constants and run configuration
//!
//! Every value the flight model reads lives in an explicit immutable
//! [`FlightConfig`] that is passed by reference into each calculation. There is
//! no process-wide state, so independent birds can be simulated on different
//! threads with the same config.
//!
//! Config files are JSON with the physical constants flattened into the top
//! level:
//!
//! ```
//! use flight_range_core::{FlightConfig, SpeedControl};
//!
//! let config: FlightConfig = serde_json::from_str(
//!     r#"{ "air_density": 0.909, "speed_control": "constant_speed" }"#,
//! ).unwrap();
//! assert_eq!(config.constants.air_density, 0.909);
//! assert_eq!(config.speed_control, SpeedControl::ConstantSpeed);
//! assert_eq!(config.time_step_seconds, 360.0);
//! ```

use crate::core_types::bird::TaxonomicOrder;
use crate::error::FlightRangeError;
use serde::{Deserialize, Serialize};

/// Basal metabolic rate coefficients `Πm = α·m^δ` (watts, kilograms)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BasalMetabolism {
    /// Coefficient α
    pub alpha: f64,
    /// Mass exponent δ
    pub delta: f64,
}

/// Basal metabolism coefficients for each taxonomic order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasalMetabolismTable {
    /// Passerines (Lasiewski & Dawson 1967)
    pub passerine: BasalMetabolism,
    /// Non-passerines (Lasiewski & Dawson 1967)
    pub non_passerine: BasalMetabolism,
}

impl Default for BasalMetabolismTable {
    fn default() -> Self {
        Self {
            passerine: BasalMetabolism {
                alpha: 6.25,
                delta: 0.724,
            },
            non_passerine: BasalMetabolism {
                alpha: 3.79,
                delta: 0.723,
            },
        }
    }
}

impl BasalMetabolismTable {
    /// Coefficients for an order
    pub fn for_order(&self, order: TaxonomicOrder) -> BasalMetabolism {
        match order {
            TaxonomicOrder::Passerine => self.passerine,
            TaxonomicOrder::NonPasserine => self.non_passerine,
        }
    }
}

/// Physical and physiological constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalConstants {
    /// Air density ρ (kg/m³)
    pub air_density: f64,
    /// Gravitational acceleration g (m/s²)
    pub gravity: f64,
    /// Mechanical conversion efficiency η of the flight muscles (0-1]
    pub mechanical_efficiency: f64,
    /// Induced power factor k (dimensionless)
    pub induced_power_factor: f64,
    /// Profile power constant `C_pro` (dimensionless)
    pub profile_power_constant: f64,
    /// Body drag coefficient `C_Db` (dimensionless)
    pub body_drag_coefficient: f64,
    /// Energy density of fat e (J/kg)
    pub fat_energy_content: f64,
    /// Minimum fraction of energy drawn from protein. The constant-muscle-mass
    /// criterion draws everything from fat, so this only has to be in range.
    pub min_protein_fraction: f64,
    /// Basal metabolism coefficients
    pub basal_metabolism: BasalMetabolismTable,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            air_density: 1.00,
            gravity: 9.81,
            mechanical_efficiency: 0.23,
            induced_power_factor: 1.20,
            profile_power_constant: 8.4,
            body_drag_coefficient: 0.10,
            fat_energy_content: 3.9e7,
            min_protein_fraction: 0.0,
            basal_metabolism: BasalMetabolismTable::default(),
        }
    }
}

impl PhysicalConstants {
    /// Check every constant lies in its physical domain
    ///
    /// `k`, `C_pro` and `C_Db` may be zero. A zero there does not make the
    /// configuration unreadable, it makes the flight infeasible, and the
    /// simulator reports it as such at the first step.
    ///
    /// # Errors
    /// Returns `InvalidConfig` naming the first offending constant.
    pub fn validate(&self) -> Result<(), FlightRangeError> {
        require_positive("air_density", self.air_density)?;
        require_positive("gravity", self.gravity)?;
        require_positive("fat_energy_content", self.fat_energy_content)?;
        require_non_negative("induced_power_factor", self.induced_power_factor)?;
        require_non_negative("profile_power_constant", self.profile_power_constant)?;
        require_non_negative("body_drag_coefficient", self.body_drag_coefficient)?;

        let eta = self.mechanical_efficiency;
        if eta.is_nan() || eta <= 0.0 || eta > 1.0 {
            return Err(FlightRangeError::invalid_config(
                "mechanical_efficiency",
                format!("must be in (0, 1] (got {})", self.mechanical_efficiency),
            ));
        }
        if !(0.0..1.0).contains(&self.min_protein_fraction) {
            return Err(FlightRangeError::invalid_config(
                "min_protein_fraction",
                format!("must be in [0, 1) (got {})", self.min_protein_fraction),
            ));
        }

        for (field, bmr) in [
            ("basal_metabolism.passerine", self.basal_metabolism.passerine),
            (
                "basal_metabolism.non_passerine",
                self.basal_metabolism.non_passerine,
            ),
        ] {
            if !bmr.alpha.is_finite() || bmr.alpha < 0.0 || !bmr.delta.is_finite() {
                return Err(FlightRangeError::invalid_config(
                    field,
                    format!(
                        "alpha must be non-negative and delta finite (got {}, {})",
                        bmr.alpha, bmr.delta
                    ),
                ));
            }
        }

        Ok(())
    }
}

/// How true airspeed is chosen at each step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedControl {
    /// Hold the airspeed picked at take-off for the whole flight
    ConstantSpeed,
    /// Hold Vt/Vmp fixed, so airspeed falls as the bird gets lighter
    #[default]
    ConstantRatio,
}

/// Default ceiling on the number of steps in one flight
pub const DEFAULT_MAX_STEPS: u32 = 1_000_000;

/// Complete configuration for a flight simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    /// Physical constants
    #[serde(flatten)]
    pub constants: PhysicalConstants,
    /// Length of one integration step Δt (s)
    pub time_step_seconds: f64,
    /// Airspeed control strategy, fixed for the whole run
    pub speed_control: SpeedControl,
    /// Safety ceiling on the number of steps
    pub max_steps: u32,
    /// Keep a per-step trace on the outcome
    pub record_trace: bool,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            constants: PhysicalConstants::default(),
            time_step_seconds: 360.0,
            speed_control: SpeedControl::default(),
            max_steps: DEFAULT_MAX_STEPS,
            record_trace: false,
        }
    }
}

impl FlightConfig {
    /// Use the given speed control strategy
    pub fn with_speed_control(mut self, speed_control: SpeedControl) -> Self {
        self.speed_control = speed_control;
        self
    }

    /// Use the given step length in seconds
    pub fn with_time_step(mut self, seconds: f64) -> Self {
        self.time_step_seconds = seconds;
        self
    }

    /// Cap the number of steps
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Record a per-step trace
    pub fn with_trace(mut self, record_trace: bool) -> Self {
        self.record_trace = record_trace;
        self
    }

    /// Replace the physical constants
    pub fn with_constants(mut self, constants: PhysicalConstants) -> Self {
        self.constants = constants;
        self
    }

    /// Check the configuration before a run
    ///
    /// # Errors
    /// Returns `InvalidConfig` for a non-positive time step, a zero step
    /// ceiling, or any constant outside its domain.
    pub fn validate(&self) -> Result<(), FlightRangeError> {
        require_positive("time_step_seconds", self.time_step_seconds)?;
        if self.max_steps == 0 {
            return Err(FlightRangeError::invalid_config(
                "max_steps",
                "must allow at least one step",
            ));
        }
        self.constants.validate()
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<(), FlightRangeError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FlightRangeError::invalid_config(
            field,
            format!("must be a positive finite number (got {value})"),
        ))
    }
}

fn require_non_negative(field: &'static str, value: f64) -> Result<(), FlightRangeError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(FlightRangeError::invalid_config(
            field,
            format!("must be zero or positive (got {value})"),
        ))
    }
}
