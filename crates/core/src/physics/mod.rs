//! Flight physics: aerodynamic power, metabolic conversion and airspeed control

pub mod aerodynamics;
pub mod metabolism;
pub mod speed_control;

pub use aerodynamics::{Airframe, PowerBudget};
pub use metabolism::{basal_metabolic_rate, chemical_power, RESPIRATION_CIRCULATION_FACTOR};
pub use speed_control::{SpeedController, CRUISE_SPEED_RATIO};
