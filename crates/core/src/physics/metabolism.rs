//! Conversion of mechanical power output to chemical power input
//!
//! # Formula
//! ```text
//! Pchem = R × (Pmech / η + Πm)
//! Πm    = α × m^δ
//! ```
//!
//! Where:
//! - **η** = Mechanical conversion efficiency of the flight muscles
//! - **Πm** = Basal metabolic rate, coefficients by taxonomic order
//! - **R** = 1.10, respiration and circulation surcharge
//!
//! # References
//! - Lasiewski, R.C., Dawson, W.R. (1967). "A re-examination of the relation
//!   between standard metabolic rate and body weight in birds." Condor 69, 13-23.
//! - Pennycuick, C.J. (2008). "Modelling the Flying Bird." Academic Press.

use crate::core_types::bird::TaxonomicOrder;
use crate::core_types::config::PhysicalConstants;
use crate::core_types::units::{Kilograms, Watts};

/// Heart and lung surcharge on chemical power
pub const RESPIRATION_CIRCULATION_FACTOR: f64 = 1.10;

/// Basal metabolic rate `Πm = α × m^δ` for a bird of the given mass and order
pub fn basal_metabolic_rate(
    mass: Kilograms,
    order: TaxonomicOrder,
    constants: &PhysicalConstants,
) -> Watts {
    let bmr = constants.basal_metabolism.for_order(order);
    Watts::new(bmr.alpha * mass.powf(bmr.delta))
}

/// Chemical power drawn from fuel to deliver `mechanical_power`
///
/// Stateless; nothing carries over between calls.
pub fn chemical_power(
    mechanical_power: Watts,
    basal_metabolic_rate: Watts,
    constants: &PhysicalConstants,
) -> Watts {
    let muscle_input = *mechanical_power / constants.mechanical_efficiency;
    Watts::new((muscle_input + *basal_metabolic_rate) * RESPIRATION_CIRCULATION_FACTOR)
}
