//! Flapping-flight mechanical power (Pennycuick)
//!
//! Computes the minimum power speed and the three components of mechanical
//! power (parasite, profile, induced) for a bird of a given instantaneous mass.
//!
//! # References
//! - Pennycuick, C.J. (1975). "Mechanics of flight." In Avian Biology vol. 5,
//!   pp. 1-75. Academic Press.
//! - Pennycuick, C.J. (1989). "Bird Flight Performance: A Practical Calculation
//!   Manual." Oxford University Press.
//! - Pennycuick, C.J. (2008). "Modelling the Flying Bird." Academic Press.

use crate::core_types::bird::Bird;
use crate::core_types::config::PhysicalConstants;
use crate::core_types::units::{Kilograms, Meters, MetersPerSecond, SquareMeters, Watts};
use serde::Serialize;
use std::f64::consts::PI;

/// Coefficient of the minimum power speed equation
const MIN_POWER_SPEED_COEFFICIENT: f64 = 0.807;

/// Coefficient of the absolute minimum power equation
const ABSOLUTE_MIN_POWER_COEFFICIENT: f64 = 1.05;

/// Body frontal area `Sb = 0.00813 × m^0.666` (Pennycuick et al. 1988)
const FRONTAL_AREA_COEFFICIENT: f64 = 0.00813;
const FRONTAL_AREA_EXPONENT: f64 = 0.666;

/// Mechanical power split into its components
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerBudget {
    /// Power to overcome body drag
    pub parasite: Watts,
    /// Power to overcome wing profile drag
    pub profile: Watts,
    /// Power to support the weight
    pub induced: Watts,
}

impl PowerBudget {
    /// Total mechanical power `Pmech = Ppro + Ppar + Pind`
    #[inline]
    pub fn total(&self) -> Watts {
        self.profile + self.parasite + self.induced
    }
}

/// Wing geometry of one bird and the quantities derived from it
///
/// Span and wing area don't change during a flight, so the aspect ratio, disk
/// area and profile power ratio are computed once. Everything that depends on
/// mass is recomputed per call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Airframe {
    wing_span: Meters,
    wing_area: SquareMeters,
    aspect_ratio: f64,
    disk_area: SquareMeters,
    profile_power_ratio: f64,
}

impl Airframe {
    /// Derive the invariant geometry
    pub fn new(wing_span: Meters, wing_area: SquareMeters, constants: &PhysicalConstants) -> Self {
        let span = *wing_span;
        let aspect_ratio = span * span / *wing_area;

        Self {
            wing_span,
            wing_area,
            aspect_ratio,
            // Sd = π B² / 4
            disk_area: SquareMeters::new(PI * span * span / 4.0),
            // X1 = C_pro / AR
            profile_power_ratio: constants.profile_power_constant / aspect_ratio,
        }
    }

    /// Geometry of a bird record
    pub fn from_bird(bird: &Bird, constants: &PhysicalConstants) -> Self {
        Self::new(bird.wing_span, bird.wing_area, constants)
    }

    /// Wingspan B
    pub fn wing_span(&self) -> Meters {
        self.wing_span
    }

    /// Wing area S
    pub fn wing_area(&self) -> SquareMeters {
        self.wing_area
    }

    /// Aspect ratio `B² / S`
    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    /// Area of the circle with the wingspan as diameter
    pub fn disk_area(&self) -> SquareMeters {
        self.disk_area
    }

    /// Profile power ratio X1
    pub fn profile_power_ratio(&self) -> f64 {
        self.profile_power_ratio
    }

    /// Body frontal (flat-plate) area for a given mass
    ///
    /// # Formula
    /// ```text
    /// Sb = 0.00813 × m^0.666
    /// ```
    pub fn body_frontal_area(mass: Kilograms) -> SquareMeters {
        SquareMeters::new(FRONTAL_AREA_COEFFICIENT * mass.powf(FRONTAL_AREA_EXPONENT))
    }

    /// Minimum power speed Vmp
    ///
    /// # Formula
    /// ```text
    /// Vmp = 0.807 × k^(1/4) × m^(1/2) × g^(1/2) / (ρ^(1/2) × B^(1/2) × Sb^(1/4) × C_Db^(1/4))
    /// ```
    pub fn minimum_power_speed(
        &self,
        mass: Kilograms,
        constants: &PhysicalConstants,
    ) -> MetersPerSecond {
        let sb = *Self::body_frontal_area(mass);
        self.minimum_power_speed_with_area(*mass, sb, constants)
    }

    fn minimum_power_speed_with_area(
        &self,
        mass: f64,
        sb: f64,
        c: &PhysicalConstants,
    ) -> MetersPerSecond {
        let numerator =
            MIN_POWER_SPEED_COEFFICIENT * c.induced_power_factor.powf(0.25) * (mass * c.gravity).sqrt();
        let denominator = c.air_density.sqrt()
            * self.wing_span.sqrt()
            * sb.powf(0.25)
            * c.body_drag_coefficient.powf(0.25);

        MetersPerSecond::new(numerator / denominator)
    }

    /// Absolute minimum power Pam, the power at Vmp of an idealised bird with
    /// no profile drag
    ///
    /// # Formula
    /// ```text
    /// Pam = 1.05 × k^(3/4) × m^(3/2) × g^(3/2) × Sb^(1/4) × C_Db^(1/4) / (ρ^(1/2) × B^(3/2))
    /// ```
    pub fn absolute_minimum_power(&self, mass: Kilograms, constants: &PhysicalConstants) -> Watts {
        let sb = *Self::body_frontal_area(mass);
        self.absolute_minimum_power_with_area(*mass, sb, constants)
    }

    fn absolute_minimum_power_with_area(&self, mass: f64, sb: f64, c: &PhysicalConstants) -> Watts {
        let weight = mass * c.gravity;
        let numerator = ABSOLUTE_MIN_POWER_COEFFICIENT
            * c.induced_power_factor.powf(0.75)
            * weight.powf(1.5)
            * sb.powf(0.25)
            * c.body_drag_coefficient.powf(0.25);
        let denominator = c.air_density.sqrt() * self.wing_span.powf(1.5);

        Watts::new(numerator / denominator)
    }

    /// Split the mechanical power needed to fly at `airspeed` with mass `mass`
    ///
    /// # Formula
    /// ```text
    /// Ppar = ρ × Vt³ × Sb × C_Db / 2
    /// Ppro = X1 × Pam
    /// Pind = k × (m × g)² / (2 × Vt × Sd × ρ)
    /// ```
    ///
    /// No bounds checking is done. A zero airspeed gives an infinite induced
    /// power; callers decide what to do with non-finite results.
    pub fn power_budget(
        &self,
        mass: Kilograms,
        airspeed: MetersPerSecond,
        constants: &PhysicalConstants,
    ) -> PowerBudget {
        let c = constants;
        let m = *mass;
        let v = *airspeed;
        let sb = *Self::body_frontal_area(mass);
        let weight = m * c.gravity;

        let parasite = c.air_density * v.powi(3) * sb * c.body_drag_coefficient / 2.0;
        let profile =
            self.profile_power_ratio * *self.absolute_minimum_power_with_area(m, sb, c);
        let induced = c.induced_power_factor * weight * weight
            / (2.0 * v * *self.disk_area * c.air_density);

        PowerBudget {
            parasite: Watts::new(parasite),
            profile: Watts::new(profile),
            induced: Watts::new(induced),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn warbler_airframe() -> Airframe {
        Airframe::new(
            Meters::new(0.18),
            SquareMeters::new(0.0065),
            &PhysicalConstants::default(),
        )
    }

    #[test]
    fn test_invariant_geometry() {
        let airframe = warbler_airframe();
        assert_relative_eq!(airframe.aspect_ratio(), 0.0324 / 0.0065, epsilon = 1e-12);
        assert_relative_eq!(*airframe.disk_area(), PI * 0.0324 / 4.0, epsilon = 1e-12);
        assert_relative_eq!(
            airframe.profile_power_ratio(),
            8.4 / (0.0324 / 0.0065),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_body_frontal_area() {
        // 1 kg bird: Sb = 0.00813 m²
        assert_relative_eq!(
            *Airframe::body_frontal_area(Kilograms::new(1.0)),
            0.00813,
            epsilon = 1e-12
        );
        // 20 g bird: ~6.0 cm²
        let sb = *Airframe::body_frontal_area(Kilograms::new(0.020));
        assert!(sb > 5.9e-4 && sb < 6.1e-4, "Sb = {}", sb);
    }

    #[test]
    fn test_minimum_power_speed_small_passerine() {
        let vmp = airframe_vmp(0.020);
        // Small passerines have Vmp around 8-11 m/s
        assert!(vmp > 9.5 && vmp < 10.5, "Vmp = {}", vmp);
    }

    fn airframe_vmp(mass: f64) -> f64 {
        *warbler_airframe().minimum_power_speed(Kilograms::new(mass), &PhysicalConstants::default())
    }

    #[test]
    fn test_minimum_power_speed_falls_with_mass() {
        assert!(airframe_vmp(0.016) < airframe_vmp(0.020));
    }

    #[test]
    fn test_minimum_power_speed_scaling() {
        // Vmp ∝ m^(1/2) / Sb^(1/4) = m^(0.5 - 0.1665)
        let ratio = airframe_vmp(0.040) / airframe_vmp(0.020);
        assert_relative_eq!(ratio, 2f64.powf(0.5 - 0.666 / 4.0), epsilon = 1e-12);
    }

    #[test]
    fn test_power_components() {
        let constants = PhysicalConstants::default();
        let airframe = warbler_airframe();
        let mass = Kilograms::new(0.020);
        let airspeed = MetersPerSecond::new(12.0);
        let budget = airframe.power_budget(mass, airspeed, &constants);

        let sb = *Airframe::body_frontal_area(mass);
        assert_relative_eq!(*budget.parasite, 1728.0 * sb * 0.1 / 2.0, epsilon = 1e-12);

        let weight = 0.020 * 9.81;
        let expected_induced = 1.2 * weight * weight / (2.0 * 12.0 * PI * 0.0324 / 4.0);
        assert_relative_eq!(*budget.induced, expected_induced, epsilon = 1e-12);

        let pam = *airframe.absolute_minimum_power(mass, &constants);
        assert_relative_eq!(
            *budget.profile,
            airframe.profile_power_ratio() * pam,
            epsilon = 1e-12
        );

        assert_relative_eq!(
            *budget.total(),
            *budget.parasite + *budget.profile + *budget.induced,
            epsilon = 1e-12
        );
        assert!(*budget.total() > 0.25 && *budget.total() < 0.40);
    }

    #[test]
    fn test_induced_power_falls_with_speed() {
        let constants = PhysicalConstants::default();
        let airframe = warbler_airframe();
        let mass = Kilograms::new(0.020);
        let slow = airframe.power_budget(mass, MetersPerSecond::new(8.0), &constants);
        let fast = airframe.power_budget(mass, MetersPerSecond::new(14.0), &constants);

        assert!(fast.induced < slow.induced);
        assert!(fast.parasite > slow.parasite);
        assert_eq!(fast.profile, slow.profile);
    }

    #[test]
    fn test_zero_airspeed_gives_non_finite_induced_power() {
        let budget = warbler_airframe().power_budget(
            Kilograms::new(0.020),
            MetersPerSecond::ZERO,
            &PhysicalConstants::default(),
        );
        assert!(!budget.induced.is_finite());
        assert!(!budget.total().is_finite());
    }
}
