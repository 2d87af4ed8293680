//! Bird morphology records
//!
//! A [`Bird`] is one row of the input dataset: the all-up mass at take-off,
//! wing measurements, the fat reserve that fuels the flight and the flight
//! muscle mass that stays fixed under the constant-muscle-mass criterion.

use crate::core_types::units::{Kilograms, Meters, SquareMeters};
use crate::error::FlightRangeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Taxonomic grouping used to pick the basal metabolism coefficients
///
/// Deserializes through [`TaxonomicOrder::parse`], so JSON accepts the same
/// labels as the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum TaxonomicOrder {
    /// Passeriformes (perching birds)
    Passerine,
    /// Every other order
    NonPasserine,
}

impl TaxonomicOrder {
    /// Parse an order label, accepting the spellings found in field datasets
    ///
    /// # Errors
    /// Returns `InvalidInput` for anything other than a passerine or
    /// non-passerine label.
    pub fn parse(label: &str) -> Result<Self, FlightRangeError> {
        let normalized: String = label
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "passerine" | "passeriformes" | "p" | "1" => Ok(Self::Passerine),
            "nonpasserine" | "np" | "2" => Ok(Self::NonPasserine),
            _ => Err(FlightRangeError::invalid_input(
                "order",
                format!("unrecognised taxonomic order '{label}'"),
            )),
        }
    }
}

impl TryFrom<String> for TaxonomicOrder {
    type Error = FlightRangeError;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        Self::parse(&label)
    }
}

impl FromStr for TaxonomicOrder {
    type Err = FlightRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TaxonomicOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passerine => write!(f, "passerine"),
            Self::NonPasserine => write!(f, "non-passerine"),
        }
    }
}

/// Morphological measurements of one bird at the start of a flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bird {
    /// Optional label (species or specimen id) carried into batch results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// All-up mass at take-off
    pub body_mass: Kilograms,
    /// Tip-to-tip wingspan
    pub wing_span: Meters,
    /// Area of both wings including the body strip between them
    pub wing_area: SquareMeters,
    /// Fat reserve available as fuel
    pub fat_mass: Kilograms,
    /// Flight muscle mass, held constant for the whole flight
    #[serde(default)]
    pub muscle_mass: Kilograms,
    /// Selects the basal metabolism coefficients
    pub order: TaxonomicOrder,
}

impl Bird {
    /// Create a new bird record
    ///
    /// The record is not validated here; [`Bird::validate`] runs before any
    /// simulation starts.
    pub fn new(
        body_mass: Kilograms,
        wing_span: Meters,
        wing_area: SquareMeters,
        fat_mass: Kilograms,
        muscle_mass: Kilograms,
        order: TaxonomicOrder,
    ) -> Self {
        Self {
            name: None,
            body_mass,
            wing_span,
            wing_area,
            fat_mass,
            muscle_mass,
            order,
        }
    }

    /// Attach a label to the record
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Mass left once the whole fat reserve is burnt
    #[inline]
    pub fn fat_free_mass(&self) -> Kilograms {
        self.body_mass - self.fat_mass
    }

    /// Fat fraction F of the all-up mass
    #[inline]
    pub fn fat_fraction(&self) -> f64 {
        *self.fat_mass / *self.body_mass
    }

    /// Check the record can be flown
    ///
    /// # Errors
    /// Returns `InvalidInput` when a measurement is non-finite or
    /// non-positive, when the fat mass is not strictly between zero and the
    /// body mass, or when the muscle mass is negative. Fat and muscle that
    /// together reach the body mass only log a warning.
    pub fn validate(&self) -> Result<(), FlightRangeError> {
        require_positive("body_mass", *self.body_mass)?;
        require_positive("wing_span", *self.wing_span)?;
        require_positive("wing_area", *self.wing_area)?;

        if !self.fat_mass.is_finite() || *self.fat_mass <= 0.0 {
            return Err(FlightRangeError::invalid_input(
                "fat_mass",
                format!(
                    "must be greater than zero, fat is the only fuel (got {})",
                    *self.fat_mass
                ),
            ));
        }
        if self.fat_mass >= self.body_mass {
            return Err(FlightRangeError::invalid_input(
                "fat_mass",
                format!(
                    "must be less than body mass {} (got {})",
                    self.body_mass, self.fat_mass
                ),
            ));
        }

        if !self.muscle_mass.is_finite() || *self.muscle_mass < 0.0 {
            return Err(FlightRangeError::invalid_input(
                "muscle_mass",
                format!("must be zero or positive (got {})", *self.muscle_mass),
            ));
        }
        if *self.fat_mass + *self.muscle_mass >= *self.body_mass {
            warn!(
                "Fat {} plus muscle {} leaves no other tissue in body mass {}",
                self.fat_mass, self.muscle_mass, self.body_mass
            );
        }

        Ok(())
    }
}

/// One row of an input dataset, with the order label still unresolved
///
/// Reading a batch as records keeps an unknown order label local to its row:
/// [`BirdRecord::to_bird`] rejects that row alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirdRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub body_mass: Kilograms,
    pub wing_span: Meters,
    pub wing_area: SquareMeters,
    pub fat_mass: Kilograms,
    #[serde(default)]
    pub muscle_mass: Kilograms,
    /// Order label as written in the dataset
    pub order: String,
}

impl BirdRecord {
    /// Resolve the order label
    ///
    /// # Errors
    /// Returns `InvalidInput` on field `order` when the label is not
    /// recognised. The measurements are checked later by [`Bird::validate`].
    pub fn to_bird(&self) -> Result<Bird, FlightRangeError> {
        let order = TaxonomicOrder::parse(&self.order)?;
        Ok(Bird {
            name: self.name.clone(),
            body_mass: self.body_mass,
            wing_span: self.wing_span,
            wing_area: self.wing_area,
            fat_mass: self.fat_mass,
            muscle_mass: self.muscle_mass,
            order,
        })
    }
}

impl From<&Bird> for BirdRecord {
    fn from(bird: &Bird) -> Self {
        Self {
            name: bird.name.clone(),
            body_mass: bird.body_mass,
            wing_span: bird.wing_span,
            wing_area: bird.wing_area,
            fat_mass: bird.fat_mass,
            muscle_mass: bird.muscle_mass,
            order: bird.order.to_string(),
        }
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<(), FlightRangeError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FlightRangeError::invalid_input(
            field,
            format!("must be a positive finite number (got {value})"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warbler() -> Bird {
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
    fn test_valid_record_passes() {
        assert!(warbler().validate().is_ok());
        assert!((warbler().fat_fraction() - 0.2).abs() < 1e-12);
        assert!((*warbler().fat_free_mass() - 0.016).abs() < 1e-12);
    }

    #[test]
    fn test_zero_fat_rejected() {
        let bird = Bird {
            fat_mass: Kilograms::ZERO,
            ..warbler()
        };
        let err = bird.validate().unwrap_err();
        assert!(matches!(
            err,
            FlightRangeError::InvalidInput {
                field: "fat_mass",
                ..
            }
        ));
    }

    #[test]
    fn test_fat_equal_to_body_mass_rejected() {
        let bird = Bird {
            fat_mass: Kilograms::new(0.020),
            muscle_mass: Kilograms::ZERO,
            ..warbler()
        };
        assert!(matches!(
            bird.validate(),
            Err(FlightRangeError::InvalidInput {
                field: "fat_mass",
                ..
            })
        ));
    }

    #[test]
    fn test_non_positive_geometry_rejected() {
        let no_span = Bird {
            wing_span: Meters::ZERO,
            ..warbler()
        };
        assert!(no_span.validate().is_err());

        let nan_area = Bird {
            wing_area: SquareMeters::new(f64::NAN),
            ..warbler()
        };
        assert!(nan_area.validate().is_err());

        let negative_mass = Bird {
            body_mass: Kilograms::new(-0.02),
            ..warbler()
        };
        assert!(negative_mass.validate().is_err());
    }

    #[test]
    fn test_zero_muscle_mass_is_valid() {
        let bird = Bird {
            muscle_mass: Kilograms::ZERO,
            ..warbler()
        };
        assert!(bird.validate().is_ok());
    }

    #[test]
    fn test_heavy_muscle_only_warns() {
        let bird = Bird {
            muscle_mass: Kilograms::new(0.016),
            ..warbler()
        };
        assert!(bird.validate().is_ok());
    }

    #[test]
    fn test_negative_muscle_rejected() {
        let bird = Bird {
            muscle_mass: Kilograms::new(-0.001),
            ..warbler()
        };
        assert!(matches!(
            bird.validate(),
            Err(FlightRangeError::InvalidInput {
                field: "muscle_mass",
                ..
            })
        ));
    }

    #[test]
    fn test_order_parsing() {
        assert_eq!(
            "Passerine".parse::<TaxonomicOrder>().unwrap(),
            TaxonomicOrder::Passerine
        );
        assert_eq!(
            TaxonomicOrder::parse("non-passerine").unwrap(),
            TaxonomicOrder::NonPasserine
        );
        assert_eq!(
            TaxonomicOrder::parse(" Non Passerine ").unwrap(),
            TaxonomicOrder::NonPasserine
        );
        assert!(matches!(
            TaxonomicOrder::parse("raptor"),
            Err(FlightRangeError::InvalidInput { field: "order", .. })
        ));
    }

    #[test]
    fn test_deserialize_record() {
        let json = r#"{
            "name": "Sedge warbler",
            "body_mass": 0.02,
            "wing_span": 0.18,
            "wing_area": 0.0065,
            "fat_mass": 0.004,
            "muscle_mass": 0.003,
            "order": "passerine"
        }"#;
        let bird: Bird = serde_json::from_str(json).unwrap();
        assert_eq!(bird.name.as_deref(), Some("Sedge warbler"));
        assert_eq!(bird, warbler().with_name("Sedge warbler"));

        let np: TaxonomicOrder = serde_json::from_str(r#""non-passerine""#).unwrap();
        assert_eq!(np, TaxonomicOrder::NonPasserine);
    }

    #[test]
    fn test_json_order_labels_match_parse() {
        for (label, expected) in [
            ("Passerine", TaxonomicOrder::Passerine),
            ("1", TaxonomicOrder::Passerine),
            ("np", TaxonomicOrder::NonPasserine),
            ("non_passerine", TaxonomicOrder::NonPasserine),
        ] {
            let order: TaxonomicOrder = serde_json::from_str(&format!("\"{label}\"")).unwrap();
            assert_eq!(order, expected);
            assert_eq!(TaxonomicOrder::parse(label).unwrap(), expected);
        }

        let json = serde_json::to_string(&TaxonomicOrder::NonPasserine).unwrap();
        assert_eq!(json, r#""non_passerine""#);
        assert!(serde_json::from_str::<TaxonomicOrder>(&json).is_ok());
        assert!(serde_json::from_str::<TaxonomicOrder>(r#""raptor""#).is_err());
    }

    #[test]
    fn test_unknown_order_rejects_only_its_record() {
        let json = r#"[
            {"body_mass": 0.02, "wing_span": 0.18, "wing_area": 0.0065,
             "fat_mass": 0.004, "muscle_mass": 0.003, "order": "Passerine"},
            {"name": "Kestrel", "body_mass": 0.2, "wing_span": 0.75, "wing_area": 0.07,
             "fat_mass": 0.03, "order": "raptor"}
        ]"#;
        let records: Vec<BirdRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].to_bird().unwrap(), warbler());
        assert!(matches!(
            records[1].to_bird(),
            Err(FlightRangeError::InvalidInput { field: "order", .. })
        ));
    }

    #[test]
    fn test_record_from_bird_resolves_back() {
        let bird = warbler().with_name("Sedge warbler");
        assert_eq!(BirdRecord::from(&bird).to_bird().unwrap(), bird);
    }
}
