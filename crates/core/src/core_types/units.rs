//! Semantic unit types for type-safe physical quantity handling
//!
//! This module provides newtype wrappers for the physical quantities that cross
//! the public API (bird measurements, airspeeds, powers, distances) so that a
//! wing area can't be passed where a wingspan is expected.
//!
//! # Design Philosophy
//! - All quantities use f64: the flight loop accumulates hundreds of steps and
//!   fat masses of a few grams, so f32 rounding would be visible in the range
//! - `Deref` to the raw value keeps the aerodynamic formulas readable
//!   (`*bird.wing_span` instead of `bird.wing_span.value()`)
//! - Equality and total ordering both follow `f64::total_cmp` (NaN equals
//!   itself and sorts after all values)
//! - Serde serializes each unit as its bare number
//!
//! # Usage
//! ```
//! use flight_range_core::core_types::units::{Kilometers, Meters};
//!
//! let leg = Meters::new(1500.0);
//! let km: Kilometers = leg.into();
//! assert!((*km - 1.5).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Deref, Div, Mul, Sub, SubAssign};

/// Defines a unit newtype over f64 with the shared trait surface.
macro_rules! unit_type {
    ($(#[$meta:meta])* $name:ident, $symbol:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        #[repr(transparent)]
        pub struct $name(f64);

        impl $name {
            /// Zero of this quantity
            pub const ZERO: $name = $name(0.0);

            /// Wrap a raw value
            #[inline]
            #[must_use]
            pub const fn new(value: f64) -> Self {
                $name(value)
            }

            /// Get the raw f64 value
            #[inline]
            #[must_use]
            pub const fn value(self) -> f64 {
                self.0
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.cmp(other) == Ordering::Equal
            }
        }

        impl Eq for $name {}

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                self.0.total_cmp(&other.0)
            }
        }

        impl Deref for $name {
            type Target = f64;
            #[inline]
            fn deref(&self) -> &f64 {
                &self.0
            }
        }

        impl From<f64> for $name {
            fn from(v: f64) -> Self {
                $name(v)
            }
        }

        impl From<$name> for f64 {
            fn from(v: $name) -> f64 {
                v.0
            }
        }

        impl Add for $name {
            type Output = $name;
            fn add(self, rhs: $name) -> $name {
                $name(self.0 + rhs.0)
            }
        }

        impl AddAssign for $name {
            fn add_assign(&mut self, rhs: $name) {
                self.0 += rhs.0;
            }
        }

        impl Sub for $name {
            type Output = $name;
            fn sub(self, rhs: $name) -> $name {
                $name(self.0 - rhs.0)
            }
        }

        impl SubAssign for $name {
            fn sub_assign(&mut self, rhs: $name) {
                self.0 -= rhs.0;
            }
        }

        impl Mul<f64> for $name {
            type Output = $name;
            fn mul(self, rhs: f64) -> $name {
                $name(self.0 * rhs)
            }
        }

        impl Div<f64> for $name {
            type Output = $name;
            fn div(self, rhs: f64) -> $name {
                $name(self.0 / rhs)
            }
        }

        impl PartialEq<f64> for $name {
            fn eq(&self, other: &f64) -> bool {
                self.0 == *other
            }
        }

        impl PartialOrd<f64> for $name {
            fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
                self.0.partial_cmp(other)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if let Some(precision) = f.precision() {
                    write!(f, "{:.*} {}", precision, self.0, $symbol)
                } else {
                    write!(f, "{} {}", self.0, $symbol)
                }
            }
        }
    };
}

unit_type!(
    /// Mass in kilograms
    Kilograms,
    "kg"
);

unit_type!(
    /// Length in meters
    Meters,
    "m"
);

unit_type!(
    /// Length in kilometers, used for reported flight range
    Kilometers,
    "km"
);

unit_type!(
    /// Area in square meters
    SquareMeters,
    "m²"
);

unit_type!(
    /// Duration in seconds
    Seconds,
    "s"
);

unit_type!(
    /// Speed in meters per second
    MetersPerSecond,
    "m/s"
);

unit_type!(
    /// Power in watts
    Watts,
    "W"
);

impl Meters {
    /// Convert to kilometers
    #[inline]
    #[must_use]
    pub fn to_kilometers(self) -> Kilometers {
        Kilometers(self.0 / 1000.0)
    }
}

impl From<Meters> for Kilometers {
    fn from(m: Meters) -> Kilometers {
        m.to_kilometers()
    }
}

impl Kilometers {
    /// Round to one decimal place, the precision ranges are reported at
    #[inline]
    #[must_use]
    pub fn round_to_tenth(self) -> Kilometers {
        Kilometers((self.0 * 10.0).round() / 10.0)
    }
}

impl Seconds {
    /// Convert to hours
    #[inline]
    #[must_use]
    pub fn as_hours(self) -> f64 {
        self.0 / 3600.0
    }
}

/// Distance = speed × time
impl Mul<Seconds> for MetersPerSecond {
    type Output = Meters;
    fn mul(self, rhs: Seconds) -> Meters {
        Meters(self.0 * rhs.0)
    }
}

/// Speed = distance / time
impl Div<Seconds> for Meters {
    type Output = MetersPerSecond;
    fn div(self, rhs: Seconds) -> MetersPerSecond {
        MetersPerSecond(self.0 / rhs.0)
    }
}
