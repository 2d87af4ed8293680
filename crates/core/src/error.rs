//! Error types for flight range estimation
//!
//! Record and configuration problems are caught before a single step runs.
//! Abnormal terminations of a running flight are normally reported as a
//! [`TerminationReason`](crate::simulation::TerminationReason) on the outcome;
//! [`FlightOutcome::into_result`](crate::simulation::FlightOutcome::into_result)
//! converts them into the matching variants here.

use crate::simulation::FlightQuantity;
use thiserror::Error;

/// Errors that can occur while estimating flight range
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlightRangeError {
    /// A bird record failed validation
    #[error("invalid input `{field}`: {reason}")]
    InvalidInput {
        /// Name of the offending record field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// A configuration value is outside its physical domain
    #[error("invalid configuration `{field}`: {reason}")]
    InvalidConfig {
        /// Name of the offending configuration key
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// A step produced a non-finite or non-positive speed or power
    #[error("flight infeasible at step {step}: {quantity} = {value}")]
    Infeasible {
        /// 1-based index of the step that could not be flown
        step: u32,
        /// Which quantity broke down
        quantity: FlightQuantity,
        /// The offending value
        value: f64,
    },

    /// The step ceiling was hit before the fat reserve ran out
    #[error("step limit of {steps} reached before fuel exhaustion")]
    MaxStepsReached {
        /// Number of steps flown
        steps: u32,
    },
}

impl FlightRangeError {
    /// Create an `InvalidInput` error for a record field
    pub(crate) fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Create an `InvalidConfig` error for a configuration key
    pub(crate) fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_field() {
        let err = FlightRangeError::invalid_input("fat_mass", "must be greater than zero");
        assert_eq!(
            err.to_string(),
            "invalid input `fat_mass`: must be greater than zero"
        );

        let err = FlightRangeError::Infeasible {
            step: 1,
            quantity: FlightQuantity::InducedPower,
            value: f64::INFINITY,
        };
        assert_eq!(
            err.to_string(),
            "flight infeasible at step 1: induced power = inf"
        );
    }
}
