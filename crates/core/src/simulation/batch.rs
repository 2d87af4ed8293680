//! Batch simulation over many bird records
//!
//! Each bird owns its own [`SimulationState`](super::SimulationState) and the
//! config is shared read-only, so records are simulated in parallel with rayon
//! with no synchronization beyond collecting results. `collect` on an indexed
//! parallel iterator keeps input order, so results line up with records
//! whichever worker finishes first.

use super::{simulate_flight, FlightOutcome, TerminationReason};
use crate::core_types::bird::{Bird, BirdRecord};
use crate::core_types::config::FlightConfig;
use crate::error::FlightRangeError;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

/// Simulate every record in parallel
///
/// Returns one result per record, in input order. A rejected record doesn't
/// stop the others.
pub fn simulate_batch(
    birds: &[Bird],
    config: &FlightConfig,
) -> Vec<Result<FlightOutcome, FlightRangeError>> {
    info!(
        "Simulating {} birds on {} threads",
        birds.len(),
        rayon::current_num_threads()
    );

    let results: Vec<_> = birds
        .par_iter()
        .map(|bird| simulate_flight(bird, config))
        .collect();

    log_rejections(&results);
    info!("Batch complete: {:?}", BatchSummary::from_results(&results));
    results
}

/// Simulate every record on the calling thread
///
/// Produces the same results as [`simulate_batch`].
pub fn simulate_batch_sequential(
    birds: &[Bird],
    config: &FlightConfig,
) -> Vec<Result<FlightOutcome, FlightRangeError>> {
    let results: Vec<_> = birds
        .iter()
        .map(|bird| simulate_flight(bird, config))
        .collect();

    log_rejections(&results);
    results
}

/// Simulate raw dataset rows in parallel
///
/// Like [`simulate_batch`], but each row's order label is resolved inside its
/// own job, so an unknown label comes back as that row's `InvalidInput`.
pub fn simulate_records(
    records: &[BirdRecord],
    config: &FlightConfig,
) -> Vec<Result<FlightOutcome, FlightRangeError>> {
    info!(
        "Simulating {} records on {} threads",
        records.len(),
        rayon::current_num_threads()
    );

    let results: Vec<_> = records
        .par_iter()
        .map(|record| simulate_record(record, config))
        .collect();

    log_rejections(&results);
    info!("Batch complete: {:?}", BatchSummary::from_results(&results));
    results
}

/// Resolve one raw record and fly it
///
/// # Errors
/// Returns `InvalidInput` for an unknown order label, otherwise whatever
/// [`simulate_flight`] returns.
pub fn simulate_record(
    record: &BirdRecord,
    config: &FlightConfig,
) -> Result<FlightOutcome, FlightRangeError> {
    let bird = record.to_bird()?;
    simulate_flight(&bird, config)
}

fn log_rejections(results: &[Result<FlightOutcome, FlightRangeError>]) {
    for (index, result) in results.iter().enumerate() {
        if let Err(err) = result {
            warn!("Record {} rejected: {}", index, err);
        }
    }
}

/// Counts of how the flights in a batch ended
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Records submitted
    pub total: usize,
    /// Flights that used up their fat
    pub exhausted: usize,
    /// Flights stopped by an infeasible step
    pub infeasible: usize,
    /// Flights stopped by the step ceiling
    pub max_steps_reached: usize,
    /// Records rejected before the first step
    pub rejected: usize,
}

impl BatchSummary {
    /// Tally a batch of results
    pub fn from_results(results: &[Result<FlightOutcome, FlightRangeError>]) -> Self {
        results.iter().fold(Self::default(), |mut summary, result| {
            summary.total += 1;
            match result {
                Ok(outcome) => match outcome.termination {
                    TerminationReason::Exhausted => summary.exhausted += 1,
                    TerminationReason::Infeasible { .. } => summary.infeasible += 1,
                    TerminationReason::MaxStepsReached => summary.max_steps_reached += 1,
                },
                Err(_) => summary.rejected += 1,
            }
            summary
        })
    }
}
