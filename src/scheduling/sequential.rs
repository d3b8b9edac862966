//! Sequential back-end of the event processing

use super::batches;
use crate::{job::JobResults, Result};

use std::ops::Range;

/// Process events in sequential mode
///
/// We use batched logic even in sequential mode, in order to achieve
/// reproducibility with respect to multi-threaded runs. A single worker goes
/// through every batch.
///
pub fn run_job_impl<W>(
    num_events: usize,
    make_worker: impl Fn() -> Result<W>,
    process_events: impl Fn(&mut W, Range<usize>) -> Result<JobResults>,
) -> Result<JobResults> {
    // Some double-checking cannot hurt...
    assert!(num_events > 0, "Must process at least one event");
    let mut worker = make_worker()?;

    // Initialize the accumulator with the first batch of events
    let mut batches = batches(num_events);
    let first_batch = batches.next().expect("There should be at least one batch");
    let mut accumulator = process_events(&mut worker, first_batch)?;

    // Process and integrate the remaining batches
    for batch in batches {
        accumulator.merge(process_events(&mut worker, batch)?);
    }
    Ok(accumulator)
}
