//! This module takes care of scheduling the event processing work,
//! encapsulating use of multiple threads and anything else that will come in
//! the future

#[cfg(feature = "multi-threading")]
mod multi_threading;
#[cfg(not(feature = "multi-threading"))]
mod sequential;

use crate::{job::JobResults, Result};

use eyre::ensure;

use std::ops::Range;

/// Size of the processed event batches
///
/// Events are grouped in batches of a certain size, each of which is handed to
/// one worker. Batch results are then merged in input order, which makes
/// sequential and parallel runs produce identical outputs.
///
/// This constant may need to be tuned if per-event processing becomes much
/// cheaper or more expensive, but the rate of such change is expected to be
/// low enough for hard-coding of this constant to be reasonable.
///
pub const EVENT_BATCH_SIZE: usize = 1_000;

/// Process events in the manner that was configured at build time
///
/// Takes as parameters the total number of events to be processed, a factory
/// of per-worker state, and a processing kernel that handles the events within
/// a certain index range using some worker's state and returns the accumulated
/// intermediary results.
///
/// Worker state is created lazily and reused across batches: the sequential
/// back-end creates exactly one, the multi-threaded back-end at most one per
/// concurrently running task.
///
/// The first batch error, in input order, aborts the job.
///
pub fn run_job<W: Send>(
    num_events: usize,
    make_worker: impl Send + Sync + Fn() -> Result<W>,
    process_events: impl Send + Sync + Fn(&mut W, Range<usize>) -> Result<JobResults>,
) -> Result<JobResults> {
    ensure!(num_events > 0, "Must process at least one event");

    // ...in sequential mode
    #[cfg(not(feature = "multi-threading"))]
    {
        sequential::run_job_impl(num_events, make_worker, process_events)
    }

    // ...in multi-threaded mode
    #[cfg(feature = "multi-threading")]
    {
        multi_threading::run_job_impl(num_events, make_worker, process_events)
    }
}

/// Split an event index range into batches
fn batches(num_events: usize) -> impl Iterator<Item = Range<usize>> {
    (0..num_events)
        .step_by(EVENT_BATCH_SIZE)
        .map(move |start| start..(start + EVENT_BATCH_SIZE).min(num_events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cutflow::{CutSet, CutflowResult},
        event::EventId,
        job::EventOutcome,
        sink::EventContent,
    };

    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn cut_set() -> Arc<CutSet> {
        let mut cuts = CutSet::new();
        cuts.push_back("Even").unwrap();
        Arc::new(cuts.finish())
    }

    /// Worker state which only counts the batches it went through
    fn new_worker() -> Result<usize> {
        Ok(0)
    }

    /// Kernel which lets even event numbers through
    fn process(
        cuts: &Arc<CutSet>,
        batches_seen: &mut usize,
        range: Range<usize>,
    ) -> Result<JobResults> {
        *batches_seen += 1;
        let mut results = JobResults::new(cuts.clone());
        for idx in range {
            let mut result = CutflowResult::new(cuts.clone());
            result.pass_cut("No selection");
            if idx % 2 == 0 {
                result.pass_cut("Even");
            }
            results.cutflow.record(&result);
            results.outcomes.push(EventOutcome {
                id: EventId {
                    event: idx as u64,
                    ..EventId::default()
                },
                passed: idx % 2 == 0,
                passed_cuts: Vec::new(),
                values: EventContent::new(),
            });
        }
        Ok(results)
    }

    #[test]
    fn batches_cover_all_events() {
        let ranges: Vec<_> = batches(2 * EVENT_BATCH_SIZE + 3).collect();
        assert_eq!(
            ranges,
            [
                0..EVENT_BATCH_SIZE,
                EVENT_BATCH_SIZE..2 * EVENT_BATCH_SIZE,
                2 * EVENT_BATCH_SIZE..2 * EVENT_BATCH_SIZE + 3
            ]
        );
        assert_eq!(batches(5).collect::<Vec<_>>(), [0..5]);
    }

    #[test]
    fn results_are_merged_in_input_order() {
        let cuts = cut_set();
        let num_events = 3 * EVENT_BATCH_SIZE + 17;
        let results = run_job(num_events, new_worker, |worker, range| {
            process(&cuts, worker, range)
        })
        .unwrap();
        assert_eq!(results.cutflow.num_events(), num_events as u64);
        assert_eq!(results.cutflow.count("Even"), Some((num_events as u64 + 1) / 2));
        assert!(results
            .outcomes
            .iter()
            .enumerate()
            .all(|(idx, outcome)| outcome.id.event == idx as u64));
    }

    #[test]
    fn first_failure_is_reported() {
        let cuts = cut_set();
        let result = run_job(3 * EVENT_BATCH_SIZE, new_worker, |worker, range| {
            if range.start > 0 {
                eyre::bail!("Batch starting at {} failed", range.start);
            }
            process(&cuts, worker, range)
        });
        let err = result.err().unwrap();
        assert_eq!(err.to_string(), format!("Batch starting at {} failed", EVENT_BATCH_SIZE));
    }

    #[test]
    fn empty_jobs_are_rejected() {
        let cuts = cut_set();
        assert!(run_job(0, new_worker, |worker, range| process(&cuts, worker, range)).is_err());
    }

    #[test]
    fn workers_are_reused_across_batches() {
        let cuts = cut_set();
        let num_batches = 8;
        let workers_made = AtomicUsize::new(0);
        let busiest_worker = AtomicUsize::new(0);
        let results = run_job(
            num_batches * EVENT_BATCH_SIZE,
            || {
                workers_made.fetch_add(1, Ordering::Relaxed);
                new_worker()
            },
            |worker, range| {
                let results = process(&cuts, worker, range)?;
                busiest_worker.fetch_max(*worker, Ordering::Relaxed);
                Ok(results)
            },
        )
        .unwrap();
        assert_eq!(results.cutflow.num_events(), (num_batches * EVENT_BATCH_SIZE) as u64);

        let workers_made = workers_made.into_inner();
        assert!(workers_made >= 1);
        #[cfg(not(feature = "multi-threading"))]
        {
            assert_eq!(workers_made, 1);
            assert_eq!(busiest_worker.into_inner(), num_batches);
        }
        #[cfg(feature = "multi-threading")]
        assert!(workers_made <= rayon::current_num_threads().min(num_batches));
    }
}
