//! Multi-threaded back-end of the event processing

use super::batches;
use crate::{job::JobResults, Result};

use std::{ops::Range, sync::Mutex};

/// Process events in multi-threaded mode
///
/// Each batch of events is processed by its own task, using a worker which
/// no other task is currently using. Batch results are merged in input order
/// once every task is done, so that the outcome does not depend on task
/// scheduling.
///
pub fn run_job_impl<W: Send>(
    num_events: usize,
    make_worker: impl Send + Sync + Fn() -> Result<W>,
    process_events: impl Send + Sync + Fn(&mut W, Range<usize>) -> Result<JobResults>,
) -> Result<JobResults> {
    // Some double-checking cannot hurt...
    assert!(num_events > 0, "Must process at least one event");

    // We know in advance how many batches of event we will process
    let batches = batches(num_events).collect::<Vec<_>>();
    let accumulator = ReproducibleAccumulator::new(batches.len());
    let workers = WorkerPool::new(make_worker);

    // This function is a synchronization scope: it will only return
    // once all inner tasks have been executed
    rayon::scope(|scope| {
        // For each batch of events, spawn a task which processes them
        for (batch_id, batch) in batches.into_iter().enumerate() {
            let accumulator_ref = &accumulator;
            let workers_ref = &workers;
            let process_events_ref = &process_events;
            scope.spawn(move |_| {
                let result = workers_ref.checkout().and_then(|mut worker| {
                    let result = process_events_ref(&mut worker, batch);
                    workers_ref.give_back(worker);
                    result
                });
                accumulator_ref.set_task_result(batch_id, result);
            });
        }
    });

    // Extract the results from the accumulator
    accumulator.get_merged_result()
}

/// Set of workers which are not currently processing a batch
struct WorkerPool<W, F> {
    /// Workers waiting for their next batch
    idle: Mutex<Vec<W>>,

    /// How new workers are created
    make_worker: F,
}
//
impl<W, F: Fn() -> Result<W>> WorkerPool<W, F> {
    /// Start with no worker, they are created on demand
    fn new(make_worker: F) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            make_worker,
        }
    }

    /// Take an idle worker, or create one if all of them are busy
    fn checkout(&self) -> Result<W> {
        let idle_worker = self.idle.lock().expect("Mutex data should be valid").pop();
        match idle_worker {
            Some(worker) => Ok(worker),
            None => (self.make_worker)(),
        }
    }

    /// Make a worker available to other tasks again
    fn give_back(&self, worker: W) {
        self.idle
            .lock()
            .expect("Mutex data should be valid")
            .push(worker);
    }
}

/// Reproducibility-optimized results accumulation mechanism
struct ReproducibleAccumulator {
    /// Storage for the intermediary results of parallel tasks
    results: Box<[Mutex<Option<Result<JobResults>>>]>,
}
//
impl ReproducibleAccumulator {
    /// Set up results storage for N parallel tasks
    fn new(num_tasks: usize) -> Self {
        assert!(num_tasks > 0, "There should be at least one task");
        Self {
            results: (0..num_tasks)
                .map(|_| Mutex::new(None))
                .collect::<Vec<_>>()
                .into_boxed_slice(),
        }
    }

    /// Integrate the results of the n-th task
    fn set_task_result(&self, task_id: usize, result: Result<JobResults>) {
        let mut lock = self.results[task_id]
            .lock()
            .expect("Mutex data should be valid");
        assert!(lock.is_none(), "Tasks should not report results twice");
        *lock = Some(result);
    }

    /// Aggregate the results in input order
    ///
    /// The error of the earliest failed batch, if any, is returned.
    ///
    fn get_merged_result(self) -> Result<JobResults> {
        // Start iterating over the task results
        let mut results_iter = self.results.into_vec().into_iter().map(|entry| {
            entry
                .into_inner()
                .expect("Mutex data should be valid")
                .expect("Result should be ready")
        });

        // Initialize results storage with the result of the first task
        let first_result = results_iter
            .next()
            .expect("There should be at least one task")?;

        // Merge the results of the other tasks
        results_iter.try_fold(first_result, |mut r1, r2| {
            r1.merge(r2?);
            Ok(r1)
        })
    }
}
