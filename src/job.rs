//! Processing of a list of events by the configured components
//!
//! Every worker gets its own selector and calculator instances, which it keeps
//! across the batches it processes, so that batches can be processed in
//! parallel. Per-instance state such as the first-event trigger menu dump is
//! therefore per-worker. Batch results are accumulated in `JobResults`.

use crate::{
    config::Configuration,
    cutflow::{CutSet, Cutflow},
    event::{Event, EventId},
    plugin::{EventClassifier, EventSelector, Registry},
    scheduling,
    sink::EventContent,
    Result,
};

use eyre::WrapErr;
use serde::Serialize;
use tracing::warn;

use std::sync::Arc;

/// What happened to one event
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EventOutcome {
    /// Event identifier
    pub id: EventId,

    /// Whether the event passed the whole selection
    pub passed: bool,

    /// Names of the cuts satisfied by the event, in evaluation order
    pub passed_cuts: Vec<String>,

    /// Values published by the calculators
    pub values: EventContent,
}

/// Accumulated results of a job
#[derive(Clone, Debug, PartialEq)]
pub struct JobResults {
    /// Events surviving each cut
    pub cutflow: Cutflow,

    /// Outcome of every processed event, in input order
    pub outcomes: Vec<EventOutcome>,

    /// Events skipped because an input collection was missing
    pub skipped: Vec<EventId>,
}
//
impl JobResults {
    /// Set up results accumulation for a given cut chain
    pub fn new(cuts: Arc<CutSet>) -> Self {
        Self {
            cutflow: Cutflow::new(cuts),
            outcomes: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Append the results of the events which come next in input order
    pub fn merge(&mut self, other: JobResults) {
        self.cutflow.merge(other.cutflow);
        self.outcomes.extend(other.outcomes);
        self.skipped.extend(other.skipped);
    }
}

/// Component instances owned by one worker
pub struct Worker {
    /// Event selector
    selector: Box<dyn EventSelector>,

    /// Calculators, in configuration order
    calculators: Vec<Box<dyn EventClassifier>>,
}

/// Event processing job
pub struct Job<'cfg> {
    /// Job configuration
    cfg: &'cfg Configuration,

    /// Where components are looked up
    registry: &'cfg Registry,
}
//
impl<'cfg> Job<'cfg> {
    /// Set up a job, checking that every configured component exists
    pub fn new(cfg: &'cfg Configuration, registry: &'cfg Registry) -> Result<Self> {
        registry
            .make_selector(&cfg.selector, cfg)
            .wrap_err("Failed to set up the event selector")?;
        registry
            .make_classifiers(cfg)
            .wrap_err("Failed to set up the event calculators")?;
        Ok(Self { cfg, registry })
    }

    /// Process events in the manner that was configured at build time
    pub fn run(&self, events: &[Event]) -> Result<JobResults> {
        scheduling::run_job(
            events.len(),
            || self.make_worker(),
            |worker, range| self.process_batch(worker, &events[range]),
        )
    }

    /// Set up the component instances of a new worker
    pub fn make_worker(&self) -> Result<Worker> {
        Ok(Worker {
            selector: self.registry.make_selector(&self.cfg.selector, self.cfg)?,
            calculators: self.registry.make_classifiers(self.cfg)?,
        })
    }

    /// Process a batch of events with a worker's component instances
    pub fn process_batch(&self, worker: &mut Worker, events: &[Event]) -> Result<JobResults> {
        let Worker {
            selector,
            calculators,
        } = worker;
        let mut results = JobResults::new(selector.cuts().clone());

        for event in events {
            let selection = match selector.evaluate(event) {
                Ok(selection) => selection,
                Err(err) if !self.cfg.abort_on_missing => {
                    warn!("Skipping event {}: {:#}", event.id(), err);
                    results.skipped.push(event.id());
                    continue;
                }
                Err(err) => {
                    return Err(err)
                        .wrap_err_with(|| format!("Failed to process event {}", event.id()));
                }
            };
            results.cutflow.record(&selection.cutflow);

            // Generator truth only exists in simulation
            let mut values = EventContent::new();
            if self.cfg.selector_config.is_mc {
                for calculator in calculators.iter_mut() {
                    calculator
                        .analyze(event, &selection, &mut values)
                        .wrap_err_with(|| {
                            format!("{} failed on event {}", calculator.name(), event.id())
                        })?;
                }
            }

            results.outcomes.push(EventOutcome {
                id: event.id(),
                passed: selection.passed(),
                passed_cuts: selection
                    .cutflow
                    .iter()
                    .filter(|&(_, passed)| passed)
                    .map(|(name, _)| name.to_owned())
                    .collect(),
                values,
            });
        }
        Ok(results)
    }
}
