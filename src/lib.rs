//! vlq_select: multi-lepton event selection and T'/B' truth tagging
//!
//!
//! # Introduction (for the physicist)
//!
//! Searches for pair-produced vector-like quarks (T'T̄' and B'B̄') in
//! multi-lepton final states start with two per-event tasks:
//!
//! * deciding whether a reconstructed collision passes the analysis
//!   pre-selection (trigger, primary vertex, MET filters, muon quality tiers,
//!   lepton multiplicity, MET window), while counting how many events survive
//!   each step of that chain;
//! * for simulated signal samples, finding out from the generator record which
//!   of the twelve possible T'/B' decay final states (tZ, tH, bW, bZ, bH, tW
//!   pairings) the event belongs to, so that samples can later be reweighted
//!   to arbitrary branching ratios.
//!
//!
//! # Introduction (for the computer guy)
//!
//! The job is a single pass over a list of events:
//!
//! * read in the configuration and set up the named components
//! * loop over events, in batches which may be processed in parallel,
//!     * run the selector's cut chain, stopping at the first failed cut,
//!     * for simulation, run the calculators and collect their named outputs
//!     * accumulate the cutflow
//! * then display / store the cutflow report and per-event outcomes.
//!
//! Collections are retrieved from events by input tag, and a missing one is
//! an error which the job driver turns into a skipped event (or an abort).
//! Malformed generator records, on the other hand, are only warned about.

#![warn(missing_docs)]

pub mod classifier;
pub mod config;
pub mod cutflow;
pub mod event;
pub mod genparticle;
pub mod input;
pub mod job;
pub mod kinematics;
pub mod logging;
pub mod numeric;
pub mod output;
pub mod plugin;
pub mod scheduling;
pub mod selector;
pub mod sink;

/// We'll use eyre's type-erased result type throughout the crate
pub type Result<T> = eyre::Result<T>;
