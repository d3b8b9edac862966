//! Cutflow bookkeeping
//!
//! A cutflow is an ordered list of named selection requirements. For each
//! event, the selector records which of them were satisfied, and a `Cutflow`
//! accumulator counts how many events survived every step of the chain.

use crate::Result;

use eyre::{bail, ensure};
use tracing::warn;

use std::sync::Arc;

/// Baseline entry, always enabled and always first
pub const NO_SELECTION: &str = "No selection";

/// Sentinel entry, always enabled and always last
pub const ALL_CUTS: &str = "All cuts";

/// A named selection requirement
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CutDefinition {
    /// Cut name, unique within a cut set
    pub name: String,

    /// Whether the cut's logic is applied (disabled cuts pass automatically)
    pub enabled: bool,
}

/// Ordered set of cuts, which defines both evaluation and display order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CutSet {
    /// Cut definitions, "No selection" first and "All cuts" last
    cuts: Vec<CutDefinition>,
}
//
impl CutSet {
    /// Start a cut set with only the "No selection" baseline
    pub fn new() -> Self {
        Self {
            cuts: vec![CutDefinition {
                name: NO_SELECTION.to_owned(),
                enabled: true,
            }],
        }
    }

    /// Append a cut (enabled by default) after those already declared
    pub fn push_back(&mut self, name: &str) -> Result<()> {
        ensure!(
            name != NO_SELECTION && name != ALL_CUTS,
            "Cut name '{}' is reserved",
            name
        );
        ensure!(self.position(name).is_none(), "Cut '{}' declared twice", name);
        self.cuts.push(CutDefinition {
            name: name.to_owned(),
            enabled: true,
        });
        Ok(())
    }

    /// Enable or disable a previously declared cut
    pub fn set(&mut self, name: &str, enabled: bool) -> Result<()> {
        ensure!(
            name != NO_SELECTION || enabled,
            "The '{}' baseline cannot be disabled",
            NO_SELECTION
        );
        match self.cuts.iter_mut().find(|cut| cut.name == name) {
            Some(cut) => cut.enabled = enabled,
            None => bail!("Cannot configure undeclared cut '{}'", name),
        }
        Ok(())
    }

    /// Close the cut set by appending the "All cuts" sentinel
    pub fn finish(mut self) -> Self {
        self.cuts.push(CutDefinition {
            name: ALL_CUTS.to_owned(),
            enabled: true,
        });
        self
    }

    /// Position of a cut in evaluation order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.cuts.iter().position(|cut| cut.name == name)
    }

    /// Whether a cut's logic should be applied
    pub fn is_enabled(&self, name: &str) -> bool {
        self.cuts.iter().any(|cut| cut.name == name && cut.enabled)
    }

    /// Iterate over the cuts in evaluation order
    pub fn iter(&self) -> impl Iterator<Item = &CutDefinition> {
        self.cuts.iter()
    }

    /// Number of cuts, sentinels included
    pub fn len(&self) -> usize {
        self.cuts.len()
    }

    /// Always false, a cut set holds at least the baseline
    pub fn is_empty(&self) -> bool {
        self.cuts.is_empty()
    }
}
//
impl Default for CutSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Which cuts one event satisfied
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CutflowResult {
    /// Cut definitions, shared with the selector
    cuts: Arc<CutSet>,

    /// One bit per cut, in cut set order
    bits: Vec<bool>,
}
//
impl CutflowResult {
    /// Start an event with no cut satisfied
    pub fn new(cuts: Arc<CutSet>) -> Self {
        let bits = vec![false; cuts.len()];
        Self { cuts, bits }
    }

    /// Record that the event satisfied a cut
    pub fn pass_cut(&mut self, name: &str) {
        match self.cuts.position(name) {
            Some(idx) => self.bits[idx] = true,
            None => warn!("Ignoring unknown cut '{}'", name),
        }
    }

    /// Whether the event satisfied a cut
    pub fn passed(&self, name: &str) -> bool {
        self.cuts
            .position(name)
            .map_or(false, |idx| self.bits[idx])
    }

    /// Whether the event satisfied the whole chain
    pub fn passed_all(&self) -> bool {
        self.passed(ALL_CUTS)
    }

    /// Cut definitions this result refers to
    pub fn cuts(&self) -> &CutSet {
        &self.cuts
    }

    /// Iterate over (cut name, satisfied) pairs in evaluation order
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.cuts
            .iter()
            .zip(self.bits.iter())
            .map(|(cut, &bit)| (cut.name.as_str(), bit))
    }
}

/// Number of events surviving each cut, accumulated over many events
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cutflow {
    /// Cut definitions
    cuts: Arc<CutSet>,

    /// Events which satisfied each cut
    counts: Vec<u64>,
}
//
impl Cutflow {
    /// Start counting at zero
    pub fn new(cuts: Arc<CutSet>) -> Self {
        let counts = vec![0; cuts.len()];
        Self { cuts, counts }
    }

    /// Account for one event
    pub fn record(&mut self, result: &CutflowResult) {
        assert_eq!(
            result.cuts(),
            &*self.cuts,
            "Cutflow results must come from the same cut set"
        );
        for (count, &bit) in self.counts.iter_mut().zip(result.bits.iter()) {
            *count += u64::from(bit);
        }
    }

    /// Merge the counts of another accumulator into this one
    pub fn merge(&mut self, other: Cutflow) {
        assert_eq!(
            self.cuts, other.cuts,
            "Only cutflows over the same cut set can be merged"
        );
        for (count, other_count) in self.counts.iter_mut().zip(other.counts) {
            *count += other_count;
        }
    }

    /// Number of events which satisfied a cut
    pub fn count(&self, name: &str) -> Option<u64> {
        self.cuts.position(name).map(|idx| self.counts[idx])
    }

    /// Number of events seen
    pub fn num_events(&self) -> u64 {
        self.counts[0]
    }

    /// Table rows in evaluation order
    pub fn rows(&self) -> impl Iterator<Item = CutflowRow<'_>> {
        let total = self.num_events();
        let mut previous = total;
        self.cuts
            .iter()
            .zip(self.counts.iter())
            .map(move |(cut, &count)| {
                let row = CutflowRow {
                    name: &cut.name,
                    enabled: cut.enabled,
                    count,
                    relative: ratio(count, previous),
                    cumulative: ratio(count, total),
                };
                previous = count;
                row
            })
    }
}

/// One line of a cutflow table
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CutflowRow<'cuts> {
    /// Cut name
    pub name: &'cuts str,

    /// Whether the cut was applied
    pub enabled: bool,

    /// Surviving events
    pub count: u64,

    /// Efficiency with respect to the previous cut
    pub relative: f64,

    /// Efficiency with respect to the total
    pub cumulative: f64,
}

/// Efficiency, defined as zero when there was nothing to select from
#[allow(clippy::cast_precision_loss)]
fn ratio(num: u64, denom: u64) -> f64 {
    if denom == 0 {
        0.
    } else {
        num as f64 / denom as f64
    }
}
