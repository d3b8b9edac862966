//! Missing transverse energy window
//!
//! The window is applied to the uncorrected MET magnitude. No energy
//! correction is propagated to it.

use crate::{event::Met, numeric::Float};

use tracing::debug;

/// MET window configuration
#[derive(Clone, Debug, PartialEq)]
pub struct MetConfig {
    /// Whether the MET window is applied
    pub enabled: bool,

    /// Lower bound (GeV, exclusive)
    pub min_met: Float,

    /// Upper bound (GeV, exclusive)
    pub max_met: Float,
}
//
impl MetConfig {
    /// Whether the leading MET object lies strictly inside the window
    ///
    /// Both bounds must hold at once. An event without any MET object fails.
    ///
    pub fn passes(&self, mets: &[Met]) -> bool {
        let Some(met) = mets.first() else {
            debug!("\t\tno MET object");
            return false;
        };
        debug!("\t\tMET = {}", met.pt);
        let pass_min = met.pt > self.min_met;
        let pass_max = met.pt < self.max_met;
        pass_min && pass_max
    }
}
//
impl Default for MetConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_met: 20.,
            max_met: 99_999_999_999.,
        }
    }
}
