//! Coarse kinematic pre-selection of leptons and the lepton multiplicity cut

use crate::{kinematics::Kinematics, numeric::Float};

use prefix_num_ops::real::*;
use tracing::debug;

/// Kinematic acceptance of one lepton flavour
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KinematicCut {
    /// Minimal transverse momentum (GeV)
    pub min_pt: Float,

    /// Maximal absolute pseudorapidity
    pub max_eta: Float,
}
//
impl KinematicCut {
    /// Whether an object lies inside the acceptance
    pub fn accepts(&self, p4: &Kinematics) -> bool {
        p4.pt >= self.min_pt && abs(p4.eta) <= self.max_eta
    }

    /// Indices of the accepted objects, in input order
    pub fn preselect<T>(&self, objects: &[T], p4: impl Fn(&T) -> &Kinematics) -> Vec<usize> {
        objects
            .iter()
            .enumerate()
            .filter_map(|(idx, object)| {
                let p4 = p4(object);
                let pass = self.accepts(p4);
                debug!(
                    "\t\t#{} pt = {} eta = {}{}",
                    idx,
                    p4.pt,
                    p4.eta,
                    if pass { " ---> Pass" } else { "" }
                );
                pass.then_some(idx)
            })
            .collect()
    }
}

/// Lepton multiplicity requirement
#[derive(Clone, Debug, PartialEq)]
pub struct LeptonConfig {
    /// Minimal number of pre-selected muons and electrons
    pub min_leptons: usize,

    /// Muon acceptance
    pub muon: KinematicCut,

    /// Electron acceptance
    pub electron: KinematicCut,
}
//
impl Default for LeptonConfig {
    fn default() -> Self {
        Self {
            min_leptons: 3,
            muon: KinematicCut {
                min_pt: 20.,
                max_eta: 2.4,
            },
            electron: KinematicCut {
                min_pt: 20.,
                max_eta: 2.4,
            },
        }
    }
}
