//! Tiered (loose/tight) muon identification
//!
//! Each tier is a short-circuiting chain of requirements. The tight tier is
//! only evaluated for muons which passed the loose one, so that the tight
//! muons are always a subset of the loose muons.

use crate::{
    event::{Muon, Vertex},
    numeric::Float,
};

use prefix_num_ops::real::*;
use tracing::debug;

use std::fmt::Display;

/// Identification strictness level
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tier {
    /// Loose working point
    Loose,

    /// Tight working point
    Tight,
}

/// One requirement of the identification chain
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MuonCheck {
    /// Cut-based identification flag
    Id,

    /// Relative isolation or mini-isolation flag
    Isolation,

    /// Transverse impact parameter
    Dxy,

    /// Longitudinal impact parameter
    Dz,

    /// Minimal transverse momentum
    MinPt,

    /// Maximal absolute pseudorapidity
    MaxEta,
}
//
impl Display for MuonCheck {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Id => "CutBasedID",
            Self::Isolation => "isolation",
            Self::Dxy => "dxy",
            Self::Dz => "dz",
            Self::MinPt => "minpt",
            Self::MaxEta => "maxeta",
        };
        write!(fmt, "{}", name)
    }
}

/// Thresholds of one identification tier
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TierCuts {
    /// Minimal transverse momentum (GeV)
    pub min_pt: Float,

    /// Maximal absolute pseudorapidity
    pub max_eta: Float,

    /// Maximal transverse impact parameter (cm)
    pub dxy: Float,

    /// Maximal longitudinal impact parameter (cm)
    pub dz: Float,

    /// Maximal relative isolation, when mini-isolation is not used
    pub rel_iso: Float,
}
//
impl TierCuts {
    /// Run the requirement chain, reporting the first failed check
    ///
    /// Impact parameters can only be computed with respect to a primary
    /// vertex. Without one, those checks are skipped and the chain carries on.
    ///
    pub fn check(
        &self,
        muon: &Muon,
        tier: Tier,
        use_mini_iso: bool,
        vertex: Option<&Vertex>,
    ) -> Result<(), MuonCheck> {
        let (id, mini_iso) = match tier {
            Tier::Loose => (muon.id.cut_based_loose, muon.id.mini_iso_loose),
            Tier::Tight => (muon.id.cut_based_tight, muon.id.mini_iso_tight),
        };
        require(id, MuonCheck::Id)?;

        if use_mini_iso {
            require(mini_iso, MuonCheck::Isolation)?;
        } else {
            require(muon.rel_iso() < self.rel_iso, MuonCheck::Isolation)?;
        }

        match vertex {
            Some(pv) => {
                require(abs(muon.track.dxy(&pv.position)) < self.dxy, MuonCheck::Dxy)?;
                require(abs(muon.track.dz(&pv.position)) < self.dz, MuonCheck::Dz)?;
            }
            None => debug!("\t\t\tno primary vertex, skipping impact parameter cuts"),
        }

        require(muon.p4.pt > self.min_pt, MuonCheck::MinPt)?;
        require(abs(muon.p4.eta) < self.max_eta, MuonCheck::MaxEta)
    }
}

/// Turn a boolean requirement into a step of the check chain
fn require(condition: bool, check: MuonCheck) -> Result<(), MuonCheck> {
    if condition {
        Ok(())
    } else {
        Err(check)
    }
}

/// Muon identification configuration
#[derive(Clone, Debug, PartialEq)]
pub struct MuonIdConfig {
    /// Whether identification is applied (otherwise every muon is kept)
    pub enabled: bool,

    /// Use the mini-isolation flags instead of relative isolation
    pub use_mini_iso: bool,

    /// Tight tier thresholds
    pub tight: TierCuts,

    /// Loose tier thresholds
    pub loose: TierCuts,
}
//
impl Default for MuonIdConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            use_mini_iso: true,
            tight: TierCuts {
                min_pt: 20.,
                max_eta: 2.4,
                dxy: 0.2,
                dz: 0.5,
                rel_iso: 0.2,
            },
            loose: TierCuts {
                min_pt: 20.,
                max_eta: 2.4,
                dxy: 999_999.,
                dz: 999_999.,
                rel_iso: 0.4,
            },
        }
    }
}

/// Indices of the muons which passed each tier
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MuonSelection {
    /// Tight muons
    pub tight: Vec<usize>,

    /// Loose muons
    pub loose: Vec<usize>,
}

/// Sort the muons of an event into the loose and tight tiers
pub fn select_muons(cfg: &MuonIdConfig, muons: &[Muon], vertex: Option<&Vertex>) -> MuonSelection {
    let mut selection = MuonSelection::default();

    if !cfg.enabled {
        debug!("\tNOT applying MuonSelection");
        selection.tight = (0..muons.len()).collect();
        selection.loose = (0..muons.len()).collect();
        return selection;
    }

    debug!("\tApplying MuonSelection");
    for (idx, muon) in muons.iter().enumerate() {
        debug!(
            "\t\tpt = {}, |eta| = {}, phi = {}",
            muon.p4.pt,
            abs(muon.p4.eta),
            muon.p4.phi
        );

        // Check loose first, and skip to the next muon if that fails
        if let Err(check) = cfg.loose.check(muon, Tier::Loose, cfg.use_mini_iso, vertex) {
            debug!("\t\t\tfails loose {}", check);
            continue;
        }
        selection.loose.push(idx);

        // Then check tight
        match cfg.tight.check(muon, Tier::Tight, cfg.use_mini_iso, vertex) {
            Ok(()) => selection.tight.push(idx),
            Err(check) => debug!("\t\t\tfails tight {}", check),
        }
    }

    debug!(
        "\t\tnSelMuons = {}, nSelLooseMuons = {} out of {}",
        selection.tight.len(),
        selection.loose.len(),
        muons.len()
    );
    selection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        event::MuonId,
        kinematics::{Kinematics, Momentum3, Position, Track},
    };

    fn muon(pt: Float, eta: Float, id: MuonId, ip: Float) -> Muon {
        Muon {
            p4: Kinematics {
                pt,
                eta,
                ..Kinematics::default()
            },
            track: Track {
                reference_point: Position::new(0., ip, ip),
                momentum: Momentum3::new(pt, 0., 0.),
            },
            id,
            ..Muon::default()
        }
    }

    fn all_flags() -> MuonId {
        MuonId {
            cut_based_loose: true,
            cut_based_tight: true,
            mini_iso_loose: true,
            mini_iso_tight: true,
        }
    }

    fn primary_vertex() -> Vertex {
        Vertex {
            position: Position::origin(),
            ndof: 10.,
            is_fake: false,
        }
    }

    #[test]
    fn chain_reports_first_failure() {
        let cfg = MuonIdConfig::default();
        let pv = primary_vertex();
        let soft = muon(10., 0.5, MuonId::default(), 0.);
        assert_eq!(
            cfg.tight.check(&soft, Tier::Tight, true, Some(&pv)),
            Err(MuonCheck::Id)
        );
        let soft = muon(10., 0.5, all_flags(), 0.);
        assert_eq!(
            cfg.tight.check(&soft, Tier::Tight, true, Some(&pv)),
            Err(MuonCheck::MinPt)
        );
        let forward = muon(30., -2.6, all_flags(), 0.);
        assert_eq!(
            cfg.tight.check(&forward, Tier::Tight, true, Some(&pv)),
            Err(MuonCheck::MaxEta)
        );
    }

    #[test]
    fn displaced_muons_are_only_loose() {
        let cfg = MuonIdConfig::default();
        let pv = primary_vertex();
        let displaced = muon(30., 0.5, all_flags(), 0.3);
        let selection = select_muons(&cfg, &[displaced], Some(&pv));
        assert_eq!(selection.loose, vec![0]);
        assert!(selection.tight.is_empty());
    }

    #[test]
    fn impact_parameters_are_skipped_without_vertex() {
        let cfg = MuonIdConfig::default();
        let displaced = muon(30., 0.5, all_flags(), 0.3);
        let selection = select_muons(&cfg, &[displaced], None);
        assert_eq!(selection.tight, vec![0]);
    }

    #[test]
    fn relative_isolation_can_replace_mini_isolation() {
        let cfg = MuonIdConfig {
            use_mini_iso: false,
            ..MuonIdConfig::default()
        };
        let flags = MuonId {
            mini_iso_loose: false,
            mini_iso_tight: false,
            ..all_flags()
        };
        let mut isolated = muon(50., 0.5, flags, 0.);
        isolated.isolation.charged_hadron_pt = 5.;
        let mut loosely_isolated = isolated;
        loosely_isolated.isolation.charged_hadron_pt = 15.;
        let mut non_isolated = isolated;
        non_isolated.isolation.charged_hadron_pt = 25.;

        let selection = select_muons(
            &cfg,
            &[isolated, loosely_isolated, non_isolated],
            Some(&primary_vertex()),
        );
        assert_eq!(selection.loose, vec![0, 1]);
        assert_eq!(selection.tight, vec![0]);
    }

    #[test]
    fn disabled_identification_keeps_everything() {
        let cfg = MuonIdConfig {
            enabled: false,
            ..MuonIdConfig::default()
        };
        let muons = [muon(1., 4., MuonId::default(), 10.), muon(2., 0., MuonId::default(), 0.)];
        let selection = select_muons(&cfg, &muons, None);
        assert_eq!(selection.loose, vec![0, 1]);
        assert_eq!(selection.tight, vec![0, 1]);
    }
}
