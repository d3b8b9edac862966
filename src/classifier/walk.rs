//! Walk of the generator decay tree below each heavy quark partner
//!
//! Generators often record a particle several times in a row (e.g. W → W)
//! before it actually decays. Each step of the walk follows such copies down
//! a bounded number of generations, then records what comes out of the last
//! copy.

use super::{
    category::ResonanceKind,
    record::{BosonDecay, DecayProduct, DecayRecord, LeafLepton, Resonance},
};
use crate::{
    genparticle::{GenParticle, GenParticles, ParticleIndex},
    numeric::pdg,
};

use tracing::{debug, warn};

/// Top quark copies followed before looking for the W
const TOP_COPIES: usize = 1;

/// W boson copies followed before looking at its decay products
const W_COPIES: usize = 1;

/// Z and Higgs boson copies followed before looking at their decay products
const NEUTRAL_BOSON_COPIES: usize = 2;

/// Walk state for one event
pub struct DecayWalker<'tree> {
    /// Generator particles of the event
    tree: &'tree GenParticles,

    /// Output being filled
    record: DecayRecord,
}
//
impl<'tree> DecayWalker<'tree> {
    /// Start walking an event's decay tree
    pub fn new(tree: &'tree GenParticles) -> Self {
        Self {
            tree,
            record: DecayRecord::default(),
        }
    }

    /// Record every final copy of a T' or B' along with its decay chain
    pub fn walk(mut self) -> DecayRecord {
        let tree = self.tree;
        for (idx, particle) in tree.iter() {
            let Some(kind) = ResonanceKind::from_pdg(particle.pdg_id) else {
                continue;
            };

            // Skip intermediate copies, the last one will be found later on
            let mut has_copy = false;
            for (_, daughter) in tree.daughters(idx) {
                if kind.matches(daughter.pdg_id) {
                    has_copy = true;
                } else if pdg::is_exotic_partner(daughter.pdg_id) {
                    warn!(
                        "{} {} has a daughter {} of another partner kind",
                        kind, particle.pdg_id, daughter.pdg_id
                    );
                }
            }
            if has_copy {
                continue;
            }

            self.record_resonance(kind, idx, particle);
            self.walk_resonance_daughters(idx);
        }
        self.record
    }

    /// Record the kinematics of a resonance
    ///
    /// When the resonance is the last of a chain of copies, its mother holds
    /// the kinematics before radiation, which are the ones of interest.
    ///
    fn record_resonance(&mut self, kind: ResonanceKind, idx: ParticleIndex, particle: &GenParticle) {
        let original = self
            .tree
            .mother(idx)
            .filter(|mother| kind.matches(mother.pdg_id))
            .unwrap_or(particle);
        let resonance = Resonance {
            status: original.status,
            pdg_id: original.pdg_id,
            p4: original.p4,
            num_daughters: original.daughters.len(),
        };
        debug!(
            "{} {} has {} daughters",
            kind,
            resonance.pdg_id,
            particle.daughters.len()
        );
        match kind {
            ResonanceKind::TPrime => self.record.t_primes.push(resonance),
            ResonanceKind::BPrime => self.record.b_primes.push(resonance),
        }
    }

    /// Record the quark and boson daughters of a resonance, then walk their
    /// own decays
    fn walk_resonance_daughters(&mut self, resonance: ParticleIndex) {
        let tree = self.tree;
        for (idx, daughter) in tree.daughters(resonance) {
            let product = DecayProduct {
                pdg_id: daughter.pdg_id,
                p4: daughter.p4,
            };
            if pdg::is_heavy_quark(daughter.pdg_id) {
                debug!("\tquark daughter {}", daughter.pdg_id);
                self.record.quarks.push(product);
                if daughter.pdg_id.abs() == pdg::TOP {
                    self.walk_top(idx, daughter.pdg_id, TOP_COPIES);
                }
            } else if pdg::is_boson(daughter.pdg_id) {
                debug!("\tboson daughter {}", daughter.pdg_id);
                let boson_index = self.record.bosons.len();
                self.record.bosons.push(product);
                let copies = if daughter.pdg_id.abs() == pdg::W {
                    W_COPIES
                } else {
                    NEUTRAL_BOSON_COPIES
                };
                self.walk_boson(idx, daughter.pdg_id, boson_index, copies);
            }
        }
    }

    /// Look for leptonic W decays below a top quark (t → Wb)
    fn walk_top(&mut self, top: ParticleIndex, quark_id: i32, copies_left: usize) {
        let tree = self.tree;
        for (idx, daughter) in tree.daughters(top) {
            match daughter.pdg_id.abs() {
                pdg::TOP if copies_left > 0 => self.walk_top(idx, quark_id, copies_left - 1),
                pdg::W => self.walk_top_w(idx, quark_id, W_COPIES),
                _ => {}
            }
        }
    }

    /// Record the leptons from the W of a top decay, crediting them to the
    /// quark daughter of the resonance
    fn walk_top_w(&mut self, w: ParticleIndex, quark_id: i32, copies_left: usize) {
        let tree = self.tree;
        for (idx, daughter) in tree.daughters(w) {
            if daughter.pdg_id.abs() == pdg::W && copies_left > 0 {
                self.walk_top_w(idx, quark_id, copies_left - 1);
            } else if pdg::is_charged_lepton(daughter.pdg_id) {
                self.record_lepton(daughter, quark_id);
            }
        }
    }

    /// Record the terminal decay products of a boson daughter
    fn walk_boson(
        &mut self,
        boson: ParticleIndex,
        boson_id: i32,
        boson_index: usize,
        copies_left: usize,
    ) {
        let tree = self.tree;
        for (idx, daughter) in tree.daughters(boson) {
            if daughter.pdg_id.abs() == boson_id.abs() && copies_left > 0 {
                self.walk_boson(idx, boson_id, boson_index, copies_left - 1);
                continue;
            }

            let decay = BosonDecay {
                pdg_id: daughter.pdg_id,
                boson_index,
                p4: daughter.p4,
            };
            match boson_id.abs() {
                pdg::W => self.record.w_decays.push(decay),
                pdg::Z => self.record.z_decays.push(decay),
                _ => self.record.h_decays.push(decay),
            }
            if pdg::is_charged_lepton(daughter.pdg_id) {
                self.record_lepton(daughter, boson_id);
            }
        }
    }

    /// Record a leaf lepton
    fn record_lepton(&mut self, lepton: &GenParticle, parent_id: i32) {
        debug!("\t\tlepton {} from {}", lepton.pdg_id, parent_id);
        self.record.leptons.push(LeafLepton {
            pdg_id: lepton.pdg_id,
            parent_id,
            p4: lepton.p4,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{genparticle::GenTreeBuilder, kinematics::Kinematics};

    fn p4(pt: f64) -> Kinematics {
        Kinematics {
            pt: pt as _,
            ..Kinematics::default()
        }
    }

    #[test]
    fn resonance_copies_keep_original_kinematics() {
        let mut tree = GenTreeBuilder::new();
        let first = tree.particle(pdg::T_PRIME, 22, p4(300.));
        let last = tree.daughter(first, pdg::T_PRIME, 62, p4(290.));
        tree.decay(last, &[pdg::BOTTOM, pdg::W]);
        let tree = tree.build();

        let record = DecayWalker::new(&tree).walk();
        assert_eq!(record.t_primes.len(), 1);
        assert_eq!(record.t_primes[0].status, 22);
        assert_eq!(record.t_primes[0].p4.pt, 300.);
        assert_eq!(record.t_primes[0].num_daughters, 1);
        assert_eq!(record.quarks.len(), 1);
        assert_eq!(record.bosons.len(), 1);
    }

    #[test]
    fn boson_copies_are_followed_to_a_bounded_depth() {
        let mut tree = GenTreeBuilder::new();
        let b_prime = tree.particle(-pdg::B_PRIME, 62, p4(500.));
        let products = tree.decay(b_prime, &[-pdg::BOTTOM, pdg::Z]);
        let z1 = tree.daughter(products[1], pdg::Z, 44, p4(100.));
        let z2 = tree.daughter(z1, pdg::Z, 44, p4(100.));
        tree.decay(z2, &[pdg::MUON, -pdg::MUON]);
        let tree = tree.build();

        let record = DecayWalker::new(&tree).walk();
        let z_codes: Vec<_> = record.z_decays.iter().map(|dec| dec.pdg_id).collect();
        assert_eq!(z_codes, [pdg::MUON, -pdg::MUON]);
        assert!(record.z_decays.iter().all(|dec| dec.boson_index == 0));
        let parents: Vec<_> = record.leptons.iter().map(|lep| lep.parent_id).collect();
        assert_eq!(parents, [pdg::Z, pdg::Z]);
    }

    #[test]
    fn w_copies_beyond_the_limit_are_terminal() {
        let mut tree = GenTreeBuilder::new();
        let t_prime = tree.particle(pdg::T_PRIME, 62, p4(500.));
        let products = tree.decay(t_prime, &[pdg::BOTTOM, pdg::W]);
        let w1 = tree.daughter(products[1], pdg::W, 44, p4(100.));
        let w2 = tree.daughter(w1, pdg::W, 44, p4(100.));
        tree.decay(w2, &[pdg::ELECTRON, -12]);
        let tree = tree.build();

        let record = DecayWalker::new(&tree).walk();
        let w_codes: Vec<_> = record.w_decays.iter().map(|dec| dec.pdg_id).collect();
        assert_eq!(w_codes, [pdg::W]);
        assert!(record.leptons.is_empty());
    }

    #[test]
    fn top_leptons_are_credited_to_the_quark() {
        let mut tree = GenTreeBuilder::new();
        let b_prime = tree.particle(pdg::B_PRIME, 62, p4(500.));
        let products = tree.decay(b_prime, &[-pdg::TOP, pdg::W]);
        let top_copy = tree.daughter(products[0], -pdg::TOP, 62, p4(200.));
        let top_products = tree.decay(top_copy, &[-pdg::W, -pdg::BOTTOM]);
        tree.decay(top_products[0], &[pdg::TAU, -16]);
        let tree = tree.build();

        let record = DecayWalker::new(&tree).walk();
        assert_eq!(record.leptons.len(), 1);
        assert_eq!(record.leptons[0].pdg_id, pdg::TAU);
        assert_eq!(record.leptons[0].parent_id, -pdg::TOP);
        assert!(record.w_decays.is_empty());
    }
}
