//! Generator-level tagging of T'T' and B'B' decay chains
//!
//! The classifier finds the pair-produced heavy quark partners of a simulated
//! event, follows their decays through the generator record, and assigns the
//! event to one of the final-state categories used to reweight signal
//! samples to arbitrary branching ratios. Malformed generator records are
//! reported as warnings and never stop the processing: the event then simply
//! ends up without a category.

pub mod category;
pub mod record;
pub mod repair;
pub mod walk;

pub use self::category::Category;

use self::{
    category::{categorize, ResonanceKind},
    record::DecayRecord,
    repair::repair_sibling_order,
    walk::DecayWalker,
};
use crate::{event::Event, genparticle::GenParticles};

use tracing::{debug, debug_span, warn};

/// Name under which the classifier is registered
pub const CALCULATOR_NAME: &str = "TpTpCalc";

/// Decay chain classifier configuration
#[derive(Clone, Debug, PartialEq)]
pub struct ClassifierConfig {
    /// Verbose per-event tracing
    pub debug: bool,

    /// Input tag of the generator particle collection
    pub gen_particles: String,
}
//
impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            debug: false,
            gen_particles: "prunedGenParticles".to_owned(),
        }
    }
}

/// T'/B' decay chain classifier
#[derive(Clone, Debug)]
pub struct TpTpCalc {
    /// Classifier configuration
    cfg: ClassifierConfig,
}
//
impl TpTpCalc {
    /// Set up the classifier
    pub fn new(cfg: ClassifierConfig) -> Self {
        Self { cfg }
    }

    /// Classifier configuration
    pub fn config(&self) -> &ClassifierConfig {
        &self.cfg
    }

    /// Classify an event
    ///
    /// An event without generator particles yields an empty record.
    ///
    pub fn classify(&self, event: &Event) -> DecayRecord {
        let span = debug_span!("classify", event = %event.id());
        let _guard = span.enter();
        match event.gen_particles(&self.cfg.gen_particles) {
            Ok(particles) => self.classify_particles(particles),
            Err(err) => {
                warn!("{}, no decay chain to classify", err);
                DecayRecord::default()
            }
        }
    }

    /// Classify the decay chains of a generator particle tree
    pub fn classify_particles(&self, particles: &GenParticles) -> DecayRecord {
        let mut record = DecayWalker::new(particles).walk();

        if !record.t_primes.is_empty() && !record.b_primes.is_empty() {
            warn!("Found both T' and B'");
        }

        // Now time for some checking: do we have the right particles?
        let num_quarks = record.quarks.len();
        if num_quarks != 0 && num_quarks != 2 {
            warn!(
                "More/less than 2 quarks stored: {:?}",
                record.quarks.iter().map(|q| q.pdg_id).collect::<Vec<_>>()
            );
            repair_sibling_order(&mut record.quarks);
        }
        let num_bosons = record.bosons.len();
        if num_bosons != 0 && num_bosons != 2 {
            warn!("More/less than 2 bosons stored: {}", num_bosons);
        }

        record.category = Self::tag(&record);
        debug!("category: {:?}", record.category);
        record
    }

    /// Tag the decay chains according to the identified quarks and bosons
    ///
    /// Needs at least two quarks and two bosons; only the first two of each,
    /// after sibling-order repair, take part in the tagging.
    ///
    fn tag(record: &DecayRecord) -> Option<Category> {
        let kind = match (record.t_primes.len(), record.b_primes.len()) {
            (n, 0) if n > 1 => ResonanceKind::TPrime,
            (0, n) if n > 1 => ResonanceKind::BPrime,
            _ => return None,
        };

        let quarks: Vec<i32> = record.quarks.iter().map(|q| q.pdg_id).collect();
        let bosons: Vec<i32> = record.bosons.iter().map(|b| b.pdg_id).collect();
        let (&[q0, q1, ..], &[b0, b1, ..]) = (quarks.as_slice(), bosons.as_slice()) else {
            warn!(
                "{} pair has too few daughters (quarks {:?}, bosons {:?})",
                kind, quarks, bosons
            );
            return None;
        };

        let category = categorize(kind, [q0, q1], [b0, b1]);
        if category.is_none() {
            warn!(
                "{} daughters didn't match a recognized pattern (quarks {:?}, bosons {:?})",
                kind, quarks, bosons
            );
        }
        category
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        event::EventId,
        genparticle::GenTreeBuilder,
        numeric::pdg,
        sink::EventContent,
    };

    /// T'T' → tZ bW with a radiated T' copy and a leptonic W
    fn tzbw_tree() -> GenParticles {
        let mut tree = GenTreeBuilder::new();
        let t1 = tree.particle(pdg::T_PRIME, 22, Default::default());
        let t1_last = tree.daughter(t1, pdg::T_PRIME, 62, Default::default());
        tree.decay(t1_last, &[pdg::TOP, pdg::Z]);
        let t2 = tree.particle(-pdg::T_PRIME, 22, Default::default());
        let products = tree.decay(t2, &[-pdg::BOTTOM, -pdg::W]);
        tree.decay(products[1], &[pdg::MUON, -14]);
        tree.build()
    }

    #[test]
    fn mixed_decay_is_tagged() {
        let calc = TpTpCalc::new(ClassifierConfig::default());
        let record = calc.classify_particles(&tzbw_tree());
        assert_eq!(record.t_primes.len(), 2);
        assert!(record.b_primes.is_empty());
        assert_eq!(record.category, Some(Category::TzBw));
        assert_eq!(record.leptons.len(), 1);
        assert_eq!(record.leptons[0].parent_id, -pdg::W);
    }

    #[test]
    fn single_resonance_is_not_tagged() {
        let mut tree = GenTreeBuilder::new();
        let t_prime = tree.particle(pdg::T_PRIME, 22, Default::default());
        tree.decay(t_prime, &[pdg::TOP, pdg::Z]);
        let calc = TpTpCalc::new(ClassifierConfig::default());
        let record = calc.classify_particles(&tree.build());
        assert_eq!(record.quarks.len(), 1);
        assert_eq!(record.category, None);
    }

    #[test]
    fn missing_daughters_are_an_anomaly() {
        let mut tree = GenTreeBuilder::new();
        for code in [pdg::B_PRIME, -pdg::B_PRIME] {
            let b_prime = tree.particle(code, 22, Default::default());
            tree.decay(b_prime, &[pdg::Z]);
        }
        let calc = TpTpCalc::new(ClassifierConfig::default());
        let record = calc.classify_particles(&tree.build());
        assert_eq!(record.bosons.len(), 2);
        assert_eq!(record.category, None);
    }

    #[test]
    fn events_without_generator_record_publish_empty_fields() {
        let calc = TpTpCalc::new(ClassifierConfig::default());
        let record = calc.classify(&Event::new(EventId::default()));
        assert_eq!(record, DecayRecord::default());

        let mut content = EventContent::new();
        record.publish(&mut content);
        assert_eq!(content.get_int("NLeptonDecays"), Some(0));
        assert_eq!(content.get_bool("isTZBW"), Some(false));
    }
}
