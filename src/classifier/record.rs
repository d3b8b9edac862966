//! Per-event output of the decay chain classification

use super::category::{Category, ResonanceKind};
use crate::{
    kinematics::Kinematics,
    numeric::Float,
    sink::{OutputSink, Value},
};

/// Heavy quark partner found in the generator record
#[derive(Clone, Debug, PartialEq)]
pub struct Resonance {
    /// Generator status code
    pub status: i32,

    /// Signed particle code
    pub pdg_id: i32,

    /// Kinematics (before any radiation, when the generator made copies)
    pub p4: Kinematics,

    /// Number of direct daughters
    pub num_daughters: usize,
}

/// Quark or boson produced by a resonance decay
#[derive(Clone, Debug, PartialEq)]
pub struct DecayProduct {
    /// Signed particle code
    pub pdg_id: i32,

    /// Kinematics
    pub p4: Kinematics,
}

/// Terminal decay product of a boson
#[derive(Clone, Debug, PartialEq)]
pub struct BosonDecay {
    /// Signed particle code
    pub pdg_id: i32,

    /// Position of the parent boson in `DecayRecord::bosons`
    pub boson_index: usize,

    /// Kinematics
    pub p4: Kinematics,
}

/// Charged lepton ending a top or boson decay chain
#[derive(Clone, Debug, PartialEq)]
pub struct LeafLepton {
    /// Signed particle code
    pub pdg_id: i32,

    /// Signed code of the resonance daughter (quark or boson) whose chain
    /// produced the lepton
    pub parent_id: i32,

    /// Kinematics
    pub p4: Kinematics,
}

/// Everything the classifier learned about one event
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecayRecord {
    /// T' resonances
    pub t_primes: Vec<Resonance>,

    /// B' resonances
    pub b_primes: Vec<Resonance>,

    /// Quark daughters of the resonances
    pub quarks: Vec<DecayProduct>,

    /// Boson daughters of the resonances
    pub bosons: Vec<DecayProduct>,

    /// Decay products of the W bosons
    pub w_decays: Vec<BosonDecay>,

    /// Decay products of the Z bosons
    pub z_decays: Vec<BosonDecay>,

    /// Decay products of the Higgs bosons
    pub h_decays: Vec<BosonDecay>,

    /// Charged leptons from top and boson decays
    pub leptons: Vec<LeafLepton>,

    /// Final-state category, if one could be recognized
    pub category: Option<Category>,
}
//
impl DecayRecord {
    /// Resonances of one kind
    pub fn resonances(&self, kind: ResonanceKind) -> &[Resonance] {
        match kind {
            ResonanceKind::TPrime => &self.t_primes,
            ResonanceKind::BPrime => &self.b_primes,
        }
    }

    /// Truth that an event was tagged with a given category
    pub fn is(&self, category: Category) -> bool {
        self.category == Some(category)
    }

    /// Publish every output field, whether or not anything was found
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn publish(&self, sink: &mut dyn OutputSink) {
        sink.set_value("NLeptonDecays", Value::Int(self.leptons.len() as i32));
        sink.set_value("LeptonID", ints(&self.leptons, |lep| lep.pdg_id));
        sink.set_value("LeptonParentID", ints(&self.leptons, |lep| lep.parent_id));
        publish_kinematics(sink, "Lepton", &self.leptons, |lep| &lep.p4);

        for (kind, categories) in [
            (ResonanceKind::TPrime, Category::T_PRIME),
            (ResonanceKind::BPrime, Category::B_PRIME),
        ] {
            let prefix = kind.field_prefix();
            let resonances = self.resonances(kind);
            let field = |name: &str| format!("{}{}", prefix, name);
            sink.set_value(&field("Status"), ints(resonances, |res| res.status));
            sink.set_value(&field("ID"), ints(resonances, |res| res.pdg_id));
            sink.set_value(&field("Mass"), floats(resonances, |res| res.p4.mass));
            publish_kinematics(sink, prefix, resonances, |res| &res.p4);
            sink.set_value(
                &field("NDaughters"),
                ints(resonances, |res| res.num_daughters as i32),
            );
            for category in categories {
                sink.set_value(category.field_name(), Value::Bool(self.is(category)));
            }
        }

        for (prefix, products) in [("quark", &self.quarks), ("boson", &self.bosons)] {
            sink.set_value(&format!("{}ID", prefix), ints(products, |prod| prod.pdg_id));
            publish_kinematics(sink, prefix, products, |prod| &prod.p4);
        }

        for (prefix, decays) in [
            ("Wdecay", &self.w_decays),
            ("Zdecay", &self.z_decays),
            ("Hdecay", &self.h_decays),
        ] {
            sink.set_value(&format!("{}ID", prefix), ints(decays, |dec| dec.pdg_id));
            sink.set_value(
                &format!("{}Index", prefix),
                ints(decays, |dec| dec.boson_index as i32),
            );
            publish_kinematics(sink, prefix, decays, |dec| &dec.p4);
        }
    }
}

/// Integer column
fn ints<T>(items: &[T], column: impl Fn(&T) -> i32) -> Value {
    Value::Ints(items.iter().map(column).collect())
}

/// Floating-point column
fn floats<T>(items: &[T], column: impl Fn(&T) -> Float) -> Value {
    Value::Floats(items.iter().map(column).collect())
}

/// Publish the Pt, Eta, Phi and Energy columns of a list of objects
fn publish_kinematics<T>(
    sink: &mut dyn OutputSink,
    prefix: &str,
    items: &[T],
    p4: impl Fn(&T) -> &Kinematics,
) {
    sink.set_value(&format!("{}Pt", prefix), floats(items, |item| p4(item).pt));
    sink.set_value(&format!("{}Eta", prefix), floats(items, |item| p4(item).eta));
    sink.set_value(&format!("{}Phi", prefix), floats(items, |item| p4(item).phi));
    sink.set_value(
        &format!("{}Energy", prefix),
        floats(items, |item| p4(item).energy),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::EventContent;

    #[test]
    fn empty_records_publish_every_field() {
        let mut content = EventContent::new();
        DecayRecord::default().publish(&mut content);

        assert_eq!(content.get_int("NLeptonDecays"), Some(0));
        for name in ["LeptonID", "tPrimeStatus", "bPrimeNDaughters", "quarkID", "HdecayIndex"] {
            assert_eq!(content.get_ints(name), Some(&[][..]), "{}", name);
        }
        for name in ["LeptonPt", "tPrimeMass", "bosonEnergy", "WdecayPhi", "ZdecayEta"] {
            assert_eq!(content.get_floats(name), Some(&[][..]), "{}", name);
        }
        for category in Category::T_PRIME.iter().chain(&Category::B_PRIME) {
            assert_eq!(content.get_bool(category.field_name()), Some(false));
        }
        // 7 lepton, 2x(8 + 6) resonance, 2x5 daughter and 3x6 boson decay fields
        assert_eq!(content.len(), 7 + 28 + 10 + 18);
    }

    #[test]
    fn columns_follow_list_order() {
        let lepton = |pdg_id, parent_id, pt| LeafLepton {
            pdg_id,
            parent_id,
            p4: Kinematics {
                pt,
                ..Kinematics::default()
            },
        };
        let record = DecayRecord {
            leptons: vec![lepton(13, 24, 50.), lepton(-11, 6, 20.)],
            z_decays: vec![BosonDecay {
                pdg_id: 5,
                boson_index: 1,
                p4: Kinematics::default(),
            }],
            category: Some(Category::TzBw),
            ..DecayRecord::default()
        };
        let mut content = EventContent::new();
        record.publish(&mut content);

        assert_eq!(content.get_int("NLeptonDecays"), Some(2));
        assert_eq!(content.get_ints("LeptonID"), Some(&[13, -11][..]));
        assert_eq!(content.get_ints("LeptonParentID"), Some(&[24, 6][..]));
        assert_eq!(content.get_floats("LeptonPt"), Some(&[50., 20.][..]));
        assert_eq!(content.get_ints("ZdecayIndex"), Some(&[1][..]));
        assert_eq!(content.get_bool("isTZBW"), Some(true));
        assert_eq!(content.get_bool("isBZTW"), Some(false));
    }
}
