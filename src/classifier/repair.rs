//! Recovery of the genuine quark daughters of a resonance pair
//!
//! Generator copies of the resonances can capture extra quarks (typically a
//! radiated b-bbar pair) between the two genuine daughters. The quark list
//! of a pair should hold one quark and one antiquark, so the list is
//! rearranged to bring an opposite-sign candidate and any top quark to the
//! front, where the categorization looks.

use super::record::DecayProduct;

use tracing::{debug, warn};

/// Reorder captured quark daughters so that the two genuine ones come first
///
/// This assumes that exactly two genuine quarks are present among at most
/// four candidates. Lists with fewer than two entries are left untouched.
///
pub fn repair_sibling_order(quarks: &mut [DecayProduct]) {
    if quarks.len() < 2 {
        warn!("Cannot repair a list of {} quark(s)", quarks.len());
        return;
    }

    // A b-bbar pair can sneak in between the daughters we want, so first
    // look for an opposite sign quark to put in the second slot
    if same_sign(&quarks[0], &quarks[1]) {
        if quarks.len() == 4 {
            quarks.swap(2, 3);
            debug!("Moved up an opposite sign quark: 3 --> 2");
        }
        if quarks.len() > 2 {
            quarks.swap(1, 2);
            debug!("Moved up an opposite sign quark: 2 --> 1");
        }
        if !same_sign(&quarks[0], &quarks[1]) {
            debug!("Signs are fixed!");
        }
    }

    // Then bring forward tops which come after a b-bbar pair, even if
    // the signs were fine
    if quarks.len() > 3 && is_top(&quarks[3]) {
        quarks.swap(2, 3);
        debug!("Moved up a top, 3 --> 2");
    }
    if quarks.len() > 2 && is_top(&quarks[2]) {
        quarks.swap(1, 2);
        debug!("Moved up a top, 2 --> 1");
    }
}

/// Truth that two quarks are both particles or both antiparticles
fn same_sign(q1: &DecayProduct, q2: &DecayProduct) -> bool {
    q1.pdg_id.signum() * q2.pdg_id.signum() > 0
}

/// Truth that a quark is a top quark
fn is_top(quark: &DecayProduct) -> bool {
    quark.pdg_id.abs() == crate::numeric::pdg::TOP
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::Kinematics;

    fn quarks(codes: &[i32]) -> Vec<DecayProduct> {
        codes
            .iter()
            .enumerate()
            .map(|(idx, &pdg_id)| DecayProduct {
                pdg_id,
                p4: Kinematics {
                    pt: idx as _,
                    ..Kinematics::default()
                },
            })
            .collect()
    }

    fn codes(quarks: &[DecayProduct]) -> Vec<i32> {
        quarks.iter().map(|quark| quark.pdg_id).collect()
    }

    #[test]
    fn same_sign_pair_with_trailing_tops() {
        // Sign repair gives [5, 6, 5, -6], then the trailing top moves up
        let mut list = quarks(&[5, 5, -6, 6]);
        repair_sibling_order(&mut list);
        assert_eq!(codes(&list), [5, -6, 6, 5]);
    }

    #[test]
    fn kinematics_follow_their_quark() {
        let mut list = quarks(&[5, 5, -6, 6]);
        repair_sibling_order(&mut list);
        let pts: Vec<_> = list.iter().map(|quark| quark.p4.pt).collect();
        assert_eq!(pts, [0., 2., 3., 1.]);
    }

    #[test]
    fn three_candidates() {
        let mut list = quarks(&[-5, -5, 5]);
        repair_sibling_order(&mut list);
        assert_eq!(codes(&list), [-5, 5, -5]);

        let mut list = quarks(&[6, -5, -6]);
        repair_sibling_order(&mut list);
        assert_eq!(codes(&list), [6, -6, -5]);
    }

    #[test]
    fn short_lists_are_untouched() {
        let mut list = quarks(&[5]);
        repair_sibling_order(&mut list);
        assert_eq!(codes(&list), [5]);
        repair_sibling_order(&mut []);
    }
}
