//! Event quality filters recommended for missing transverse energy studies

use crate::event::TriggerResults;

/// Names of the filter flags, in the order of `MetFilterFlags::from`
pub const FLAG_NAMES: [&str; 9] = [
    "Flag_goodVertices",
    "Flag_globalSuperTightHalo2016Filter",
    "Flag_HBHENoiseFilter",
    "Flag_HBHENoiseIsoFilter",
    "Flag_EcalDeadCellTriggerPrimitiveFilter",
    "Flag_BadPFMuonFilter",
    "Flag_BadChargedCandidateFilter",
    "Flag_eeBadScFilter",
    "Flag_ecalBadCalibFilter",
];

/// Decisions of the MET quality filters for one event
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MetFilterFlags {
    /// Good primary vertex filter
    pub good_vertices: bool,

    /// Beam halo filter
    pub global_super_tight_halo: bool,

    /// HCAL barrel/endcap noise filter
    pub hbhe_noise: bool,

    /// HCAL barrel/endcap isolated noise filter
    pub hbhe_noise_iso: bool,

    /// ECAL dead cell trigger primitive filter
    pub ecal_dead_cell: bool,

    /// Bad particle-flow muon filter
    pub bad_pf_muon: bool,

    /// Bad charged hadron filter
    pub bad_charged_candidate: bool,

    /// ECAL endcap bad supercluster filter (not applied to simulation)
    pub ee_bad_sc: bool,

    /// ECAL bad calibration filter
    pub ecal_bad_calib: bool,
}
//
impl MetFilterFlags {
    /// Read the flags from the filter menu, absent flags counting as failed
    pub fn from_results(results: &TriggerResults) -> Self {
        Self::from(FLAG_NAMES.map(|name| results.accept(name).unwrap_or(false)))
    }

    /// Replace the calibration filter decision with a re-run one, if any
    #[must_use]
    pub fn with_calibration_override(mut self, rerun: Option<bool>) -> Self {
        if let Some(decision) = rerun {
            self.ecal_bad_calib = decision;
        }
        self
    }

    /// Whether the event passes every filter which applies to it
    pub fn pass(&self, is_mc: bool) -> bool {
        self.good_vertices
            && self.global_super_tight_halo
            && self.hbhe_noise
            && self.hbhe_noise_iso
            && self.ecal_dead_cell
            && self.bad_pf_muon
            && self.bad_charged_candidate
            && (is_mc || self.ee_bad_sc)
            && self.ecal_bad_calib
    }
}
//
impl From<[bool; 9]> for MetFilterFlags {
    /// Build from decisions listed in `FLAG_NAMES` order
    fn from(flags: [bool; 9]) -> Self {
        let [good_vertices, global_super_tight_halo, hbhe_noise, hbhe_noise_iso, ecal_dead_cell, bad_pf_muon, bad_charged_candidate, ee_bad_sc, ecal_bad_calib] =
            flags;
        Self {
            good_vertices,
            global_super_tight_halo,
            hbhe_noise,
            hbhe_noise_iso,
            ecal_dead_cell,
            bad_pf_muon,
            bad_charged_candidate,
            ee_bad_sc,
            ecal_bad_calib,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supercluster_filter_only_applies_to_data() {
        let flags = MetFilterFlags::from([true, true, true, true, true, true, true, false, true]);
        assert!(flags.pass(true));
        assert!(!flags.pass(false));
    }

    #[test]
    fn every_other_flag_is_required() {
        for failing in (0..FLAG_NAMES.len()).filter(|&idx| FLAG_NAMES[idx] != "Flag_eeBadScFilter") {
            let mut decisions = [true; 9];
            decisions[failing] = false;
            let flags = MetFilterFlags::from(decisions);
            assert!(!flags.pass(true), "{} should be required", FLAG_NAMES[failing]);
        }
    }

    #[test]
    fn flags_come_from_the_filter_menu() {
        let mut menu: Vec<(&str, bool)> = FLAG_NAMES.iter().map(|&name| (name, true)).collect();
        menu.push(("Flag_METFilters", false));
        let flags = MetFilterFlags::from_results(&TriggerResults::new(menu.clone()));
        assert!(flags.pass(false));

        // A flag missing from the menu counts as failed
        menu.retain(|(name, _)| *name != "Flag_HBHENoiseFilter");
        let flags = MetFilterFlags::from_results(&TriggerResults::new(menu));
        assert!(!flags.hbhe_noise);
        assert!(!flags.pass(true));
    }

    #[test]
    fn calibration_override_replaces_menu_decision() {
        let flags = MetFilterFlags::from([true; 9]);
        assert!(!flags.with_calibration_override(Some(false)).pass(true));
        assert!(flags.with_calibration_override(None).pass(true));

        let mut decisions = [true; 9];
        decisions[8] = false;
        let flags = MetFilterFlags::from(decisions).with_calibration_override(Some(true));
        assert!(flags.pass(false));
    }
}
