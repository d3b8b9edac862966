//! High-level trigger requirement
//!
//! Configured path names are matched as substrings of the full menu entry
//! names, so that version suffixes (`_v1`, `_v2`...) need not be spelled out.

use crate::event::TriggerResults;

use tracing::debug;

use std::collections::BTreeMap;

/// Trigger cut configuration
#[derive(Clone, Debug, PartialEq)]
pub struct TriggerConfig {
    /// Whether the trigger requirement is applied
    pub enabled: bool,

    /// Whether the full menu should be logged for the first event
    pub dump_menu: bool,

    /// Electron paths consulted for simulated events
    pub mc_paths_el: Vec<String>,

    /// Muon paths consulted for simulated events
    pub mc_paths_mu: Vec<String>,

    /// Electron paths consulted for real data
    pub data_paths_el: Vec<String>,

    /// Muon paths consulted for real data
    pub data_paths_mu: Vec<String>,
}
//
impl Default for TriggerConfig {
    /// Dilepton and single-lepton paths of the 2017 menu
    fn default() -> Self {
        let paths = |names: &[&str]| names.iter().map(|&name| name.to_owned()).collect();
        Self {
            enabled: true,
            dump_menu: false,
            mc_paths_el: paths(&[
                "HLT_Ele23_Ele12_CaloIdL_TrackIdL_IsoVL_v",
                "HLT_Ele23_Ele12_CaloIdL_TrackIdL_IsoVL_DZ_v",
                "HLT_Mu8_TrkIsoVVL_Ele23_CaloIdL_TrackIdL_IsoVL_v",
                "HLT_Mu8_TrkIsoVVL_Ele23_CaloIdL_TrackIdL_IsoVL_DZ",
                "HLT_Mu23_TrkIsoVVL_Ele12_CaloIdL_TrackIdL_IsoVL_v",
                "HLT_Mu23_TrkIsoVVL_Ele12_CaloIdL_TrackIdL_IsoVL_DZ_v",
                "HLT_Ele27_WPTight_Gsf_v",
                "HLT_Ele35_WPTight_Gsf_v",
            ]),
            mc_paths_mu: paths(&[
                "HLT_Mu8_TrkIsoVVL_Ele23_CaloIdL_TrackIdL_IsoVL_v",
                "HLT_Mu8_TrkIsoVVL_Ele23_CaloIdL_TrackIdL_IsoVL_DZ",
                "HLT_Mu23_TrkIsoVVL_Ele12_CaloIdL_TrackIdL_IsoVL_v",
                "HLT_Mu23_TrkIsoVVL_Ele12_CaloIdL_TrackIdL_IsoVL_DZ_v",
                "HLT_Mu17_TrkIsoVVL_Mu8_TrkIsoVVL_v",
                "HLT_Mu17_TrkIsoVVL_Mu8_TrkIsoVVL_DZ_v",
                "HLT_Mu17_TrkIsoVVL_Mu8_TrkIsoVVL_DZ_Mass3p8_v",
                "HLT_Mu17_TrkIsoVVL_TkMu8_TrkIsoVVL_v",
                "HLT_Mu17_TrkIsoVVL_TkMu8_TrkIsoVVL_DZ_v",
                "HLT_IsoMu24_v",
                "HLT_IsoTkMu24_v",
                "HLT_IsoMu27_v",
            ]),
            data_paths_el: Vec::new(),
            data_paths_mu: Vec::new(),
        }
    }
}

/// Outcome of matching one list of configured paths against a menu
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathMatch {
    /// Whether any configured path fired
    pub fired: bool,

    /// For every configured path found in the menu, whether it fired
    pub paths: BTreeMap<String, bool>,
}

/// Per-path trigger decisions of one event, for downstream consumers
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TriggerDecisions {
    /// Simulation electron paths
    pub mc_el: BTreeMap<String, bool>,

    /// Simulation muon paths
    pub mc_mu: BTreeMap<String, bool>,

    /// Data electron paths
    pub data_el: BTreeMap<String, bool>,

    /// Data muon paths
    pub data_mu: BTreeMap<String, bool>,
}

/// Match a list of configured paths against the trigger menu
///
/// A configured path matches every menu entry which contains it. It is
/// considered fired if at least one of those entries accepted the event.
/// Empty names are placeholders and never match anything.
///
pub fn match_paths(menu: &TriggerResults, configured: &[String]) -> PathMatch {
    let mut result = PathMatch::default();
    for wanted in configured.iter().filter(|name| !name.is_empty()) {
        for entry in menu.iter().filter(|entry| entry.name.contains(wanted.as_str())) {
            let fired = result.paths.entry(wanted.clone()).or_insert(false);
            if entry.accept {
                debug!("\t\tfired {}", entry.name);
                *fired = true;
                result.fired = true;
            }
        }
    }
    result
}

/// Evaluate the trigger requirement
///
/// Both the simulation and data lists are matched so that the per-path
/// decisions are always available, but only the lists matching the kind of
/// event decide whether the requirement is satisfied.
///
pub fn evaluate(
    cfg: &TriggerConfig,
    menu: &TriggerResults,
    is_mc: bool,
) -> (bool, TriggerDecisions) {
    debug!("\tIn MC El trig list:");
    let mc_el = match_paths(menu, &cfg.mc_paths_el);
    debug!("\tIn MC Mu trig list:");
    let mc_mu = match_paths(menu, &cfg.mc_paths_mu);
    debug!("\tIn Data El trig list:");
    let data_el = match_paths(menu, &cfg.data_paths_el);
    debug!("\tIn Data Mu trig list:");
    let data_mu = match_paths(menu, &cfg.data_paths_mu);

    let pass = if is_mc {
        mc_el.fired || mc_mu.fired
    } else {
        data_el.fired || data_mu.fired
    };

    let decisions = TriggerDecisions {
        mc_el: mc_el.paths,
        mc_mu: mc_mu.paths,
        data_el: data_el.paths,
        data_mu: data_mu.paths,
    };
    (pass, decisions)
}
