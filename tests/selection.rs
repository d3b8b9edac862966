//! End-to-end checks of the multi-lepton cut chain

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use vlq_select::{
    cutflow::{ALL_CUTS, NO_SELECTION},
    event::{
        Electron, Event, EventId, Met, Muon, MuonId, PfIsolation, TriggerResults, Vertex,
    },
    kinematics::{Kinematics, Momentum3, Position, Track},
    numeric::Float,
    selector::{
        metfilter::FLAG_NAMES,
        muon::{select_muons, MuonIdConfig},
        trigger::{self, TriggerConfig},
        vertex::{VertexSelection, VertexSelector},
        MultiLepSelector, SelectorConfig, LEPTONS, MET, MET_FILTERS, PRIMARY_VERTEX, TRIGGER,
    },
    Result,
};

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// Vertex selector which counts how often it is consulted
struct CountingVertexSelector {
    calls: Arc<AtomicUsize>,
}
//
impl VertexSelector for CountingVertexSelector {
    fn select(&self, _event: &Event) -> Result<VertexSelection> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(VertexSelection {
            passed: true,
            vertices: vec![leading_vertex()],
        })
    }
}

fn leading_vertex() -> Vertex {
    Vertex {
        position: Position::new(0.01, 0.02, 0.1),
        ndof: 50.,
        is_fake: false,
    }
}

fn lepton_p4(pt: Float, eta: Float) -> Kinematics {
    Kinematics {
        pt,
        eta,
        ..Kinematics::default()
    }
}

fn identified_muon(pt: Float) -> Muon {
    Muon {
        p4: lepton_p4(pt, -1.1),
        id: MuonId {
            cut_based_loose: true,
            cut_based_tight: true,
            mini_iso_loose: true,
            mini_iso_tight: true,
        },
        ..Muon::default()
    }
}

fn config() -> SelectorConfig {
    SelectorConfig {
        is_mc: true,
        trigger: TriggerConfig {
            mc_paths_el: Vec::new(),
            mc_paths_mu: vec!["HLT_Mu".to_owned()],
            ..TriggerConfig::default()
        },
        ..SelectorConfig::default()
    }
}

/// Event which passes every cut of the default configuration
fn trilepton_event(cfg: &SelectorConfig) -> Event {
    Event::new(EventId {
        run: 297_050,
        lumi: 12,
        event: 7_001,
    })
    .with_triggers(
        &cfg.tags.hlt,
        TriggerResults::new([("HLT_Mu17_TrkIsoVVL_v5", true)]),
    )
    .with_triggers(
        &cfg.tags.met_filters,
        TriggerResults::new(FLAG_NAMES.map(|name| (name, true))),
    )
    .with_vertices(&cfg.pv.source, vec![leading_vertex()])
    .with_muons(
        &cfg.tags.muons,
        vec![identified_muon(55.), identified_muon(31.)],
    )
    .with_electrons(
        &cfg.tags.electrons,
        vec![Electron {
            p4: lepton_p4(27., 0.8),
        }],
    )
    .with_mets(&cfg.tags.met, vec![Met { pt: 60., phi: 1. }])
}

#[test]
fn failed_trigger_stops_the_chain() {
    let cfg = config();
    let calls = Arc::new(AtomicUsize::new(0));
    let pv_selector = Box::new(CountingVertexSelector {
        calls: calls.clone(),
    });
    let mut selector = MultiLepSelector::with_vertex_selector(cfg.clone(), pv_selector).unwrap();

    // Later collections are absent: touching them would be an error
    let event = Event::new(EventId::default()).with_triggers(
        &cfg.tags.hlt,
        TriggerResults::new([("HLT_Mu17_TrkIsoVVL_v5", false)]),
    );
    let selection = selector.evaluate(&event).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(!selection.passed());
    let passed: Vec<_> = selection
        .cutflow
        .iter()
        .filter(|&(_, bit)| bit)
        .map(|(name, _)| name)
        .collect();
    assert_eq!(passed, [NO_SELECTION]);
}

#[test]
fn all_cuts_requires_every_enabled_cut() {
    let mut cfg = config();
    cfg.met.enabled = true;
    cfg.met.max_met = 50.;
    let calls = Arc::new(AtomicUsize::new(0));
    let pv_selector = Box::new(CountingVertexSelector {
        calls: calls.clone(),
    });
    let mut selector = MultiLepSelector::with_vertex_selector(cfg.clone(), pv_selector).unwrap();

    let selection = selector.evaluate(&trilepton_event(&cfg)).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    for name in [NO_SELECTION, TRIGGER, PRIMARY_VERTEX, MET_FILTERS, LEPTONS] {
        assert!(selection.cutflow.passed(name), "{} should pass", name);
    }
    assert!(!selection.cutflow.passed(MET));
    assert!(!selection.cutflow.passed(ALL_CUTS));
    assert_eq!(selection.objects.leading_vertex(), Some(&leading_vertex()));
}

#[test]
fn disabled_trigger_always_passes() {
    let mut cfg = config();
    cfg.trigger.enabled = false;
    let event = trilepton_event(&cfg).with_triggers(
        &cfg.tags.hlt,
        TriggerResults::new([("HLT_Ele35_WPTight_Gsf_v7", false)]),
    );

    let mut selector = MultiLepSelector::new(cfg).unwrap();
    let selection = selector.evaluate(&event).unwrap();
    assert!(selection.cutflow.passed(TRIGGER));
    assert!(selection.passed());
}

#[test]
fn trigger_paths_match_by_substring() {
    let menu = TriggerResults::new([
        ("HLT_Ele27_WPTight_Gsf_v3", true),
        ("HLT_Mu17_TrkIsoVVL", true),
        ("HLT_IsoMu24_v4", false),
    ]);
    let cfg = TriggerConfig {
        mc_paths_el: Vec::new(),
        mc_paths_mu: vec!["HLT_Mu".to_owned()],
        data_paths_el: Vec::new(),
        data_paths_mu: Vec::new(),
        ..TriggerConfig::default()
    };

    let (mc_pass, decisions) = trigger::evaluate(&cfg, &menu, true);
    assert!(mc_pass);
    assert_eq!(decisions.mc_mu.get("HLT_Mu"), Some(&true));
    assert!(decisions.mc_el.is_empty());

    // Lists are independent: data events only look at the data lists
    let (data_pass, _) = trigger::evaluate(&cfg, &menu, false);
    assert!(!data_pass);
}

#[test]
fn missing_collections_are_errors() {
    let cfg = config();
    let event = Event::new(EventId::default())
        .with_triggers(
            &cfg.tags.hlt,
            TriggerResults::new([("HLT_Mu17_TrkIsoVVL_v5", true)]),
        )
        .with_vertices(&cfg.pv.source, vec![leading_vertex()]);
    let mut selector = MultiLepSelector::new(cfg).unwrap();
    let err = selector.evaluate(&event).err().unwrap();
    assert!(err.to_string().contains("TriggerResults::PAT"));
}

/// Muon with random kinematics, identification and isolation
fn random_muon(rng: &mut impl Rng) -> Muon {
    let pt = rng.gen_range(5.0..80.0);
    let phi: Float = rng.gen_range(-3.1..3.1);
    Muon {
        p4: lepton_p4(pt, rng.gen_range(-3.0..3.0)),
        track: Track {
            reference_point: Position::new(
                rng.gen_range(-0.3..0.3),
                rng.gen_range(-0.3..0.3),
                rng.gen_range(-3.0..3.0),
            ),
            momentum: Momentum3::new(pt * phi.cos(), pt * phi.sin(), rng.gen_range(-50.0..50.0)),
        },
        id: {
            // Tight identification always implies loose identification
            let cut_based_loose = rng.gen_bool(0.8);
            let mini_iso_loose = rng.gen_bool(0.8);
            MuonId {
                cut_based_loose,
                cut_based_tight: cut_based_loose && rng.gen_bool(0.7),
                mini_iso_loose,
                mini_iso_tight: mini_iso_loose && rng.gen_bool(0.7),
            }
        },
        isolation: PfIsolation {
            charged_hadron_pt: rng.gen_range(0.0..10.0),
            neutral_hadron_et: rng.gen_range(0.0..10.0),
            photon_et: rng.gen_range(0.0..10.0),
            pu_pt: rng.gen_range(0.0..10.0),
        },
    }
}

#[test]
fn tight_muons_are_loose_muons() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(0x5eed);
    for use_mini_iso in [true, false] {
        let cfg = MuonIdConfig {
            use_mini_iso,
            ..MuonIdConfig::default()
        };
        for _ in 0..200 {
            let muons: Vec<_> = (0..5).map(|_| random_muon(&mut rng)).collect();
            let vertex = leading_vertex();
            let selection = select_muons(&cfg, &muons, Some(&vertex));
            for idx in &selection.tight {
                assert!(selection.loose.contains(idx));
            }
        }
    }
}
