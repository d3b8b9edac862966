//! Multi-lepton event selection
//!
//! The selector evaluates an ordered chain of named cuts against one event.
//! The chain stops at the first enabled cut that fails, and a disabled cut
//! passes without running its logic. Objects selected along the way (primary
//! vertices, muons, electrons) feed the later cuts of the same event and are
//! returned to the caller along with the cutflow bits. Nothing but the
//! configuration and the first-event flag survives from one event to the next.

pub mod lepton;
pub mod met;
pub mod metfilter;
pub mod muon;
pub mod trigger;
pub mod vertex;

use crate::{
    cutflow::{CutSet, CutflowResult, ALL_CUTS, NO_SELECTION},
    event::{Event, Vertex},
    Result,
};

use self::{
    lepton::LeptonConfig,
    met::MetConfig,
    metfilter::MetFilterFlags,
    muon::MuonIdConfig,
    trigger::{TriggerConfig, TriggerDecisions},
    vertex::{PvConfig, PvSelector, VertexSelector},
};

use tracing::{debug, debug_span, info};

use std::sync::Arc;

/// Name under which the selector is registered
pub const SELECTOR_NAME: &str = "MultiLepSelector";

/// Trigger requirement
pub const TRIGGER: &str = "Trigger";

/// Primary vertex requirement
pub const PRIMARY_VERTEX: &str = "Primary Vertex";

/// MET quality filters
pub const MET_FILTERS: &str = "MET filters";

/// Lepton multiplicity requirement
pub const LEPTONS: &str = "Leptons";

/// MET window
pub const MET: &str = "MET";

/// Input tags of the collections read by the selector
#[derive(Clone, Debug, PartialEq)]
pub struct InputTags {
    /// High-level trigger menu
    pub hlt: String,

    /// MET filter flag menu
    pub met_filters: String,

    /// Re-run calibration filter decision (optional in events)
    pub met_filter_extra: String,

    /// MET objects
    pub met: String,

    /// Muons
    pub muons: String,

    /// Electrons
    pub electrons: String,
}
//
impl Default for InputTags {
    fn default() -> Self {
        Self {
            hlt: "TriggerResults::HLT".to_owned(),
            met_filters: "TriggerResults::PAT".to_owned(),
            met_filter_extra: "ecalBadCalibReducedMINIAODFilter".to_owned(),
            met: "slimmedMETs".to_owned(),
            muons: "slimmedMuons".to_owned(),
            electrons: "slimmedElectrons".to_owned(),
        }
    }
}

/// Complete selector configuration
#[derive(Clone, Debug, PartialEq)]
pub struct SelectorConfig {
    /// Verbose per-step tracing
    pub debug: bool,

    /// Whether events are simulated rather than real data
    pub is_mc: bool,

    /// Trigger requirement
    pub trigger: TriggerConfig,

    /// Primary vertex requirement
    pub pv: PvConfig,

    /// Whether the MET quality filters are applied
    pub met_filters: bool,

    /// MET window
    pub met: MetConfig,

    /// Tiered muon identification
    pub muon_id: MuonIdConfig,

    /// Lepton multiplicity requirement
    pub leptons: LeptonConfig,

    /// Input collections
    pub tags: InputTags,
}
//
impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            debug: false,
            is_mc: false,
            trigger: TriggerConfig::default(),
            pv: PvConfig::default(),
            met_filters: true,
            met: MetConfig::default(),
            muon_id: MuonIdConfig::default(),
            leptons: LeptonConfig::default(),
            tags: InputTags::default(),
        }
    }
}

/// Objects selected while evaluating one event
///
/// Muon and electron entries are indices into the event's collections.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectedObjects {
    /// Good primary vertices (leading one first)
    pub vertices: Vec<Vertex>,

    /// Muons passing the tight identification tier
    pub tight_muons: Vec<usize>,

    /// Muons passing the loose identification tier
    pub loose_muons: Vec<usize>,

    /// Muons passing the kinematic pre-selection
    pub muons: Vec<usize>,

    /// Electrons passing the kinematic pre-selection
    pub electrons: Vec<usize>,

    /// Per-path trigger decisions
    pub triggers: TriggerDecisions,
}
//
impl SelectedObjects {
    /// Leading primary vertex, if any was selected
    pub fn leading_vertex(&self) -> Option<&Vertex> {
        self.vertices.first()
    }
}

/// Outcome of the selection of one event
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    /// Cuts satisfied by the event
    pub cutflow: CutflowResult,

    /// Objects selected along the way
    pub objects: SelectedObjects,
}
//
impl Selection {
    /// Start an event with nothing satisfied and nothing selected
    fn new(cuts: Arc<CutSet>) -> Self {
        Self {
            cutflow: CutflowResult::new(cuts),
            objects: SelectedObjects::default(),
        }
    }

    /// Whether the event passed the whole selection
    pub fn passed(&self) -> bool {
        self.cutflow.passed_all()
    }
}

/// Multi-lepton event selector
pub struct MultiLepSelector {
    /// Selector configuration
    cfg: SelectorConfig,

    /// Cut chain, in evaluation order
    cuts: Arc<CutSet>,

    /// Primary vertex selection back-end
    pv_selector: Box<dyn VertexSelector>,

    /// Whether the next event is the first one seen by this instance
    first_event: bool,
}
//
impl MultiLepSelector {
    /// Set up the selector with the standard primary vertex selection
    pub fn new(cfg: SelectorConfig) -> Result<Self> {
        let pv_selector = Box::new(PvSelector::new(cfg.pv.clone()));
        Self::with_vertex_selector(cfg, pv_selector)
    }

    /// Set up the selector with a custom primary vertex selection
    pub fn with_vertex_selector(
        cfg: SelectorConfig,
        pv_selector: Box<dyn VertexSelector>,
    ) -> Result<Self> {
        info!("initializing {} selection", SELECTOR_NAME);

        let mut cuts = CutSet::new();
        for name in [TRIGGER, PRIMARY_VERTEX, MET_FILTERS, LEPTONS, MET] {
            cuts.push_back(name)?;
        }
        cuts.set(TRIGGER, cfg.trigger.enabled)?;
        cuts.set(PRIMARY_VERTEX, cfg.pv.enabled)?;
        cuts.set(MET_FILTERS, cfg.met_filters)?;
        cuts.set(LEPTONS, true)?;
        cuts.set(MET, cfg.met.enabled)?;

        Ok(Self {
            cfg,
            cuts: Arc::new(cuts.finish()),
            pv_selector,
            first_event: true,
        })
    }

    /// Cut chain, in evaluation order
    pub fn cuts(&self) -> &Arc<CutSet> {
        &self.cuts
    }

    /// Selector configuration
    pub fn config(&self) -> &SelectorConfig {
        &self.cfg
    }

    /// Evaluate the cut chain on one event
    ///
    /// A collection which the event lacks makes the whole evaluation fail.
    ///
    pub fn evaluate(&mut self, event: &Event) -> Result<Selection> {
        let span = debug_span!("select", event = %event.id());
        let _guard = span.enter();
        debug!("Processing Event in {}", SELECTOR_NAME);

        let mut selection = Selection::new(self.cuts.clone());
        let outcome = self.run_chain(event, &mut selection);
        self.first_event = false;
        outcome.map(|()| selection)
    }

    /// Walk down the cut chain, stopping at the first failure
    fn run_chain(&self, event: &Event, selection: &mut Selection) -> Result<()> {
        selection.cutflow.pass_cut(NO_SELECTION);

        if !self.trigger_selection(event, &mut selection.objects)? {
            return Ok(());
        }
        selection.cutflow.pass_cut(TRIGGER);

        if !self.pv_selection(event, &mut selection.objects)? {
            return Ok(());
        }
        selection.cutflow.pass_cut(PRIMARY_VERTEX);

        if !self.met_filter_selection(event)? {
            return Ok(());
        }
        selection.cutflow.pass_cut(MET_FILTERS);

        self.muon_selection(event, &mut selection.objects)?;
        if !self.lepton_selection(event, &mut selection.objects)? {
            return Ok(());
        }
        selection.cutflow.pass_cut(LEPTONS);

        if !self.met_selection(event)? {
            return Ok(());
        }
        selection.cutflow.pass_cut(MET);

        selection.cutflow.pass_cut(ALL_CUTS);
        Ok(())
    }

    /// Trigger cut
    fn trigger_selection(&self, event: &Event, objects: &mut SelectedObjects) -> Result<bool> {
        if !self.cuts.is_enabled(TRIGGER) {
            debug!("\tIGNORING TriggerSelection");
            return Ok(true);
        }
        debug!("\tTriggerSelection:");

        let menu = event.trigger_results(&self.cfg.tags.hlt)?;
        if self.first_event && self.cfg.trigger.dump_menu {
            info!("Dumping available HLT paths in dataset:");
            for path in menu.iter() {
                info!("{}", path.name);
            }
        }

        let (pass, decisions) = trigger::evaluate(&self.cfg.trigger, menu, self.cfg.is_mc);
        objects.triggers = decisions;
        Ok(pass)
    }

    /// Primary vertex cut
    fn pv_selection(&self, event: &Event, objects: &mut SelectedObjects) -> Result<bool> {
        if !self.cuts.is_enabled(PRIMARY_VERTEX) {
            debug!("\tIGNORING PVSelection");
            return Ok(true);
        }
        debug!("\tPVSelection:");

        let selection = self.pv_selector.select(event)?;
        if selection.passed {
            objects.vertices = selection.vertices;
        } else {
            debug!("\t\tNo selected PV.");
        }
        Ok(selection.passed)
    }

    /// MET quality filter cut
    fn met_filter_selection(&self, event: &Event) -> Result<bool> {
        if !self.cuts.is_enabled(MET_FILTERS) {
            debug!("\tIGNORING MET Filter selection");
            return Ok(true);
        }
        debug!("\tMETFilterSelection:");

        let results = event.trigger_results(&self.cfg.tags.met_filters)?;
        let flags = MetFilterFlags::from_results(results)
            .with_calibration_override(event.flag(&self.cfg.tags.met_filter_extra));
        let pass = flags.pass(self.cfg.is_mc);
        debug!("\t\t{} MET Filter selection.", if pass { "Passes" } else { "Fails" });
        Ok(pass)
    }

    /// Tiered muon identification (does not decide on the event by itself)
    fn muon_selection(&self, event: &Event, objects: &mut SelectedObjects) -> Result<()> {
        let muons = event.muons(&self.cfg.tags.muons)?;
        let selection = muon::select_muons(&self.cfg.muon_id, muons, objects.leading_vertex());
        objects.tight_muons = selection.tight;
        objects.loose_muons = selection.loose;
        Ok(())
    }

    /// Lepton multiplicity cut
    fn lepton_selection(&self, event: &Event, objects: &mut SelectedObjects) -> Result<bool> {
        debug!("\tLeptonsSelection:");
        let leptons = &self.cfg.leptons;

        let muons = event.muons(&self.cfg.tags.muons)?;
        objects.muons = leptons.muon.preselect(muons, |muon| &muon.p4);

        let electrons = event.electrons(&self.cfg.tags.electrons)?;
        objects.electrons = leptons.electron.preselect(electrons, |electron| &electron.p4);

        let num_leptons = objects.muons.len() + objects.electrons.len();
        debug!(
            "\t\tnSelMu = {} nSelEl = {}",
            objects.muons.len(),
            objects.electrons.len()
        );
        Ok(num_leptons >= leptons.min_leptons)
    }

    /// MET window cut
    fn met_selection(&self, event: &Event) -> Result<bool> {
        if !self.cuts.is_enabled(MET) {
            debug!("\tIGNORING MET selection");
            return Ok(true);
        }
        debug!("\tMET Selection:");

        let mets = event.mets(&self.cfg.tags.met)?;
        Ok(self.cfg.met.passes(mets))
    }
}
