//! This module defines the properties and storage of collision events
//!
//! An event is supplied whole by the host. Every object collection is stored
//! under the input tag it was produced with, and retrieving a collection that
//! the event does not carry is an error which the caller must propagate.

use crate::{
    genparticle::GenParticles,
    kinematics::{Kinematics, Position, Track},
    numeric::Float,
    Result,
};

use eyre::eyre;
use serde::{Deserialize, Serialize};

use std::{collections::BTreeMap, fmt::Display};

/// Identifier of a collision event
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
pub struct EventId {
    /// Run number
    pub run: u32,

    /// Luminosity block
    pub lumi: u32,

    /// Event number
    pub event: u64,
}
//
impl Display for EventId {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(fmt, "{}:{}:{}", self.run, self.lumi, self.event)
    }
}

/// One entry of a trigger menu
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct TriggerPath {
    /// Full path name, including its version suffix
    pub name: String,

    /// Whether the path accepted the event
    pub accept: bool,
}

/// Decisions of every path in a trigger menu, in menu order
///
/// This also carries the per-event quality flags, which the framework
/// stores as pseudo-trigger paths.
///
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TriggerResults(Vec<TriggerPath>);
//
impl TriggerResults {
    /// Build a trigger menu from (name, decision) pairs
    pub fn new<S: Into<String>>(paths: impl IntoIterator<Item = (S, bool)>) -> Self {
        Self(
            paths
                .into_iter()
                .map(|(name, accept)| TriggerPath {
                    name: name.into(),
                    accept,
                })
                .collect(),
        )
    }

    /// Iterate over the menu entries
    pub fn iter(&self) -> impl Iterator<Item = &TriggerPath> {
        self.0.iter()
    }

    /// Number of paths in the menu
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Truth that the menu is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decision of the path with this exact name, if it is in the menu
    pub fn accept(&self, name: &str) -> Option<bool> {
        self.iter()
            .find(|path| path.name == name)
            .map(|path| path.accept)
    }
}

/// Reconstructed primary vertex candidate
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct Vertex {
    /// Vertex position (cm)
    pub position: Position,

    /// Number of degrees of freedom of the vertex fit
    pub ndof: Float,

    /// Whether this is the beam-spot fallback rather than a fitted vertex
    #[serde(default)]
    pub is_fake: bool,
}
//
impl Vertex {
    /// Transverse distance to the beam line
    pub fn rho(&self) -> Float {
        self.position.coords.xy().norm()
    }
}

/// Identification working points computed upstream for a muon
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MuonId {
    /// Loose cut-based identification
    pub cut_based_loose: bool,

    /// Tight cut-based identification
    pub cut_based_tight: bool,

    /// Loose mini-isolation working point
    pub mini_iso_loose: bool,

    /// Tight mini-isolation working point
    pub mini_iso_tight: bool,
}

/// Particle-flow isolation sums in a ΔR < 0.4 cone
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PfIsolation {
    /// Sum of charged hadron transverse momenta
    pub charged_hadron_pt: Float,

    /// Sum of neutral hadron transverse energies
    pub neutral_hadron_et: Float,

    /// Sum of photon transverse energies
    pub photon_et: Float,

    /// Sum of pile-up charged transverse momenta
    pub pu_pt: Float,
}

/// Reconstructed muon
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Muon {
    /// Muon kinematics
    pub p4: Kinematics,

    /// Best track of the muon
    #[serde(default)]
    pub track: Track,

    /// Identification flags
    #[serde(default)]
    pub id: MuonId,

    /// Isolation sums
    #[serde(default)]
    pub isolation: PfIsolation,
}
//
impl Muon {
    /// Δβ-corrected relative particle-flow isolation
    pub fn rel_iso(&self) -> Float {
        let iso = &self.isolation;
        let neutral = iso.neutral_hadron_et + iso.photon_et - 0.5 * iso.pu_pt;
        (iso.charged_hadron_pt + neutral.max(0.)) / self.p4.pt
    }
}

/// Reconstructed electron
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Electron {
    /// Electron kinematics
    pub p4: Kinematics,
}

/// Missing transverse energy
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Met {
    /// Magnitude (GeV)
    pub pt: Float,

    /// Azimuthal direction (rad)
    pub phi: Float,
}

/// Storage for one collision record, as handed over by the host
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Event {
    /// Event identifier
    pub id: EventId,

    /// Trigger menus and filter-flag menus
    #[serde(default)]
    triggers: BTreeMap<String, TriggerResults>,

    /// Standalone boolean event flags
    #[serde(default)]
    flags: BTreeMap<String, bool>,

    /// Primary vertex candidates
    #[serde(default)]
    vertices: BTreeMap<String, Vec<Vertex>>,

    /// Missing transverse energy objects
    #[serde(default)]
    mets: BTreeMap<String, Vec<Met>>,

    /// Muons
    #[serde(default)]
    muons: BTreeMap<String, Vec<Muon>>,

    /// Electrons
    #[serde(default)]
    electrons: BTreeMap<String, Vec<Electron>>,

    /// Generator-level particle trees (simulation only)
    #[serde(default)]
    gen_particles: BTreeMap<String, GenParticles>,
}
//
impl Event {
    /// Create an event which carries no collection yet
    pub fn new(id: EventId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    // ### COLLECTION STORAGE (HOST SIDE) ###

    /// Attach a trigger or filter-flag menu
    #[must_use]
    pub fn with_triggers(mut self, tag: &str, results: TriggerResults) -> Self {
        self.triggers.insert(tag.to_owned(), results);
        self
    }

    /// Attach a standalone boolean flag
    #[must_use]
    pub fn with_flag(mut self, tag: &str, value: bool) -> Self {
        self.flags.insert(tag.to_owned(), value);
        self
    }

    /// Attach primary vertex candidates
    #[must_use]
    pub fn with_vertices(mut self, tag: &str, vertices: Vec<Vertex>) -> Self {
        self.vertices.insert(tag.to_owned(), vertices);
        self
    }

    /// Attach missing transverse energy objects
    #[must_use]
    pub fn with_mets(mut self, tag: &str, mets: Vec<Met>) -> Self {
        self.mets.insert(tag.to_owned(), mets);
        self
    }

    /// Attach muons
    #[must_use]
    pub fn with_muons(mut self, tag: &str, muons: Vec<Muon>) -> Self {
        self.muons.insert(tag.to_owned(), muons);
        self
    }

    /// Attach electrons
    #[must_use]
    pub fn with_electrons(mut self, tag: &str, electrons: Vec<Electron>) -> Self {
        self.electrons.insert(tag.to_owned(), electrons);
        self
    }

    /// Attach a generator-level particle tree
    #[must_use]
    pub fn with_gen_particles(mut self, tag: &str, particles: GenParticles) -> Self {
        self.gen_particles.insert(tag.to_owned(), particles);
        self
    }

    // ### COLLECTION RETRIEVAL (CONSUMER SIDE) ###

    /// Event identifier
    pub fn id(&self) -> EventId {
        self.id
    }

    /// Trigger or filter-flag menu
    pub fn trigger_results(&self, tag: &str) -> Result<&TriggerResults> {
        fetch(&self.triggers, "trigger results", tag)
    }

    /// Standalone boolean flag, which is allowed to be absent
    pub fn flag(&self, tag: &str) -> Option<bool> {
        self.flags.get(tag).copied()
    }

    /// Primary vertex candidates
    pub fn vertices(&self, tag: &str) -> Result<&[Vertex]> {
        fetch(&self.vertices, "vertex", tag).map(Vec::as_slice)
    }

    /// Missing transverse energy objects
    pub fn mets(&self, tag: &str) -> Result<&[Met]> {
        fetch(&self.mets, "MET", tag).map(Vec::as_slice)
    }

    /// Muons
    pub fn muons(&self, tag: &str) -> Result<&[Muon]> {
        fetch(&self.muons, "muon", tag).map(Vec::as_slice)
    }

    /// Electrons
    pub fn electrons(&self, tag: &str) -> Result<&[Electron]> {
        fetch(&self.electrons, "electron", tag).map(Vec::as_slice)
    }

    /// Generator-level particle tree
    pub fn gen_particles(&self, tag: &str) -> Result<&GenParticles> {
        fetch(&self.gen_particles, "generator particle", tag)
    }
}

/// Look up a collection by input tag, reporting which one is missing
fn fetch<'event, T>(
    collections: &'event BTreeMap<String, T>,
    kind: &str,
    tag: &str,
) -> Result<&'event T> {
    collections
        .get(tag)
        .ok_or_else(|| eyre!("Event is missing the {} collection '{}'", kind, tag))
}
