//! Generator-level particle genealogy
//!
//! The decay tree of a simulated event is stored as a flat arena of particle
//! records, where mother and daughter relationships are indices into that
//! arena. Indices are checked once, when the arena is built, so that tree
//! walks can follow them without further validation.

use crate::{kinematics::Kinematics, Result};

use eyre::ensure;
use serde::{Deserialize, Serialize};

/// Index of a particle inside its event's particle arena
pub type ParticleIndex = usize;

/// Generator-level particle
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct GenParticle {
    /// Particle Data Group identifier (signed: negative for antiparticles)
    pub pdg_id: i32,

    /// Generator status code
    #[serde(default)]
    pub status: i32,

    /// Particle kinematics
    pub p4: Kinematics,

    /// Index of the (first) mother particle, if any
    #[serde(default)]
    pub mother: Option<ParticleIndex>,

    /// Indices of the daughter particles, in generator order
    #[serde(default)]
    pub daughters: Vec<ParticleIndex>,
}

/// Immutable arena of the generator particles of one event
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "Vec<GenParticle>", into = "Vec<GenParticle>")]
pub struct GenParticles(Vec<GenParticle>);
//
impl GenParticles {
    /// Build the arena, checking that every relationship index is in range
    pub fn new(particles: Vec<GenParticle>) -> Result<Self> {
        let len = particles.len();
        for (idx, particle) in particles.iter().enumerate() {
            if let Some(mother) = particle.mother {
                ensure!(
                    mother < len,
                    "Particle {} has out-of-range mother index {} (arena size {})",
                    idx,
                    mother,
                    len
                );
            }
            for &daughter in &particle.daughters {
                ensure!(
                    daughter < len,
                    "Particle {} has out-of-range daughter index {} (arena size {})",
                    idx,
                    daughter,
                    len
                );
            }
        }
        Ok(Self(particles))
    }

    /// Number of particles
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Truth that there is no particle
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Access a particle by index
    pub fn get(&self, idx: ParticleIndex) -> Option<&GenParticle> {
        self.0.get(idx)
    }

    /// Iterate over all particles, along with their indices
    pub fn iter(&self) -> impl Iterator<Item = (ParticleIndex, &GenParticle)> {
        self.0.iter().enumerate()
    }

    /// Iterate over the daughters of a particle, in generator order
    pub fn daughters(
        &self,
        idx: ParticleIndex,
    ) -> impl Iterator<Item = (ParticleIndex, &GenParticle)> + '_ {
        self.0
            .get(idx)
            .map(|particle| particle.daughters.as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |&daughter| (daughter, &self.0[daughter]))
    }

    /// Mother of a particle, if it has one
    pub fn mother(&self, idx: ParticleIndex) -> Option<&GenParticle> {
        self.get(idx)
            .and_then(|particle| particle.mother)
            .map(|mother| &self.0[mother])
    }
}
//
impl TryFrom<Vec<GenParticle>> for GenParticles {
    type Error = eyre::Report;

    fn try_from(particles: Vec<GenParticle>) -> Result<Self> {
        Self::new(particles)
    }
}
//
impl From<GenParticles> for Vec<GenParticle> {
    fn from(particles: GenParticles) -> Self {
        particles.0
    }
}

/// Incremental construction of consistent decay trees
///
/// Mother and daughter links are always set together.
///
#[derive(Debug, Default)]
pub struct GenTreeBuilder {
    /// Particles created so far
    particles: Vec<GenParticle>,
}
//
impl GenTreeBuilder {
    /// Start an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a particle without any relationship, returning its index
    pub fn particle(&mut self, pdg_id: i32, status: i32, p4: Kinematics) -> ParticleIndex {
        self.particles.push(GenParticle {
            pdg_id,
            status,
            p4,
            mother: None,
            daughters: Vec::new(),
        });
        self.particles.len() - 1
    }

    /// Add a daughter to an existing particle, returning the daughter index
    pub fn daughter(
        &mut self,
        mother: ParticleIndex,
        pdg_id: i32,
        status: i32,
        p4: Kinematics,
    ) -> ParticleIndex {
        let idx = self.particle(pdg_id, status, p4);
        self.particles[idx].mother = Some(mother);
        self.particles[mother].daughters.push(idx);
        idx
    }

    /// Add several daughters with default kinematics, returning their indices
    pub fn decay(&mut self, mother: ParticleIndex, pdg_ids: &[i32]) -> Vec<ParticleIndex> {
        pdg_ids
            .iter()
            .map(|&pdg_id| self.daughter(mother, pdg_id, 1, Kinematics::default()))
            .collect()
    }

    /// Finish the tree
    pub fn build(self) -> GenParticles {
        // Relationships are only created through valid indices
        GenParticles(self.particles)
    }
}
