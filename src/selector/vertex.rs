//! Primary vertex selection

use crate::{
    event::{Event, Vertex},
    numeric::Float,
    Result,
};

use tracing::debug;

/// Outcome of a primary vertex selection
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VertexSelection {
    /// Whether enough good vertices were found
    pub passed: bool,

    /// Good vertices, in input order (the leading one comes first)
    pub vertices: Vec<Vertex>,
}

/// Anything which can pick primary vertices out of an event
pub trait VertexSelector: Send {
    /// Select the good primary vertices of an event
    fn select(&self, event: &Event) -> Result<VertexSelection>;
}

/// Primary vertex quality requirements
#[derive(Clone, Debug, PartialEq)]
pub struct PvConfig {
    /// Whether the primary vertex requirement is applied
    pub enabled: bool,

    /// Input tag of the vertex collection
    pub source: String,

    /// Minimal number of good vertices
    pub npv: usize,

    /// Minimal number of degrees of freedom of the vertex fit
    pub min_ndof: Float,

    /// Maximal longitudinal distance to the detector center (cm)
    pub max_z: Float,

    /// Maximal transverse distance to the beam line (cm)
    pub max_rho: Float,
}
//
impl Default for PvConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            source: "offlineSlimmedPrimaryVertices".to_owned(),
            npv: 1,
            min_ndof: 4.,
            max_z: 24.,
            max_rho: 2.,
        }
    }
}

/// Standard good-vertex selector
#[derive(Clone, Debug)]
pub struct PvSelector {
    /// Quality requirements
    cfg: PvConfig,
}
//
impl PvSelector {
    /// Set up the selector
    pub fn new(cfg: PvConfig) -> Self {
        Self { cfg }
    }

    /// Whether a single vertex is good
    pub fn is_good(&self, vertex: &Vertex) -> bool {
        !vertex.is_fake
            && vertex.ndof >= self.cfg.min_ndof
            && vertex.position.z.abs() <= self.cfg.max_z
            && vertex.rho() <= self.cfg.max_rho
    }
}
//
impl VertexSelector for PvSelector {
    fn select(&self, event: &Event) -> Result<VertexSelection> {
        let vertices: Vec<Vertex> = event
            .vertices(&self.cfg.source)?
            .iter()
            .filter(|vertex| self.is_good(vertex))
            .copied()
            .collect();
        debug!("\t\tnum of selected PV = {}", vertices.len());
        Ok(VertexSelection {
            passed: vertices.len() >= self.cfg.npv,
            vertices,
        })
    }
}
