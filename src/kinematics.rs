//! This module implements some domain-specific kinematics handling logic:
//! collider-frame 4-momenta and straight-line track impact parameters.

use crate::numeric::Float;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Position in the detector frame (cm)
pub type Position = Point3<Float>;

/// Spatial 3-momentum (GeV)
pub type Momentum3 = Vector3<Float>;

/// Collider-frame kinematics of a particle or reconstructed object
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Kinematics {
    /// Transverse momentum (GeV)
    pub pt: Float,

    /// Pseudorapidity
    pub eta: Float,

    /// Azimuthal angle (rad)
    pub phi: Float,

    /// Energy (GeV)
    #[serde(default)]
    pub energy: Float,

    /// Invariant mass (GeV)
    #[serde(default)]
    pub mass: Float,
}
//
impl Kinematics {
    /// Build kinematics from transverse momentum and direction, the energy
    /// being deduced from the mass
    pub fn from_pt_eta_phi_m(pt: Float, eta: Float, phi: Float, mass: Float) -> Self {
        let p = pt * eta.cosh();
        Self {
            pt,
            eta,
            phi,
            energy: (p * p + mass * mass).sqrt(),
            mass,
        }
    }
}

/// Straight-line approximation of a reconstructed track near the beam line
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct Track {
    /// Point of closest approach to the beam line
    pub reference_point: Position,

    /// Momentum at the reference point
    pub momentum: Momentum3,
}
//
impl Track {
    /// Transverse momentum of the track
    pub fn pt(&self) -> Float {
        self.momentum.xy().norm()
    }

    /// Transverse impact parameter with respect to a vertex
    pub fn dxy(&self, vertex: &Position) -> Float {
        let d = self.reference_point - *vertex;
        let p = &self.momentum;
        (-d.x * p.y + d.y * p.x) / self.pt()
    }

    /// Longitudinal impact parameter with respect to a vertex
    pub fn dz(&self, vertex: &Position) -> Float {
        let d = self.reference_point - *vertex;
        let p = &self.momentum;
        let pt = self.pt();
        d.z - (d.x * p.x + d.y * p.y) / pt * (p.z / pt)
    }
}
//
impl Default for Track {
    /// A track coming out of the detector origin along the x axis
    fn default() -> Self {
        Self {
            reference_point: Position::origin(),
            momentum: Momentum3::x(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn impact_parameters_vanish_for_tracks_through_the_vertex() {
        let vertex = Position::new(0.01, -0.02, 1.5);
        let track = Track {
            reference_point: vertex,
            momentum: Momentum3::new(10., 5., 3.),
        };
        assert_relative_eq!(track.dxy(&vertex), 0.);
        assert_relative_eq!(track.dz(&vertex), 0.);
    }

    #[test]
    fn transverse_offset_shows_up_in_dxy_only() {
        // Track going along x, displaced by 0.1 along y
        let track = Track {
            reference_point: Position::new(0., 0.1, 0.),
            momentum: Momentum3::new(20., 0., 0.),
        };
        let vertex = Position::origin();
        assert_relative_eq!(track.dxy(&vertex), 0.1, epsilon = 1e-12);
        assert_relative_eq!(track.dz(&vertex), 0., epsilon = 1e-12);
    }

    #[test]
    fn longitudinal_offset_shows_up_in_dz_only() {
        let track = Track {
            reference_point: Position::new(0., 0., 0.3),
            momentum: Momentum3::new(0., 15., 40.),
        };
        let vertex = Position::new(0., 0., 0.1);
        assert_relative_eq!(track.dxy(&vertex), 0., epsilon = 1e-12);
        assert_relative_eq!(track.dz(&vertex), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn energy_is_deduced_from_mass() {
        let p4 = Kinematics::from_pt_eta_phi_m(30., 0., 1., 40.);
        assert_relative_eq!(p4.energy, 50., epsilon = 1e-9);
    }
}
