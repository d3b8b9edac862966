//! Basic numerical concepts used throughout the program

#![allow(missing_docs)]

// Floating-point precision is configured here
#[cfg(feature = "f32")]
pub type Float = f32;
#[cfg(not(feature = "f32"))]
pub type Float = f64;

/// Particle Data Group numbering scheme codes used by the analysis
pub mod pdg {
    /// Bottom quark
    pub const BOTTOM: i32 = 5;
    /// Top quark
    pub const TOP: i32 = 6;
    /// Electron
    pub const ELECTRON: i32 = 11;
    /// Muon
    pub const MUON: i32 = 13;
    /// Tau lepton
    pub const TAU: i32 = 15;
    /// Z⁰ boson
    pub const Z: i32 = 23;
    /// W± boson
    pub const W: i32 = 24;
    /// Higgs boson
    pub const HIGGS: i32 = 25;
    /// Vector-like top partner (T')
    pub const T_PRIME: i32 = 8_000_001;
    /// Vector-like bottom partner (B')
    pub const B_PRIME: i32 = 8_000_002;

    /// Truth that a code designates a charged lepton (either charge)
    pub fn is_charged_lepton(pdg_id: i32) -> bool {
        matches!(pdg_id.abs(), ELECTRON | MUON | TAU)
    }

    /// Truth that a code designates a quark the T'/B' can decay into
    pub fn is_heavy_quark(pdg_id: i32) -> bool {
        matches!(pdg_id.abs(), BOTTOM | TOP)
    }

    /// Truth that a code designates a massive boson (Z, W or H)
    pub fn is_boson(pdg_id: i32) -> bool {
        matches!(pdg_id.abs(), Z | W | HIGGS)
    }

    /// Truth that a code lies in the 800000X range of exotic partners
    pub fn is_exotic_partner(pdg_id: i32) -> bool {
        (8_000_001..8_000_009).contains(&pdg_id.abs())
    }
}
