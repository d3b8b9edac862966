//! Final-state categories of pair-produced heavy quark partners

use crate::numeric::pdg;

use std::fmt::Display;

/// Kind of heavy quark partner
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResonanceKind {
    /// Vector-like top partner
    TPrime,

    /// Vector-like bottom partner
    BPrime,
}
//
impl ResonanceKind {
    /// Identify a partner from its (signed) particle code
    pub fn from_pdg(pdg_id: i32) -> Option<Self> {
        match pdg_id.abs() {
            pdg::T_PRIME => Some(Self::TPrime),
            pdg::B_PRIME => Some(Self::BPrime),
            _ => None,
        }
    }

    /// Absolute particle code
    pub fn pdg_code(self) -> i32 {
        match self {
            Self::TPrime => pdg::T_PRIME,
            Self::BPrime => pdg::B_PRIME,
        }
    }

    /// Truth that a (signed) particle code designates this kind
    pub fn matches(self, pdg_id: i32) -> bool {
        pdg_id.abs() == self.pdg_code()
    }

    /// Prefix of the output fields describing resonances of this kind
    pub fn field_prefix(self) -> &'static str {
        match self {
            Self::TPrime => "tPrime",
            Self::BPrime => "bPrime",
        }
    }
}
//
impl Display for ResonanceKind {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TPrime => write!(fmt, "T'"),
            Self::BPrime => write!(fmt, "B'"),
        }
    }
}

/// Final state of a resonance pair, named after its two decays
///
/// Mixed decays (e.g. T'T' → tZ bW) carry the same category whatever the
/// order in which the generator listed the daughters.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Category {
    TzTz,
    TzTh,
    TzBw,
    ThTh,
    ThBw,
    BwBw,
    BzBz,
    BzBh,
    BzTw,
    BhBh,
    BhTw,
    TwTw,
}
//
impl Category {
    /// Categories of T' pairs, in publication order
    pub const T_PRIME: [Category; 6] = [
        Self::TzTz,
        Self::TzTh,
        Self::TzBw,
        Self::ThTh,
        Self::ThBw,
        Self::BwBw,
    ];

    /// Categories of B' pairs, in publication order
    pub const B_PRIME: [Category; 6] = [
        Self::BzBz,
        Self::BzBh,
        Self::BzTw,
        Self::BhBh,
        Self::BhTw,
        Self::TwTw,
    ];

    /// Name of the boolean output field tagging this category
    pub fn field_name(self) -> &'static str {
        match self {
            Self::TzTz => "isTZTZ",
            Self::TzTh => "isTZTH",
            Self::TzBw => "isTZBW",
            Self::ThTh => "isTHTH",
            Self::ThBw => "isTHBW",
            Self::BwBw => "isBWBW",
            Self::BzBz => "isBZBZ",
            Self::BzBh => "isBZBH",
            Self::BzTw => "isBZTW",
            Self::BhBh => "isBHBH",
            Self::BhTw => "isBHTW",
            Self::TwTw => "isTWTW",
        }
    }
}

/// Classify the leading quark and boson daughters of a resonance pair
///
/// Particle codes are compared in absolute value. When one daughter is a
/// top and the other a bottom, the bosons must come in the matching order.
/// Returns `None` for any pattern which the partner kind cannot produce.
///
pub fn categorize(kind: ResonanceKind, quarks: [i32; 2], bosons: [i32; 2]) -> Option<Category> {
    use pdg::{BOTTOM as B, HIGGS as H, TOP as T, W, Z};
    let quarks = quarks.map(i32::abs);
    let bosons = bosons.map(i32::abs);
    let category = match (kind, quarks, bosons) {
        // T' → bW, tZ, tH
        (ResonanceKind::TPrime, [B, B], [W, W]) => Category::BwBw,
        (ResonanceKind::TPrime, [T, T], [Z, Z]) => Category::TzTz,
        (ResonanceKind::TPrime, [T, T], [H, H]) => Category::ThTh,
        (ResonanceKind::TPrime, [T, T], [Z, H] | [H, Z]) => Category::TzTh,
        (ResonanceKind::TPrime, [T, B], [Z, W]) => Category::TzBw,
        (ResonanceKind::TPrime, [T, B], [H, W]) => Category::ThBw,
        (ResonanceKind::TPrime, [B, T], [W, Z]) => Category::TzBw,
        (ResonanceKind::TPrime, [B, T], [W, H]) => Category::ThBw,

        // B' → tW, bZ, bH
        (ResonanceKind::BPrime, [T, T], [W, W]) => Category::TwTw,
        (ResonanceKind::BPrime, [B, B], [Z, Z]) => Category::BzBz,
        (ResonanceKind::BPrime, [B, B], [H, H]) => Category::BhBh,
        (ResonanceKind::BPrime, [B, B], [Z, H] | [H, Z]) => Category::BzBh,
        (ResonanceKind::BPrime, [B, T], [Z, W]) => Category::BzTw,
        (ResonanceKind::BPrime, [B, T], [H, W]) => Category::BhTw,
        (ResonanceKind::BPrime, [T, B], [W, Z]) => Category::BzTw,
        (ResonanceKind::BPrime, [T, B], [W, H]) => Category::BhTw,

        _ => return None,
    };
    Some(category)
}
