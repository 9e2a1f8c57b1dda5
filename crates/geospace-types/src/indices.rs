// ─────────────────────────────────────────────────────────────────────
// SCPN Geospace Core — Species Indices
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Closed species enumerations.
//!
//! Every gridded species variable is stored in a `Vec` indexed by
//! `idx()`, so hot loops never touch a string map. Name lookup exists
//! only for configuration resolution at init time.

use crate::constants::AMU_KG;

/// Neutral constituents carried by the thermosphere state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NeutralSpecies {
    O,
    O2,
    N2,
    N,
    NO,
}

impl NeutralSpecies {
    /// All neutrals in storage order.
    pub const ALL: [NeutralSpecies; 5] = [Self::O, Self::O2, Self::N2, Self::N, Self::NO];

    /// Number of neutral storage slots.
    pub const COUNT: usize = Self::ALL.len();

    /// Storage slot of this species.
    #[inline]
    pub fn idx(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::O => "O",
            Self::O2 => "O2",
            Self::N2 => "N2",
            Self::N => "N",
            Self::NO => "NO",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Molecular mass (amu).
    pub fn mass_amu(self) -> f64 {
        match self {
            Self::O => 15.999,
            Self::O2 => 31.998,
            Self::N2 => 28.014,
            Self::N => 14.007,
            Self::NO => 30.006,
        }
    }

    /// Molecular mass (kg).
    pub fn mass_kg(self) -> f64 {
        self.mass_amu() * AMU_KG
    }

    /// Photoionization product tracked for this neutral, if any.
    pub fn photo_ion(self) -> Option<IonSpecies> {
        match self {
            Self::O => Some(IonSpecies::OPlus),
            Self::O2 => Some(IonSpecies::O2Plus),
            Self::N2 => Some(IonSpecies::N2Plus),
            Self::N | Self::NO => None,
        }
    }
}

/// Ion constituents carried by the ionosphere state.
/// All are singly charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IonSpecies {
    OPlus,
    O2Plus,
    N2Plus,
    NOPlus,
}

impl IonSpecies {
    /// All ions in storage order.
    pub const ALL: [IonSpecies; 4] = [Self::OPlus, Self::O2Plus, Self::N2Plus, Self::NOPlus];

    /// Number of ion storage slots.
    pub const COUNT: usize = Self::ALL.len();

    /// Storage slot of this species.
    #[inline]
    pub fn idx(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::OPlus => "O+",
            Self::O2Plus => "O2+",
            Self::N2Plus => "N2+",
            Self::NOPlus => "NO+",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Ion mass (amu). Electron mass deficit is negligible here.
    pub fn mass_amu(self) -> f64 {
        match self {
            Self::OPlus => 15.999,
            Self::O2Plus => 31.998,
            Self::N2Plus => 28.014,
            Self::NOPlus => 30.006,
        }
    }

    /// Ion mass (kg).
    pub fn mass_kg(self) -> f64 {
        self.mass_amu() * AMU_KG
    }
}
