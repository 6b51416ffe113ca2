//! Unit types and conversion constants
//!
//! The closed set of concentration and volume units the calculator knows about.
//! Strings are turned into units once, at the boundary; anything outside the set
//! is rejected there.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CalcError;

// ============================================================================
// Conversion Constants
// ============================================================================

/// Millimolar per mol/L
pub const MM_PER_MOLAR: f64 = 1e3;
/// Micromolar per mol/L
pub const UM_PER_MOLAR: f64 = 1e6;
/// Nanomolar per mol/L
pub const NM_PER_MOLAR: f64 = 1e9;
/// Microliters per milliliter
pub const UL_PER_ML: f64 = 1e3;

// ============================================================================
// Concentration Units
// ============================================================================

/// A concentration unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConcentrationUnit {
    #[default]
    #[serde(rename = "mol/L")]
    MolPerLiter,
    #[serde(rename = "mM")]
    Millimolar,
    #[serde(rename = "µM")]
    Micromolar,
    #[serde(rename = "nM")]
    Nanomolar,
    /// Mass concentration; relating it to the molar units needs a molecular weight
    #[serde(rename = "mg/mL")]
    MgPerMl,
}

impl ConcentrationUnit {
    pub const ALL: [ConcentrationUnit; 5] = [
        ConcentrationUnit::MolPerLiter,
        ConcentrationUnit::Millimolar,
        ConcentrationUnit::Micromolar,
        ConcentrationUnit::Nanomolar,
        ConcentrationUnit::MgPerMl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConcentrationUnit::MolPerLiter => "mol/L",
            ConcentrationUnit::Millimolar => "mM",
            ConcentrationUnit::Micromolar => "µM",
            ConcentrationUnit::Nanomolar => "nM",
            ConcentrationUnit::MgPerMl => "mg/mL",
        }
    }

    /// Units of this kind per mol/L, or None for the mass unit
    pub fn per_molar(&self) -> Option<f64> {
        match self {
            ConcentrationUnit::MolPerLiter => Some(1.0),
            ConcentrationUnit::Millimolar => Some(MM_PER_MOLAR),
            ConcentrationUnit::Micromolar => Some(UM_PER_MOLAR),
            ConcentrationUnit::Nanomolar => Some(NM_PER_MOLAR),
            ConcentrationUnit::MgPerMl => None,
        }
    }

    pub fn is_mass(&self) -> bool {
        matches!(self, ConcentrationUnit::MgPerMl)
    }
}

impl fmt::Display for ConcentrationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConcentrationUnit {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // Bare "M" is molar; lowercasing it would read as "m".
        if trimmed == "M" {
            return Ok(ConcentrationUnit::MolPerLiter);
        }

        match trimmed.to_lowercase().as_str() {
            "mol/l" | "molar" => Ok(ConcentrationUnit::MolPerLiter),
            "mm" | "mmol/l" => Ok(ConcentrationUnit::Millimolar),
            "µm" | "μm" | "um" | "µmol/l" | "μmol/l" | "umol/l" => {
                Ok(ConcentrationUnit::Micromolar)
            }
            "nm" | "nmol/l" => Ok(ConcentrationUnit::Nanomolar),
            "mg/ml" | "g/l" => Ok(ConcentrationUnit::MgPerMl),
            _ => Err(CalcError::UnknownUnit {
                kind: "concentration",
                input: trimmed.to_string(),
            }),
        }
    }
}

// ============================================================================
// Volume Units
// ============================================================================

/// A volume unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VolumeUnit {
    #[default]
    #[serde(rename = "mL")]
    Milliliter,
    #[serde(rename = "µL")]
    Microliter,
}

impl VolumeUnit {
    pub const ALL: [VolumeUnit; 2] = [VolumeUnit::Milliliter, VolumeUnit::Microliter];

    pub fn as_str(&self) -> &'static str {
        match self {
            VolumeUnit::Milliliter => "mL",
            VolumeUnit::Microliter => "µL",
        }
    }

    /// Units of this kind per milliliter
    pub fn per_ml(&self) -> f64 {
        match self {
            VolumeUnit::Milliliter => 1.0,
            VolumeUnit::Microliter => UL_PER_ML,
        }
    }
}

impl fmt::Display for VolumeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VolumeUnit {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => {
                Ok(VolumeUnit::Milliliter)
            }
            "µl" | "μl" | "ul" | "microliter" | "microliters" | "microlitre" | "microlitres" => {
                Ok(VolumeUnit::Microliter)
            }
            _ => Err(CalcError::UnknownUnit {
                kind: "volume",
                input: trimmed.to_string(),
            }),
        }
    }
}
