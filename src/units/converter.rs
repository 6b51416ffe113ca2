//! Unit conversion functions
//!
//! Every concentration conversion pivots through mol/L. The molar units are
//! related by powers of ten; mg/mL needs the solute's molecular weight
//! (mol/L x g/mol = g/L = mg/mL).

use super::types::{ConcentrationUnit, VolumeUnit};
use crate::error::{ensure_positive, CalcError, CalcResult, Field};

/// Molecular weight to use for a conversion touching `unit`
///
/// Required (and positive) for mg/mL, ignored for the molar units.
fn molecular_weight_for(unit: ConcentrationUnit, molecular_weight: Option<f64>) -> CalcResult<f64> {
    if !unit.is_mass() {
        return Ok(1.0);
    }
    match molecular_weight {
        Some(mw) => ensure_positive(Field::MolecularWeight, mw),
        None => Err(CalcError::validation(
            Field::MolecularWeight,
            "required to convert mg/mL",
        )),
    }
}

/// Normalize a concentration to mol/L
pub fn to_molar(value: f64, unit: ConcentrationUnit, molecular_weight: Option<f64>) -> CalcResult<f64> {
    match unit.per_molar() {
        Some(factor) => Ok(value / factor),
        None => Ok(value / molecular_weight_for(unit, molecular_weight)?),
    }
}

/// Express a mol/L concentration in `unit`
pub fn from_molar(
    molar: f64,
    unit: ConcentrationUnit,
    molecular_weight: Option<f64>,
) -> CalcResult<f64> {
    match unit.per_molar() {
        Some(factor) => Ok(molar * factor),
        None => Ok(molar * molecular_weight_for(unit, molecular_weight)?),
    }
}

/// Convert a concentration between any two units
///
/// A unit converted to itself comes back unchanged, bit for bit. The molecular
/// weight is checked whenever either side is mg/mL, identity included.
pub fn convert(
    value: f64,
    from: ConcentrationUnit,
    to: ConcentrationUnit,
    molecular_weight: Option<f64>,
) -> CalcResult<f64> {
    ensure_positive(Field::Concentration, value)?;
    molecular_weight_for(from, molecular_weight)?;
    molecular_weight_for(to, molecular_weight)?;

    if from == to {
        return Ok(value);
    }

    let molar = to_molar(value, from, molecular_weight)?;
    from_molar(molar, to, molecular_weight)
}

/// Normalize a volume to milliliters
pub fn to_ml(volume: f64, unit: VolumeUnit) -> f64 {
    volume / unit.per_ml()
}

/// Express a milliliter volume in `unit`
pub fn from_ml(volume_ml: f64, unit: VolumeUnit) -> f64 {
    volume_ml * unit.per_ml()
}
