//! Concentration conversion form

use serde::Serialize;

use crate::error::{parse_quantity, CalcResult, Field};
use crate::format::format_number;
use crate::units::{self, ConcentrationUnit};

/// Response for convert_concentration
#[derive(Debug, Serialize)]
pub struct ConversionResponse {
    pub concentration: f64,
    pub from_unit: ConcentrationUnit,
    pub result: f64,
    pub to_unit: ConcentrationUnit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub molecular_weight: Option<f64>,
    /// e.g. "5.00 mM = 0.01 mol/L"
    pub display: String,
}

/// Convert a typed concentration between two units
///
/// The molecular weight field is only read when either unit is mg/mL.
pub fn convert_concentration(
    concentration: &str,
    from_unit: &str,
    to_unit: &str,
    molecular_weight: Option<&str>,
) -> CalcResult<ConversionResponse> {
    let from: ConcentrationUnit = from_unit.parse()?;
    let to: ConcentrationUnit = to_unit.parse()?;
    let value = parse_quantity(Field::Concentration, concentration)?;

    let molecular_weight = if from.is_mass() || to.is_mass() {
        Some(parse_quantity(
            Field::MolecularWeight,
            molecular_weight.unwrap_or(""),
        )?)
    } else {
        None
    };

    let result = units::convert(value, from, to, molecular_weight)?;
    let line = format!(
        "{} {} = {} {}",
        format_number(value),
        from,
        format_number(result),
        to
    );
    tracing::debug!("Converted: {}", line);

    Ok(ConversionResponse {
        concentration: value,
        from_unit: from,
        result,
        to_unit: to,
        molecular_weight,
        display: line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalcError;
    use approx::assert_relative_eq;

    #[test]
    fn test_millimolar_to_molar() {
        let resp = convert_concentration("5", "mM", "mol/L", None).unwrap();
        assert_relative_eq!(resp.result, 0.005, max_relative = 1e-12);
        assert_eq!(resp.display, "5.00 mM = 0.01 mol/L");
        assert!(resp.molecular_weight.is_none());
    }

    #[test]
    fn test_mass_round_trip() {
        let resp = convert_concentration("2", "mol/L", "mg/mL", Some("180")).unwrap();
        assert_eq!(resp.display, "2.00 mol/L = 360.00 mg/mL");

        let back = convert_concentration("360", "mg/mL", "mol/L", Some("180")).unwrap();
        assert_eq!(back.display, "360.00 mg/mL = 2.00 mol/L");
    }

    #[test]
    fn test_scientific_display() {
        let resp = convert_concentration("2", "mol/L", "nM", None).unwrap();
        assert_eq!(resp.display, "2.00 mol/L = 2.00e9 nM");
    }

    #[test]
    fn test_molecular_weight_only_read_for_mass_units() {
        assert!(convert_concentration("1", "mM", "µM", Some("garbage")).is_ok());

        let err = convert_concentration("1", "mg/mL", "mM", None).unwrap_err();
        assert_eq!(err.field(), Some(Field::MolecularWeight));
        let err = convert_concentration("1", "mM", "mg/mL", Some("-5")).unwrap_err();
        assert_eq!(err.field(), Some(Field::MolecularWeight));
    }

    #[test]
    fn test_invalid_concentration() {
        let err = convert_concentration("five", "mM", "mol/L", None).unwrap_err();
        assert!(matches!(err, CalcError::Parse { field: Field::Concentration, .. }));
        let err = convert_concentration("0", "mM", "mol/L", None).unwrap_err();
        assert!(matches!(err, CalcError::Validation { field: Field::Concentration, .. }));
    }

    #[test]
    fn test_unknown_unit_rejected_at_boundary() {
        let err = convert_concentration("1", "ppm", "mol/L", None).unwrap_err();
        assert_eq!(err.kind(), "unknown_unit");
    }
}
