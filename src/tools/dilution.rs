//! Dilution form

use serde::Serialize;

use crate::error::{parse_quantity, CalcResult, Field};
use crate::format::format_volume;
use crate::solver::{solve_dilution, DilutionRequest};
use crate::units::{ConcentrationUnit, VolumeUnit};

/// Response for calculate_dilution
#[derive(Debug, Serialize)]
pub struct DilutionResponse {
    pub stock_volume: f64,
    pub diluent_volume: f64,
    pub volume_unit: VolumeUnit,
    /// False when the diluent volume came out negative
    pub feasible: bool,
    pub display: String,
}

/// Raw dilution form fields
#[derive(Debug, Clone, Default)]
pub struct DilutionForm<'a> {
    pub stock_concentration: &'a str,
    pub stock_unit: &'a str,
    pub final_concentration: &'a str,
    pub final_unit: &'a str,
    pub final_volume: &'a str,
    pub volume_unit: &'a str,
    pub molecular_weight: Option<&'a str>,
}

pub fn calculate_dilution(form: &DilutionForm<'_>) -> CalcResult<DilutionResponse> {
    let stock_unit: ConcentrationUnit = form.stock_unit.parse()?;
    let final_unit: ConcentrationUnit = form.final_unit.parse()?;
    let volume_unit: VolumeUnit = form.volume_unit.parse()?;

    let request = DilutionRequest {
        stock_concentration: parse_quantity(Field::StockConcentration, form.stock_concentration)?,
        stock_unit,
        final_concentration: parse_quantity(Field::FinalConcentration, form.final_concentration)?,
        final_unit,
        final_volume: parse_quantity(Field::FinalVolume, form.final_volume)?,
        volume_unit,
        molecular_weight: if stock_unit.is_mass() || final_unit.is_mass() {
            Some(parse_quantity(
                Field::MolecularWeight,
                form.molecular_weight.unwrap_or(""),
            )?)
        } else {
            None
        },
    };

    let result = solve_dilution(&request)?;
    let display = format!(
        "Stock: {}, Diluent: {}",
        format_volume(result.stock_volume, volume_unit),
        format_volume(result.diluent_volume, volume_unit)
    );

    Ok(DilutionResponse {
        stock_volume: result.stock_volume,
        diluent_volume: result.diluent_volume,
        volume_unit,
        feasible: result.is_feasible(),
        display,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalcError;

    fn form<'a>(stock: &'a str, target: &'a str, volume: &'a str) -> DilutionForm<'a> {
        DilutionForm {
            stock_concentration: stock,
            stock_unit: "mol/L",
            final_concentration: target,
            final_unit: "mol/L",
            final_volume: volume,
            volume_unit: "mL",
            molecular_weight: None,
        }
    }

    #[test]
    fn test_ten_fold_dilution_display() {
        let resp = calculate_dilution(&form("10", "1", "100")).unwrap();
        assert_eq!(resp.display, "Stock: 10.00 mL, Diluent: 90.00 mL");
        assert!(resp.feasible);
    }

    #[test]
    fn test_infeasible_dilution_is_flagged() {
        let resp = calculate_dilution(&form("1", "2", "100")).unwrap();
        assert!(!resp.feasible);
        assert_eq!(resp.display, "Stock: 200.00 mL, Diluent: -100.00 mL");
    }

    #[test]
    fn test_mass_unit_needs_molecular_weight() {
        let f = DilutionForm {
            stock_unit: "mg/mL",
            ..form("18", "0.01", "50")
        };
        let err = calculate_dilution(&f).unwrap_err();
        assert_eq!(err.field(), Some(Field::MolecularWeight));

        let f = DilutionForm {
            molecular_weight: Some("180"),
            ..f
        };
        let resp = calculate_dilution(&f).unwrap();
        assert_eq!(resp.display, "Stock: 5.00 mL, Diluent: 45.00 mL");
    }

    #[test]
    fn test_each_field_validated() {
        let cases = [
            (form("x", "1", "100"), Field::StockConcentration),
            (form("10", "", "100"), Field::FinalConcentration),
            (form("10", "1", "-100"), Field::FinalVolume),
        ];
        for (f, field) in cases {
            assert_eq!(calculate_dilution(&f).unwrap_err().field(), Some(field));
        }
    }

    #[test]
    fn test_unknown_volume_unit() {
        let f = DilutionForm {
            volume_unit: "L",
            ..form("10", "1", "100")
        };
        let err = calculate_dilution(&f).unwrap_err();
        assert!(matches!(err, CalcError::UnknownUnit { kind: "volume", .. }));
    }
}
