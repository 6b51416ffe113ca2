//! Dilution Solver
//!
//! C1 x V1 = C2 x V2: how much stock to take, and how much diluent to top up
//! with, to reach a target concentration at a target volume.

use serde::Serialize;

use crate::error::{ensure_positive, CalcError, CalcResult, Field};
use crate::units::{from_ml, to_ml, to_molar, ConcentrationUnit, VolumeUnit};

/// Inputs to a dilution
#[derive(Debug, Clone, PartialEq)]
pub struct DilutionRequest {
    pub stock_concentration: f64,
    pub stock_unit: ConcentrationUnit,
    pub final_concentration: f64,
    pub final_unit: ConcentrationUnit,
    pub final_volume: f64,
    pub volume_unit: VolumeUnit,
    /// Shared by both concentrations; required iff either unit is mg/mL
    pub molecular_weight: Option<f64>,
}

/// Volumes to combine, in the request's volume unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DilutionResult {
    pub stock_volume: f64,
    pub diluent_volume: f64,
    pub volume_unit: VolumeUnit,
}

impl DilutionResult {
    /// False when the stock is too dilute to reach the target by topping up
    ///
    /// The diluent volume is then negative; it is passed through, not clamped.
    pub fn is_feasible(&self) -> bool {
        self.diluent_volume >= 0.0
    }
}

pub fn solve_dilution(request: &DilutionRequest) -> CalcResult<DilutionResult> {
    let stock = ensure_positive(Field::StockConcentration, request.stock_concentration)?;
    let target = ensure_positive(Field::FinalConcentration, request.final_concentration)?;
    let volume = ensure_positive(Field::FinalVolume, request.final_volume)?;

    let stock_molar = to_molar(stock, request.stock_unit, request.molecular_weight)?;
    let final_molar = to_molar(target, request.final_unit, request.molecular_weight)?;
    if stock_molar <= 0.0 || !stock_molar.is_finite() {
        return Err(CalcError::Computation(
            "stock concentration is zero after unit normalization".to_string(),
        ));
    }

    let final_ml = to_ml(volume, request.volume_unit);
    let stock_ml = (final_molar * final_ml) / stock_molar;
    let diluent_ml = final_ml - stock_ml;
    if !stock_ml.is_finite() {
        return Err(CalcError::Computation(
            "stock volume is not a finite number".to_string(),
        ));
    }

    let result = DilutionResult {
        stock_volume: from_ml(stock_ml, request.volume_unit),
        diluent_volume: from_ml(diluent_ml, request.volume_unit),
        volume_unit: request.volume_unit,
    };

    tracing::debug!(
        "Dilution: {} {} -> {} {} in {} {}: stock {} / diluent {}",
        stock,
        request.stock_unit,
        target,
        request.final_unit,
        volume,
        request.volume_unit,
        result.stock_volume,
        result.diluent_volume
    );
    if !result.is_feasible() {
        tracing::warn!(
            "Infeasible dilution: stock {} {} is weaker than target {} {}",
            stock,
            request.stock_unit,
            target,
            request.final_unit
        );
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn molar_request(stock: f64, target: f64, volume: f64) -> DilutionRequest {
        DilutionRequest {
            stock_concentration: stock,
            stock_unit: ConcentrationUnit::MolPerLiter,
            final_concentration: target,
            final_unit: ConcentrationUnit::MolPerLiter,
            final_volume: volume,
            volume_unit: VolumeUnit::Milliliter,
            molecular_weight: None,
        }
    }

    #[test]
    fn test_ten_fold_dilution() {
        let result = solve_dilution(&molar_request(10.0, 1.0, 100.0)).unwrap();
        assert_relative_eq!(result.stock_volume, 10.0, max_relative = 1e-12);
        assert_relative_eq!(result.diluent_volume, 90.0, max_relative = 1e-12);
        assert!(result.is_feasible());
    }

    #[test]
    fn test_microliter_output() {
        let request = DilutionRequest {
            stock_unit: ConcentrationUnit::Millimolar,
            final_unit: ConcentrationUnit::Micromolar,
            volume_unit: VolumeUnit::Microliter,
            ..molar_request(10.0, 50.0, 200.0)
        };
        // 10 mM -> 50 µM is a 200x dilution
        let result = solve_dilution(&request).unwrap();
        assert_relative_eq!(result.stock_volume, 1.0, max_relative = 1e-9);
        assert_relative_eq!(result.diluent_volume, 199.0, max_relative = 1e-9);
        assert_eq!(result.volume_unit, VolumeUnit::Microliter);
    }

    #[test]
    fn test_mass_stock_to_molar_target() {
        // 18 mg/mL glucose (180 g/mol) is 0.1 mol/L
        let request = DilutionRequest {
            stock_unit: ConcentrationUnit::MgPerMl,
            molecular_weight: Some(180.0),
            ..molar_request(18.0, 0.01, 50.0)
        };
        let result = solve_dilution(&request).unwrap();
        assert_relative_eq!(result.stock_volume, 5.0, max_relative = 1e-9);
        assert_relative_eq!(result.diluent_volume, 45.0, max_relative = 1e-9);
    }

    #[test]
    fn test_infeasible_dilution_passes_negative_through() {
        let result = solve_dilution(&molar_request(1.0, 2.0, 100.0)).unwrap();
        assert_relative_eq!(result.stock_volume, 200.0, max_relative = 1e-12);
        assert_relative_eq!(result.diluent_volume, -100.0, max_relative = 1e-12);
        assert!(!result.is_feasible());
    }

    #[test]
    fn test_missing_molecular_weight() {
        let request = DilutionRequest {
            final_unit: ConcentrationUnit::MgPerMl,
            ..molar_request(1.0, 2.0, 100.0)
        };
        let err = solve_dilution(&request).unwrap_err();
        assert_eq!(err.field(), Some(Field::MolecularWeight));
    }

    #[test]
    fn test_non_positive_inputs_rejected() {
        let cases = [
            (molar_request(0.0, 1.0, 100.0), Field::StockConcentration),
            (molar_request(10.0, -1.0, 100.0), Field::FinalConcentration),
            (molar_request(10.0, 1.0, 0.0), Field::FinalVolume),
            (molar_request(10.0, 1.0, f64::NAN), Field::FinalVolume),
        ];
        for (request, field) in cases {
            let err = solve_dilution(&request).unwrap_err();
            assert!(matches!(err, CalcError::Validation { .. }));
            assert_eq!(err.field(), Some(field));
        }
    }

    #[test]
    fn test_stock_underflowing_to_zero_is_computation_error() {
        let request = DilutionRequest {
            stock_unit: ConcentrationUnit::Nanomolar,
            ..molar_request(1e-320, 1.0, 100.0)
        };
        let err = solve_dilution(&request).unwrap_err();
        assert_eq!(err.kind(), "computation");
    }
}
