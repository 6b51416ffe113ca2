//! Mixture Solver
//!
//! Several stock solutions share a target concentration according to their
//! mixing ratios; whatever volume they leave is filled with buffer.
//!
//! Known limitation: the target concentration is normalized with a molecular
//! weight of 1 even when its unit is mg/mL, while each compound uses its own.
//! A mass-based target therefore reads as "mol/L numerically equal to mg/mL".

use serde::Serialize;

use crate::error::{ensure_positive, CalcError, CalcResult, Field};
use crate::models::{Compound, CompoundId};
use crate::units::{from_ml, to_ml, to_molar, ConcentrationUnit, VolumeUnit};

/// Molecular weight used to normalize the mixture's target concentration
pub const TARGET_MOLECULAR_WEIGHT: f64 = 1.0;

/// What the finished mixture should be
#[derive(Debug, Clone, PartialEq)]
pub struct MixtureTarget {
    pub concentration: f64,
    pub unit: ConcentrationUnit,
    pub volume: f64,
    pub volume_unit: VolumeUnit,
    /// Accepted alongside an mg/mL target; not used by the arithmetic
    pub final_mass: Option<f64>,
}

/// Stock volume required from one compound
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompoundVolume {
    pub id: CompoundId,
    /// 1-based entry position
    pub position: usize,
    pub volume: f64,
}

/// Per-compound volumes (entry order) plus the buffer top-up
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MixtureResult {
    pub volumes: Vec<CompoundVolume>,
    pub buffer_volume: f64,
    pub volume_unit: VolumeUnit,
}

impl MixtureResult {
    pub fn volume_for(&self, id: CompoundId) -> Option<f64> {
        self.volumes.iter().find(|v| v.id == id).map(|v| v.volume)
    }

    pub fn total_compound_volume(&self) -> f64 {
        self.volumes.iter().map(|v| v.volume).sum()
    }
}

pub fn solve_mixture(compounds: &[Compound], target: &MixtureTarget) -> CalcResult<MixtureResult> {
    let final_concentration = ensure_positive(Field::FinalConcentration, target.concentration)?;
    let final_volume = ensure_positive(Field::FinalVolume, target.volume)?;
    if let Some(mass) = target.final_mass {
        ensure_positive(Field::FinalMass, mass)?;
    }
    if compounds.is_empty() {
        return Err(CalcError::validation(
            Field::Concentration,
            "a mixture needs at least one compound",
        ));
    }
    for (i, compound) in compounds.iter().enumerate() {
        compound.validate().map_err(|e| e.in_compound(i + 1))?;
    }

    let total_ml = to_ml(final_volume, target.volume_unit);
    let total_ratio: u64 = compounds.iter().map(|c| u64::from(c.ratio)).sum();
    let target_molar = to_molar(
        final_concentration,
        target.unit,
        Some(TARGET_MOLECULAR_WEIGHT),
    )?;

    let mut volumes = Vec::with_capacity(compounds.len());
    for (i, compound) in compounds.iter().enumerate() {
        let position = i + 1;
        let stock_molar = to_molar(compound.concentration, compound.unit, compound.molecular_weight)
            .map_err(|e| e.in_compound(position))?;
        if stock_molar <= 0.0 || !stock_molar.is_finite() {
            return Err(CalcError::Computation(
                "concentration is zero after unit normalization".to_string(),
            )
            .in_compound(position));
        }

        let share = f64::from(compound.ratio) / total_ratio as f64;
        let contribution = share * target_molar;
        let volume_ml = (contribution * total_ml) / stock_molar;
        if !volume_ml.is_finite() {
            return Err(CalcError::Computation("stock volume is not a finite number".to_string())
                .in_compound(position));
        }

        volumes.push(CompoundVolume {
            id: compound.id,
            position,
            volume: from_ml(volume_ml, target.volume_unit),
        });
    }

    let allocated: f64 = volumes.iter().map(|v| v.volume).sum();
    let buffer_volume = (final_volume - allocated).max(0.0);
    if allocated > final_volume {
        tracing::warn!(
            "Compounds need {} {} but the mixture is {} {}; buffer clamped to zero",
            allocated,
            target.volume_unit,
            final_volume,
            target.volume_unit
        );
    }

    tracing::debug!(
        "Mixture: {} compounds -> {} {} in {} {}, buffer {}",
        compounds.len(),
        final_concentration,
        target.unit,
        final_volume,
        target.volume_unit,
        buffer_volume
    );

    Ok(MixtureResult {
        volumes,
        buffer_volume,
        volume_unit: target.volume_unit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn target(concentration: f64, volume: f64) -> MixtureTarget {
        MixtureTarget {
            concentration,
            unit: ConcentrationUnit::MolPerLiter,
            volume,
            volume_unit: VolumeUnit::Milliliter,
            final_mass: None,
        }
    }

    #[test]
    fn test_two_compounds_equal_ratio() {
        let a = Compound::new(1.0, ConcentrationUnit::MolPerLiter);
        let b = Compound::new(1.0, ConcentrationUnit::MolPerLiter);
        let result = solve_mixture(&[a.clone(), b.clone()], &target(0.5, 100.0)).unwrap();

        assert_relative_eq!(result.volume_for(a.id).unwrap(), 25.0, max_relative = 1e-12);
        assert_relative_eq!(result.volume_for(b.id).unwrap(), 25.0, max_relative = 1e-12);
        assert_relative_eq!(result.buffer_volume, 50.0, max_relative = 1e-12);
    }

    #[test]
    fn test_ratio_weighting() {
        let a = Compound::new(1.0, ConcentrationUnit::MolPerLiter).with_ratio(3);
        let b = Compound::new(100.0, ConcentrationUnit::Millimolar);
        let result = solve_mixture(&[a, b], &target(0.1, 10.0)).unwrap();

        // a: 3/4 x 0.1 M x 10 mL / 1 M; b: 1/4 x 0.1 M x 10 mL / 0.1 M
        assert_relative_eq!(result.volumes[0].volume, 0.75, max_relative = 1e-12);
        assert_relative_eq!(result.volumes[1].volume, 2.5, max_relative = 1e-12);
        assert_relative_eq!(result.buffer_volume, 6.75, max_relative = 1e-12);
    }

    #[test]
    fn test_mass_compound_uses_its_own_molecular_weight() {
        let a = Compound::new(180.0, ConcentrationUnit::MgPerMl).with_molecular_weight(180.0);
        let result = solve_mixture(&[a], &target(0.5, 100.0)).unwrap();
        assert_relative_eq!(result.volumes[0].volume, 50.0, max_relative = 1e-12);
        assert_relative_eq!(result.buffer_volume, 50.0, max_relative = 1e-12);
    }

    #[test]
    fn test_mass_target_is_normalized_with_unit_weight() {
        let a = Compound::new(1.0, ConcentrationUnit::MolPerLiter);
        let t = MixtureTarget {
            unit: ConcentrationUnit::MgPerMl,
            final_mass: Some(2.0),
            ..target(0.2, 100.0)
        };
        // 0.2 mg/mL is read as 0.2 mol/L
        let result = solve_mixture(&[a], &t).unwrap();
        assert_relative_eq!(result.volumes[0].volume, 20.0, max_relative = 1e-12);
    }

    #[test]
    fn test_microliter_volumes() {
        let a = Compound::new(10.0, ConcentrationUnit::Millimolar);
        let t = MixtureTarget {
            unit: ConcentrationUnit::Micromolar,
            volume_unit: VolumeUnit::Microliter,
            ..target(100.0, 500.0)
        };
        let result = solve_mixture(&[a], &t).unwrap();
        assert_relative_eq!(result.volumes[0].volume, 5.0, max_relative = 1e-9);
        assert_relative_eq!(result.buffer_volume, 495.0, max_relative = 1e-9);
        assert_eq!(result.volume_unit, VolumeUnit::Microliter);
    }

    #[test]
    fn test_buffer_never_negative() {
        let weak = Compound::new(1.0, ConcentrationUnit::Millimolar);
        let also_weak = Compound::new(2.0, ConcentrationUnit::Micromolar).with_ratio(5);
        let result = solve_mixture(&[weak, also_weak], &target(1.0, 100.0)).unwrap();
        assert!(result.total_compound_volume() > 100.0);
        assert_eq!(result.buffer_volume, 0.0);
    }

    #[test]
    fn test_entry_order_and_identity_preserved() {
        let compounds: Vec<Compound> = (1..=4)
            .map(|n| Compound::new(n as f64, ConcentrationUnit::MolPerLiter))
            .collect();
        let result = solve_mixture(&compounds, &target(0.4, 40.0)).unwrap();
        for (i, (volume, compound)) in result.volumes.iter().zip(&compounds).enumerate() {
            assert_eq!(volume.id, compound.id);
            assert_eq!(volume.position, i + 1);
        }
        // 0.1 M share each, 40 mL: 4 / n mL
        assert_relative_eq!(result.volumes[3].volume, 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_invalid_compound_aborts_with_concentration_field() {
        let good = Compound::new(1.0, ConcentrationUnit::MolPerLiter);
        let bad = Compound::new(0.0, ConcentrationUnit::MolPerLiter);
        let err = solve_mixture(&[good, bad], &target(0.5, 100.0)).unwrap_err();
        assert!(matches!(err, CalcError::Compound { position: 2, .. }));
        assert_eq!(err.field(), Some(Field::Concentration));
    }

    #[test]
    fn test_missing_molecular_weight_is_separate_failure() {
        let bad = Compound::new(5.0, ConcentrationUnit::MgPerMl);
        let err = solve_mixture(&[bad], &target(0.5, 100.0)).unwrap_err();
        assert_eq!(err.field(), Some(Field::MolecularWeight));
    }

    #[test]
    fn test_zero_ratio_rejected() {
        let bad = Compound::new(1.0, ConcentrationUnit::MolPerLiter).with_ratio(0);
        let err = solve_mixture(&[bad], &target(0.5, 100.0)).unwrap_err();
        assert_eq!(err.field(), Some(Field::MixingRatio));
    }

    #[test]
    fn test_target_validation() {
        let a = Compound::new(1.0, ConcentrationUnit::MolPerLiter);
        let err = solve_mixture(&[a.clone()], &target(0.0, 100.0)).unwrap_err();
        assert_eq!(err.field(), Some(Field::FinalConcentration));
        let err = solve_mixture(&[a.clone()], &target(0.5, -1.0)).unwrap_err();
        assert_eq!(err.field(), Some(Field::FinalVolume));
        let t = MixtureTarget { final_mass: Some(0.0), ..target(0.5, 100.0) };
        assert_eq!(solve_mixture(&[a], &t).unwrap_err().field(), Some(Field::FinalMass));
    }

    #[test]
    fn test_empty_compound_list_rejected() {
        assert!(solve_mixture(&[], &target(0.5, 100.0)).is_err());
    }
}
