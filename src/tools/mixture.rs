//! Mixture (complexing) form
//!
//! The form owns its compound rows; calculations run over a snapshot of them.

use serde::Serialize;

use super::ToolError;
use crate::error::{parse_optional_quantity, parse_quantity, CalcResult, Field};
use crate::format::format_volume;
use crate::models::{CompoundId, CompoundRow, CompoundRowUpdate, CompoundRows, RowError};
use crate::solver::{solve_mixture, MixtureTarget};
use crate::units::{ConcentrationUnit, VolumeUnit};

/// Raw compound row fields; unset fields keep their current (or default) value
#[derive(Debug, Clone, Default)]
pub struct CompoundFields<'a> {
    pub concentration: Option<&'a str>,
    pub unit: Option<&'a str>,
    pub molecular_weight: Option<&'a str>,
    pub ratio: Option<u32>,
}

impl CompoundFields<'_> {
    fn to_update(&self) -> CalcResult<CompoundRowUpdate> {
        let unit = match self.unit {
            Some(u) => Some(u.parse::<ConcentrationUnit>()?),
            None => None,
        };
        Ok(CompoundRowUpdate {
            concentration: self.concentration.map(str::to_string),
            unit,
            molecular_weight: self.molecular_weight.map(str::to_string),
            ratio: self.ratio,
        })
    }
}

/// A compound row with its current position
#[derive(Debug, Serialize)]
pub struct CompoundRowEntry {
    pub position: usize,
    #[serde(flatten)]
    pub row: CompoundRow,
}

/// Response for list_compounds
#[derive(Debug, Serialize)]
pub struct ListCompoundsResponse {
    pub compounds: Vec<CompoundRowEntry>,
    pub count: usize,
}

/// Response for remove_compound
#[derive(Debug, Serialize)]
pub struct RemoveCompoundResponse {
    pub removed: CompoundId,
    pub remaining: usize,
}

/// Volume for one compound in a calculated mixture
#[derive(Debug, Serialize)]
pub struct CompoundVolumeEntry {
    pub id: CompoundId,
    pub position: usize,
    pub volume: f64,
}

/// Response for calculate_mixture
#[derive(Debug, Serialize)]
pub struct MixtureResponse {
    pub compounds: Vec<CompoundVolumeEntry>,
    pub buffer_volume: f64,
    pub volume_unit: VolumeUnit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_mass: Option<f64>,
    pub display: String,
}

/// Raw mixture target fields
#[derive(Debug, Clone, Default)]
pub struct MixtureForm<'a> {
    pub final_concentration: &'a str,
    pub final_concentration_unit: &'a str,
    pub final_volume: &'a str,
    pub volume_unit: &'a str,
    /// Only read when the final unit is mg/mL
    pub final_mass: Option<&'a str>,
}

// ============================================================================
// Compound Row Tools
// ============================================================================

fn entry(rows: &CompoundRows, id: CompoundId) -> Option<CompoundRowEntry> {
    Some(CompoundRowEntry {
        position: rows.position(id)?,
        row: rows.get(id)?.clone(),
    })
}

pub fn add_compound(rows: &mut CompoundRows, fields: &CompoundFields<'_>) -> Result<CompoundRowEntry, ToolError> {
    let update = fields.to_update()?;
    let id = rows.add_row(update)?;
    tracing::info!("Added compound {} (now {} rows)", id, rows.len());
    entry(rows, id).ok_or(ToolError::Row(RowError::UnknownCompound(id)))
}

pub fn update_compound(
    rows: &mut CompoundRows,
    id: CompoundId,
    fields: &CompoundFields<'_>,
) -> Result<CompoundRowEntry, ToolError> {
    let update = fields.to_update()?;
    rows.update(id, update)?;
    entry(rows, id).ok_or(ToolError::Row(RowError::UnknownCompound(id)))
}

pub fn remove_compound(rows: &mut CompoundRows, id: CompoundId) -> Result<RemoveCompoundResponse, ToolError> {
    rows.remove(id)?;
    tracing::info!("Removed compound {} ({} rows left)", id, rows.len());
    Ok(RemoveCompoundResponse {
        removed: id,
        remaining: rows.len(),
    })
}

pub fn list_compounds(rows: &CompoundRows) -> ListCompoundsResponse {
    let compounds: Vec<CompoundRowEntry> = rows
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| CompoundRowEntry {
            position: i + 1,
            row: row.clone(),
        })
        .collect();
    ListCompoundsResponse {
        count: compounds.len(),
        compounds,
    }
}

/// Build a throwaway row collection from inline compound fields
pub fn rows_from_fields(fields: &[CompoundFields<'_>]) -> Result<CompoundRows, ToolError> {
    let rows = fields
        .iter()
        .map(|f| Ok(CompoundRow::from_update(f.to_update()?)?))
        .collect::<Result<Vec<_>, ToolError>>()?;
    Ok(CompoundRows::from_rows(rows))
}

// ============================================================================
// Calculation
// ============================================================================

pub fn calculate_mixture(rows: &CompoundRows, form: &MixtureForm<'_>) -> CalcResult<MixtureResponse> {
    let unit: ConcentrationUnit = form.final_concentration_unit.parse()?;
    let volume_unit: VolumeUnit = form.volume_unit.parse()?;
    let concentration = parse_quantity(Field::FinalConcentration, form.final_concentration)?;
    let volume = parse_quantity(Field::FinalVolume, form.final_volume)?;
    let final_mass = if unit.is_mass() {
        parse_optional_quantity(Field::FinalMass, form.final_mass)?
    } else {
        None
    };

    let compounds = rows.snapshot()?;
    let target = MixtureTarget {
        concentration,
        unit,
        volume,
        volume_unit,
        final_mass,
    };
    let result = solve_mixture(&compounds, &target)?;

    let mut lines: Vec<String> = result
        .volumes
        .iter()
        .map(|v| format!("Compound {}: {}", v.position, format_volume(v.volume, volume_unit)))
        .collect();
    lines.push(format!("Buffer: {}", format_volume(result.buffer_volume, volume_unit)));

    Ok(MixtureResponse {
        compounds: result
            .volumes
            .iter()
            .map(|v| CompoundVolumeEntry {
                id: v.id,
                position: v.position,
                volume: v.volume,
            })
            .collect(),
        buffer_volume: result.buffer_volume,
        volume_unit,
        final_mass,
        display: lines.join("\n"),
    })
}
