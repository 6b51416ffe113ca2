//! Compound model
//!
//! A compound is one stock solution in a mixture. The form keeps string-typed
//! rows (what the user typed) in an owned, identity-stable collection; a
//! calculation takes a parsed snapshot of them.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::{ensure_positive, parse_quantity, CalcError, CalcResult, Field};
use crate::units::ConcentrationUnit;

/// Stable identity of a compound row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompoundId(Uuid);

impl CompoundId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s.trim()).ok().map(Self)
    }
}

impl Default for CompoundId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CompoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A validated compound, ready for the mixture solver
#[derive(Debug, Clone, PartialEq)]
pub struct Compound {
    pub id: CompoundId,
    pub concentration: f64,
    pub unit: ConcentrationUnit,
    /// Present iff `unit` is mg/mL
    pub molecular_weight: Option<f64>,
    pub ratio: u32,
}

impl Compound {
    pub fn new(concentration: f64, unit: ConcentrationUnit) -> Self {
        Self {
            id: CompoundId::new(),
            concentration,
            unit,
            molecular_weight: None,
            ratio: 1,
        }
    }

    pub fn with_molecular_weight(mut self, molecular_weight: f64) -> Self {
        self.molecular_weight = Some(molecular_weight);
        self
    }

    pub fn with_ratio(mut self, ratio: u32) -> Self {
        self.ratio = ratio;
        self
    }

    /// Check every magnitude the solver will use
    pub fn validate(&self) -> CalcResult<()> {
        ensure_positive(Field::Concentration, self.concentration)?;
        if self.ratio == 0 {
            return Err(CalcError::validation(
                Field::MixingRatio,
                "must be a positive whole number",
            ));
        }
        if self.unit.is_mass() {
            match self.molecular_weight {
                Some(mw) => {
                    ensure_positive(Field::MolecularWeight, mw)?;
                }
                None => {
                    return Err(CalcError::validation(
                        Field::MolecularWeight,
                        "required for a compound in mg/mL",
                    ))
                }
            }
        }
        Ok(())
    }
}

/// One compound row as typed into the form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompoundRow {
    pub id: CompoundId,
    pub concentration: String,
    pub unit: ConcentrationUnit,
    pub molecular_weight: String,
    pub ratio: u32,
}

impl Default for CompoundRow {
    fn default() -> Self {
        Self {
            id: CompoundId::new(),
            concentration: String::new(),
            unit: ConcentrationUnit::MolPerLiter,
            molecular_weight: String::new(),
            ratio: 1,
        }
    }
}

impl CompoundRow {
    /// A fresh row with the given fields filled in
    pub fn from_update(update: CompoundRowUpdate) -> Result<Self, RowError> {
        if update.ratio == Some(0) {
            return Err(RowError::ZeroRatio);
        }
        let mut row = Self::default();
        apply_update(&mut row, update);
        Ok(row)
    }

    /// Parse the row into a validated compound
    ///
    /// The molecular weight field is only read when the unit is mg/mL.
    pub fn to_compound(&self) -> CalcResult<Compound> {
        let concentration = parse_quantity(Field::Concentration, &self.concentration)?;
        let molecular_weight = if self.unit.is_mass() {
            Some(parse_quantity(Field::MolecularWeight, &self.molecular_weight)?)
        } else {
            None
        };
        let compound = Compound {
            id: self.id,
            concentration,
            unit: self.unit,
            molecular_weight,
            ratio: self.ratio,
        };
        compound.validate()?;
        Ok(compound)
    }
}

/// Partial update of a compound row
#[derive(Debug, Clone, Default)]
pub struct CompoundRowUpdate {
    pub concentration: Option<String>,
    pub unit: Option<ConcentrationUnit>,
    pub molecular_weight: Option<String>,
    pub ratio: Option<u32>,
}

/// Compound collection errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("A mixture needs at least one compound; the last one cannot be removed.")]
    LastCompound,

    #[error("No compound with id {0}.")]
    UnknownCompound(CompoundId),

    #[error("Mixing ratio must be a positive whole number.")]
    ZeroRatio,
}

/// The compound rows of a mixture form, in entry order
///
/// Never empty: it starts with one default row and refuses to drop the last.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundRows {
    rows: Vec<CompoundRow>,
}

impl Default for CompoundRows {
    fn default() -> Self {
        Self::new()
    }
}

impl CompoundRows {
    pub fn new() -> Self {
        Self {
            rows: vec![CompoundRow::default()],
        }
    }

    /// Build from existing rows; an empty list yields one default row
    pub fn from_rows(rows: Vec<CompoundRow>) -> Self {
        if rows.is_empty() {
            Self::new()
        } else {
            Self { rows }
        }
    }

    pub fn rows(&self) -> &[CompoundRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Never true: the collection keeps at least one row
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: CompoundId) -> Option<&CompoundRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// 1-based position of a row
    pub fn position(&self, id: CompoundId) -> Option<usize> {
        self.rows.iter().position(|r| r.id == id).map(|i| i + 1)
    }

    /// Append a default row and return its id
    pub fn add(&mut self) -> CompoundId {
        let row = CompoundRow::default();
        let id = row.id;
        self.rows.push(row);
        id
    }

    /// Append a filled-in row and return its id
    pub fn add_row(&mut self, update: CompoundRowUpdate) -> Result<CompoundId, RowError> {
        let row = CompoundRow::from_update(update)?;
        let id = row.id;
        self.rows.push(row);
        Ok(id)
    }

    pub fn update(&mut self, id: CompoundId, update: CompoundRowUpdate) -> Result<&CompoundRow, RowError> {
        if update.ratio == Some(0) {
            return Err(RowError::ZeroRatio);
        }
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(RowError::UnknownCompound(id))?;
        apply_update(row, update);
        Ok(row)
    }

    pub fn remove(&mut self, id: CompoundId) -> Result<CompoundRow, RowError> {
        let index = self
            .rows
            .iter()
            .position(|r| r.id == id)
            .ok_or(RowError::UnknownCompound(id))?;
        if self.rows.len() <= 1 {
            return Err(RowError::LastCompound);
        }
        Ok(self.rows.remove(index))
    }

    /// Back to a single default row
    pub fn reset(&mut self) {
        self.rows = vec![CompoundRow::default()];
    }

    /// Parse every row, failing on the first invalid one
    ///
    /// Errors carry the 1-based position of the offending row.
    pub fn snapshot(&self) -> CalcResult<Vec<Compound>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| row.to_compound().map_err(|e| e.in_compound(i + 1)))
            .collect()
    }
}

fn apply_update(row: &mut CompoundRow, update: CompoundRowUpdate) {
    if let Some(concentration) = update.concentration {
        row.concentration = concentration;
    }
    if let Some(unit) = update.unit {
        row.unit = unit;
    }
    if let Some(molecular_weight) = update.molecular_weight {
        row.molecular_weight = molecular_weight;
    }
    if let Some(ratio) = update.ratio {
        row.ratio = ratio;
    }
}
