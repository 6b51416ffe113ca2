//! Calculation errors
//!
//! Every failure a calculation can produce. All of them are recoverable: the
//! forms turn them into a message shown in place of the numeric result.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// The input field a failure refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Concentration,
    StockConcentration,
    FinalConcentration,
    FinalVolume,
    MolecularWeight,
    MixingRatio,
    FinalMass,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Concentration => "concentration",
            Field::StockConcentration => "stock concentration",
            Field::FinalConcentration => "final concentration",
            Field::FinalVolume => "final volume",
            Field::MolecularWeight => "molecular weight",
            Field::MixingRatio => "mixing ratio",
            Field::FinalMass => "final mass",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calculation error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("Please enter a valid {field}: '{input}' is not a number.")]
    Parse { field: Field, input: String },

    #[error("Unrecognized {kind} unit '{input}'.")]
    UnknownUnit { kind: &'static str, input: String },

    #[error("Please enter a valid {field}: {reason}.")]
    Validation { field: Field, reason: String },

    #[error("Calculation failed: {0}.")]
    Computation(String),

    #[error("Compound {position}: {source}")]
    Compound {
        position: usize,
        #[source]
        source: Box<CalcError>,
    },
}

/// Result type for calculations
pub type CalcResult<T> = Result<T, CalcError>;

impl CalcError {
    pub fn validation(field: Field, reason: impl Into<String>) -> Self {
        CalcError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Scope an error to a 1-based compound row position
    pub fn in_compound(self, position: usize) -> Self {
        CalcError::Compound {
            position,
            source: Box::new(self),
        }
    }

    /// The offending field, looking through compound scoping
    pub fn field(&self) -> Option<Field> {
        match self {
            CalcError::Parse { field, .. } | CalcError::Validation { field, .. } => Some(*field),
            CalcError::Compound { source, .. } => source.field(),
            CalcError::UnknownUnit { .. } | CalcError::Computation(_) => None,
        }
    }

    /// Short machine-readable category for tool responses
    pub fn kind(&self) -> &'static str {
        match self {
            CalcError::Parse { .. } => "parse",
            CalcError::UnknownUnit { .. } => "unknown_unit",
            CalcError::Validation { .. } => "validation",
            CalcError::Computation(_) => "computation",
            CalcError::Compound { source, .. } => source.kind(),
        }
    }
}

/// Require a positive finite magnitude
pub fn ensure_positive(field: Field, value: f64) -> CalcResult<f64> {
    if !value.is_finite() {
        return Err(CalcError::validation(field, "must be a finite number"));
    }
    if value <= 0.0 {
        return Err(CalcError::validation(field, "must be greater than zero"));
    }
    Ok(value)
}

/// Parse a typed field into a positive finite magnitude
pub fn parse_quantity(field: Field, input: &str) -> CalcResult<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CalcError::validation(field, "a value is required"));
    }
    let value = trimmed.parse::<f64>().map_err(|_| CalcError::Parse {
        field,
        input: trimmed.to_string(),
    })?;
    ensure_positive(field, value)
}

/// Parse a field that may be left blank
pub fn parse_optional_quantity(field: Field, input: Option<&str>) -> CalcResult<Option<f64>> {
    match input.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_quantity(field, s).map(Some),
    }
}

/// Serializable form of an error, shown in place of a result
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
}

impl From<&CalcError> for ErrorResponse {
    fn from(err: &CalcError) -> Self {
        Self {
            error: err.to_string(),
            kind: err.kind(),
            field: err.field(),
        }
    }
}
