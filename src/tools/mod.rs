//! Concentrator Tools module
//!
//! Form handlers: raw typed input in, parsed at the boundary, solved, and
//! returned as serializable responses with a display string.

pub mod conversion;
pub mod dilution;
pub mod mixture;
pub mod status;

use thiserror::Error;

use crate::error::{CalcError, ErrorResponse};
use crate::models::RowError;

/// Failure of a form action
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    #[error(transparent)]
    Calc(#[from] CalcError),

    #[error(transparent)]
    Row(#[from] RowError),
}

impl ToolError {
    pub fn to_response(&self) -> ErrorResponse {
        match self {
            ToolError::Calc(e) => ErrorResponse::from(e),
            ToolError::Row(e) => ErrorResponse {
                error: e.to_string(),
                kind: "compound_row",
                field: None,
            },
        }
    }
}
