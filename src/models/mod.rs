//! Data models
//!
//! Compound rows owned by the mixture form and their validated snapshots.

mod compound;

pub use compound::{Compound, CompoundId, CompoundRow, CompoundRowUpdate, CompoundRows, RowError};
