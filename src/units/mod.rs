//! Concentration and volume units
//!
//! The Unit Normalizer: closed unit enums plus conversions through mol/L and mL.

pub mod converter;
pub mod types;

pub use converter::{convert, from_ml, from_molar, to_ml, to_molar};
pub use types::{ConcentrationUnit, VolumeUnit};
