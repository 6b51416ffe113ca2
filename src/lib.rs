//! The Concentrator Library
//!
//! Laboratory solution preparation: concentration unit conversion, dilution,
//! and multi-compound mixtures.

pub mod build_info;
pub mod error;
pub mod format;
pub mod mcp;
pub mod models;
pub mod solver;
pub mod tools;
pub mod units;
