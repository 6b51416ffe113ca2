//! Solvers
//!
//! Dilution and mixture arithmetic over validated, unit-typed inputs.

pub mod dilution;
pub mod mixture;

pub use dilution::{solve_dilution, DilutionRequest, DilutionResult};
pub use mixture::{solve_mixture, CompoundVolume, MixtureResult, MixtureTarget};
