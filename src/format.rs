//! Result formatting
//!
//! Magnitudes in [1e-3, 1e6) print fixed with two decimals; anything outside
//! that range, except zero, prints in scientific notation.

use crate::units::VolumeUnit;

/// The range check runs on the unrounded value, as C's `%.2f` would see it,
/// so 999999.996 prints as "1000000.00" rather than switching to "1.00e6".
pub fn format_number(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1e6 || (magnitude < 1e-3 && value != 0.0) {
        format!("{:.2e}", value)
    } else {
        format!("{:.2}", value)
    }
}

pub fn format_volume(value: f64, unit: VolumeUnit) -> String {
    format!("{} {}", format_number(value), unit)
}
