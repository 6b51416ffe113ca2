//! Build information module
//!
//! What this binary is and which units it was compiled to understand.

use serde::Serialize;

use crate::units::{ConcentrationUnit, VolumeUnit};

/// Build timestamp in ISO 8601 format, embedded by `build.rs`
pub const BUILD_TIMESTAMP: &str = match option_env!("CONCENTRATOR_BUILD_TIMESTAMP") {
    Some(s) => s,
    None => "unknown",
};

/// Cargo profile the binary was built with ("debug" or "release")
pub const BUILD_PROFILE: &str = match option_env!("CONCENTRATOR_BUILD_PROFILE") {
    Some(s) => s,
    None => "unknown",
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Build information for the status tool and startup banner
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub build_timestamp: &'static str,
    pub build_profile: &'static str,
    pub concentration_units: [&'static str; 5],
    pub volume_units: [&'static str; 2],
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            name: NAME,
            version: VERSION,
            build_timestamp: BUILD_TIMESTAMP,
            build_profile: BUILD_PROFILE,
            concentration_units: ConcentrationUnit::ALL.map(|u| u.as_str()),
            volume_units: VolumeUnit::ALL.map(|u| u.as_str()),
        }
    }
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self::current()
    }
}

/// Print the startup banner to stderr
pub fn print_startup_banner() {
    let info = BuildInfo::current();
    eprintln!("===============================================");
    eprintln!("  The Concentrator v{} ({})", info.version, info.build_profile);
    eprintln!("  Compiled: {}", info.build_timestamp);
    eprintln!("  Concentrations: {}", info.concentration_units.join(", "));
    eprintln!("  Volumes: {}", info.volume_units.join(", "));
    eprintln!("===============================================");
}
