//! Concentrator Status Tool
//!
//! Runtime status of the service and usage instructions for AI assistants.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Calculator usage instructions for AI assistants
pub const CALCULATOR_INSTRUCTIONS: &str = r#"
# The Concentrator: Usage Instructions

Three calculators for preparing laboratory solutions. Every numeric field is
passed as a string, exactly as a user would type it. Results come back as JSON
with a `display` line; failures come back as `{"error", "kind", "field"}`.

## Units

| Kind | Accepted |
|------|----------|
| Concentration | `mol/L` (or `M`), `mM`, `µM` (or `uM`), `nM`, `mg/mL` |
| Volume | `mL`, `µL` (or `uL`) |

Any other unit string is rejected. `mg/mL` needs a molecular weight (g/mol).

Displayed numbers use two decimals for magnitudes between 0.001 and 1,000,000
and scientific notation (`5.00e-4`) outside that range.

---

## 1. Convert a Concentration

```
convert_concentration(concentration: "5", from_unit: "mM", to_unit: "mol/L")
→ "5.00 mM = 0.01 mol/L"

convert_concentration(concentration: "2", from_unit: "mol/L", to_unit: "mg/mL",
                      molecular_weight: "180")
→ "2.00 mol/L = 360.00 mg/mL"
```

`molecular_weight` is only read when either unit is `mg/mL`.

---

## 2. Calculate a Dilution

```
calculate_dilution(stock_concentration: "10", stock_unit: "mol/L",
                   final_concentration: "1", final_unit: "mol/L",
                   final_volume: "100", volume_unit: "mL")
→ "Stock: 10.00 mL, Diluent: 90.00 mL"
```

- One `molecular_weight` serves both concentrations when either is `mg/mL`.
- If the stock is weaker than the target, the diluent volume is **negative**
  and `feasible` is `false`. Tell the user the dilution is impossible; do not
  round the negative number to zero.

---

## 3. Mix Several Compounds (Complexing)

Each compound contributes `ratio / total_ratio` of the target concentration.
The remaining volume is buffer. Buffer is never negative: if the compounds
need more than the final volume, buffer is reported as 0.

### Inline (one call)

```
calculate_mixture(final_concentration: "0.5", final_volume: "100",
                  compounds: [
                    {concentration: "1", unit: "mol/L", ratio: 1},
                    {concentration: "1", unit: "mol/L", ratio: 1}
                  ])
→ "Compound 1: 25.00 mL\nCompound 2: 25.00 mL\nBuffer: 50.00 mL"
```

### Stored rows (step by step)

The server keeps one list of compound rows. It always has at least one row.

| Task | Tool |
|------|------|
| See rows and their ids | `list_compounds` |
| Add a row | `add_compound` |
| Change a row | `update_compound(id, ...)` |
| Remove a row (not the last) | `remove_compound(id)` |
| Start over | `reset_compounds` |
| Calculate over stored rows | `calculate_mixture` without `compounds` |

Results are listed in row order and tagged with each row's `id`.

### Known limitation

When `final_concentration_unit` is `mg/mL`, the target is read as if its
molecular weight were 1 (0.2 mg/mL counts as 0.2 mol/L). Each compound still
uses its own molecular weight. `final_mass` is accepted with an `mg/mL` target
and echoed back, but does not change the result.
"#;

/// Runtime status of the Concentrator service
#[derive(Debug, Clone, Serialize)]
pub struct ConcentratorStatus {
    /// Build information
    pub version: &'static str,
    pub build_timestamp: &'static str,
    pub build_profile: &'static str,
    pub concentration_units: [&'static str; 5],
    pub volume_units: [&'static str; 2],

    /// Mixture form state
    pub compound_rows: usize,

    /// Process information
    pub started_at: String,
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    started_at: DateTime<Utc>,
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            started_at: Utc::now(),
        }
    }

    pub fn get_status(&self, compound_rows: usize) -> ConcentratorStatus {
        let build_info = BuildInfo::current();

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        ConcentratorStatus {
            version: build_info.version,
            build_timestamp: build_info.build_timestamp,
            build_profile: build_info.build_profile,
            concentration_units: build_info.concentration_units,
            volume_units: build_info.volume_units,
            compound_rows,
            started_at: self.started_at.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
