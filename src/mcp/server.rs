//! Concentrator MCP Server Implementation
//!
//! Exposes the conversion, dilution and mixture forms as MCP tools.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::models::{CompoundId, CompoundRows};
use crate::tools::conversion;
use crate::tools::dilution::{self, DilutionForm};
use crate::tools::mixture::{self, CompoundFields, MixtureForm};
use crate::tools::status::StatusTracker;
use crate::tools::ToolError;

/// Concentrator MCP Service
#[derive(Clone)]
pub struct ConcentratorService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    /// Compound rows of the mixture form; the only mutable state
    compounds: Arc<std::sync::Mutex<CompoundRows>>,
    tool_router: ToolRouter<ConcentratorService>,
}

impl Default for ConcentratorService {
    fn default() -> Self {
        Self::new()
    }
}

impl ConcentratorService {
    pub fn new() -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new())),
            compounds: Arc::new(std::sync::Mutex::new(CompoundRows::new())),
            tool_router: Self::tool_router(),
        }
    }

    fn with_compounds<T>(&self, f: impl FnOnce(&mut CompoundRows) -> T) -> Result<T, McpError> {
        let mut rows = self
            .compounds
            .lock()
            .map_err(|_| McpError::internal_error("Compound list lock poisoned", None))?;
        Ok(f(&mut *rows))
    }
}

// ============================================================================
// Response Helpers
// ============================================================================

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Calculation failures are shown to the user, not raised as protocol errors
fn respond<T: Serialize>(result: Result<T, ToolError>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(value) => json_result(&value),
        Err(e) => {
            tracing::debug!("Form rejected input: {}", e);
            json_result(&e.to_response())
        }
    }
}

fn invalid_id(id: &str) -> Result<CallToolResult, McpError> {
    json_result(&serde_json::json!({
        "error": "Invalid compound id",
        "kind": "compound_row",
        "id": id,
    }))
}

// ============================================================================
// Conversion Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ConvertConcentrationParams {
    /// Concentration value as typed (e.g., "5")
    pub concentration: String,
    /// Unit to convert from: mol/L, mM, µM, nM, mg/mL (default mg/mL)
    #[serde(default = "default_from_unit")]
    pub from_unit: String,
    /// Unit to convert to: mol/L, mM, µM, nM, mg/mL (default mol/L)
    #[serde(default = "default_concentration_unit")]
    pub to_unit: String,
    /// Molecular weight in g/mol; required when either unit is mg/mL
    pub molecular_weight: Option<String>,
}

fn default_from_unit() -> String { "mg/mL".to_string() }
fn default_concentration_unit() -> String { "mol/L".to_string() }
fn default_volume_unit() -> String { "mL".to_string() }

// ============================================================================
// Dilution Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CalculateDilutionParams {
    /// Stock concentration as typed
    pub stock_concentration: String,
    /// Stock unit: mol/L, mM, µM, nM, mg/mL (default mol/L)
    #[serde(default = "default_concentration_unit")]
    pub stock_unit: String,
    /// Target concentration as typed
    pub final_concentration: String,
    /// Target unit: mol/L, mM, µM, nM, mg/mL (default mol/L)
    #[serde(default = "default_concentration_unit")]
    pub final_unit: String,
    /// Target volume as typed
    pub final_volume: String,
    /// Volume unit: mL or µL (default mL)
    #[serde(default = "default_volume_unit")]
    pub volume_unit: String,
    /// Molecular weight in g/mol; required when either unit is mg/mL
    pub molecular_weight: Option<String>,
}

// ============================================================================
// Mixture Parameter Structs
// ============================================================================

/// One compound row
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CompoundParam {
    /// Stock concentration as typed
    pub concentration: Option<String>,
    /// Unit: mol/L, mM, µM, nM, mg/mL (default mol/L)
    pub unit: Option<String>,
    /// Molecular weight in g/mol; required when unit is mg/mL
    pub molecular_weight: Option<String>,
    /// Mixing ratio, a positive whole number (default 1)
    pub ratio: Option<u32>,
}

impl CompoundParam {
    fn as_fields(&self) -> CompoundFields<'_> {
        CompoundFields {
            concentration: self.concentration.as_deref(),
            unit: self.unit.as_deref(),
            molecular_weight: self.molecular_weight.as_deref(),
            ratio: self.ratio,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateCompoundParams {
    /// Compound row id (from list_compounds)
    pub id: String,
    /// New concentration (optional)
    pub concentration: Option<String>,
    /// New unit (optional)
    pub unit: Option<String>,
    /// New molecular weight (optional)
    pub molecular_weight: Option<String>,
    /// New mixing ratio (optional)
    pub ratio: Option<u32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RemoveCompoundParams {
    /// Compound row id to remove
    pub id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CalculateMixtureParams {
    /// Target concentration as typed
    pub final_concentration: String,
    /// Target unit: mol/L, mM, µM, nM, mg/mL (default mol/L)
    #[serde(default = "default_concentration_unit")]
    pub final_concentration_unit: String,
    /// Target volume as typed
    pub final_volume: String,
    /// Volume unit: mL or µL (default mL)
    #[serde(default = "default_volume_unit")]
    pub volume_unit: String,
    /// Final mass, only read when the target unit is mg/mL
    pub final_mass: Option<String>,
    /// Inline compounds; when omitted the stored compound rows are used
    pub compounds: Option<Vec<CompoundParam>>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl ConcentratorService {
    // --- Status ---

    #[tool(description = "Get the current status of the Concentrator service including build info, stored compound rows, and process information")]
    async fn concentrator_status(&self) -> Result<CallToolResult, McpError> {
        let rows = self.with_compounds(|rows| rows.len())?;
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(rows);
        json_result(&status)
    }

    #[tool(description = "Get instructions for the concentration, dilution, and mixture calculators. Call this when unsure how to use the tools.")]
    fn calculator_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::CALCULATOR_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(CALCULATOR_INSTRUCTIONS)]))
    }

    // --- Conversion ---

    #[tool(description = "Convert a concentration between mol/L, mM, µM, nM and mg/mL (mg/mL needs a molecular weight)")]
    fn convert_concentration(&self, Parameters(p): Parameters<ConvertConcentrationParams>) -> Result<CallToolResult, McpError> {
        let result = conversion::convert_concentration(
            &p.concentration, &p.from_unit, &p.to_unit, p.molecular_weight.as_deref(),
        );
        respond(result.map_err(ToolError::from))
    }

    // --- Dilution ---

    #[tool(description = "Calculate stock and diluent volumes to dilute a stock solution to a target concentration and volume. A negative diluent volume (feasible=false) means the stock is too weak.")]
    fn calculate_dilution(&self, Parameters(p): Parameters<CalculateDilutionParams>) -> Result<CallToolResult, McpError> {
        let form = DilutionForm {
            stock_concentration: &p.stock_concentration,
            stock_unit: &p.stock_unit,
            final_concentration: &p.final_concentration,
            final_unit: &p.final_unit,
            final_volume: &p.final_volume,
            volume_unit: &p.volume_unit,
            molecular_weight: p.molecular_weight.as_deref(),
        };
        respond(dilution::calculate_dilution(&form).map_err(ToolError::from))
    }

    // --- Compound Rows ---

    #[tool(description = "List the stored compound rows of the mixture form, in entry order, with their ids")]
    fn list_compounds(&self) -> Result<CallToolResult, McpError> {
        let resp = self.with_compounds(|rows| mixture::list_compounds(rows))?;
        json_result(&resp)
    }

    #[tool(description = "Add a compound row to the mixture form (defaults: unit mol/L, ratio 1)")]
    fn add_compound(&self, Parameters(p): Parameters<CompoundParam>) -> Result<CallToolResult, McpError> {
        let result = self.with_compounds(|rows| mixture::add_compound(rows, &p.as_fields()))?;
        respond(result)
    }

    #[tool(description = "Update fields of a stored compound row by id")]
    fn update_compound(&self, Parameters(p): Parameters<UpdateCompoundParams>) -> Result<CallToolResult, McpError> {
        let Some(id) = CompoundId::parse(&p.id) else {
            return invalid_id(&p.id);
        };
        let fields = CompoundFields {
            concentration: p.concentration.as_deref(),
            unit: p.unit.as_deref(),
            molecular_weight: p.molecular_weight.as_deref(),
            ratio: p.ratio,
        };
        let result = self.with_compounds(|rows| mixture::update_compound(rows, id, &fields))?;
        respond(result)
    }

    #[tool(description = "Remove a stored compound row by id. The last remaining row cannot be removed.")]
    fn remove_compound(&self, Parameters(p): Parameters<RemoveCompoundParams>) -> Result<CallToolResult, McpError> {
        let Some(id) = CompoundId::parse(&p.id) else {
            return invalid_id(&p.id);
        };
        let result = self.with_compounds(|rows| mixture::remove_compound(rows, id))?;
        respond(result)
    }

    #[tool(description = "Reset the mixture form to a single empty compound row")]
    fn reset_compounds(&self) -> Result<CallToolResult, McpError> {
        let resp = self.with_compounds(|rows| {
            rows.reset();
            mixture::list_compounds(rows)
        })?;
        tracing::info!("Compound rows reset");
        json_result(&resp)
    }

    // --- Mixture ---

    #[tool(description = "Calculate per-compound stock volumes and buffer volume for a mixture. Uses inline compounds if given, otherwise the stored compound rows.")]
    fn calculate_mixture(&self, Parameters(p): Parameters<CalculateMixtureParams>) -> Result<CallToolResult, McpError> {
        let form = MixtureForm {
            final_concentration: &p.final_concentration,
            final_concentration_unit: &p.final_concentration_unit,
            final_volume: &p.final_volume,
            volume_unit: &p.volume_unit,
            final_mass: p.final_mass.as_deref(),
        };
        let result = match &p.compounds {
            Some(inline) => {
                let fields: Vec<CompoundFields<'_>> = inline.iter().map(CompoundParam::as_fields).collect();
                mixture::rows_from_fields(&fields)
                    .and_then(|rows| mixture::calculate_mixture(&rows, &form).map_err(ToolError::from))
            }
            None => self.with_compounds(|rows| {
                mixture::calculate_mixture(rows, &form).map_err(ToolError::from)
            })?,
        };
        respond(result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for ConcentratorService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "concentrator".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("The Concentrator".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "The Concentrator - laboratory solution preparation calculators. \
                 Call calculator_instructions first if unsure. \
                 Conversion: convert_concentration (mol/L, mM, µM, nM, mg/mL). \
                 Dilution: calculate_dilution. \
                 Mixtures: calculate_mixture with inline compounds, or build stored rows with \
                 add/update/remove/list/reset_compounds and call calculate_mixture without compounds. \
                 All numeric inputs are strings as typed; invalid input returns an error message instead of a result."
                    .into(),
            ),
        }
    }
}
