//! MCP tools: `generate_schedule`, `validate_schedule` and `health`.
//!
//! Business failures (validation, row limit, internal) come back as a
//! normal tool result with `isError` set and the same `{ ok: false }` body
//! the HTTP API returns.  Only an unknown tool name is a protocol error.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

use sg_mcp::{McpToolDef, ServerInfo, ToolCallError, ToolCallResult, ToolHandler};

use crate::service::{self, Failure, ServiceError, SERVICE_NAME};
use crate::state::AppState;

pub const GENERATE_SCHEDULE: &str = "generate_schedule";
pub const VALIDATE_SCHEDULE: &str = "validate_schedule";
pub const HEALTH: &str = "health";

pub struct ScheduleTools {
    state: AppState,
}

impl ScheduleTools {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

fn payload_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "payload": {
                "type": "object",
                "description": "Schedule payload: { project: { name, code?, owner?, timezone? }, settings?: { max_rows?, include_project_row?, sheet_name?, format_version? }, macros: [ { name, responsible?, micros: [ { name, hours, responsible? } ] } ] }",
                "properties": {
                    "project": { "type": "object" },
                    "settings": { "type": "object" },
                    "macros": { "type": "array" }
                },
                "required": ["project", "macros"]
            }
        },
        "required": ["payload"]
    })
}

fn success<T: Serialize>(body: &T) -> Result<ToolCallResult, ToolCallError> {
    let value = serde_json::to_value(body).map_err(|e| ToolCallError::Internal(e.to_string()))?;
    Ok(ToolCallResult::json(&value, false))
}

fn failure(err: ServiceError) -> Result<ToolCallResult, ToolCallError> {
    tracing::warn!(error_code = %err.error_code(), error = %err, "tool call failed");
    failure_body(&err.to_failure())
}

fn failure_body(body: &Failure) -> Result<ToolCallResult, ToolCallError> {
    let value = serde_json::to_value(body).map_err(|e| ToolCallError::Internal(e.to_string()))?;
    Ok(ToolCallResult::json(&value, true))
}

/// Tool arguments are `{ "payload": { ... } }`.  A missing payload is
/// validated as an empty one so the caller gets field-level issues back.
fn take_payload(mut arguments: Value) -> Value {
    arguments
        .get_mut("payload")
        .map(Value::take)
        .unwrap_or(Value::Null)
}

#[async_trait]
impl ToolHandler for ScheduleTools {
    fn server_info(&self) -> ServerInfo {
        ServerInfo {
            name: SERVICE_NAME.into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }

    fn tools(&self) -> Vec<McpToolDef> {
        vec![
            McpToolDef {
                name: GENERATE_SCHEDULE.into(),
                description: "Generate an XLSX schedule from a project/macro/micro payload. \
                              Durations are hours and may exceed 24; every macro needs at least one micro. \
                              Returns totals, a summary, the workbook as base64 and a temporary download URL."
                    .into(),
                input_schema: payload_schema(),
            },
            McpToolDef {
                name: VALIDATE_SCHEDULE.into(),
                description: "Validate a schedule payload and preview its totals without generating a file."
                    .into(),
                input_schema: payload_schema(),
            },
            McpToolDef {
                name: HEALTH.into(),
                description: "Report service status, limits and active downloads.".into(),
                input_schema: json!({ "type": "object", "properties": {} }),
            },
        ]
    }

    async fn call(&self, name: &str, arguments: Value) -> Result<ToolCallResult, ToolCallError> {
        match name {
            GENERATE_SCHEDULE => match service::generate(&self.state, take_payload(arguments)).await {
                Ok(resp) => success(&resp),
                Err(e) => failure(e),
            },
            VALIDATE_SCHEDULE => {
                match service::validate_preview(&take_payload(arguments), &self.state.config.schedule) {
                    Ok(resp) => success(&resp),
                    Err(e) => failure(e),
                }
            }
            HEALTH => success(&service::health(&self.state)),
            other => Err(ToolCallError::UnknownTool(other.to_owned())),
        }
    }
}
