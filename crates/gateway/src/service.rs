//! Operations shared by the HTTP API and the MCP tools.
//!
//! Each returns either a success body or a [`ServiceError`] that knows its
//! public error code and how to render the `{ ok: false }` body.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use sg_artifacts::{RegistryError, RegistryStats};
use sg_domain::ErrorCode;
use sg_schedule::{plan, FieldIssue, PlannedSchedule, ScheduleError, ScheduleSummary};

use crate::render::{artifact_filename, render_workbook, RenderError, XLSX_MIME};
use crate::state::AppState;

pub const SERVICE_NAME: &str = "schedgen";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Errors
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("render: {0}")]
    Render(#[from] RenderError),

    #[error("registry: {0}")]
    Registry(#[from] RegistryError),

    #[error("worker: {0}")]
    Worker(String),
}

impl ServiceError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Schedule(e) => e.error_code(),
            Self::Registry(RegistryError::NotFound) => ErrorCode::NotFound,
            Self::Render(_) | Self::Registry(_) | Self::Worker(_) => ErrorCode::InternalError,
        }
    }

    /// Public body.  Internal failures are reported generically; the cause
    /// goes to the log only.
    pub fn to_failure(&self) -> Failure {
        match self {
            Self::Schedule(e) => Failure {
                ok: false,
                error_code: e.error_code(),
                message: e.message(),
                details: e.details(),
            },
            _ => Failure::internal("internal error while generating the schedule"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    pub ok: bool,
    pub error_code: ErrorCode,
    pub message: String,
    pub details: Vec<FieldIssue>,
}

impl Failure {
    pub fn new(error_code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error_code,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Generate
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub ok: bool,
    pub format_version: String,
    pub project_name: String,
    pub project_total_hours: f64,
    pub project_total_duration_display: String,
    pub filename: String,
    pub mime_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
    pub download_url: String,
    pub download_expires_at: DateTime<Utc>,
    pub total_rows: usize,
    pub summary: ScheduleSummary,
}

/// Validate, plan, render and register.  Nothing is rendered or registered
/// unless planning succeeds.
pub async fn generate(state: &AppState, payload: Value) -> Result<GenerateResponse, ServiceError> {
    let planned = plan(&payload, &state.config.schedule)?;

    let worker_state = state.clone();
    tokio::task::spawn_blocking(move || render_and_register(&worker_state, planned))
        .await
        .map_err(|e| ServiceError::Worker(e.to_string()))?
}

fn render_and_register(
    state: &AppState,
    planned: PlannedSchedule,
) -> Result<GenerateResponse, ServiceError> {
    let bytes = render_workbook(&planned)?;
    let filename = artifact_filename(&planned.tree.project.name, state.clock.now().date_naive());

    let registered = state.registry.register(
        &bytes,
        &filename,
        XLSX_MIME,
        state.config.artifacts.ttl(),
    )?;

    let base64 = state
        .config
        .artifacts
        .inline_base64
        .then(|| BASE64.encode(&bytes));

    tracing::info!(
        project = %planned.tree.project.name,
        filename = %filename,
        rows = planned.total_rows(),
        bytes = bytes.len(),
        "schedule generated"
    );

    Ok(GenerateResponse {
        ok: true,
        format_version: planned.tree.settings.format_version.clone(),
        project_name: planned.tree.project.name.clone(),
        project_total_hours: planned.project_total_hours(),
        project_total_duration_display: planned.project_total_display(),
        filename,
        mime_type: XLSX_MIME,
        base64,
        download_url: state.config.server.download_url(&registered.token),
        download_expires_at: registered.expires_at,
        total_rows: planned.total_rows(),
        summary: planned.summary,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Validate (preview)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    pub project_name: String,
    pub project_total_hours: f64,
    pub project_total_duration_display: String,
    pub macro_count: usize,
    pub micro_count: usize,
    pub total_rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidateResponse {
    pub ok: bool,
    pub message: String,
    pub preview: Preview,
}

/// Run the full planning pipeline without rendering anything.
pub fn validate_preview(
    payload: &Value,
    defaults: &sg_domain::config::ScheduleConfig,
) -> Result<ValidateResponse, ServiceError> {
    let planned = plan(payload, defaults)?;
    Ok(ValidateResponse {
        ok: true,
        message: "payload is valid".into(),
        preview: Preview {
            project_name: planned.tree.project.name.clone(),
            project_total_hours: planned.project_total_hours(),
            project_total_duration_display: planned.project_total_display(),
            macro_count: planned.summary.macro_count,
            micro_count: planned.summary.micro_count,
            total_rows: planned.total_rows(),
        },
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Health
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub max_rows: usize,
    pub ttl_minutes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    pub artifacts: RegistryStats,
}

pub fn health(state: &AppState) -> HealthResponse {
    let artifacts = state.registry.stats();
    let output_dir = (artifacts.storage == "disk")
        .then(|| state.config.artifacts.output_dir.display().to_string());

    HealthResponse {
        ok: true,
        service: SERVICE_NAME,
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started_at.elapsed().as_secs(),
        max_rows: state.config.schedule.max_rows,
        ttl_minutes: state.config.artifacts.ttl_minutes,
        output_dir,
        artifacts,
    }
}
