//! End-to-end planning: everything that happens before a workbook is drawn.

use serde::Serialize;
use serde_json::Value;

use sg_domain::config::ScheduleConfig;
use sg_domain::ErrorCode;

use crate::duration::{aggregate, format_duration, round4};
use crate::model::ScheduleTree;
use crate::rows::{self, RowCount, RowLimitExceeded};
use crate::validation::{validate, FieldIssue, IssueCode};

#[derive(Debug, Clone, thiserror::Error)]
pub enum ScheduleError {
    #[error("the payload failed validation with {} issue(s)", .0.len())]
    Validation(Vec<FieldIssue>),

    #[error(transparent)]
    MaxRowsExceeded(#[from] RowLimitExceeded),
}

impl ScheduleError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::ValidationError,
            Self::MaxRowsExceeded(_) => ErrorCode::MaxRowsExceeded,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Field-level detail list for the `{ ok: false }` response body.
    pub fn details(&self) -> Vec<FieldIssue> {
        match self {
            Self::Validation(issues) => issues.clone(),
            Self::MaxRowsExceeded(exceeded) => vec![FieldIssue {
                field: "total_rows".into(),
                issue: IssueCode::TooManyRows,
                message: exceeded.to_string(),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacroSummary {
    pub name: String,
    pub hours: f64,
    pub duration_display: String,
    pub micro_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleSummary {
    pub macro_count: usize,
    pub micro_count: usize,
    pub macros: Vec<MacroSummary>,
}

impl ScheduleSummary {
    fn of(tree: &ScheduleTree) -> Self {
        let macros = tree
            .macros
            .iter()
            .map(|m| {
                let hours = m.computed_hours().unwrap_or_default();
                MacroSummary {
                    name: m.name.clone(),
                    hours: round4(hours),
                    duration_display: format_duration(hours),
                    micro_count: m.micros.len(),
                }
            })
            .collect();

        Self {
            macro_count: tree.macro_count(),
            micro_count: tree.micro_count(),
            macros,
        }
    }
}

/// An aggregated tree that fits within its row ceiling.
#[derive(Debug, Clone)]
pub struct PlannedSchedule {
    pub tree: ScheduleTree,
    pub rows: RowCount,
    pub summary: ScheduleSummary,
}

impl PlannedSchedule {
    fn raw_total(&self) -> f64 {
        self.tree.project.computed_hours().unwrap_or_default()
    }

    pub fn project_total_hours(&self) -> f64 {
        round4(self.raw_total())
    }

    pub fn project_total_display(&self) -> String {
        format_duration(self.raw_total())
    }

    pub fn total_rows(&self) -> usize {
        self.rows.total()
    }
}

/// Validate, build, aggregate and enforce the row ceiling.
pub fn plan(raw: &Value, defaults: &ScheduleConfig) -> Result<PlannedSchedule, ScheduleError> {
    let payload = validate(raw, defaults)
        .into_result()
        .map_err(ScheduleError::Validation)?;
    let max_rows = payload.settings().max_rows;

    let tree = aggregate(ScheduleTree::build(payload));
    let rows = rows::check(&tree, max_rows)?;
    let summary = ScheduleSummary::of(&tree);

    tracing::debug!(
        project = %tree.project.name,
        macros = summary.macro_count,
        micros = summary.micro_count,
        rows = rows.total(),
        max_rows,
        "schedule planned"
    );

    Ok(PlannedSchedule {
        tree,
        rows,
        summary,
    })
}
