//! Payload validation.
//!
//! Validation never stops at the first problem: every violation is collected
//! so a caller can fix the whole payload in one round trip.  The outcome is a
//! value, not an error path.  [`ValidationOutcome::Valid`] carries the only
//! handle from which a [`ScheduleTree`](crate::ScheduleTree) can be built.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use sg_domain::config::{is_valid_sheet_name, ScheduleConfig, SHEET_NAME_MAX_CHARS};

use crate::model::ScheduleSettings;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Issues
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    MissingField,
    EmptyMicros,
    InvalidHours,
    InvalidSetting,
    TooManyRows,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingField => "MISSING_FIELD",
            Self::EmptyMicros => "EMPTY_MICROS",
            Self::InvalidHours => "INVALID_HOURS",
            Self::InvalidSetting => "INVALID_SETTING",
            Self::TooManyRows => "TOO_MANY_ROWS",
        }
    }
}

/// One violation, addressed by a JSON-path-like field name
/// (`macros[2].micros[0].hours`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub issue: IssueCode,
    pub message: String,
}

impl FieldIssue {
    fn new(field: impl Into<String>, issue: IssueCode, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            issue,
            message: message.into(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Outcome
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A payload that passed every rule, plus the settings resolved against the
/// configured defaults.  Only [`validate`] can produce one.
#[derive(Debug, Clone)]
pub struct ValidatedPayload {
    pub(crate) raw: Value,
    pub(crate) settings: ScheduleSettings,
}

impl ValidatedPayload {
    pub fn settings(&self) -> &ScheduleSettings {
        &self.settings
    }
}

#[derive(Debug, Clone)]
pub enum ValidationOutcome {
    Valid(ValidatedPayload),
    Invalid(Vec<FieldIssue>),
}

impl ValidationOutcome {
    pub fn ok(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn errors(&self) -> &[FieldIssue] {
        match self {
            Self::Valid(_) => &[],
            Self::Invalid(errors) => errors,
        }
    }

    pub fn into_result(self) -> Result<ValidatedPayload, Vec<FieldIssue>> {
        match self {
            Self::Valid(payload) => Ok(payload),
            Self::Invalid(errors) => Err(errors),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Rules
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Check `raw` against every structural rule.
///
/// `defaults` supplies the configured row ceiling and rendering options; a
/// valid `settings` block in the payload overrides them.  The row ceiling is
/// only resolved here; it is enforced by [`crate::rows::check`] once the
/// tree exists and the row count is known.
pub fn validate(raw: &Value, defaults: &ScheduleConfig) -> ValidationOutcome {
    let mut errors = Vec::new();

    let project = raw.get("project");
    if project.and_then(|p| p.get("name")).and_then(non_empty_str).is_none() {
        errors.push(FieldIssue::new(
            "project.name",
            IssueCode::MissingField,
            "project name is required",
        ));
    }

    match raw.get("macros").and_then(Value::as_array) {
        Some(macros) if !macros.is_empty() => {
            for (idx, item) in macros.iter().enumerate() {
                check_macro(idx, item, &mut errors);
            }
        }
        _ => errors.push(FieldIssue::new(
            "macros",
            IssueCode::MissingField,
            "at least one macro is required",
        )),
    }

    let settings = resolve_settings(raw.get("settings"), defaults, &mut errors);

    if errors.is_empty() {
        ValidationOutcome::Valid(ValidatedPayload {
            raw: raw.clone(),
            settings,
        })
    } else {
        ValidationOutcome::Invalid(errors)
    }
}

fn check_macro(idx: usize, item: &Value, errors: &mut Vec<FieldIssue>) {
    let obj = item.as_object();

    if obj.and_then(|o| o.get("name")).and_then(non_empty_str).is_none() {
        errors.push(FieldIssue::new(
            format!("macros[{idx}].name"),
            IssueCode::MissingField,
            "macro name is required",
        ));
    }

    let micros = obj
        .and_then(|o| o.get("micros"))
        .and_then(Value::as_array)
        .filter(|m| !m.is_empty());

    let Some(micros) = micros else {
        errors.push(FieldIssue::new(
            format!("macros[{idx}].micros"),
            IssueCode::EmptyMicros,
            "a macro must always contain at least one micro",
        ));
        return;
    };

    for (midx, micro) in micros.iter().enumerate() {
        check_micro(idx, midx, micro.as_object(), errors);
    }
}

fn check_micro(idx: usize, midx: usize, obj: Option<&Map<String, Value>>, errors: &mut Vec<FieldIssue>) {
    let prefix = format!("macros[{idx}].micros[{midx}]");

    if obj.and_then(|o| o.get("name")).and_then(non_empty_str).is_none() {
        errors.push(FieldIssue::new(
            format!("{prefix}.name"),
            IssueCode::MissingField,
            "micro name is required",
        ));
    }

    match obj.and_then(|o| o.get("hours")) {
        None | Some(Value::Null) => errors.push(FieldIssue::new(
            format!("{prefix}.hours"),
            IssueCode::InvalidHours,
            "hours is required",
        )),
        Some(value) => match parse_hours(value) {
            None => errors.push(FieldIssue::new(
                format!("{prefix}.hours"),
                IssueCode::InvalidHours,
                "hours must be numeric",
            )),
            Some(h) if h <= 0.0 => errors.push(FieldIssue::new(
                format!("{prefix}.hours"),
                IssueCode::InvalidHours,
                "hours must be greater than 0",
            )),
            Some(_) => {}
        },
    }
}

fn resolve_settings(
    raw: Option<&Value>,
    defaults: &ScheduleConfig,
    errors: &mut Vec<FieldIssue>,
) -> ScheduleSettings {
    let mut settings = ScheduleSettings {
        max_rows: defaults.max_rows,
        include_project_row: defaults.include_project_row,
        sheet_name: defaults.sheet_name.clone(),
        format_version: defaults.format_version.clone(),
    };

    let Some(obj) = raw.and_then(Value::as_object) else {
        if raw.is_some_and(|v| !v.is_null()) {
            errors.push(FieldIssue::new(
                "settings",
                IssueCode::InvalidSetting,
                "settings must be an object",
            ));
        }
        return settings;
    };

    if let Some(v) = obj.get("max_rows").filter(|v| !v.is_null()) {
        match v.as_u64().filter(|n| *n > 0) {
            Some(n) => settings.max_rows = usize::try_from(n).unwrap_or(usize::MAX),
            None => errors.push(FieldIssue::new(
                "settings.max_rows",
                IssueCode::InvalidSetting,
                "max_rows must be a positive integer",
            )),
        }
    }

    if let Some(v) = obj.get("include_project_row").filter(|v| !v.is_null()) {
        match v.as_bool() {
            Some(b) => settings.include_project_row = b,
            None => errors.push(FieldIssue::new(
                "settings.include_project_row",
                IssueCode::InvalidSetting,
                "include_project_row must be a boolean",
            )),
        }
    }

    if let Some(v) = obj.get("sheet_name").filter(|v| !v.is_null()) {
        match v.as_str().map(str::trim) {
            Some(name) if is_valid_sheet_name(name) => settings.sheet_name = name.to_owned(),
            _ => errors.push(FieldIssue::new(
                "settings.sheet_name",
                IssueCode::InvalidSetting,
                format!(
                    "sheet_name must be 1..={SHEET_NAME_MAX_CHARS} characters without any of []:*?/\\ or a leading or trailing apostrophe"
                ),
            )),
        }
    }

    if let Some(v) = obj.get("format_version").filter(|v| !v.is_null()) {
        match v.as_str().and_then(non_empty) {
            Some(version) => settings.format_version = version.to_owned(),
            None => errors.push(FieldIssue::new(
                "settings.format_version",
                IssueCode::InvalidSetting,
                "format_version must be a non-empty string",
            )),
        }
    }

    settings
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Value helpers (shared with the model builder)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Hours are a JSON number or a string holding a finite decimal number.
/// Booleans are never numeric.
pub(crate) fn parse_hours(value: &Value) -> Option<f64> {
    let hours = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    hours.is_finite().then_some(hours)
}

pub(crate) fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().and_then(non_empty)
}

fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
