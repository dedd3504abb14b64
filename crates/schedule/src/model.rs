//! Canonical Project → Macro → Micro tree.
//!
//! Nodes are immutable value objects.  `computed_hours` is never read from
//! the payload; it stays `None` until [`crate::duration::aggregate`] fills it.

use serde::Serialize;
use serde_json::Value;

use crate::validation::{non_empty_str, parse_hours, ValidatedPayload};

/// Rendering and limit options resolved from config defaults plus the
/// payload's `settings` block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleSettings {
    pub max_rows: usize,
    pub include_project_row: bool,
    pub sheet_name: String,
    pub format_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Micro {
    pub name: String,
    pub hours: f64,
    pub responsible: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Macro {
    pub name: String,
    pub responsible: Option<String>,
    pub micros: Vec<Micro>,
    pub(crate) computed_hours: Option<f64>,
}

impl Macro {
    pub fn computed_hours(&self) -> Option<f64> {
        self.computed_hours
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    pub name: String,
    pub code: Option<String>,
    pub owner: Option<String>,
    pub timezone: Option<String>,
    pub(crate) computed_hours: Option<f64>,
}

impl Project {
    pub fn computed_hours(&self) -> Option<f64> {
        self.computed_hours
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleTree {
    pub project: Project,
    pub macros: Vec<Macro>,
    pub settings: ScheduleSettings,
}

impl ScheduleTree {
    /// Build the tree from a payload that already passed validation.
    ///
    /// Input order is preserved.  There is no failure path: every field the
    /// validator required is known to be present and well-formed.
    pub fn build(payload: ValidatedPayload) -> Self {
        let ValidatedPayload { raw, settings } = payload;

        let project = raw.get("project").unwrap_or(&Value::Null);
        let project = Project {
            name: text(project, "name"),
            code: optional_text(project, "code"),
            owner: optional_text(project, "owner"),
            timezone: optional_text(project, "timezone"),
            computed_hours: None,
        };

        let macros = raw
            .get("macros")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(build_macro).collect())
            .unwrap_or_default();

        Self {
            project,
            macros,
            settings,
        }
    }

    pub fn macro_count(&self) -> usize {
        self.macros.len()
    }

    pub fn micro_count(&self) -> usize {
        self.macros.iter().map(|m| m.micros.len()).sum()
    }
}

fn build_macro(item: &Value) -> Macro {
    let micros = item
        .get("micros")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(build_micro).collect())
        .unwrap_or_default();

    Macro {
        name: text(item, "name"),
        responsible: optional_text(item, "responsible"),
        micros,
        computed_hours: None,
    }
}

fn build_micro(item: &Value) -> Micro {
    Micro {
        name: text(item, "name"),
        hours: item.get("hours").and_then(parse_hours).unwrap_or_default(),
        responsible: optional_text(item, "responsible"),
    }
}

fn text(obj: &Value, key: &str) -> String {
    obj.get(key)
        .and_then(non_empty_str)
        .map(str::to_owned)
        .unwrap_or_default()
}

/// Optional pass-through fields: strings are trimmed, numbers are kept in
/// their textual form, anything else is dropped.
fn optional_text(obj: &Value, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;
    use serde_json::json;
    use sg_domain::config::ScheduleConfig;

    fn build(raw: Value) -> ScheduleTree {
        let payload = validate(&raw, &ScheduleConfig::default())
            .into_result()
            .expect("payload should be valid");
        ScheduleTree::build(payload)
    }

    #[test]
    fn preserves_order_and_optional_fields() {
        let tree = build(json!({
            "project": { "name": " Apollo ", "code": 7, "owner": "Ana", "timezone": "America/Sao_Paulo" },
            "macros": [
                { "name": "Second?", "responsible": "Bo", "micros": [
                    { "name": "z", "hours": 1 }, { "name": "a", "hours": "2.5", "responsible": "Cy" }
                ]},
                { "name": "First?", "micros": [{ "name": "m", "hours": 3 }] }
            ]
        }));

        assert_eq!(tree.project.name, "Apollo");
        assert_eq!(tree.project.code.as_deref(), Some("7"));
        assert_eq!(tree.project.owner.as_deref(), Some("Ana"));
        assert_eq!(tree.project.timezone.as_deref(), Some("America/Sao_Paulo"));
        assert_eq!(tree.macros[0].name, "Second?");
        assert_eq!(tree.macros[0].responsible.as_deref(), Some("Bo"));
        assert_eq!(tree.macros[0].micros[0].name, "z");
        assert_eq!(tree.macros[0].micros[1].hours, 2.5);
        assert_eq!(tree.macros[0].micros[1].responsible.as_deref(), Some("Cy"));
        assert_eq!(tree.macros[1].name, "First?");
        assert_eq!(tree.macro_count(), 2);
        assert_eq!(tree.micro_count(), 3);
    }

    #[test]
    fn supplied_totals_are_ignored() {
        let tree = build(json!({
            "project": { "name": "P", "computed_hours": 999 },
            "macros": [{ "name": "A", "computed_hours": 999, "hours": 999,
                         "micros": [{ "name": "a", "hours": 1 }] }]
        }));
        assert_eq!(tree.project.computed_hours(), None);
        assert_eq!(tree.macros[0].computed_hours(), None);
    }
}
