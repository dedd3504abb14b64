//! Row-count ceiling.
//!
//! Rendered rows: one header, one optional project row, one row per macro
//! and one per micro.  Exceeding the ceiling aborts the pipeline before any
//! rendering, so nothing partial or truncated is ever produced.

use serde::Serialize;

use crate::model::ScheduleTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowCount {
    pub header: usize,
    pub project: usize,
    pub macros: usize,
    pub micros: usize,
}

impl RowCount {
    pub fn of(tree: &ScheduleTree) -> Self {
        Self {
            header: 1,
            project: usize::from(tree.settings.include_project_row),
            macros: tree.macro_count(),
            micros: tree.micro_count(),
        }
    }

    pub fn total(&self) -> usize {
        self.header + self.project + self.macros + self.micros
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("the schedule has {actual} rows, exceeding the limit of {limit}")]
pub struct RowLimitExceeded {
    pub actual: usize,
    pub limit: usize,
}

/// Enforce `max_rows` against the built tree.
pub fn check(tree: &ScheduleTree, max_rows: usize) -> Result<RowCount, RowLimitExceeded> {
    let rows = RowCount::of(tree);
    let actual = rows.total();
    if actual > max_rows {
        return Err(RowLimitExceeded {
            actual,
            limit: max_rows,
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;
    use serde_json::json;
    use sg_domain::config::ScheduleConfig;

    fn tree(include_project_row: bool) -> ScheduleTree {
        let raw = json!({
            "project": { "name": "P" },
            "settings": { "include_project_row": include_project_row },
            "macros": [
                { "name": "A", "micros": [{ "name": "a1", "hours": 1 }, { "name": "a2", "hours": 1 }] },
                { "name": "B", "micros": [{ "name": "b1", "hours": 1 }] }
            ]
        });
        let payload = validate(&raw, &ScheduleConfig::default()).into_result().unwrap();
        ScheduleTree::build(payload)
    }

    #[test]
    fn counts_header_project_macros_micros() {
        let rows = RowCount::of(&tree(true));
        assert_eq!(rows.total(), 1 + 1 + 2 + 3);
        assert_eq!(RowCount::of(&tree(false)).total(), 1 + 2 + 3);
    }

    #[test]
    fn limit_is_inclusive() {
        assert!(check(&tree(true), 7).is_ok());
        let err = check(&tree(true), 6).unwrap_err();
        assert_eq!(err, RowLimitExceeded { actual: 7, limit: 6 });
        assert_eq!(err.to_string(), "the schedule has 7 rows, exceeding the limit of 6");
    }

    #[test]
    fn dropping_project_row_frees_one_row() {
        assert!(check(&tree(false), 6).is_ok());
    }
}
