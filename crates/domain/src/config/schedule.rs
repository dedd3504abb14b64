use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Schedule generation defaults
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Defaults applied when a payload's `settings` block omits a value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Row ceiling (header + project + macros + micros).  A payload may
    /// override it through `settings.max_rows`.
    #[serde(default = "d_500")]
    pub max_rows: usize,
    #[serde(default = "d_true")]
    pub include_project_row: bool,
    #[serde(default = "d_sheet_name")]
    pub sheet_name: String,
    #[serde(default = "d_format_version")]
    pub format_version: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            max_rows: 500,
            include_project_row: true,
            sheet_name: d_sheet_name(),
            format_version: d_format_version(),
        }
    }
}

/// Excel rejects sheet names longer than this.
pub const SHEET_NAME_MAX_CHARS: usize = 31;
const SHEET_NAME_FORBIDDEN: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Whether Excel (and `rust_xlsxwriter`) will accept `name` as a worksheet
/// name: 1..=31 characters, none of `[]:*?/\`, no leading or trailing
/// apostrophe, and not the reserved `History`.
pub fn is_valid_sheet_name(name: &str) -> bool {
    let len = name.chars().count();
    (1..=SHEET_NAME_MAX_CHARS).contains(&len)
        && !name.contains(SHEET_NAME_FORBIDDEN)
        && !name.starts_with('\'')
        && !name.ends_with('\'')
        && !name.eq_ignore_ascii_case("history")
}

fn d_500() -> usize {
    500
}
fn d_true() -> bool {
    true
}
fn d_sheet_name() -> String {
    "Schedule".into()
}
fn d_format_version() -> String {
    "1.0.0".into()
}
