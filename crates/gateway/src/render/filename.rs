use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

const MAX_STEM_CHARS: usize = 200;
const FALLBACK_STEM: &str = "schedule";

fn forbidden() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1f\x7f]"#).expect("static regex"))
}

fn whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

/// Make `name` safe as a filename component on every common filesystem.
pub fn sanitize_filename(name: &str) -> String {
    let stripped = forbidden().replace_all(name, "");
    let collapsed = whitespace().replace_all(&stripped, " ");
    let capped: String = collapsed.trim().chars().take(MAX_STEM_CHARS).collect();
    let capped = capped.trim_end();
    if capped.is_empty() {
        FALLBACK_STEM.to_owned()
    } else {
        capped.to_owned()
    }
}

/// `Schedule - {project} - {YYYY-MM-DD}.xlsx`
pub fn artifact_filename(project_name: &str, date: NaiveDate) -> String {
    format!(
        "Schedule - {} - {}.xlsx",
        sanitize_filename(project_name),
        date.format("%Y-%m-%d")
    )
}
