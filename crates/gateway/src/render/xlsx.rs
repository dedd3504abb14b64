//! Single-sheet XLSX rendering of a planned schedule.
//!
//! ```text
//! | Task name            | Duration  | Responsible |
//! |----------------------|-----------|-------------|
//! | Apollo               | 40:00:00  | Ana         |   project (optional)
//! | Build                | 40:00:00  | Bo          |   macro
//! |     Backend          | 16:00:00  | Cy          |   micro
//! |     Frontend         | 24:00:00  |             |   micro
//! ```
//!
//! Durations are written as real duration cells (fraction of a day with a
//! `[h]:mm:ss` format) so a spreadsheet can sum them.

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

use sg_schedule::{format_duration, parse_duration_display, DurationParseError, PlannedSchedule};

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const HEADERS: [&str; 3] = ["Task name", "Duration", "Responsible"];
const COLUMN_WIDTHS: [f64; 3] = [70.0, 15.0, 22.0];
const MICRO_INDENT: &str = "    ";
const DURATION_FORMAT: &str = "[h]:mm:ss";
const HOURS_PER_DAY: f64 = 24.0;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("xlsx: {0}")]
    Xlsx(#[from] XlsxError),

    #[error(transparent)]
    Duration(#[from] DurationParseError),
}

struct Formats {
    header_text: Format,
    header_centered: Format,
    project_text: Format,
    project_duration: Format,
    macro_text: Format,
    macro_duration: Format,
    micro_text: Format,
    micro_duration: Format,
}

impl Formats {
    fn new() -> Self {
        let header = Format::new()
            .set_bold()
            .set_font_size(11)
            .set_background_color(0xD3D3D3)
            .set_border(FormatBorder::Thin);
        let project = Format::new()
            .set_bold()
            .set_font_size(11)
            .set_background_color(0xA9A9A9)
            .set_border(FormatBorder::Thin);
        let macro_row = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_background_color(0xE8E8E8)
            .set_border(FormatBorder::Thin);
        let micro = Format::new().set_border(FormatBorder::Thin);

        let duration = |base: &Format| {
            base.clone()
                .set_align(FormatAlign::Center)
                .set_num_format(DURATION_FORMAT)
        };

        Self {
            header_centered: header.clone().set_align(FormatAlign::Center),
            project_duration: duration(&project),
            macro_duration: duration(&macro_row),
            micro_duration: duration(&micro),
            header_text: header.set_align(FormatAlign::Left),
            project_text: project,
            macro_text: macro_row,
            micro_text: micro,
        }
    }
}

/// Render `planned` to XLSX bytes.
pub fn render_workbook(planned: &PlannedSchedule) -> Result<Vec<u8>, RenderError> {
    let tree = &planned.tree;
    let formats = Formats::new();

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(&tree.settings.sheet_name)?;

    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        sheet.set_column_width(col as u16, *width)?;
    }

    for (col, title) in HEADERS.iter().enumerate() {
        let format = if col == 0 {
            &formats.header_text
        } else {
            &formats.header_centered
        };
        sheet.write_string_with_format(0, col as u16, *title, format)?;
    }
    sheet.set_freeze_panes(1, 0)?;

    let mut row: u32 = 1;

    if tree.settings.include_project_row {
        write_row(
            sheet,
            row,
            &tree.project.name,
            tree.project.computed_hours().unwrap_or_default(),
            tree.project.owner.as_deref(),
            &formats.project_text,
            &formats.project_duration,
        )?;
        row += 1;
    }

    for m in &tree.macros {
        write_row(
            sheet,
            row,
            &m.name,
            m.computed_hours().unwrap_or_default(),
            m.responsible.as_deref(),
            &formats.macro_text,
            &formats.macro_duration,
        )?;
        row += 1;

        for micro in &m.micros {
            write_row(
                sheet,
                row,
                &format!("{MICRO_INDENT}{}", micro.name),
                micro.hours,
                micro.responsible.as_deref(),
                &formats.micro_text,
                &formats.micro_duration,
            )?;
            row += 1;
        }
    }

    let bytes = workbook.save_to_buffer()?;
    tracing::debug!(rows = row, bytes = bytes.len(), "workbook rendered");
    Ok(bytes)
}

fn write_row(
    sheet: &mut Worksheet,
    row: u32,
    name: &str,
    hours: f64,
    responsible: Option<&str>,
    text: &Format,
    duration: &Format,
) -> Result<(), RenderError> {
    sheet.write_string_with_format(row, 0, name, text)?;
    sheet.write_number_with_format(row, 1, duration_cell(hours)?, duration)?;
    match responsible {
        Some(who) => sheet.write_string_with_format(row, 2, who, text)?,
        None => sheet.write_blank(row, 2, text)?,
    };
    Ok(())
}

/// Fraction of a day, read back from the `H:MM:SS` display so the cell
/// and the reported text can never disagree.
fn duration_cell(hours: f64) -> Result<f64, RenderError> {
    let shown = format_duration(hours);
    Ok(parse_duration_display(&shown)? / HOURS_PER_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sg_domain::config::ScheduleConfig;

    fn planned(include_project_row: bool) -> PlannedSchedule {
        let raw = json!({
            "project": { "name": "Apollo", "owner": "Ana" },
            "settings": { "include_project_row": include_project_row, "sheet_name": "Plan" },
            "macros": [{ "name": "Build", "responsible": "Bo", "micros": [
                { "name": "Backend", "hours": 16, "responsible": "Cy" },
                { "name": "Frontend", "hours": 24 }
            ]}]
        });
        sg_schedule::plan(&raw, &ScheduleConfig::default()).unwrap()
    }

    #[test]
    fn renders_a_zip_container() {
        let bytes = render_workbook(&planned(true)).unwrap();
        assert!(bytes.len() > 100);
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn renders_without_project_row() {
        let bytes = render_workbook(&planned(false)).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn duration_cells_are_day_fractions() {
        assert_eq!(duration_cell(24.0).unwrap(), 1.0);
        assert_eq!(duration_cell(40.0).unwrap(), 40.0 / 24.0);
        assert_eq!(duration_cell(-1.0).unwrap(), 0.0);
        // 0.1667h displays as 0:10:00, so the cell holds exactly ten minutes.
        let ten_minutes = duration_cell(0.1667).unwrap();
        assert!((ten_minutes - 600.0 / 86_400.0).abs() < 1e-12);
    }

    #[test]
    fn cell_matches_display_to_the_second() {
        for hours in [0.5, 7.999_99, 247.6667, 1234.5678] {
            let seconds = (duration_cell(hours).unwrap() * 86_400.0).round() as u64;
            let display = format!("{}:{:02}:{:02}", seconds / 3600, seconds % 3600 / 60, seconds % 60);
            assert_eq!(display, format_duration(hours), "hours = {hours}");
        }
    }

    #[test]
    fn edge_sheet_names_that_validate_also_render() {
        for name in ["x".repeat(31), "Q3 - don't slip".to_owned(), "Plan (v2)".to_owned()] {
            let raw = json!({
                "project": { "name": "P" },
                "settings": { "sheet_name": name },
                "macros": [{ "name": "A", "micros": [{ "name": "a", "hours": 1 }] }]
            });
            let planned = sg_schedule::plan(&raw, &ScheduleConfig::default()).unwrap();
            assert!(render_workbook(&planned).is_ok(), "sheet_name = {name:?}");
        }
    }
}
