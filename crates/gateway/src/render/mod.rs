//! Workbook rendering.

pub mod filename;
pub mod xlsx;

pub use filename::{artifact_filename, sanitize_filename};
pub use xlsx::{render_workbook, RenderError, XLSX_MIME};
