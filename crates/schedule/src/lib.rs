//! `sg-schedule` turns a project/macro/micro payload into a validated,
//! duration-consistent schedule.
//!
//! The pipeline is pure and synchronous:
//!
//! ```text
//! raw JSON ─▶ validation ─▶ model::build ─▶ duration::aggregate ─▶ rows::check
//! ```
//!
//! [`plan`] runs all four stages and returns either a [`PlannedSchedule`]
//! ready for rendering or a [`ScheduleError`] describing every problem found.

pub mod duration;
pub mod model;
pub mod plan;
pub mod rows;
pub mod validation;

pub use duration::{aggregate, format_duration, parse_duration_display, round4, DurationParseError};
pub use model::{Macro, Micro, Project, ScheduleSettings, ScheduleTree};
pub use plan::{plan, MacroSummary, PlannedSchedule, ScheduleError, ScheduleSummary};
pub use rows::{RowCount, RowLimitExceeded};
pub use validation::{validate, FieldIssue, IssueCode, ValidatedPayload, ValidationOutcome};
