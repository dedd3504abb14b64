//! Hour aggregation and the canonical `H:MM:SS` display format.
//!
//! Sums run on the raw `f64` values bottom-up.  Rounding happens only when a
//! total is reported ([`round4`]) or displayed ([`format_duration`]), so no
//! rounding error compounds across levels.  Hours are unbounded in the
//! display form: `247:40:00` is a valid duration, not a clock time.

use crate::model::ScheduleTree;

const SECONDS_PER_HOUR: u64 = 3600;

/// Fill `computed_hours` on every macro and on the project.
pub fn aggregate(mut tree: ScheduleTree) -> ScheduleTree {
    let mut project_total = 0.0_f64;
    for m in &mut tree.macros {
        let macro_total: f64 = m.micros.iter().map(|micro| micro.hours).sum();
        m.computed_hours = Some(macro_total);
        project_total += macro_total;
    }
    tree.project.computed_hours = Some(project_total);
    tree
}

/// Round to four decimal places for reporting.
pub fn round4(hours: f64) -> f64 {
    (hours * 10_000.0).round() / 10_000.0
}

/// Whole seconds in `hours`, rounded to nearest.  Negative and non-finite
/// inputs count as zero.
fn total_seconds(hours: f64) -> u64 {
    if hours.is_finite() && hours > 0.0 {
        // Saturating float→int cast; anything beyond u64 is not a schedule.
        (hours * SECONDS_PER_HOUR as f64).round() as u64
    } else {
        0
    }
}

/// Render hours as `H:MM:SS` with unpadded, unbounded hours.
///
/// Negative and non-finite inputs render as `0:00:00`.
pub fn format_duration(hours: f64) -> String {
    let total_seconds = total_seconds(hours);
    let h = total_seconds / SECONDS_PER_HOUR;
    let m = (total_seconds % SECONDS_PER_HOUR) / 60;
    let s = total_seconds % 60;
    format!("{h}:{m:02}:{s:02}")
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid duration '{0}': expected H:MM:SS with minutes and seconds <= 59")]
pub struct DurationParseError(pub String);

/// Inverse of [`format_duration`]: parse `H:MM:SS` back into hours.
pub fn parse_duration_display(value: &str) -> Result<f64, DurationParseError> {
    let err = || DurationParseError(value.to_owned());
    let mut parts = value.trim().split(':');

    let (Some(h), Some(m), Some(s), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(err());
    };
    if h.is_empty() || m.len() != 2 || s.len() != 2 {
        return Err(err());
    }
    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    if !(all_digits(h) && all_digits(m) && all_digits(s)) {
        return Err(err());
    }

    let h: u64 = h.parse().map_err(|_| err())?;
    let m: u64 = m.parse().map_err(|_| err())?;
    let s: u64 = s.parse().map_err(|_| err())?;
    if m > 59 || s > 59 {
        return Err(err());
    }

    let total_seconds = h
        .checked_mul(SECONDS_PER_HOUR)
        .and_then(|secs| secs.checked_add(m * 60 + s))
        .ok_or_else(err)?;
    Ok(total_seconds as f64 / SECONDS_PER_HOUR as f64)
}
