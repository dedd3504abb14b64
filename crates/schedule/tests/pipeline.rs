use serde_json::{json, Value};
use sg_domain::config::ScheduleConfig;
use sg_domain::ErrorCode;
use sg_schedule::{format_duration, plan, IssueCode, ScheduleError};

fn payload(macros: Value) -> Value {
    json!({ "project": { "name": "Apollo" }, "macros": macros })
}

#[test]
fn sixteen_plus_twenty_four_is_forty_hours() {
    let raw = payload(json!([
        { "name": "Build", "micros": [{ "name": "a", "hours": 16 }, { "name": "b", "hours": 24 }] }
    ]));
    let planned = plan(&raw, &ScheduleConfig::default()).unwrap();

    let m = &planned.summary.macros[0];
    assert_eq!(m.hours, 40.0);
    assert_eq!(m.duration_display, "40:00:00");
    assert_eq!(planned.project_total_hours(), 40.0);
    assert_eq!(planned.project_total_display(), "40:00:00");
}

#[test]
fn totals_equal_the_sum_of_children() {
    let raw = payload(json!([
        { "name": "A", "micros": [
            { "name": "a1", "hours": 0.1 }, { "name": "a2", "hours": 0.2 }, { "name": "a3", "hours": "1.75" }
        ]},
        { "name": "B", "micros": [{ "name": "b1", "hours": 3.3333 }, { "name": "b2", "hours": 7 }] },
        { "name": "C", "micros": [{ "name": "c1", "hours": 0.0001 }] }
    ]));
    let planned = plan(&raw, &ScheduleConfig::default()).unwrap();
    let tree = &planned.tree;

    let mut project_sum = 0.0;
    for m in &tree.macros {
        let child_sum: f64 = m.micros.iter().map(|micro| micro.hours).sum();
        let total = m.computed_hours().unwrap();
        assert!((total - child_sum).abs() < 1e-9, "{}: {total} != {child_sum}", m.name);
        project_sum += total;
    }
    let project_total = tree.project.computed_hours().unwrap();
    assert!((project_total - project_sum).abs() < 1e-9);
}

#[test]
fn canonical_display_examples() {
    assert_eq!(format_duration(40.0), "40:00:00");
    assert_eq!(format_duration(0.1667), "0:10:00");
    assert_eq!(format_duration(247.6667), "247:40:00");
}

#[test]
fn empty_micros_is_a_validation_error() {
    let raw = payload(json!([
        { "name": "A", "micros": [{ "name": "a", "hours": 1 }] },
        { "name": "B", "micros": [] }
    ]));
    let err = plan(&raw, &ScheduleConfig::default()).unwrap_err();

    assert_eq!(err.error_code(), ErrorCode::ValidationError);
    let details = err.details();
    assert_eq!(details.len(), 1);
    assert_eq!(details[0].field, "macros[1].micros");
    assert_eq!(details[0].issue, IssueCode::EmptyMicros);
}

#[test]
fn every_problem_is_reported_at_once() {
    let raw = json!({
        "project": {},
        "settings": { "sheet_name": "bad/name" },
        "macros": [
            { "micros": [{ "name": "", "hours": -1 }] },
            { "name": "B" }
        ]
    });
    let Err(ScheduleError::Validation(issues)) = plan(&raw, &ScheduleConfig::default()) else {
        panic!("expected validation failure");
    };
    let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
    assert_eq!(
        fields,
        [
            "project.name",
            "macros[0].name",
            "macros[0].micros[0].name",
            "macros[0].micros[0].hours",
            "macros[1].micros",
            "settings.sheet_name",
        ]
    );
}

#[test]
fn exceeding_the_configured_ceiling() {
    let micros: Vec<Value> = (0..10).map(|i| json!({ "name": format!("t{i}"), "hours": 1 })).collect();
    let raw = payload(json!([{ "name": "A", "micros": micros }]));
    let config = ScheduleConfig {
        max_rows: 12,
        ..ScheduleConfig::default()
    };

    // header + project + 1 macro + 10 micros = 13
    let err = plan(&raw, &config).unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::MaxRowsExceeded);
    let ScheduleError::MaxRowsExceeded(exceeded) = err else {
        unreachable!()
    };
    assert_eq!((exceeded.actual, exceeded.limit), (13, 12));

    let mut without_project_row = payload(json!([{ "name": "A", "micros": micros }]));
    without_project_row["settings"] = json!({ "include_project_row": false });
    assert_eq!(plan(&without_project_row, &config).unwrap().total_rows(), 12);
}

#[test]
fn payload_settings_override_configured_defaults() {
    let raw = json!({
        "project": { "name": "P" },
        "settings": { "max_rows": 1000, "sheet_name": "Plan", "format_version": "2.0.0" },
        "macros": [{ "name": "A", "micros": [{ "name": "a", "hours": 1 }] }]
    });
    let config = ScheduleConfig {
        max_rows: 2,
        ..ScheduleConfig::default()
    };
    let planned = plan(&raw, &config).unwrap();
    assert_eq!(planned.tree.settings.max_rows, 1000);
    assert_eq!(planned.tree.settings.sheet_name, "Plan");
    assert_eq!(planned.tree.settings.format_version, "2.0.0");
}
