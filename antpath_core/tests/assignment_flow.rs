use std::io::Write;

use antpath_core::{
    Assignment, AssignmentError, GeometryError, Settings, SolutionAttempt, SolutionStatus, Verdict,
    assignment::{AssignmentRecord, ElementRecord, load_assignment_from_string, parse_map},
    config::ConfigError,
};
use chrono::Utc;
use tempfile::NamedTempFile;

const MAZE: &str = "
    ST BL WL BL BL BL
    BL BL WL BL PT BL
    BL BL WL BL BL BL
    BL BL BL BL WL EN
    BL BL BL BL WL BL
";

#[test]
fn settings_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        [validation]
        min_width = 3
        min_height = 3
        "#
    )
    .unwrap();

    let settings = Settings::from_file(file.path()).unwrap();
    assert_eq!(settings.validation.min_width, 3);
    assert_eq!(settings.validation.max_width, 25);

    let tiny = "ST BL BL\nBL WL BL\nBL BL EN";
    let assignment = load_assignment_from_string(tiny, "tiny", &settings).unwrap();
    assert!(assignment.is_solvable());
    // Default bounds reject the same map
    let err = load_assignment_from_string(tiny, "tiny", &Settings::default()).unwrap_err();
    assert!(matches!(
        err,
        AssignmentError::Geometry(GeometryError::FieldWidthOutOfRange { .. })
    ));
}

#[test]
fn missing_settings_file_is_an_io_error() {
    let err = Settings::from_file("/definitely/not/here.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn broken_settings_file_is_a_parse_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[validation\nmin_width = ").unwrap();
    let err = Settings::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn create_store_reload_and_review() {
    let settings = Settings::default();
    let catalog = settings.catalog().unwrap();
    let (draft, elements) = parse_map(MAZE).unwrap().into_draft("maze");
    let created = Assignment::create(draft, elements, Some(&[1, 2, 3, 4][..]), &catalog, &settings).unwrap();

    // Round trip through the store rows
    let record: AssignmentRecord = created.to_record();
    let element_rows: Vec<ElementRecord> = created
        .elements()
        .iter()
        .map(|e| ElementRecord {
            element_id: e.element_id,
            name: e.name.clone(),
            pos_x: e.position.x,
            pos_y: e.position.y,
        })
        .collect();
    let permitted: Vec<_> = created.actions().iter().map(|a| a.id).collect();
    let reloaded = Assignment::from_records(record, element_rows, &permitted, &catalog).unwrap();
    assert_eq!(reloaded, created);

    let answer = reloaded.solve().unwrap();
    let mut attempt = SolutionAttempt::submit(reloaded.id, "student", answer, Utc::now());
    let verdict = attempt.auto_review(&reloaded, Utc::now()).unwrap();
    assert_eq!(verdict, Verdict::Success);
    assert_eq!(attempt.status(), SolutionStatus::Correct);

    // Straight right runs into the wall column
    let mut wrong = SolutionAttempt::submit(reloaded.id, "student", vec![1, 1], Utc::now());
    let verdict = wrong.auto_review(&reloaded, Utc::now()).unwrap();
    assert_eq!(verdict.failed_step(), Some(1));
    assert_eq!(wrong.is_correct(), Some(false));
}

#[test]
fn verdict_serializes_with_a_tag() {
    let verdict = Verdict::WrongEnd {
        position: antpath_core::Position::new(3, 2),
    };
    let json = serde_json::to_string(&verdict).unwrap();
    assert_eq!(json, r#"{"verdict":"wrong_end","position":{"x":3,"y":2}}"#);
}
