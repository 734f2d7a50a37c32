// ==========================================
// ImportApi 集成测试
// ==========================================
// 测试目标: 完整调用流程、配置回退、错误转换
// ==========================================

mod helpers;
mod test_helpers;

use coach_import::api::{ApiError, ImportApi};
use coach_import::config::config_keys;
use coach_import::domain::{EntityKind, MappingTarget};
use helpers::document_builder::DocumentBuilder;
use helpers::mock_config::MockConfig;
use std::sync::Arc;
use test_helpers::*;

const DOCUMENT_JSON: &str = r#"{
    "equipment": [{"name": "Trap Bar"}],
    "exercises": [
        {"name": "Trap Bar Deadlift", "tier": "primary", "required_equipment": ["Trap Bar"]}
    ],
    "workouts": [
        {
            "date": "2026-04-01",
            "sets": [
                {"exercise_name": "Trap Bar Deadlift", "set_number": 1, "reps": 5, "rep_type": "reps", "weight": 140.0}
            ],
            "review": {"rating": 5, "comment": "fast bar speed"}
        }
    ]
}"#;

#[test]
fn test_full_flow_from_json() {
    let (_temp, db_path) = create_test_db().unwrap();
    let athlete_id = insert_athlete(&db_path, "Alex");
    let coach_id = insert_coach(&db_path, "Coach Kim");
    let api = ImportApi::new(&db_path).unwrap();

    let document = api.load_document(DOCUMENT_JSON).unwrap();
    let mappings = api.build_mappings(&document).unwrap();
    let preview = api.preview(athlete_id, &mappings).unwrap();
    assert_eq!(preview.workouts, 1);
    assert_eq!(preview.reviews, 1);
    assert!(preview.conflicts.is_empty());

    let result = api.import_personal(athlete_id, &mappings, Some(coach_id)).unwrap();
    assert_eq!(result.workouts_created, 1);
    assert_eq!(result.sets_created, 1);
    assert_eq!(result.reviews_created, 1);
    assert_eq!(count_rows(&db_path, "exercise_equipment"), 1);

    // 再次预览：日期已存在
    let mappings = api.build_mappings(&document).unwrap();
    let preview = api.preview(athlete_id, &mappings).unwrap();
    assert_eq!(preview.conflicts.len(), 1);
    assert_eq!(preview.exercises.mapped, 1);
}

#[test]
fn test_default_reviewer_from_config() {
    let (_temp, db_path) = create_test_db().unwrap();
    let athlete_id = insert_athlete(&db_path, "Alex");
    let coach_id = insert_coach(&db_path, "Coach Kim");
    insert_test_config(&db_path, config_keys::DEFAULT_REVIEWER_ID, &coach_id.to_string());
    let api = ImportApi::new(&db_path).unwrap();

    let document = api.load_document(DOCUMENT_JSON).unwrap();
    let mappings = api.build_mappings(&document).unwrap();
    let result = api.import_personal(athlete_id, &mappings, None).unwrap();

    assert_eq!(result.reviews_created, 1);
    assert_eq!(result.reviews_skipped, 0);
}

#[test]
fn test_grace_days_from_mock_config() {
    let (_temp, db_path) = create_test_db().unwrap();
    let athlete_id = insert_athlete(&db_path, "Alex");
    let api = ImportApi::new(&db_path).unwrap();

    let tomorrow = (chrono::Local::now().date_naive() + chrono::Duration::days(1))
        .format("%Y-%m-%d")
        .to_string();
    let document = DocumentBuilder::new().exercise("Burpee").workout(&tomorrow, &["Burpee"]).build();
    let mappings = api.build_mappings(&document).unwrap();

    let strict = api.preview(athlete_id, &mappings).unwrap();
    assert_eq!(strict.warnings.len(), 1);
    assert_eq!(strict.warnings[0].field, "date");

    let relaxed_config = MockConfig {
        future_date_grace_days: 2,
        ..MockConfig::default()
    };
    let api = api.with_config(Arc::new(relaxed_config));
    let relaxed = api.preview(athlete_id, &mappings).unwrap();
    assert!(relaxed.warnings.is_empty());
}

#[test]
fn test_operator_override_then_catalog_import() {
    let (_temp, db_path) = create_test_db().unwrap();
    let athlete_id = insert_athlete(&db_path, "Alex");
    let existing_bar = insert_named(&db_path, "equipment", "Olympic Bar");
    let api = ImportApi::new(&db_path)
        .unwrap()
        .with_config(Arc::new(MockConfig::with_reviewer(1)));

    let document = DocumentBuilder::new()
        .equipment("Barbell")
        .exercise_with_equipment("Snatch", &["Barbell"], &[])
        .template("Weightlifting Base", &["Snatch"])
        .build();
    let mut mappings = api.build_mappings(&document).unwrap();
    // 运营人员确认 Barbell 即已有的 Olympic Bar
    assert!(mappings.override_mapping(
        EntityKind::Equipment,
        "Barbell",
        MappingTarget::Existing(existing_bar)
    ));

    let result = api.import_catalog(&mappings, Some(athlete_id)).unwrap();

    assert_eq!(result.equipment_created, 0);
    assert_eq!(result.equipment_mapped, 1);
    assert_eq!(result.exercises_created, 1);
    assert_eq!(result.programs_activated, 1);
    assert_eq!(count_rows(&db_path, "equipment"), 1);
    assert_eq!(count_rows(&db_path, "exercise_equipment"), 1);
}

#[test]
fn test_errors_are_converted() {
    let (_temp, db_path) = create_test_db().unwrap();
    let api = ImportApi::new(&db_path).unwrap();

    let err = api.load_document("{ not json").unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let document = api.load_document(DOCUMENT_JSON).unwrap();
    let mappings = api.build_mappings(&document).unwrap();
    let err = api.import_personal(404, &mappings, None).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
fn test_oversized_grace_days_do_not_break_preview() {
    let (_temp, db_path) = create_test_db().unwrap();
    let athlete_id = insert_athlete(&db_path, "Alex");
    insert_test_config(&db_path, config_keys::FUTURE_DATE_GRACE_DAYS, "100000000");
    let api = ImportApi::new(&db_path).unwrap();

    let document = DocumentBuilder::new()
        .exercise("Burpee")
        .workout("2100-01-01", &["Burpee"])
        .build();
    let mappings = api.build_mappings(&document).unwrap();

    let preview = api.preview(athlete_id, &mappings).unwrap();
    assert!(preview.warnings.is_empty());

    let unbounded = MockConfig {
        future_date_grace_days: i64::MAX,
        ..MockConfig::default()
    };
    let api = api.with_config(Arc::new(unbounded));
    let preview = api.preview(athlete_id, &mappings).unwrap();
    assert!(preview.warnings.is_empty());
}
