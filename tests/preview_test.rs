// ==========================================
// PreviewBuilder 集成测试
// ==========================================
// 测试目标: 计数、日期区间、冲突检测、只读
// ==========================================

mod helpers;
mod test_helpers;

use coach_import::domain::{EntityKind, KindCounts, ParsedDocument};
use coach_import::importer::{EntityReconciler, ImportValidator, PreviewBuilder};
use coach_import::repository::ImportStore;
use helpers::document_builder::{date, DocumentBuilder};
use test_helpers::*;

fn preview_document() -> ParsedDocument {
    DocumentBuilder::new()
        .equipment("Barbell")
        .exercise("Squat")
        .exercise("Bench")
        .assignment("Squat", Some(5))
        .training_max("Squat", 150.0, "2026-01-01")
        .body_weight("2026-01-02", 80.0)
        .body_weight("2026-01-09", -1.0)
        .workout_with_review("2026-01-09", &["Squat", "Bench"], Some("good"))
        .workout("2026-01-02", &["Squat", "Deadlift"])
        .workout("2026-01-05", &["Bench"])
        .program("Peaking", &["Squat"], "2026-02-01", true)
        .build()
}

fn builder(store: ImportStore) -> PreviewBuilder {
    PreviewBuilder::new(store, Box::new(ImportValidator::new(date("2026-06-01"))))
}

#[test]
fn test_preview_counts_and_conflicts() {
    let (_temp, db_path) = create_test_db().unwrap();
    let athlete_id = insert_athlete(&db_path, "Alex");
    insert_named(&db_path, "exercise", "squat");
    insert_workout(&db_path, athlete_id, "2026-01-05");
    let store = ImportStore::new(&db_path).unwrap();

    let document = preview_document();
    let snapshot = store.catalog_snapshot().unwrap();
    let mappings = EntityReconciler::build_mapping_set(&document, &snapshot);

    let preview = builder(store).build(athlete_id, &mappings).unwrap();

    assert_eq!(preview.exercises, KindCounts { new: 1, mapped: 1 });
    assert_eq!(preview.equipment, KindCounts { new: 1, mapped: 0 });
    assert_eq!(preview.programs, KindCounts { new: 1, mapped: 0 });
    assert_eq!(preview.workouts, 3);
    assert_eq!(preview.sets, 5);

    let range = preview.date_range.unwrap();
    assert_eq!(range.start, date("2026-01-02"));
    assert_eq!(range.end, date("2026-01-09"));

    assert_eq!(preview.conflicts, vec![date("2026-01-05")]);
    assert_eq!(preview.assignments, 1);
    assert_eq!(preview.training_maxes, 1);
    assert_eq!(preview.body_weights, 2);
    assert_eq!(preview.reviews, 1);

    assert_eq!(preview.warnings.len(), 1);
    assert_eq!(preview.warnings[0].entity, "body_weight");

    assert_eq!(preview.unresolved_references.len(), 1);
    assert_eq!(preview.unresolved_references[0].kind, EntityKind::Exercise);
    assert_eq!(preview.unresolved_references[0].name, "Deadlift");
}

#[test]
fn test_preview_does_not_mutate_store() {
    let (_temp, db_path) = create_test_db().unwrap();
    let athlete_id = insert_athlete(&db_path, "Alex");
    let store = ImportStore::new(&db_path).unwrap();

    let document = preview_document();
    let snapshot = store.catalog_snapshot().unwrap();
    let mappings = EntityReconciler::build_mapping_set(&document, &snapshot);

    let preview_builder = builder(store);
    let first = preview_builder.build(athlete_id, &mappings).unwrap();
    let second = preview_builder.build(athlete_id, &mappings).unwrap();

    assert_eq!(first.workouts, second.workouts);
    assert!(first.conflicts.is_empty());
    for table in ["equipment", "exercise", "workout", "workout_set", "program_template"] {
        assert_eq!(count_rows(&db_path, table), 0, "table {} changed", table);
    }
}

#[test]
fn test_preview_of_empty_document() {
    let (_temp, db_path) = create_test_db().unwrap();
    let athlete_id = insert_athlete(&db_path, "Alex");
    let store = ImportStore::new(&db_path).unwrap();

    let document = ParsedDocument::default();
    let snapshot = store.catalog_snapshot().unwrap();
    let mappings = EntityReconciler::build_mapping_set(&document, &snapshot);

    let preview = builder(store).build(athlete_id, &mappings).unwrap();

    assert!(preview.date_range.is_none());
    assert_eq!(preview.workouts, 0);
    assert!(preview.warnings.is_empty());
    assert!(preview.unresolved_references.is_empty());
}

#[test]
fn test_unresolved_references_can_be_hidden() {
    let (_temp, db_path) = create_test_db().unwrap();
    let athlete_id = insert_athlete(&db_path, "Alex");
    let store = ImportStore::new(&db_path).unwrap();

    let document = preview_document();
    let snapshot = store.catalog_snapshot().unwrap();
    let mappings = EntityReconciler::build_mapping_set(&document, &snapshot);

    let preview = builder(store)
        .with_unresolved_references(false)
        .build(athlete_id, &mappings)
        .unwrap();

    assert!(preview.unresolved_references.is_empty());
}
