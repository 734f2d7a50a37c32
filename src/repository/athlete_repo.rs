// ==========================================
// 训练档案系统 - 运动员数据 Repository
// ==========================================
// 职责: 运动员作用域的事务内写入与存在性检查
// 唯一约束:
// - athlete_exercise(athlete_id, exercise_id)
// - training_max(athlete_id, exercise_id, effective_date)
// - body_weight(athlete_id, date) / workout(athlete_id, date)
// - athlete_program(athlete_id, template_id)
// ==========================================

use crate::domain::document::{
    ParsedBodyWeight, ParsedReview, ParsedSet, ParsedTrainingMax, ParsedWorkout,
};
use crate::repository::catalog_repo::stored_rep_type;
use crate::repository::error::{classify_insert, InsertOutcome, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Transaction};

fn date_str(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn workout_exists(conn: &Connection, athlete_id: i64, date: NaiveDate) -> RepositoryResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM workout WHERE athlete_id = ?1 AND date = ?2 LIMIT 1",
            params![athlete_id, date_str(date)],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);
    Ok(found)
}

pub fn has_active_program(conn: &Connection, athlete_id: i64) -> RepositoryResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM athlete_program WHERE athlete_id = ?1 AND active = 1 LIMIT 1",
            params![athlete_id],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);
    Ok(found)
}

pub fn link_athlete_equipment(
    tx: &Transaction,
    athlete_id: i64,
    equipment_id: i64,
) -> RepositoryResult<InsertOutcome> {
    let result = tx
        .execute(
            "INSERT INTO athlete_equipment (athlete_id, equipment_id) VALUES (?1, ?2)",
            params![athlete_id, equipment_id],
        )
        .map(|_| tx.last_insert_rowid());
    classify_insert(result)
}

pub fn insert_assignment(
    tx: &Transaction,
    athlete_id: i64,
    exercise_id: i64,
    target_reps: Option<i32>,
    active: bool,
) -> RepositoryResult<InsertOutcome> {
    let result = tx
        .execute(
            r#"
            INSERT INTO athlete_exercise (athlete_id, exercise_id, target_reps, active)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![athlete_id, exercise_id, target_reps, active as i32],
        )
        .map(|_| tx.last_insert_rowid());
    classify_insert(result)
}

pub fn insert_training_max(
    tx: &Transaction,
    athlete_id: i64,
    exercise_id: i64,
    training_max: &ParsedTrainingMax,
) -> RepositoryResult<InsertOutcome> {
    let result = tx
        .execute(
            r#"
            INSERT INTO training_max (athlete_id, exercise_id, weight, effective_date, notes)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                athlete_id,
                exercise_id,
                training_max.weight,
                date_str(training_max.effective_date),
                training_max.notes,
            ],
        )
        .map(|_| tx.last_insert_rowid());
    classify_insert(result)
}

pub fn insert_body_weight(
    tx: &Transaction,
    athlete_id: i64,
    body_weight: &ParsedBodyWeight,
) -> RepositoryResult<InsertOutcome> {
    let result = tx
        .execute(
            "INSERT INTO body_weight (athlete_id, date, weight, notes) VALUES (?1, ?2, ?3, ?4)",
            params![
                athlete_id,
                date_str(body_weight.date),
                body_weight.weight,
                body_weight.notes,
            ],
        )
        .map(|_| tx.last_insert_rowid());
    classify_insert(result)
}

pub fn insert_workout(
    tx: &Transaction,
    athlete_id: i64,
    workout: &ParsedWorkout,
) -> RepositoryResult<InsertOutcome> {
    let result = tx
        .execute(
            "INSERT INTO workout (athlete_id, date, notes) VALUES (?1, ?2, ?3)",
            params![athlete_id, date_str(workout.date), workout.notes],
        )
        .map(|_| tx.last_insert_rowid());
    classify_insert(result)
}

pub fn insert_workout_set(
    tx: &Transaction,
    workout_id: i64,
    exercise_id: i64,
    set: &ParsedSet,
) -> RepositoryResult<i64> {
    tx.execute(
        r#"
        INSERT INTO workout_set (workout_id, exercise_id, set_number, reps, rep_type, weight, rpe, notes)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
        params![
            workout_id,
            exercise_id,
            set.set_number,
            set.reps,
            stored_rep_type(&set.rep_type),
            set.weight,
            set.rpe,
            set.notes,
        ],
    )?;
    Ok(tx.last_insert_rowid())
}

pub fn insert_review(
    tx: &Transaction,
    workout_id: i64,
    coach_id: i64,
    review: &ParsedReview,
) -> RepositoryResult<i64> {
    tx.execute(
        "INSERT INTO workout_review (workout_id, coach_id, rating, comment) VALUES (?1, ?2, ?3, ?4)",
        params![workout_id, coach_id, review.rating, review.comment],
    )?;
    Ok(tx.last_insert_rowid())
}

/// 运动员-训练计划关联
#[derive(Debug, Clone)]
pub struct AthleteProgramLink<'a> {
    pub athlete_id: i64,
    pub template_id: i64,
    pub start_date: NaiveDate,
    pub notes: Option<&'a str>,
    pub goal: Option<&'a str>,
    pub active: bool,
}

pub fn insert_athlete_program(
    tx: &Transaction,
    link: &AthleteProgramLink<'_>,
) -> RepositoryResult<InsertOutcome> {
    let result = tx
        .execute(
            r#"
            INSERT INTO athlete_program (athlete_id, template_id, start_date, notes, goal, active)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                link.athlete_id,
                link.template_id,
                date_str(link.start_date),
                link.notes,
                link.goal,
                link.active as i32,
            ],
        )
        .map(|_| tx.last_insert_rowid());
    classify_insert(result)
}

/// 停用运动员当前所有激活中的训练计划
///
/// # 返回
/// - 被停用的行数
pub fn deactivate_programs(tx: &Transaction, athlete_id: i64) -> RepositoryResult<usize> {
    let count = tx.execute(
        "UPDATE athlete_program SET active = 0 WHERE athlete_id = ?1 AND active = 1",
        params![athlete_id],
    )?;
    Ok(count)
}

/// 将单条训练计划关联设为激活
pub fn set_program_active(tx: &Transaction, link_id: i64) -> RepositoryResult<()> {
    tx.execute(
        "UPDATE athlete_program SET active = 1 WHERE id = ?1",
        params![link_id],
    )?;
    Ok(())
}
