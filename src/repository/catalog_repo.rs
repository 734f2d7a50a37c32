// ==========================================
// 训练档案系统 - 目录实体 Repository
// ==========================================
// 职责: 器械、动作、训练计划模板及其附属行的事务内写入
// 红线: 唯一约束冲突只做分类，由导入层决定跳过还是中止
// ==========================================

use crate::domain::document::{
    ParsedEquipment, ParsedExercise, ParsedPrescribedSet, ParsedProgramTemplate,
    ParsedProgressionRule,
};
use crate::domain::mapping::EntityKind;
use crate::repository::error::{classify_insert, InsertOutcome, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Transaction};

/// 实体类型对应的表名
pub fn table_for(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Exercise => "exercise",
        EntityKind::Equipment => "equipment",
        EntityKind::ProgramTemplate => "program_template",
    }
}

/// 按名称查 ID（name 列为 COLLATE NOCASE，比较忽略大小写）
pub fn find_id_by_name(
    conn: &Connection,
    kind: EntityKind,
    name: &str,
) -> RepositoryResult<Option<i64>> {
    let sql = format!("SELECT id FROM {} WHERE name = ?1", table_for(kind));
    let id = conn
        .query_row(&sql, params![name], |row| row.get::<_, i64>(0))
        .optional()?;
    Ok(id)
}

pub fn insert_equipment(tx: &Transaction, equipment: &ParsedEquipment) -> RepositoryResult<InsertOutcome> {
    let result = tx
        .execute(
            "INSERT INTO equipment (name, description) VALUES (?1, ?2)",
            params![equipment.name, equipment.description],
        )
        .map(|_| tx.last_insert_rowid());
    classify_insert(result)
}

/// 仅有名称、文档中没有完整定义时使用
pub fn insert_equipment_by_name(tx: &Transaction, name: &str) -> RepositoryResult<InsertOutcome> {
    insert_equipment(
        tx,
        &ParsedEquipment {
            name: name.to_string(),
            description: None,
        },
    )
}

pub fn insert_exercise(tx: &Transaction, exercise: &ParsedExercise) -> RepositoryResult<InsertOutcome> {
    let result = tx
        .execute(
            r#"
            INSERT INTO exercise (name, tier, form_notes, demo_url, rest_seconds, featured)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                exercise.name,
                exercise.tier,
                exercise.form_notes,
                exercise.demo_url,
                exercise.rest_seconds,
                exercise.featured as i32,
            ],
        )
        .map(|_| tx.last_insert_rowid());
    classify_insert(result)
}

pub fn link_exercise_equipment(
    tx: &Transaction,
    exercise_id: i64,
    equipment_id: i64,
    optional: bool,
) -> RepositoryResult<InsertOutcome> {
    let result = tx
        .execute(
            "INSERT INTO exercise_equipment (exercise_id, equipment_id, optional) VALUES (?1, ?2, ?3)",
            params![exercise_id, equipment_id, optional as i32],
        )
        .map(|_| tx.last_insert_rowid());
    classify_insert(result)
}

/// 插入训练计划模板
///
/// # 参数
/// - athlete_scope: Some(id) 表示该模板仅属于此运动员；None 为全局共享
pub fn insert_program_template(
    tx: &Transaction,
    template: &ParsedProgramTemplate,
    athlete_scope: Option<i64>,
) -> RepositoryResult<InsertOutcome> {
    let result = tx
        .execute(
            r#"
            INSERT INTO program_template (
                name, description, num_weeks, num_days, is_loop, audience, athlete_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                template.name,
                template.description,
                template.num_weeks.max(1),
                template.num_days.max(1),
                template.is_loop as i32,
                template.audience,
                athlete_scope,
            ],
        )
        .map(|_| tx.last_insert_rowid());
    classify_insert(result)
}

pub fn insert_prescribed_set(
    tx: &Transaction,
    template_id: i64,
    exercise_id: i64,
    set: &ParsedPrescribedSet,
) -> RepositoryResult<i64> {
    tx.execute(
        r#"
        INSERT INTO prescribed_set (
            template_id, exercise_id, week, day, set_number, reps, rep_type, percentage, rpe
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
        params![
            template_id,
            exercise_id,
            set.week,
            set.day,
            set.set_number,
            set.reps,
            stored_rep_type(&set.rep_type),
            set.percentage,
            set.rpe,
        ],
    )?;
    Ok(tx.last_insert_rowid())
}

pub fn insert_progression_rule(
    tx: &Transaction,
    template_id: i64,
    exercise_id: i64,
    rule: &ParsedProgressionRule,
) -> RepositoryResult<i64> {
    tx.execute(
        r#"
        INSERT INTO progression_rule (template_id, exercise_id, strategy, increment, cadence_weeks)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            template_id,
            exercise_id,
            rule.strategy,
            rule.increment,
            rule.cadence_weeks,
        ],
    )?;
    Ok(tx.last_insert_rowid())
}

/// 空计次方式按默认值 "reps" 落库
pub fn stored_rep_type(rep_type: &str) -> &str {
    if rep_type.is_empty() {
        "reps"
    } else {
        rep_type
    }
}
