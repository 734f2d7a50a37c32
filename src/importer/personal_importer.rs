// ==========================================
// 训练档案系统 - 个人导入落库器
// ==========================================
// 职责: 将一名运动员的训练档案整体落库（单事务，全部成功或全部回滚）
// 流程（顺序固定，后续阶段引用前面阶段产出的 ID）:
//   1 器械 → 2 动作 → 3 运动员器械清单 → 4 动作分配 → 5 训练最大重量
//   → 6 体重 → 7 训练课/训练组/点评 → 8 训练计划
// 红线:
// - 运动员数据一律"先插入、唯一约束冲突即跳过"，不做先查后插
// - 其他任何错误立即上抛，整个事务回滚
// ==========================================

use crate::domain::document::ParsedDocument;
use crate::domain::mapping::{EntityKind, MappingSet};
use crate::domain::report::ImportResult;
use crate::importer::catalog_phases::{
    link_program, validate_mappings, CatalogPhases, DuplicatePolicy, ProgramLinkOutcome,
};
use crate::importer::error::{ImportError, ImportOutcome, ImportPhase};
use crate::repository::athlete_repo::{self, AthleteProgramLink};
use crate::repository::{ImportStore, InsertOutcome};
use rusqlite::Transaction;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// PersonalImporter
// ==========================================
pub struct PersonalImporter {
    store: ImportStore,
}

impl PersonalImporter {
    pub fn new(store: ImportStore) -> Self {
        Self { store }
    }

    /// 执行个人导入
    ///
    /// # 参数
    /// - athlete_id: 目标运动员
    /// - mappings: 已确认的映射集（其 document 即导入内容）
    /// - reviewer_id: 点评教练；None 时跳过点评
    ///
    /// # 返回
    /// - Ok(ImportResult): 事务已提交，完整统计
    /// - Err: 数据库保持调用前状态
    #[instrument(skip(self, mappings), fields(import_id))]
    pub fn import(
        &self,
        athlete_id: i64,
        mappings: &MappingSet<'_>,
        reviewer_id: Option<i64>,
    ) -> ImportOutcome<ImportResult> {
        let import_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("import_id", import_id.as_str());

        // 事务开启前的快速失败检查
        validate_mappings(mappings)?;
        if !self.store.athlete_exists(athlete_id)? {
            return Err(ImportError::AthleteNotFound(athlete_id));
        }
        if let Some(coach_id) = reviewer_id {
            if !self.store.coach_exists(coach_id)? {
                return Err(ImportError::CoachNotFound(coach_id));
            }
        }

        let document = mappings.document;
        info!(
            athlete_id,
            workouts = document.workouts.len(),
            sets = document.total_sets(),
            "开始个人导入"
        );

        let result = self
            .store
            .transaction(|tx| run_phases(tx, athlete_id, mappings, reviewer_id));

        match &result {
            Ok(summary) => info!(
                athlete_id,
                workouts_created = summary.workouts_created,
                workouts_skipped = summary.workouts_skipped,
                sets_created = summary.sets_created,
                unresolved = summary.unresolved_references,
                "个人导入完成"
            ),
            Err(e) => error!(athlete_id, error = %e, "个人导入失败，事务已回滚"),
        }

        result
    }
}

fn run_phases(
    tx: &Transaction,
    athlete_id: i64,
    mappings: &MappingSet<'_>,
    reviewer_id: Option<i64>,
) -> ImportOutcome<ImportResult> {
    let document = mappings.document;
    let mut result = ImportResult::default();
    let mut catalog = CatalogPhases::new(mappings, DuplicatePolicy::Fail);

    // === 阶段 1-2: 器械、动作 ===
    let equipment = catalog.apply_equipment(tx)?;
    result.equipment_created = equipment.created;
    result.equipment_mapped = equipment.mapped;

    let exercises = catalog.apply_exercises(tx)?;
    result.exercises_created = exercises.created;
    result.exercises_mapped = exercises.mapped;

    // === 阶段 3-7: 运动员数据 ===
    link_athlete_equipment(tx, athlete_id, document, &mut catalog, &mut result)?;
    import_assignments(tx, athlete_id, document, &mut catalog, &mut result)?;
    import_training_maxes(tx, athlete_id, document, &mut catalog, &mut result)?;
    import_body_weights(tx, athlete_id, document, &mut result)?;
    import_workouts(tx, athlete_id, document, reviewer_id, &mut catalog, &mut result)?;

    // === 阶段 8: 训练计划 ===
    // 模板同名冲突（映射生成后被并发导入创建）按跳过处理，复用已有模板
    catalog.set_policy(DuplicatePolicy::ReuseExisting);
    let templates = catalog.apply_program_templates(tx, None)?;
    result.programs_created = templates.created;
    result.programs_mapped = templates.mapped;
    result.programs_skipped = templates.skipped;
    import_programs(tx, athlete_id, document, &mut catalog, &mut result)?;

    result.unresolved_references = catalog.unresolved;
    Ok(result)
}

// ==========================================
// 阶段 3: 运动员器械清单
// ==========================================
fn link_athlete_equipment(
    tx: &Transaction,
    athlete_id: i64,
    document: &ParsedDocument,
    catalog: &mut CatalogPhases<'_, '_>,
    result: &mut ImportResult,
) -> ImportOutcome<()> {
    debug!("阶段 3: 运动员器械清单");

    for name in &document.athlete_equipment {
        let Some(equipment_id) = catalog.equipment.get(name) else {
            catalog.note_unresolved(EntityKind::Equipment, name, "athlete inventory");
            continue;
        };

        match athlete_repo::link_athlete_equipment(tx, athlete_id, equipment_id)
            .map_err(|e| ImportError::phase(ImportPhase::AthleteEquipment, name, e))?
        {
            InsertOutcome::Inserted(_) => result.athlete_equipment_linked += 1,
            InsertOutcome::Duplicate => result.athlete_equipment_skipped += 1,
        }
    }

    info!(
        linked = result.athlete_equipment_linked,
        skipped = result.athlete_equipment_skipped,
        "运动员器械清单阶段完成"
    );
    Ok(())
}

// ==========================================
// 阶段 4: 动作分配
// ==========================================
fn import_assignments(
    tx: &Transaction,
    athlete_id: i64,
    document: &ParsedDocument,
    catalog: &mut CatalogPhases<'_, '_>,
    result: &mut ImportResult,
) -> ImportOutcome<()> {
    debug!("阶段 4: 动作分配");

    for assignment in &document.assignments {
        let Some(exercise_id) = catalog.exercises.get(&assignment.exercise_name) else {
            catalog.note_unresolved(EntityKind::Exercise, &assignment.exercise_name, "assignment");
            continue;
        };

        let outcome = athlete_repo::insert_assignment(
            tx,
            athlete_id,
            exercise_id,
            assignment.target_reps,
            assignment.active,
        )
        .map_err(|e| ImportError::phase(ImportPhase::Assignments, &assignment.exercise_name, e))?;

        match outcome {
            InsertOutcome::Inserted(_) => result.assignments_created += 1,
            InsertOutcome::Duplicate => {
                debug!(exercise = %assignment.exercise_name, "动作已分配，跳过");
                result.assignments_skipped += 1;
            }
        }
    }

    info!(
        created = result.assignments_created,
        skipped = result.assignments_skipped,
        "动作分配阶段完成"
    );
    Ok(())
}

// ==========================================
// 阶段 5: 训练最大重量
// ==========================================
fn import_training_maxes(
    tx: &Transaction,
    athlete_id: i64,
    document: &ParsedDocument,
    catalog: &mut CatalogPhases<'_, '_>,
    result: &mut ImportResult,
) -> ImportOutcome<()> {
    debug!("阶段 5: 训练最大重量");

    for training_max in &document.training_maxes {
        let record = format!("{}@{}", training_max.exercise_name, training_max.effective_date);
        let Some(exercise_id) = catalog.exercises.get(&training_max.exercise_name) else {
            catalog.note_unresolved(EntityKind::Exercise, &training_max.exercise_name, "training_max");
            continue;
        };

        let outcome = athlete_repo::insert_training_max(tx, athlete_id, exercise_id, training_max)
            .map_err(|e| ImportError::phase(ImportPhase::TrainingMaxes, &record, e))?;

        match outcome {
            InsertOutcome::Inserted(_) => result.training_maxes_created += 1,
            InsertOutcome::Duplicate => {
                debug!(record = %record, "训练最大重量已存在，跳过");
                result.training_maxes_skipped += 1;
            }
        }
    }

    info!(
        created = result.training_maxes_created,
        skipped = result.training_maxes_skipped,
        "训练最大重量阶段完成"
    );
    Ok(())
}

// ==========================================
// 阶段 6: 体重
// ==========================================
fn import_body_weights(
    tx: &Transaction,
    athlete_id: i64,
    document: &ParsedDocument,
    result: &mut ImportResult,
) -> ImportOutcome<()> {
    debug!("阶段 6: 体重");

    for body_weight in &document.body_weights {
        let outcome = athlete_repo::insert_body_weight(tx, athlete_id, body_weight).map_err(|e| {
            ImportError::phase(ImportPhase::BodyWeights, body_weight.date.to_string(), e)
        })?;

        match outcome {
            InsertOutcome::Inserted(_) => result.body_weights_created += 1,
            InsertOutcome::Duplicate => result.body_weights_skipped += 1,
        }
    }

    info!(
        created = result.body_weights_created,
        skipped = result.body_weights_skipped,
        "体重阶段完成"
    );
    Ok(())
}

// ==========================================
// 阶段 7: 训练课、训练组、点评
// ==========================================
// 同一运动员同一日期已有训练课 → 整课跳过（重复导入的主要幂等手段）
fn import_workouts(
    tx: &Transaction,
    athlete_id: i64,
    document: &ParsedDocument,
    reviewer_id: Option<i64>,
    catalog: &mut CatalogPhases<'_, '_>,
    result: &mut ImportResult,
) -> ImportOutcome<()> {
    debug!("阶段 7: 训练课");

    for workout in &document.workouts {
        let record = workout.date.to_string();
        let workout_id = match athlete_repo::insert_workout(tx, athlete_id, workout)
            .map_err(|e| ImportError::phase(ImportPhase::Workouts, &record, e))?
        {
            InsertOutcome::Inserted(id) => id,
            InsertOutcome::Duplicate => {
                debug!(date = %record, "该日期已有训练课，跳过");
                result.workouts_skipped += 1;
                continue;
            }
        };
        result.workouts_created += 1;

        let context = format!("workout {}", record);
        for set in &workout.sets {
            let Some(exercise_id) = catalog.exercises.get(&set.exercise_name) else {
                catalog.note_unresolved(EntityKind::Exercise, &set.exercise_name, &context);
                continue;
            };
            athlete_repo::insert_workout_set(tx, workout_id, exercise_id, set).map_err(|e| {
                ImportError::phase(
                    ImportPhase::Workouts,
                    format!("{} set#{}", record, set.set_number),
                    e,
                )
            })?;
            result.sets_created += 1;
        }

        if let Some(review) = &workout.review {
            match reviewer_id {
                Some(coach_id) => {
                    athlete_repo::insert_review(tx, workout_id, coach_id, review).map_err(|e| {
                        ImportError::phase(ImportPhase::Workouts, format!("{} review", record), e)
                    })?;
                    result.reviews_created += 1;
                }
                None => {
                    warn!(date = %record, "未指定点评教练，点评未导入");
                    result.reviews_skipped += 1;
                }
            }
        }
    }

    info!(
        created = result.workouts_created,
        skipped = result.workouts_skipped,
        sets = result.sets_created,
        reviews = result.reviews_created,
        "训练课阶段完成"
    );
    Ok(())
}

// ==========================================
// 阶段 8: 运动员训练计划
// ==========================================
// 文档中多个激活计划按文档顺序依次激活，最后一个保持激活
fn import_programs(
    tx: &Transaction,
    athlete_id: i64,
    document: &ParsedDocument,
    catalog: &mut CatalogPhases<'_, '_>,
    result: &mut ImportResult,
) -> ImportOutcome<()> {
    for program in &document.programs {
        let name = &program.template.name;
        let Some(template_id) = catalog.templates.get(name) else {
            catalog.note_unresolved(EntityKind::ProgramTemplate, name, "program");
            continue;
        };

        let link = AthleteProgramLink {
            athlete_id,
            template_id,
            start_date: program.start_date,
            notes: program.notes.as_deref(),
            goal: program.goal.as_deref(),
            active: program.active,
        };

        match link_program(tx, &link)? {
            ProgramLinkOutcome::Linked { deactivated, activated } => {
                result.athlete_programs_created += 1;
                result.athlete_programs_deactivated += deactivated;
                if activated {
                    result.athlete_programs_activated += 1;
                }
            }
            ProgramLinkOutcome::AlreadyLinked => {
                debug!(program = %name, "训练计划已关联，跳过");
                result.athlete_programs_skipped += 1;
            }
        }
    }

    info!(
        created = result.athlete_programs_created,
        skipped = result.athlete_programs_skipped,
        activated = result.athlete_programs_activated,
        "训练计划阶段完成"
    );
    Ok(())
}
