// ==========================================
// 训练档案系统 - 目录落库阶段（个人导入与目录导入共用）
// ==========================================
// 阶段: 器械 → 动作（含器械关联） → 训练计划模板（含处方组与进阶规则）
// 说明:
// - 每阶段产出 name → id 查找表，后续阶段只按名称解析
// - 无法解析的名称引用不中止事务，计入 unresolved 并记录日志
// - 名称唯一约束冲突的处理由 DuplicatePolicy 决定
// ==========================================

use crate::domain::document::{ParsedExercise, ParsedProgramTemplate};
use crate::domain::mapping::{EntityKind, EntityMapping, MappingSet};
use crate::importer::error::{ImportError, ImportOutcome, ImportPhase};
use crate::importer::lookup::NameLookup;
use crate::repository::athlete_repo::{self, AthleteProgramLink};
use crate::repository::catalog_repo;
use crate::repository::{InsertOutcome, RepositoryError};
use rusqlite::Transaction;
use tracing::{debug, info, warn};

/// 新建目录实体遇到同名已存在时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// 视为致命错误（个人导入阶段 1-2：映射已声明新建）
    Fail,
    /// 查出已有行并复用，计为跳过（目录导入）
    ReuseExisting,
}

/// 单阶段统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseTally {
    pub created: usize,
    pub mapped: usize,
    pub skipped: usize,
    pub created_ids: Vec<i64>,
}

pub struct CatalogPhases<'m, 'd> {
    mappings: &'m MappingSet<'d>,
    policy: DuplicatePolicy,
    pub equipment: NameLookup,
    pub exercises: NameLookup,
    pub templates: NameLookup,
    pub unresolved: usize,
}

impl<'m, 'd> CatalogPhases<'m, 'd> {
    pub fn new(mappings: &'m MappingSet<'d>, policy: DuplicatePolicy) -> Self {
        Self {
            mappings,
            policy,
            equipment: NameLookup::new(),
            exercises: NameLookup::new(),
            templates: NameLookup::new(),
            unresolved: 0,
        }
    }

    /// 切换后续阶段的同名冲突处理方式
    pub fn set_policy(&mut self, policy: DuplicatePolicy) {
        self.policy = policy;
    }

    /// 记录一条无法解析的名称引用
    pub fn note_unresolved(&mut self, kind: EntityKind, name: &str, context: &str) {
        self.unresolved += 1;
        warn!(kind = %kind, name = %name, context = %context, "名称引用无法解析，已跳过");
    }

    // ==========================================
    // 阶段: 器械
    // ==========================================
    pub fn apply_equipment(&mut self, tx: &Transaction) -> ImportOutcome<PhaseTally> {
        debug!("阶段: 器械");
        let mappings = self.mappings;
        let document = mappings.document;
        let mut tally = PhaseTally::default();

        for mapping in &mappings.equipment {
            if self.equipment.contains(&mapping.name) {
                debug!(name = %mapping.name, "同名器械已处理");
                continue;
            }

            if let Some(id) = reuse_target(mapping)? {
                self.equipment.insert(&mapping.name, id);
                tally.mapped += 1;
                continue;
            }

            let outcome = match document.find_equipment(&mapping.name) {
                Some(parsed) => catalog_repo::insert_equipment(tx, parsed),
                None => catalog_repo::insert_equipment_by_name(tx, &mapping.name),
            }
            .map_err(|e| ImportError::phase(ImportPhase::Equipment, &mapping.name, e))?;

            let (id, created) = self.settle(tx, ImportPhase::Equipment, mapping, outcome)?;
            self.equipment.insert(&mapping.name, id);
            tally.record(id, created);
        }

        info!(
            created = tally.created,
            mapped = tally.mapped,
            skipped = tally.skipped,
            "器械阶段完成"
        );
        Ok(tally)
    }

    // ==========================================
    // 阶段: 动作（新建时同时写入器械关联）
    // ==========================================
    pub fn apply_exercises(&mut self, tx: &Transaction) -> ImportOutcome<PhaseTally> {
        debug!("阶段: 动作");
        let mappings = self.mappings;
        let document = mappings.document;
        let mut tally = PhaseTally::default();

        for mapping in &mappings.exercises {
            if self.exercises.contains(&mapping.name) {
                debug!(name = %mapping.name, "同名动作已处理");
                continue;
            }

            if let Some(id) = reuse_target(mapping)? {
                self.exercises.insert(&mapping.name, id);
                tally.mapped += 1;
                continue;
            }

            let parsed = document.find_exercise(&mapping.name);
            let fallback;
            let definition = match parsed {
                Some(exercise) => exercise,
                None => {
                    fallback = ParsedExercise {
                        name: mapping.name.clone(),
                        ..Default::default()
                    };
                    &fallback
                }
            };

            let outcome = catalog_repo::insert_exercise(tx, definition)
                .map_err(|e| ImportError::phase(ImportPhase::Exercises, &mapping.name, e))?;

            let (id, created) = self.settle(tx, ImportPhase::Exercises, mapping, outcome)?;
            self.exercises.insert(&mapping.name, id);
            tally.record(id, created);

            if created {
                self.link_exercise_equipment(tx, id, definition)?;
            }
        }

        info!(
            created = tally.created,
            mapped = tally.mapped,
            skipped = tally.skipped,
            unresolved = self.unresolved,
            "动作阶段完成"
        );
        Ok(tally)
    }

    fn link_exercise_equipment(
        &mut self,
        tx: &Transaction,
        exercise_id: i64,
        exercise: &ParsedExercise,
    ) -> ImportOutcome<()> {
        let links = exercise
            .required_equipment
            .iter()
            .map(|name| (name, false))
            .chain(exercise.optional_equipment.iter().map(|name| (name, true)));

        for (name, optional) in links {
            let Some(equipment_id) = self.equipment.get(name) else {
                self.note_unresolved(
                    EntityKind::Equipment,
                    name,
                    &format!("exercise {}", exercise.name),
                );
                continue;
            };

            let outcome = catalog_repo::link_exercise_equipment(tx, exercise_id, equipment_id, optional)
                .map_err(|e| {
                    ImportError::phase(
                        ImportPhase::Exercises,
                        format!("{} -> {}", exercise.name, name),
                        e,
                    )
                })?;
            if outcome == InsertOutcome::Duplicate {
                debug!(exercise = %exercise.name, equipment = %name, "器械关联重复，忽略");
            }
        }

        Ok(())
    }

    // ==========================================
    // 阶段: 训练计划模板（新建时写入处方组与进阶规则）
    // ==========================================
    pub fn apply_program_templates(
        &mut self,
        tx: &Transaction,
        athlete_scope: Option<i64>,
    ) -> ImportOutcome<PhaseTally> {
        debug!(athlete_scope = ?athlete_scope, "阶段: 训练计划模板");
        let mappings = self.mappings;
        let document = mappings.document;
        let mut tally = PhaseTally::default();

        for mapping in &mappings.program_templates {
            if self.templates.contains(&mapping.name) {
                debug!(name = %mapping.name, "同名模板已处理");
                continue;
            }

            if let Some(id) = reuse_target(mapping)? {
                self.templates.insert(&mapping.name, id);
                tally.mapped += 1;
                continue;
            }

            let fallback;
            let definition = match document.find_template(&mapping.name) {
                Some(template) => template,
                None => {
                    fallback = ParsedProgramTemplate {
                        name: mapping.name.clone(),
                        ..Default::default()
                    };
                    &fallback
                }
            };

            let outcome = catalog_repo::insert_program_template(tx, definition, athlete_scope)
                .map_err(|e| ImportError::phase(ImportPhase::ProgramTemplates, &mapping.name, e))?;

            let (id, created) = self.settle(tx, ImportPhase::ProgramTemplates, mapping, outcome)?;
            self.templates.insert(&mapping.name, id);
            tally.record(id, created);

            if created {
                self.insert_template_rows(tx, id, definition)?;
            }
        }

        info!(
            created = tally.created,
            mapped = tally.mapped,
            skipped = tally.skipped,
            "训练计划模板阶段完成"
        );
        Ok(tally)
    }

    fn insert_template_rows(
        &mut self,
        tx: &Transaction,
        template_id: i64,
        template: &ParsedProgramTemplate,
    ) -> ImportOutcome<()> {
        let context = format!("program {}", template.name);

        for (idx, set) in template.prescribed_sets.iter().enumerate() {
            let Some(exercise_id) = self.exercises.get(&set.exercise_name) else {
                self.note_unresolved(EntityKind::Exercise, &set.exercise_name, &context);
                continue;
            };
            catalog_repo::insert_prescribed_set(tx, template_id, exercise_id, set).map_err(|e| {
                ImportError::phase(
                    ImportPhase::ProgramTemplates,
                    format!("{} prescribed_set#{}", template.name, idx),
                    e,
                )
            })?;
        }

        for (idx, rule) in template.progression_rules.iter().enumerate() {
            let Some(exercise_id) = self.exercises.get(&rule.exercise_name) else {
                self.note_unresolved(EntityKind::Exercise, &rule.exercise_name, &context);
                continue;
            };
            catalog_repo::insert_progression_rule(tx, template_id, exercise_id, rule).map_err(|e| {
                ImportError::phase(
                    ImportPhase::ProgramTemplates,
                    format!("{} progression_rule#{}", template.name, idx),
                    e,
                )
            })?;
        }

        Ok(())
    }

    /// 处理新建插入结果
    ///
    /// # 返回
    /// - (id, true): 新建成功
    /// - (id, false): 同名已存在，按 ReuseExisting 复用
    fn settle(
        &self,
        tx: &Transaction,
        phase: ImportPhase,
        mapping: &EntityMapping,
        outcome: InsertOutcome,
    ) -> ImportOutcome<(i64, bool)> {
        match outcome {
            InsertOutcome::Inserted(id) => Ok((id, true)),
            InsertOutcome::Duplicate => match self.policy {
                DuplicatePolicy::Fail => Err(ImportError::phase(
                    phase,
                    &mapping.name,
                    RepositoryError::UniqueConstraintViolation(format!(
                        "{} 名称已存在: {}",
                        mapping.kind, mapping.name
                    )),
                )),
                DuplicatePolicy::ReuseExisting => {
                    let id = catalog_repo::find_id_by_name(tx, mapping.kind, &mapping.name)
                        .map_err(|e| ImportError::phase(phase, &mapping.name, e))?
                        .ok_or_else(|| ImportError::MissingTarget {
                            kind: mapping.kind,
                            name: mapping.name.clone(),
                        })?;
                    debug!(kind = %mapping.kind, name = %mapping.name, id, "同名已存在，复用");
                    Ok((id, false))
                }
            },
        }
    }
}

impl PhaseTally {
    fn record(&mut self, id: i64, created: bool) {
        if created {
            self.created += 1;
            self.created_ids.push(id);
        } else {
            self.skipped += 1;
        }
    }
}

/// 训练计划关联结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramLinkOutcome {
    /// 新建关联；deactivated 为被停用的原激活计划数
    Linked { deactivated: usize, activated: bool },
    /// 关联已存在，保持原状
    AlreadyLinked,
}

/// 写入运动员-训练计划关联，并维持"每名运动员至多一个激活计划"
///
/// 关联先以未激活状态插入；仅在新建且 link.active 时停用其他计划并激活本条。
/// 已存在的关联不改动激活状态，重复导入不会停用当前计划。
pub fn link_program(
    tx: &Transaction,
    link: &AthleteProgramLink<'_>,
) -> ImportOutcome<ProgramLinkOutcome> {
    let record = format!("athlete {} template {}", link.athlete_id, link.template_id);
    let fail = |e: RepositoryError| ImportError::phase(ImportPhase::Programs, &record, e);

    let pending = AthleteProgramLink {
        active: false,
        ..link.clone()
    };
    let link_id = match athlete_repo::insert_athlete_program(tx, &pending).map_err(fail)? {
        InsertOutcome::Inserted(id) => id,
        InsertOutcome::Duplicate => {
            debug!(
                athlete_id = link.athlete_id,
                template_id = link.template_id,
                "计划关联已存在，跳过"
            );
            return Ok(ProgramLinkOutcome::AlreadyLinked);
        }
    };

    if !link.active {
        return Ok(ProgramLinkOutcome::Linked {
            deactivated: 0,
            activated: false,
        });
    }

    let mut deactivated = 0;
    if athlete_repo::has_active_program(tx, link.athlete_id).map_err(fail)? {
        deactivated = athlete_repo::deactivate_programs(tx, link.athlete_id).map_err(fail)?;
        debug!(athlete_id = link.athlete_id, deactivated, "已停用原激活计划");
    }
    athlete_repo::set_program_active(tx, link_id).map_err(fail)?;

    Ok(ProgramLinkOutcome::Linked {
        deactivated,
        activated: true,
    })
}

/// 复用映射返回其 ID；新建映射返回 None；两者皆非则为调用方约定错误
fn reuse_target(mapping: &EntityMapping) -> ImportOutcome<Option<i64>> {
    if !mapping.is_valid() {
        return Err(ImportError::InvalidMapping {
            kind: mapping.kind,
            name: mapping.name.clone(),
        });
    }
    Ok(mapping.target_id)
}

/// 事务开启前检查映射集（快速失败）
pub fn validate_mappings(mappings: &MappingSet<'_>) -> ImportOutcome<()> {
    match mappings.first_invalid() {
        Some(mapping) => Err(ImportError::InvalidMapping {
            kind: mapping.kind,
            name: mapping.name.clone(),
        }),
        None => Ok(()),
    }
}
