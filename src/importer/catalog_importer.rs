// ==========================================
// 训练档案系统 - 目录导入落库器
// ==========================================
// 职责: 只落库共享目录（器械、动作、训练计划模板），可选归属到一名运动员
// 流程: 器械 → 动作（含器械关联） → 模板（含处方组与进阶规则）
// 规则:
// - 同名新建冲突视为"无需处理"，复用已有行，重复导入在实体层面幂等
// - 指定运动员时，新模板仅属于该运动员，并成为其唯一激活中的训练计划
// ==========================================

use crate::domain::mapping::MappingSet;
use crate::domain::report::CatalogImportResult;
use crate::importer::catalog_phases::{
    link_program, validate_mappings, CatalogPhases, DuplicatePolicy, ProgramLinkOutcome,
};
use crate::importer::error::{ImportError, ImportOutcome};
use crate::repository::athlete_repo::AthleteProgramLink;
use crate::repository::ImportStore;
use chrono::{Local, NaiveDate};
use rusqlite::Transaction;
use tracing::{error, info, instrument};

pub struct CatalogImporter {
    store: ImportStore,
}

impl CatalogImporter {
    pub fn new(store: ImportStore) -> Self {
        Self { store }
    }

    /// 执行目录导入
    ///
    /// # 参数
    /// - mappings: 已确认的映射集
    /// - athlete_scope: Some(id) 时新模板归属该运动员并立即激活
    #[instrument(skip(self, mappings))]
    pub fn import(
        &self,
        mappings: &MappingSet<'_>,
        athlete_scope: Option<i64>,
    ) -> ImportOutcome<CatalogImportResult> {
        validate_mappings(mappings)?;
        if let Some(athlete_id) = athlete_scope {
            if !self.store.athlete_exists(athlete_id)? {
                return Err(ImportError::AthleteNotFound(athlete_id));
            }
        }

        info!(
            equipment = mappings.equipment.len(),
            exercises = mappings.exercises.len(),
            program_templates = mappings.program_templates.len(),
            "开始目录导入"
        );

        let today = Local::now().date_naive();
        let result = self
            .store
            .transaction(|tx| run_phases(tx, mappings, athlete_scope, today));

        match &result {
            Ok(summary) => info!(
                created_programs = summary.created_program_ids.len(),
                activated = summary.programs_activated,
                deactivated = summary.programs_deactivated,
                "目录导入完成"
            ),
            Err(e) => error!(error = %e, "目录导入失败，事务已回滚"),
        }

        result
    }
}

fn run_phases(
    tx: &Transaction,
    mappings: &MappingSet<'_>,
    athlete_scope: Option<i64>,
    today: NaiveDate,
) -> ImportOutcome<CatalogImportResult> {
    let mut result = CatalogImportResult::default();
    let mut catalog = CatalogPhases::new(mappings, DuplicatePolicy::ReuseExisting);

    let equipment = catalog.apply_equipment(tx)?;
    result.equipment_created = equipment.created;
    result.equipment_mapped = equipment.mapped;
    result.equipment_skipped = equipment.skipped;

    let exercises = catalog.apply_exercises(tx)?;
    result.exercises_created = exercises.created;
    result.exercises_mapped = exercises.mapped;
    result.exercises_skipped = exercises.skipped;

    let templates = catalog.apply_program_templates(tx, athlete_scope)?;
    result.programs_created = templates.created;
    result.programs_mapped = templates.mapped;
    result.programs_skipped = templates.skipped;
    result.created_program_ids = templates.created_ids;

    if let Some(athlete_id) = athlete_scope {
        for &template_id in &result.created_program_ids {
            let link = AthleteProgramLink {
                athlete_id,
                template_id,
                start_date: today,
                notes: None,
                goal: None,
                active: true,
            };
            if let ProgramLinkOutcome::Linked { deactivated, activated } = link_program(tx, &link)? {
                result.programs_deactivated += deactivated;
                if activated {
                    result.programs_activated += 1;
                }
            }
        }
    }

    result.unresolved_references = catalog.unresolved;
    Ok(result)
}
