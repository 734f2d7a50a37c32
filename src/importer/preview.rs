// ==========================================
// 训练档案系统 - 导入预览
// ==========================================
// 职责: 落库前向运营人员展示将要发生的变化
// 红线: 只读；每个训练日期一次存在性检查，不写任何数据
// 说明: 冲突检测仅供参考，最终跳过判定以落库时的唯一约束为准
// ==========================================

use crate::domain::mapping::{EntityKind, MappingSet};
use crate::domain::report::{DateRange, ImportPreview, KindCounts};
use crate::importer::error::{ImportError, ImportOutcome};
use crate::importer::importer_trait::DocumentValidator;
use crate::importer::references::find_unresolved_references;
use crate::repository::ImportStore;
use chrono::NaiveDate;
use tracing::{debug, info, instrument};

pub struct PreviewBuilder {
    store: ImportStore,
    validator: Box<dyn DocumentValidator>,
    surface_unresolved: bool,
}

impl PreviewBuilder {
    pub fn new(store: ImportStore, validator: Box<dyn DocumentValidator>) -> Self {
        Self {
            store,
            validator,
            surface_unresolved: true,
        }
    }

    /// 是否在预览中列出无法解析的名称引用
    pub fn with_unresolved_references(mut self, enabled: bool) -> Self {
        self.surface_unresolved = enabled;
        self
    }

    /// 生成预览
    ///
    /// # 参数
    /// - athlete_id: 目标运动员（用于冲突检测）
    /// - mappings: 已解析的映射集
    #[instrument(skip(self, mappings))]
    pub fn build(&self, athlete_id: i64, mappings: &MappingSet<'_>) -> ImportOutcome<ImportPreview> {
        if !self.store.athlete_exists(athlete_id)? {
            return Err(ImportError::AthleteNotFound(athlete_id));
        }

        let document = mappings.document;
        let mut preview = ImportPreview {
            exercises: kind_counts(mappings, EntityKind::Exercise),
            equipment: kind_counts(mappings, EntityKind::Equipment),
            programs: kind_counts(mappings, EntityKind::ProgramTemplate),
            workouts: document.workouts.len(),
            sets: document.total_sets(),
            date_range: date_range(document.workouts.iter().map(|w| w.date)),
            assignments: document.assignments.len(),
            training_maxes: document.training_maxes.len(),
            body_weights: document.body_weights.len(),
            reviews: document.review_count(),
            ..Default::default()
        };

        for workout in &document.workouts {
            if preview.conflicts.contains(&workout.date) {
                continue;
            }
            if self.store.workout_exists(athlete_id, workout.date)? {
                debug!(date = %workout.date, "训练日期已存在");
                preview.conflicts.push(workout.date);
            }
        }

        preview.warnings = self.validator.validate(document);
        if self.surface_unresolved {
            preview.unresolved_references = find_unresolved_references(mappings);
        }

        info!(
            workouts = preview.workouts,
            sets = preview.sets,
            conflicts = preview.conflicts.len(),
            warnings = preview.warnings.len(),
            unresolved = preview.unresolved_references.len(),
            "预览生成完成"
        );
        Ok(preview)
    }
}

fn kind_counts(mappings: &MappingSet<'_>, kind: EntityKind) -> KindCounts {
    let (new, mapped) = mappings.counts(kind);
    KindCounts { new, mapped }
}

/// 闭区间 [最早, 最晚]；无日期时为 None
fn date_range(dates: impl Iterator<Item = NaiveDate>) -> Option<DateRange> {
    dates.fold(None, |range, date| match range {
        None => Some(DateRange { start: date, end: date }),
        Some(DateRange { start, end }) => Some(DateRange {
            start: start.min(date),
            end: end.max(date),
        }),
    })
}
