// ==========================================
// 训练档案系统 - 导入报告模型
// ==========================================
// 职责: 校验警告、预览结果、落库统计
// 红线: 落库统计只在事务提交后整体返回，不存在部分填充
// ==========================================

use crate::domain::mapping::EntityKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// ValidationWarning - 数据质量警告（不阻断导入）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub entity: String,      // workout / set / training_max / body_weight
    pub field: String,       // date / weight / reps / rpe / rep_type
    pub record_index: usize, // 在所属列表中的位置（从 0 开始）
    pub message: String,
}

/// 无法按名称解析的引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedReference {
    pub kind: EntityKind,
    pub name: String,
    pub context: String, // 引用出现的位置，如 "workout 2026-01-01"
}

/// 新建 / 复用 计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCounts {
    pub new: usize,
    pub mapped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

// ==========================================
// ImportPreview - 只读预览
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportPreview {
    pub exercises: KindCounts,
    pub equipment: KindCounts,
    pub programs: KindCounts,

    pub workouts: usize,
    pub sets: usize,
    pub date_range: Option<DateRange>,
    pub conflicts: Vec<NaiveDate>, // 运动员已有训练课的日期，落库时将跳过

    pub assignments: usize,
    pub training_maxes: usize,
    pub body_weights: usize,
    pub reviews: usize,

    pub warnings: Vec<ValidationWarning>,
    pub unresolved_references: Vec<UnresolvedReference>,
}

// ==========================================
// ImportResult - 个人导入统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    // ===== 目录实体 =====
    pub equipment_created: usize,
    pub equipment_mapped: usize,
    pub exercises_created: usize,
    pub exercises_mapped: usize,
    pub programs_created: usize,
    pub programs_mapped: usize,
    pub programs_skipped: usize, // 新建时同名已存在，复用

    // ===== 运动员数据 =====
    pub athlete_equipment_linked: usize,
    pub athlete_equipment_skipped: usize,
    pub assignments_created: usize,
    pub assignments_skipped: usize,
    pub training_maxes_created: usize,
    pub training_maxes_skipped: usize,
    pub body_weights_created: usize,
    pub body_weights_skipped: usize,
    pub workouts_created: usize,
    pub workouts_skipped: usize,
    pub sets_created: usize,
    pub reviews_created: usize,
    pub reviews_skipped: usize, // 未提供点评教练
    pub athlete_programs_created: usize,
    pub athlete_programs_skipped: usize,
    pub athlete_programs_activated: usize,
    pub athlete_programs_deactivated: usize,

    // 无法解析而被丢弃的名称引用
    pub unresolved_references: usize,
}

// ==========================================
// CatalogImportResult - 目录导入统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogImportResult {
    pub equipment_created: usize,
    pub equipment_mapped: usize,
    pub equipment_skipped: usize,
    pub exercises_created: usize,
    pub exercises_mapped: usize,
    pub exercises_skipped: usize,
    pub programs_created: usize,
    pub programs_mapped: usize,
    pub programs_skipped: usize,

    // 新建的模板 ID（供调用方后续自动分配）
    pub created_program_ids: Vec<i64>,

    // 仅在指定运动员作用域时有效
    pub programs_activated: usize,
    pub programs_deactivated: usize,

    pub unresolved_references: usize,
}
