// ==========================================
// 训练档案系统 - 领域模型层
// ==========================================
// 职责: 导入文档、实体映射、导入报告
// 红线: 不含数据访问逻辑,不含导入流程逻辑
// ==========================================

pub mod document;
pub mod mapping;
pub mod report;

// 重导出核心类型
pub use document::{
    name_key, ParsedAssignment, ParsedBodyWeight, ParsedDocument, ParsedEquipment,
    ParsedExercise, ParsedPrescribedSet, ParsedProgram, ParsedProgramTemplate,
    ParsedProgressionRule, ParsedReview, ParsedSet, ParsedTrainingMax, ParsedWorkout,
};
pub use mapping::{
    CatalogSnapshot, EntityKind, EntityMapping, ExistingEntity, MappingSet, MappingTarget,
};
pub use report::{
    CatalogImportResult, DateRange, ImportPreview, ImportResult, KindCounts,
    UnresolvedReference, ValidationWarning,
};
