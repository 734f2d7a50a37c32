// ==========================================
// 训练档案系统 - 导入层
// ==========================================
// 职责: 映射对账、导入预览、数据质量校验、单事务落库
// 流程: 对账 → {预览, 校验} → 运营确认 → 落库（个人 / 目录）
// ==========================================

// 模块声明
pub mod catalog_importer;
pub mod catalog_phases;
pub mod error;
pub mod importer_trait;
pub mod lookup;
pub mod personal_importer;
pub mod preview;
pub mod reconciler;
pub mod references;
pub mod validator;

// 重导出核心类型
pub use catalog_importer::CatalogImporter;
pub use catalog_phases::{validate_mappings, DuplicatePolicy};
pub use error::{ImportError, ImportOutcome, ImportPhase};
pub use lookup::NameLookup;
pub use personal_importer::PersonalImporter;
pub use preview::PreviewBuilder;
pub use reconciler::EntityReconciler;
pub use references::find_unresolved_references;
pub use validator::ImportValidator;

// 重导出 Trait 接口
pub use importer_trait::DocumentValidator;
