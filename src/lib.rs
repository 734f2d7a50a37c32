// ==========================================
// 训练档案系统 - 导入引擎核心库
// ==========================================
// 职责: 实体映射对账、导入预览与校验、单事务落库（个人 / 目录）
// 技术栈: Rust + SQLite
// 边界: 文件解析、界面与请求处理由调用方负责
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 导入文档、映射、报告
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 对账、预览、落库
pub mod importer;

// 配置层 - 导入参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/表结构）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 进程内调用入口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    CatalogImportResult, EntityKind, EntityMapping, ImportPreview, ImportResult, MappingSet,
    MappingTarget, ParsedDocument, UnresolvedReference, ValidationWarning,
};

// 导入组件
pub use importer::{
    CatalogImporter, DocumentValidator, EntityReconciler, ImportError, ImportValidator,
    PersonalImporter, PreviewBuilder,
};

// 仓储
pub use repository::{ImportStore, RepositoryError};

// API
pub use api::{ApiError, ImportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "训练档案系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
