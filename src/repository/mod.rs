// ==========================================
// 训练档案系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod athlete_repo;
pub mod catalog_repo;
pub mod error;
pub mod import_store;

// 重导出核心仓储
pub use athlete_repo::AthleteProgramLink;
pub use error::{classify_insert, InsertOutcome, RepositoryError, RepositoryResult};
pub use import_store::ImportStore;
