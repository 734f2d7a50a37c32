// ==========================================
// 训练档案系统 - API 层
// ==========================================
// 职责: 提供导入 API 接口，供请求处理层在进程内调用
// ==========================================

pub mod error;
pub mod import_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use import_api::ImportApi;
