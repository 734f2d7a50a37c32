// ==========================================
// 训练档案系统 - 导入组件 Trait
// ==========================================
// 职责: 定义导入管道中可替换组件的接口（不包含实现）
// ==========================================

use crate::domain::document::ParsedDocument;
use crate::domain::report::ValidationWarning;

// ==========================================
// DocumentValidator Trait
// ==========================================
// 用途: 数据质量校验（纯函数，不访问数据库）
// 实现者: ImportValidator
pub trait DocumentValidator: Send + Sync {
    /// 校验整份文档
    ///
    /// # 返回
    /// - Vec<ValidationWarning>: 警告列表（全部不阻断导入）
    fn validate(&self, document: &ParsedDocument) -> Vec<ValidationWarning>;
}
