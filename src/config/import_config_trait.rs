// ==========================================
// 训练档案系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use std::error::Error;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait ImportConfigReader: Send + Sync {
    /// 默认点评教练 ID（调用方未提供点评教练时使用）
    ///
    /// # 默认值
    /// - None（不写入点评）
    fn get_default_reviewer_id(&self) -> Result<Option<i64>, Box<dyn Error>>;

    /// 未来日期宽限天数
    ///
    /// 校验器以 today + grace 作为"今天"，严格晚于它的训练日期才告警
    ///
    /// # 默认值
    /// - 0
    fn get_future_date_grace_days(&self) -> Result<i64, Box<dyn Error>>;

    /// 预览中是否列出无法解析的名称引用
    ///
    /// # 默认值
    /// - true
    fn get_surface_unresolved_references(&self) -> Result<bool, Box<dyn Error>>;
}
