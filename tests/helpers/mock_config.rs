// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use coach_import::config::ImportConfigReader;
use std::error::Error;

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub default_reviewer_id: Option<i64>,
    pub future_date_grace_days: i64,
    pub surface_unresolved_references: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            default_reviewer_id: None,
            future_date_grace_days: 0,
            surface_unresolved_references: true,
        }
    }
}

impl MockConfig {
    pub fn with_reviewer(coach_id: i64) -> Self {
        Self {
            default_reviewer_id: Some(coach_id),
            ..Self::default()
        }
    }
}

impl ImportConfigReader for MockConfig {
    fn get_default_reviewer_id(&self) -> Result<Option<i64>, Box<dyn Error>> {
        Ok(self.default_reviewer_id)
    }

    fn get_future_date_grace_days(&self) -> Result<i64, Box<dyn Error>> {
        Ok(self.future_date_grace_days)
    }

    fn get_surface_unresolved_references(&self) -> Result<bool, Box<dyn Error>> {
        Ok(self.surface_unresolved_references)
    }
}
