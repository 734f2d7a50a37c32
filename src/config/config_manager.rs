// ==========================================
// 训练档案系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// 未来日期宽限天数上限（约 100 年）
pub const MAX_FUTURE_DATE_GRACE_DAYS: i64 = 36_500;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 配置（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;

        Ok(())
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }
}

impl ImportConfigReader for ConfigManager {
    fn get_default_reviewer_id(&self) -> Result<Option<i64>, Box<dyn Error>> {
        let value = match self.get_config_value(config_keys::DEFAULT_REVIEWER_ID)? {
            Some(v) => v,
            None => return Ok(None),
        };

        match value.trim().parse::<i64>() {
            Ok(id) => Ok(Some(id)),
            Err(_) => {
                warn!(
                    config_key = config_keys::DEFAULT_REVIEWER_ID,
                    value = %value,
                    "配置值无法解析，忽略"
                );
                Ok(None)
            }
        }
    }

    fn get_future_date_grace_days(&self) -> Result<i64, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::FUTURE_DATE_GRACE_DAYS, "0")?;
        let days = parse_or_default(config_keys::FUTURE_DATE_GRACE_DAYS, &value, 0);
        Ok(clamp_grace_days(days))
    }

    fn get_surface_unresolved_references(&self) -> Result<bool, Box<dyn Error>> {
        let value =
            self.get_config_or_default(config_keys::SURFACE_UNRESOLVED_REFERENCES, "true")?;
        Ok(parse_flag(&value).unwrap_or_else(|| {
            warn!(
                config_key = config_keys::SURFACE_UNRESOLVED_REFERENCES,
                value = %value,
                "配置值无法解析，使用默认值 true"
            );
            true
        }))
    }
}

fn parse_or_default(key: &str, value: &str, default: i64) -> i64 {
    value.trim().parse::<i64>().unwrap_or_else(|_| {
        warn!(config_key = key, value = %value, default, "配置值无法解析，使用默认值");
        default
    })
}

/// 宽限天数限制在 [0, MAX_FUTURE_DATE_GRACE_DAYS]
fn clamp_grace_days(days: i64) -> i64 {
    let clamped = days.clamp(0, MAX_FUTURE_DATE_GRACE_DAYS);
    if clamped != days {
        warn!(
            config_key = config_keys::FUTURE_DATE_GRACE_DAYS,
            days,
            clamped,
            "宽限天数超出范围，已截断"
        );
    }
    clamped
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 点评
    pub const DEFAULT_REVIEWER_ID: &str = "import.default_reviewer_id";

    // 校验
    pub const FUTURE_DATE_GRACE_DAYS: &str = "import.future_date_grace_days";

    // 预览
    pub const SURFACE_UNRESOLVED_REFERENCES: &str = "import.surface_unresolved_references";
}
