// ==========================================
// 训练档案系统 - 导入存储入口
// ==========================================
// 职责: 持有连接，提供目录快照、存在性检查、单事务执行
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::domain::mapping::{CatalogSnapshot, EntityKind, ExistingEntity};
use crate::repository::athlete_repo;
use crate::repository::catalog_repo::table_for;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// ImportStore
// ==========================================
#[derive(Clone)]
pub struct ImportStore {
    conn: Arc<Mutex<Connection>>,
}

impl ImportStore {
    /// 创建新的 ImportStore 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（会再次应用统一 PRAGMA，幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
        }

        Ok(Self { conn })
    }

    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取三类可对账实体的 (id, name) 快照
    pub fn catalog_snapshot(&self) -> RepositoryResult<CatalogSnapshot> {
        let conn = self.get_conn()?;

        Ok(CatalogSnapshot {
            exercises: list_entities(&conn, EntityKind::Exercise)?,
            equipment: list_entities(&conn, EntityKind::Equipment)?,
            program_templates: list_entities(&conn, EntityKind::ProgramTemplate)?,
        })
    }

    /// 运动员在该日期是否已有训练课
    pub fn workout_exists(&self, athlete_id: i64, date: NaiveDate) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        athlete_repo::workout_exists(&conn, athlete_id, date)
    }

    /// 运动员当前是否有激活中的训练计划
    pub fn has_active_program(&self, athlete_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        athlete_repo::has_active_program(&conn, athlete_id)
    }

    pub fn athlete_exists(&self, athlete_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        row_exists(&conn, "SELECT 1 FROM athlete WHERE id = ?1", athlete_id)
    }

    pub fn coach_exists(&self, coach_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        row_exists(&conn, "SELECT 1 FROM coach WHERE id = ?1", coach_id)
    }

    /// 在单个写事务内执行闭包
    ///
    /// - 闭包返回 Ok: 提交
    /// - 闭包返回 Err: 事务随 drop 回滚，数据库保持调用前状态
    pub fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let value = f(&tx)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(value)
    }
}

fn list_entities(conn: &Connection, kind: EntityKind) -> RepositoryResult<Vec<ExistingEntity>> {
    let sql = format!("SELECT id, name FROM {} ORDER BY id", table_for(kind));
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        Ok(ExistingEntity {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;

    let mut entities = Vec::new();
    for row in rows {
        entities.push(row?);
    }
    Ok(entities)
}

fn row_exists(conn: &Connection, sql: &str, id: i64) -> RepositoryResult<bool> {
    let found = conn
        .query_row(sql, params![id], |_row| Ok(true))
        .optional()?
        .unwrap_or(false);
    Ok(found)
}
