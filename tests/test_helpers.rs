// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据写入与查询
// ==========================================

#![allow(dead_code)]

use coach_import::db::{init_schema, open_sqlite_connection};
use rusqlite::{params, Connection};
use std::error::Error;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

fn open(db_path: &str) -> Connection {
    open_sqlite_connection(db_path).expect("Failed to open test db")
}

/// 插入测试运动员，返回 ID
pub fn insert_athlete(db_path: &str, name: &str) -> i64 {
    let conn = open(db_path);
    conn.execute("INSERT INTO athlete (name) VALUES (?1)", params![name])
        .expect("Failed to insert athlete");
    conn.last_insert_rowid()
}

/// 插入测试教练，返回 ID
pub fn insert_coach(db_path: &str, name: &str) -> i64 {
    let conn = open(db_path);
    conn.execute("INSERT INTO coach (name) VALUES (?1)", params![name])
        .expect("Failed to insert coach");
    conn.last_insert_rowid()
}

/// 插入已有训练课（日期格式 YYYY-MM-DD）
pub fn insert_workout(db_path: &str, athlete_id: i64, date: &str) -> i64 {
    let conn = open(db_path);
    conn.execute(
        "INSERT INTO workout (athlete_id, date) VALUES (?1, ?2)",
        params![athlete_id, date],
    )
    .expect("Failed to insert workout");
    conn.last_insert_rowid()
}

/// 插入目录实体（equipment / exercise / program_template），返回 ID
pub fn insert_named(db_path: &str, table: &str, name: &str) -> i64 {
    let conn = open(db_path);
    conn.execute(&format!("INSERT INTO {} (name) VALUES (?1)", table), params![name])
        .expect("Failed to insert named row");
    conn.last_insert_rowid()
}

/// 插入运动员训练计划关联
pub fn insert_athlete_program(db_path: &str, athlete_id: i64, template_id: i64, active: bool) -> i64 {
    let conn = open(db_path);
    conn.execute(
        "INSERT INTO athlete_program (athlete_id, template_id, start_date, active) VALUES (?1, ?2, '2026-01-01', ?3)",
        params![athlete_id, template_id, active],
    )
    .expect("Failed to insert athlete_program");
    conn.last_insert_rowid()
}

/// 写入全局配置
pub fn insert_test_config(db_path: &str, key: &str, value: &str) {
    let conn = open(db_path);
    conn.execute(
        "INSERT OR REPLACE INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)",
        params![key, value],
    )
    .expect("Failed to insert config");
}

/// 统计表行数
pub fn count_rows(db_path: &str, table: &str) -> i64 {
    let conn = open(db_path);
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
        .expect("Failed to count rows")
}

/// 执行任意 SQL（用于构造故障场景）
pub fn execute_sql(db_path: &str, sql: &str) {
    let conn = open(db_path);
    conn.execute_batch(sql).expect("Failed to execute sql");
}

/// 运动员各训练计划的 (template_id, active)
pub fn athlete_programs(db_path: &str, athlete_id: i64) -> Vec<(i64, bool)> {
    let conn = open(db_path);
    let mut stmt = conn
        .prepare("SELECT template_id, active FROM athlete_program WHERE athlete_id = ?1 ORDER BY id")
        .expect("Failed to prepare");
    let rows = stmt
        .query_map(params![athlete_id], |row| Ok((row.get(0)?, row.get(1)?)))
        .expect("Failed to query");
    rows.map(|r| r.expect("row")).collect()
}

/// 按名称查询目录实体 ID
pub fn find_id(db_path: &str, table: &str, name: &str) -> Option<i64> {
    let conn = open(db_path);
    conn.query_row(
        &format!("SELECT id FROM {} WHERE name = ?1", table),
        params![name],
        |row| row.get(0),
    )
    .ok()
}
