// ==========================================
// 训练档案系统 - SQLite 连接初始化与建表
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键、busy_timeout）
// - 提供导入引擎依赖的表结构与唯一约束
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 建表（幂等）
///
/// 唯一约束即导入"跳过"语义的依据：
/// - 目录实体名称（忽略大小写）
/// - athlete_exercise(athlete_id, exercise_id)
/// - training_max(athlete_id, exercise_id, effective_date)
/// - body_weight(athlete_id, date) / workout(athlete_id, date)
/// - athlete_program(athlete_id, template_id)
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_scope (
            scope_id TEXT PRIMARY KEY,
            scope_type TEXT NOT NULL,
            scope_key TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(scope_type, scope_key)
        );

        INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
        VALUES ('global', 'GLOBAL', 'global');

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS athlete (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS coach (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS equipment (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE,
            description TEXT
        );

        CREATE TABLE IF NOT EXISTS exercise (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE,
            tier TEXT,
            form_notes TEXT,
            demo_url TEXT,
            rest_seconds INTEGER,
            featured INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS exercise_equipment (
            exercise_id INTEGER NOT NULL REFERENCES exercise(id) ON DELETE CASCADE,
            equipment_id INTEGER NOT NULL REFERENCES equipment(id) ON DELETE CASCADE,
            optional INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (exercise_id, equipment_id)
        );

        CREATE TABLE IF NOT EXISTS athlete_equipment (
            athlete_id INTEGER NOT NULL REFERENCES athlete(id) ON DELETE CASCADE,
            equipment_id INTEGER NOT NULL REFERENCES equipment(id) ON DELETE CASCADE,
            PRIMARY KEY (athlete_id, equipment_id)
        );

        CREATE TABLE IF NOT EXISTS athlete_exercise (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            athlete_id INTEGER NOT NULL REFERENCES athlete(id) ON DELETE CASCADE,
            exercise_id INTEGER NOT NULL REFERENCES exercise(id) ON DELETE CASCADE,
            target_reps INTEGER,
            active INTEGER NOT NULL DEFAULT 1,
            UNIQUE(athlete_id, exercise_id)
        );

        CREATE TABLE IF NOT EXISTS training_max (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            athlete_id INTEGER NOT NULL REFERENCES athlete(id) ON DELETE CASCADE,
            exercise_id INTEGER NOT NULL REFERENCES exercise(id) ON DELETE CASCADE,
            weight REAL NOT NULL,
            effective_date TEXT NOT NULL,
            notes TEXT,
            UNIQUE(athlete_id, exercise_id, effective_date)
        );

        CREATE TABLE IF NOT EXISTS body_weight (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            athlete_id INTEGER NOT NULL REFERENCES athlete(id) ON DELETE CASCADE,
            date TEXT NOT NULL,
            weight REAL NOT NULL,
            notes TEXT,
            UNIQUE(athlete_id, date)
        );

        CREATE TABLE IF NOT EXISTS workout (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            athlete_id INTEGER NOT NULL REFERENCES athlete(id) ON DELETE CASCADE,
            date TEXT NOT NULL,
            notes TEXT,
            UNIQUE(athlete_id, date)
        );

        CREATE TABLE IF NOT EXISTS workout_set (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            workout_id INTEGER NOT NULL REFERENCES workout(id) ON DELETE CASCADE,
            exercise_id INTEGER NOT NULL REFERENCES exercise(id),
            set_number INTEGER NOT NULL,
            reps INTEGER,
            rep_type TEXT NOT NULL DEFAULT 'reps',
            weight REAL,
            rpe REAL,
            notes TEXT
        );

        CREATE TABLE IF NOT EXISTS workout_review (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            workout_id INTEGER NOT NULL UNIQUE REFERENCES workout(id) ON DELETE CASCADE,
            coach_id INTEGER NOT NULL REFERENCES coach(id),
            rating INTEGER,
            comment TEXT
        );

        CREATE TABLE IF NOT EXISTS program_template (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE,
            description TEXT,
            num_weeks INTEGER NOT NULL DEFAULT 1,
            num_days INTEGER NOT NULL DEFAULT 1,
            is_loop INTEGER NOT NULL DEFAULT 0,
            audience TEXT,
            athlete_id INTEGER REFERENCES athlete(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS prescribed_set (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            template_id INTEGER NOT NULL REFERENCES program_template(id) ON DELETE CASCADE,
            exercise_id INTEGER NOT NULL REFERENCES exercise(id),
            week INTEGER NOT NULL,
            day INTEGER NOT NULL,
            set_number INTEGER NOT NULL,
            reps INTEGER,
            rep_type TEXT NOT NULL DEFAULT 'reps',
            percentage REAL,
            rpe REAL
        );

        CREATE TABLE IF NOT EXISTS progression_rule (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            template_id INTEGER NOT NULL REFERENCES program_template(id) ON DELETE CASCADE,
            exercise_id INTEGER NOT NULL REFERENCES exercise(id),
            strategy TEXT NOT NULL,
            increment REAL NOT NULL,
            cadence_weeks INTEGER
        );

        CREATE TABLE IF NOT EXISTS athlete_program (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            athlete_id INTEGER NOT NULL REFERENCES athlete(id) ON DELETE CASCADE,
            template_id INTEGER NOT NULL REFERENCES program_template(id) ON DELETE CASCADE,
            start_date TEXT NOT NULL,
            notes TEXT,
            goal TEXT,
            active INTEGER NOT NULL DEFAULT 0,
            UNIQUE(athlete_id, template_id)
        );

        CREATE INDEX IF NOT EXISTS idx_athlete_program_active ON athlete_program(athlete_id, active);
        CREATE INDEX IF NOT EXISTS idx_workout_set_workout ON workout_set(workout_id);
        CREATE INDEX IF NOT EXISTS idx_prescribed_set_template ON prescribed_set(template_id);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}
