// ==========================================
// 元器件库存系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键 / busy_timeout）
// - 统一建表入口，所有仓储共用同一套 schema
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
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
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

/// 打开连接并确保 schema 已就绪
pub fn open_and_migrate(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = open_sqlite_connection(db_path)?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// 建表（幂等）
///
/// 约束说明：
/// - part.part_number 唯一（已规范化：TRIM + UPPER）
/// - inventory 与 part 1:1（part_id 为主键）
/// - purchase_import_batch.sales_order_no 唯一，是重复导入的最终裁决
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS part (
            id TEXT PRIMARY KEY,
            part_number TEXT NOT NULL UNIQUE,
            description TEXT,
            supplier TEXT,
            moq INTEGER NOT NULL DEFAULT 1 CHECK (moq >= 1),
            order_multiple INTEGER NOT NULL DEFAULT 1 CHECK (order_multiple >= 1),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS inventory (
            part_id TEXT PRIMARY KEY REFERENCES part(id) ON DELETE CASCADE,
            on_hand INTEGER NOT NULL DEFAULT 0 CHECK (on_hand >= 0),
            reserved INTEGER NOT NULL DEFAULT 0 CHECK (reserved >= 0),
            on_order INTEGER NOT NULL DEFAULT 0 CHECK (on_order >= 0),
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS feeder (
            id TEXT PRIMARY KEY,
            feeder_no TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS feeder_assignment (
            id TEXT PRIMARY KEY,
            part_id TEXT NOT NULL REFERENCES part(id) ON DELETE CASCADE,
            feeder_id TEXT NOT NULL REFERENCES feeder(id) ON DELETE CASCADE,
            active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_feeder_assignment_part
            ON feeder_assignment(part_id, active);

        CREATE TABLE IF NOT EXISTS purchase_import_batch (
            id TEXT PRIMARY KEY,
            file_name TEXT NOT NULL,
            sales_order_no TEXT UNIQUE,
            meta TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS purchase_import_line (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            batch_id TEXT NOT NULL REFERENCES purchase_import_batch(id) ON DELETE CASCADE,
            part_number_raw TEXT NOT NULL,
            part_id TEXT REFERENCES part(id) ON DELETE SET NULL,
            qty INTEGER NOT NULL,
            status TEXT NOT NULL,
            error TEXT,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_purchase_import_line_batch
            ON purchase_import_line(batch_id);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), None);

        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn test_sales_order_no_is_unique() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO purchase_import_batch (id, file_name, sales_order_no, created_at) VALUES ('b1', 'a.xls', 'SO-1', 'now')",
            [],
        )
        .unwrap();
        let dup = conn.execute(
            "INSERT INTO purchase_import_batch (id, file_name, sales_order_no, created_at) VALUES ('b2', 'b.xls', 'SO-1', 'now')",
            [],
        );
        assert!(dup.is_err());

        // NULL 不参与唯一约束
        conn.execute(
            "INSERT INTO purchase_import_batch (id, file_name, created_at) VALUES ('b3', 'c.xls', 'now')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO purchase_import_batch (id, file_name, created_at) VALUES ('b4', 'd.xls', 'now')",
            [],
        )
        .unwrap();
    }
}
