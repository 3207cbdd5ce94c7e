// ==========================================
// 元器件库存系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value)
// 缺省: 键不存在或值无法解析时使用内置默认值
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

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
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入配置值（存在则覆盖）
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .get_config_value(key)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string()))
    }

    /// 全部配置（按键排序）
    pub fn get_config_snapshot(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut snapshot = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }

    // ===== 导入配置 =====

    /// 新建料号及批次 meta 使用的供应商
    pub fn get_default_supplier(&self) -> RepositoryResult<String> {
        self.get_config_or_default(config_keys::DEFAULT_SUPPLIER, defaults::DEFAULT_SUPPLIER)
    }

    /// 请求未提供文件名时使用的批次文件名
    pub fn get_default_file_name(&self) -> RepositoryResult<String> {
        self.get_config_or_default(config_keys::DEFAULT_FILE_NAME, defaults::DEFAULT_FILE_NAME)
    }

    // ===== 预览配置 =====

    /// 文件预览最多返回的行数（非正数或非法值回退默认值）
    pub fn get_preview_max_rows(&self) -> RepositoryResult<usize> {
        let value = self.get_config_or_default(
            config_keys::PREVIEW_MAX_ROWS,
            &defaults::PREVIEW_MAX_ROWS.to_string(),
        )?;
        Ok(value
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .unwrap_or(defaults::PREVIEW_MAX_ROWS))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 导入
    pub const DEFAULT_SUPPLIER: &str = "import.default_supplier";
    pub const DEFAULT_FILE_NAME: &str = "import.default_file_name";

    // 预览
    pub const PREVIEW_MAX_ROWS: &str = "preview.max_rows";
}

/// 内置默认值
pub mod defaults {
    pub const DEFAULT_SUPPLIER: &str = "Mouser";
    pub const DEFAULT_FILE_NAME: &str = "mouser-import";
    pub const PREVIEW_MAX_ROWS: usize = 30;
}
