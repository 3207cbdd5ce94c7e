// ==========================================
// 元器件库存系统 - 采购导入批次仓储
// ==========================================
// 职责: 管理 purchase_import_batch / purchase_import_line 表
// 约束: sales_order_no 唯一由数据库保证，仓储只透传约束错误
// ==========================================

use crate::domain::purchase::{ImportBatch, ImportLine};
use crate::domain::types::ImportLineStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

fn map_batch_row(row: &Row) -> rusqlite::Result<ImportBatch> {
    let meta_raw: String = row.get(3)?;
    Ok(ImportBatch {
        id: row.get(0)?,
        file_name: row.get(1)?,
        sales_order_no: row.get(2)?,
        // meta 仅作展示，损坏时降级为 null
        meta: serde_json::from_str(&meta_raw).unwrap_or(serde_json::Value::Null),
        created_at: row.get(4)?,
    })
}

pub struct ImportBatchRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ImportBatchRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入批次；sales_order_no 冲突时返回 UniqueConstraintViolation
    pub fn insert_batch(&self, batch: &ImportBatch) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO purchase_import_batch (id, file_name, sales_order_no, meta, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                batch.id,
                batch.file_name,
                batch.sales_order_no,
                batch.meta.to_string(),
                batch.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, batch_id: &str) -> RepositoryResult<Option<ImportBatch>> {
        let conn = self.get_conn()?;
        let batch = conn
            .query_row(
                r#"
                SELECT id, file_name, sales_order_no, meta, created_at
                FROM purchase_import_batch WHERE id = ?1
                "#,
                params![batch_id],
                map_batch_row,
            )
            .optional()?;
        Ok(batch)
    }

    pub fn find_by_sales_order_no(
        &self,
        sales_order_no: &str,
    ) -> RepositoryResult<Option<ImportBatch>> {
        let conn = self.get_conn()?;
        let batch = conn
            .query_row(
                r#"
                SELECT id, file_name, sales_order_no, meta, created_at
                FROM purchase_import_batch WHERE sales_order_no = ?1
                "#,
                params![sales_order_no],
                map_batch_row,
            )
            .optional()?;
        Ok(batch)
    }

    /// 最近批次（按创建时间倒序）
    pub fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<ImportBatch>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, file_name, sales_order_no, meta, created_at
            FROM purchase_import_batch
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )?;
        let batches = stmt
            .query_map(params![limit as i64], map_batch_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(batches)
    }

    pub fn insert_line(&self, line: &ImportLine) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO purchase_import_line (
                batch_id, part_number_raw, part_id, qty, status, error, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                line.batch_id,
                line.part_number_raw,
                line.part_id,
                line.qty,
                line.status.as_str(),
                line.error,
                line.created_at,
            ],
        )?;
        Ok(())
    }

    /// 批次全部审计行（按写入顺序）
    pub fn list_lines(&self, batch_id: &str) -> RepositoryResult<Vec<ImportLine>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT batch_id, part_number_raw, part_id, qty, status, error, created_at
            FROM purchase_import_line
            WHERE batch_id = ?1
            ORDER BY id
            "#,
        )?;

        let rows = stmt.query_map(params![batch_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut lines = Vec::new();
        for row in rows {
            let (batch_id, part_number_raw, part_id, qty, status_raw, error, created_at) = row?;
            let status = ImportLineStatus::from_db_str(&status_raw).ok_or_else(|| {
                RepositoryError::FieldValueError {
                    field: "status".to_string(),
                    message: format!("未知的导入行状态: {}", status_raw),
                }
            })?;
            lines.push(ImportLine {
                batch_id,
                part_number_raw,
                part_id,
                qty,
                status,
                error,
                created_at,
            });
        }
        Ok(lines)
    }

    pub fn count_batches(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n: i64 =
            conn.query_row("SELECT COUNT(*) FROM purchase_import_batch", [], |row| row.get(0))?;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;
    use crate::domain::purchase::ImportBatchMeta;

    fn setup_repo() -> ImportBatchRepository {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ImportBatchRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn meta() -> ImportBatchMeta {
        ImportBatchMeta {
            supplier: "Mouser".to_string(),
            distinct_items: 2,
            sales_order_no: Some("SO-100".to_string()),
        }
    }

    #[test]
    fn test_insert_and_find_by_sales_order_no() {
        let repo = setup_repo();
        let batch = ImportBatch::new("order.xlsx".to_string(), Some("SO-100".to_string()), &meta());
        repo.insert_batch(&batch).unwrap();

        let found = repo.find_by_sales_order_no("SO-100").unwrap().unwrap();
        assert_eq!(found.id, batch.id);
        assert_eq!(found.meta["supplier"], "Mouser");
        assert_eq!(found.meta["distinctItems"], 2);
        assert!(repo.find_by_sales_order_no("SO-999").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_sales_order_no_is_unique_violation() {
        let repo = setup_repo();
        let first = ImportBatch::new("a.xlsx".to_string(), Some("SO-100".to_string()), &meta());
        let second = ImportBatch::new("b.xlsx".to_string(), Some("SO-100".to_string()), &meta());

        repo.insert_batch(&first).unwrap();
        let err = repo.insert_batch(&second).unwrap_err();

        assert!(err.is_unique_violation());
        assert_eq!(repo.count_batches().unwrap(), 1);
    }

    #[test]
    fn test_lines_keep_insert_order() {
        let repo = setup_repo();
        let batch = ImportBatch::new("a.xlsx".to_string(), None, &meta());
        repo.insert_batch(&batch).unwrap();

        repo.insert_line(&ImportLine::failure(
            &batch.id,
            "BAD",
            None,
            3,
            "boom".to_string(),
        ))
        .unwrap();
        repo.insert_line(&ImportLine::failure(
            &batch.id,
            "WORSE",
            None,
            4,
            "bang".to_string(),
        ))
        .unwrap();

        let lines = repo.list_lines(&batch.id).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].part_number_raw, "BAD");
        assert_eq!(lines[0].status, ImportLineStatus::Error);
        assert_eq!(lines[1].error.as_deref(), Some("bang"));
    }
}
