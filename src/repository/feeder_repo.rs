// ==========================================
// 元器件库存系统 - 料站仓储
// ==========================================
// 职责: 管理 feeder / feeder_assignment 表
// ==========================================

use crate::domain::part::{Feeder, FeederAssignment};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub struct FeederRepository {
    conn: Arc<Mutex<Connection>>,
}

impl FeederRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 确保料站存在（按 feeder_no 幂等），返回料站
    pub fn ensure_feeder(&self, feeder_no: &str) -> RepositoryResult<Feeder> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO feeder (id, feeder_no) VALUES (?1, ?2)",
            params![Uuid::new_v4().to_string(), feeder_no],
        )?;
        let feeder = conn.query_row(
            "SELECT id, feeder_no FROM feeder WHERE feeder_no = ?1",
            params![feeder_no],
            |row| {
                Ok(Feeder {
                    id: row.get(0)?,
                    feeder_no: row.get(1)?,
                })
            },
        )?;
        Ok(feeder)
    }

    pub fn find_by_feeder_no(&self, feeder_no: &str) -> RepositoryResult<Option<Feeder>> {
        let conn = self.get_conn()?;
        let feeder = conn
            .query_row(
                "SELECT id, feeder_no FROM feeder WHERE feeder_no = ?1",
                params![feeder_no],
                |row| {
                    Ok(Feeder {
                        id: row.get(0)?,
                        feeder_no: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(feeder)
    }

    /// 挂料（新建一条 active 关系）
    pub fn assign(&self, part_id: &str, feeder_id: &str) -> RepositoryResult<FeederAssignment> {
        let assignment = FeederAssignment {
            id: Uuid::new_v4().to_string(),
            part_id: part_id.to_string(),
            feeder_id: feeder_id.to_string(),
            active: true,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO feeder_assignment (id, part_id, feeder_id, active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                assignment.id,
                assignment.part_id,
                assignment.feeder_id,
                assignment.active as i32,
                assignment.created_at,
            ],
        )?;
        Ok(assignment)
    }

    /// 挂料（幂等：该料号在该料站已有 active 关系时不重复插入）
    pub fn ensure_assigned(&self, part_id: &str, feeder_id: &str) -> RepositoryResult<()> {
        let exists = {
            let conn = self.get_conn()?;
            conn.query_row(
                r#"
                SELECT 1 FROM feeder_assignment
                WHERE part_id = ?1 AND feeder_id = ?2 AND active = 1
                LIMIT 1
                "#,
                params![part_id, feeder_id],
                |_row| Ok(true),
            )
            .optional()?
            .unwrap_or(false)
        };

        if !exists {
            self.assign(part_id, feeder_id)?;
        }
        Ok(())
    }

    /// 卸料（关系保留，active 置 0）
    pub fn deactivate(&self, assignment_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "UPDATE feeder_assignment SET active = 0 WHERE id = ?1",
            params![assignment_id],
        )?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "FeederAssignment".to_string(),
                id: assignment_id.to_string(),
            });
        }
        Ok(())
    }
}
