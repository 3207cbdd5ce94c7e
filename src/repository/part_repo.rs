// ==========================================
// 元器件库存系统 - 料号/库存仓储
// ==========================================
// 职责: 管理 part / inventory 表，并为核对引擎提供料号视图
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::open_and_migrate;
use crate::domain::part::{InventorySnapshot, Part, PartStockView};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// SQLite 默认变量上限通常为 999；留出余量
const CHUNK_SIZE: usize = 900;

const PART_COLUMNS: &str =
    "id, part_number, description, supplier, moq, order_multiple, created_at, updated_at";

fn map_part_row(row: &Row) -> rusqlite::Result<Part> {
    Ok(Part {
        id: row.get(0)?,
        part_number: row.get(1)?,
        description: row.get(2)?,
        supplier: row.get(3)?,
        moq: row.get(4)?,
        order_multiple: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn placeholders(n: usize) -> String {
    std::iter::repeat("?").take(n).collect::<Vec<_>>().join(", ")
}

pub struct PartRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PartRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_and_migrate(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn insert_part_on(conn: &Connection, part: &Part) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO part (
                id, part_number, description, supplier,
                moq, order_multiple, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                part.id,
                part.part_number,
                part.description,
                part.supplier,
                part.moq,
                part.order_multiple,
                part.created_at,
                part.updated_at,
            ],
        )?;
        Ok(())
    }

    /// 插入料号（不含库存）
    pub fn insert(&self, part: &Part) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::insert_part_on(&conn, part)
    }

    /// 按规范化料号查找
    pub fn find_by_part_number(&self, part_number: &str) -> RepositoryResult<Option<Part>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM part WHERE part_number = ?1", PART_COLUMNS);
        let part = conn
            .query_row(&sql, params![part_number], map_part_row)
            .optional()?;
        Ok(part)
    }

    /// 批量查找（分块，避免超出 SQLite 参数上限）
    pub fn find_by_part_numbers(&self, part_numbers: &[String]) -> RepositoryResult<Vec<Part>> {
        if part_numbers.is_empty() {
            return Ok(vec![]);
        }

        let conn = self.get_conn()?;
        let mut out = Vec::with_capacity(part_numbers.len());

        for chunk in part_numbers.chunks(CHUNK_SIZE) {
            let sql = format!(
                "SELECT {} FROM part WHERE part_number IN ({})",
                PART_COLUMNS,
                placeholders(chunk.len())
            );
            let mut stmt = conn.prepare(&sql)?;
            let params_vec: Vec<&dyn ToSql> = chunk.iter().map(|s| s as &dyn ToSql).collect();
            let rows = stmt.query_map(params_vec.as_slice(), map_part_row)?;
            for row in rows {
                out.push(row?);
            }
        }

        Ok(out)
    }

    /// 读取库存快照（无库存记录时返回 None）
    pub fn get_inventory(&self, part_id: &str) -> RepositoryResult<Option<InventorySnapshot>> {
        let conn = self.get_conn()?;
        let snapshot = conn
            .query_row(
                "SELECT on_hand, reserved, on_order FROM inventory WHERE part_id = ?1",
                params![part_id],
                |row| {
                    Ok(InventorySnapshot {
                        on_hand: row.get(0)?,
                        reserved: row.get(1)?,
                        on_order: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(snapshot)
    }

    /// 覆盖写入库存快照（盘点/初始化用）
    pub fn upsert_inventory(
        &self,
        part_id: &str,
        snapshot: &InventorySnapshot,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO inventory (part_id, on_hand, reserved, on_order, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(part_id) DO UPDATE SET
                on_hand = excluded.on_hand,
                reserved = excluded.reserved,
                on_order = excluded.on_order,
                updated_at = excluded.updated_at
            "#,
            params![
                part_id,
                snapshot.on_hand,
                snapshot.reserved,
                snapshot.on_order,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// 新建料号并以 on_order 初始化库存（同一事务）
    pub fn create_with_on_order(&self, part: &Part, on_order: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        Self::insert_part_on(&tx, part)?;
        tx.execute(
            "INSERT INTO inventory (part_id, on_order, updated_at) VALUES (?1, ?2, ?3)",
            params![part.id, on_order, Utc::now().to_rfc3339()],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// 在途累加（库存记录不存在时以 qty 创建），可选回填空描述
    ///
    /// # 返回
    /// - Ok(true): 描述已回填
    /// - Ok(false): 未回填（未提供描述或已有描述）
    pub fn add_on_order(
        &self,
        part_id: &str,
        qty: i64,
        description: Option<&str>,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let now = Utc::now().to_rfc3339();

        // SQLite 整数溢出会静默转为 REAL，累加必须在事务内先校验
        let current: Option<i64> = tx
            .query_row(
                "SELECT on_order FROM inventory WHERE part_id = ?1",
                params![part_id],
                |row| row.get(0),
            )
            .optional()?;
        let on_order = current
            .unwrap_or(0)
            .checked_add(qty)
            .filter(|v| *v >= 0)
            .ok_or_else(|| RepositoryError::FieldValueError {
                field: "on_order".to_string(),
                message: format!(
                    "在途数量溢出: {} + {}",
                    current.unwrap_or(0),
                    qty
                ),
            })?;

        tx.execute(
            r#"
            INSERT INTO inventory (part_id, on_order, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(part_id) DO UPDATE SET
                on_order = excluded.on_order,
                updated_at = excluded.updated_at
            "#,
            params![part_id, on_order, now],
        )?;

        let filled = match description {
            Some(desc) => {
                tx.execute(
                    r#"
                    UPDATE part SET description = ?2, updated_at = ?3
                    WHERE id = ?1 AND (description IS NULL OR TRIM(description) = '')
                    "#,
                    params![part_id, desc, now],
                )? > 0
            }
            None => false,
        };

        tx.commit()?;
        Ok(filled)
    }

    /// 加载核对所需的料号视图（料号 + 库存 + 在用料站）
    ///
    /// 未找到的料号不出现在结果中；料站号未排序。
    pub fn load_stock_views(&self, part_numbers: &[String]) -> RepositoryResult<Vec<PartStockView>> {
        if part_numbers.is_empty() {
            return Ok(vec![]);
        }

        let conn = self.get_conn()?;
        let mut views: Vec<PartStockView> = Vec::with_capacity(part_numbers.len());

        for chunk in part_numbers.chunks(CHUNK_SIZE) {
            let sql = format!(
                r#"
                SELECT
                    p.id, p.part_number, p.description, p.supplier,
                    p.moq, p.order_multiple, p.created_at, p.updated_at,
                    i.on_hand, i.reserved, i.on_order
                FROM part p
                LEFT JOIN inventory i ON i.part_id = p.id
                WHERE p.part_number IN ({})
                "#,
                placeholders(chunk.len())
            );
            let mut stmt = conn.prepare(&sql)?;
            let params_vec: Vec<&dyn ToSql> = chunk.iter().map(|s| s as &dyn ToSql).collect();
            let rows = stmt.query_map(params_vec.as_slice(), |row| {
                let part = map_part_row(row)?;
                let on_hand: Option<i64> = row.get(8)?;
                let inventory = match on_hand {
                    Some(on_hand) => Some(InventorySnapshot {
                        on_hand,
                        reserved: row.get(9)?,
                        on_order: row.get(10)?,
                    }),
                    None => None,
                };
                Ok(PartStockView {
                    part,
                    inventory,
                    feeder_nos: Vec::new(),
                })
            })?;
            for row in rows {
                views.push(row?);
            }
        }

        // 在用料站
        let part_ids: Vec<String> = views.iter().map(|v| v.part.id.clone()).collect();
        let mut feeders_by_part: HashMap<String, Vec<String>> = HashMap::new();
        for chunk in part_ids.chunks(CHUNK_SIZE) {
            let sql = format!(
                r#"
                SELECT fa.part_id, f.feeder_no
                FROM feeder_assignment fa
                JOIN feeder f ON f.id = fa.feeder_id
                WHERE fa.active = 1 AND fa.part_id IN ({})
                "#,
                placeholders(chunk.len())
            );
            let mut stmt = conn.prepare(&sql)?;
            let params_vec: Vec<&dyn ToSql> = chunk.iter().map(|s| s as &dyn ToSql).collect();
            let rows = stmt.query_map(params_vec.as_slice(), |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;
            for row in rows {
                let (part_id, feeder_no) = row?;
                feeders_by_part.entry(part_id).or_default().push(feeder_no);
            }
        }

        for view in views.iter_mut() {
            if let Some(feeder_nos) = feeders_by_part.remove(&view.part.id) {
                view.feeder_nos = feeder_nos;
            }
        }

        Ok(views)
    }

    /// 料号总数（健康检查用）
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM part", [], |row| row.get(0))?;
        Ok(n)
    }

    /// 库存记录总数
    pub fn count_inventory(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM inventory", [], |row| row.get(0))?;
        Ok(n)
    }
}
