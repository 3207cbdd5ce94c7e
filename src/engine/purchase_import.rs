// ==========================================
// 元器件库存系统 - 采购单导入引擎
// ==========================================
// 职责: 合并后的订单行 → 新建料号 / 在途累加 / 审计行
// 流程:
//   1. 无有效行 → 拒绝（不写库）
//   2. 销售订单号预检 → 已导入则拒绝并返回原批次（不写库）
//   3. 插入批次；唯一约束冲突视同预检命中
//   4. 逐行处理；单行失败记 ERROR 行，继续下一行
// 红线: 批次只创建一次，之后只追加行
// ==========================================

use crate::domain::demand::DemandLine;
use crate::domain::part::NewPart;
use crate::domain::purchase::{ImportBatch, ImportBatchMeta, ImportLine, ImportSummary};
use crate::domain::types::ImportLineStatus;
use crate::engine::repositories::PurchaseImportStore;
use crate::repository::RepositoryError;
use thiserror::Error;
use tracing::instrument;

// ==========================================
// 错误类型
// ==========================================
#[derive(Error, Debug)]
pub enum PurchaseImportError {
    #[error("没有有效的导入行（料号为空或数量 ≤ 0）")]
    NoValidRows,

    #[error("销售订单已导入: batch_id={}", .existing.id)]
    DuplicateOrder { existing: Box<ImportBatch> },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// 单行处理结果
struct LineOutcome {
    status: ImportLineStatus,
    part_id: String,
    description_filled: bool,
}

/// 单行失败（part_id 在已找到料号时保留）
struct LineFailure {
    part_id: Option<String>,
    error: RepositoryError,
}

// ==========================================
// PurchaseImportEngine
// ==========================================
pub struct PurchaseImportEngine<S> {
    store: S,
    supplier: String,
}

impl<S: PurchaseImportStore> PurchaseImportEngine<S> {
    /// # 参数
    /// - store: 存储实现
    /// - supplier: 新建料号的供应商，同时写入批次 meta
    pub fn new(store: S, supplier: impl Into<String>) -> Self {
        Self {
            store,
            supplier: supplier.into(),
        }
    }

    /// 导入一个采购单
    #[instrument(skip(self, lines), fields(file_name = %file_name, lines = lines.len()))]
    pub fn import(
        &self,
        file_name: &str,
        sales_order_no: Option<&str>,
        lines: &[DemandLine],
    ) -> Result<ImportSummary, PurchaseImportError> {
        if lines.is_empty() {
            return Err(PurchaseImportError::NoValidRows);
        }

        let sales_order_no = sales_order_no
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        // ===== 重复导入预检 =====
        if let Some(so) = sales_order_no.as_deref() {
            if let Some(existing) = self.store.find_batch_by_sales_order_no(so)? {
                tracing::warn!(
                    "销售订单已导入，拒绝本次导入: sales_order_no={}, batch_id={}",
                    so,
                    existing.id
                );
                return Err(PurchaseImportError::DuplicateOrder {
                    existing: Box::new(existing),
                });
            }
        }

        // ===== 创建批次 =====
        let meta = ImportBatchMeta {
            supplier: self.supplier.clone(),
            distinct_items: lines.len(),
            sales_order_no: sales_order_no.clone(),
        };
        let batch = ImportBatch::new(file_name.to_string(), sales_order_no.clone(), &meta);
        self.insert_batch_guarded(&batch)?;

        // ===== 逐行处理 =====
        let mut summary = ImportSummary {
            batch_id: batch.id.clone(),
            sales_order_no,
            created_parts: 0,
            updated_parts: 0,
            description_filled: 0,
            error_lines: 0,
        };

        for line in lines {
            let audit = match self.apply_line(line) {
                Ok(outcome) => {
                    match outcome.status {
                        ImportLineStatus::CreatedPart => summary.created_parts += 1,
                        _ => summary.updated_parts += 1,
                    }
                    if outcome.description_filled {
                        summary.description_filled += 1;
                    }
                    tracing::debug!(
                        "导入行完成: part_number={}, qty={}, status={}",
                        line.part_number,
                        line.required_qty,
                        outcome.status
                    );
                    ImportLine::success(
                        &batch.id,
                        &line.part_number,
                        outcome.part_id,
                        line.required_qty,
                        outcome.status,
                    )
                }
                Err(failure) => {
                    summary.error_lines += 1;
                    tracing::warn!(
                        "导入行失败: part_number={}, error={}",
                        line.part_number,
                        failure.error
                    );
                    ImportLine::failure(
                        &batch.id,
                        &line.part_number,
                        failure.part_id,
                        line.required_qty,
                        failure.error.to_string(),
                    )
                }
            };

            if let Err(e) = self.store.insert_line(&audit) {
                tracing::error!(
                    "审计行写入失败: batch_id={}, part_number={}, error={}",
                    batch.id,
                    line.part_number,
                    e
                );
            }
        }

        tracing::info!(
            "采购单导入完成: batch_id={}, created={}, updated={}, description_filled={}, errors={}",
            summary.batch_id,
            summary.created_parts,
            summary.updated_parts,
            summary.description_filled,
            summary.error_lines
        );

        Ok(summary)
    }

    /// 插入批次；销售订单号唯一冲突时查出胜出的批次并按重复导入处理
    fn insert_batch_guarded(&self, batch: &ImportBatch) -> Result<(), PurchaseImportError> {
        let err = match self.store.insert_batch(batch) {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        if let (true, Some(so)) = (err.is_unique_violation(), batch.sales_order_no.as_deref()) {
            if let Some(existing) = self.store.find_batch_by_sales_order_no(so)? {
                tracing::warn!(
                    "并发导入同一销售订单，以已存在批次为准: sales_order_no={}, batch_id={}",
                    so,
                    existing.id
                );
                return Err(PurchaseImportError::DuplicateOrder {
                    existing: Box::new(existing),
                });
            }
        }

        Err(err.into())
    }

    fn apply_line(&self, line: &DemandLine) -> Result<LineOutcome, LineFailure> {
        let existing = self
            .store
            .find_parts_by_numbers(std::slice::from_ref(&line.part_number))
            .map_err(|error| LineFailure {
                part_id: None,
                error,
            })?
            .into_iter()
            .find(|p| p.part_number == line.part_number);

        match existing {
            None => {
                let part = NewPart {
                    part_number: line.part_number.clone(),
                    description: line.description.clone(),
                    supplier: Some(self.supplier.clone()),
                    ..Default::default()
                }
                .into_part();

                self.store
                    .create_part_with_on_order(&part, line.required_qty)
                    .map_err(|error| LineFailure {
                        part_id: None,
                        error,
                    })?;

                Ok(LineOutcome {
                    status: ImportLineStatus::CreatedPart,
                    part_id: part.id,
                    description_filled: false,
                })
            }
            Some(part) => {
                let filled = self
                    .store
                    .add_on_order(&part.id, line.required_qty, line.description.as_deref())
                    .map_err(|error| LineFailure {
                        part_id: Some(part.id.clone()),
                        error,
                    })?;

                Ok(LineOutcome {
                    status: ImportLineStatus::UpdatedOnOrder,
                    part_id: part.id,
                    description_filled: filled,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::part::{InventorySnapshot, Part};
    use crate::repository::RepositoryResult;
    use std::cell::RefCell;
    use std::collections::HashMap;

    // ==========================================
    // 内存存储
    // ==========================================
    #[derive(Default)]
    struct MemoryStore {
        parts: RefCell<HashMap<String, Part>>,
        inventory: RefCell<HashMap<String, InventorySnapshot>>,
        batches: RefCell<Vec<ImportBatch>>,
        lines: RefCell<Vec<ImportLine>>,
        reject_part_numbers: Vec<String>,
        // 模拟并发: 预检看不到，插入时冲突
        hidden_batch: Option<ImportBatch>,
    }

    impl PurchaseImportStore for &MemoryStore {
        fn find_batch_by_sales_order_no(
            &self,
            sales_order_no: &str,
        ) -> RepositoryResult<Option<ImportBatch>> {
            let found = self
                .batches
                .borrow()
                .iter()
                .find(|b| b.sales_order_no.as_deref() == Some(sales_order_no))
                .cloned();
            Ok(found)
        }

        fn insert_batch(&self, batch: &ImportBatch) -> RepositoryResult<()> {
            if let Some(hidden) = &self.hidden_batch {
                if hidden.sales_order_no == batch.sales_order_no {
                    self.batches.borrow_mut().push(hidden.clone());
                    return Err(RepositoryError::UniqueConstraintViolation(
                        "purchase_import_batch.sales_order_no".to_string(),
                    ));
                }
            }
            self.batches.borrow_mut().push(batch.clone());
            Ok(())
        }

        fn find_parts_by_numbers(&self, part_numbers: &[String]) -> RepositoryResult<Vec<Part>> {
            let parts = self.parts.borrow();
            Ok(part_numbers
                .iter()
                .filter_map(|pn| parts.get(pn).cloned())
                .collect())
        }

        fn create_part_with_on_order(&self, part: &Part, on_order: i64) -> RepositoryResult<()> {
            if self.reject_part_numbers.contains(&part.part_number) {
                return Err(RepositoryError::DatabaseQueryError("part rejected".to_string()));
            }
            self.parts
                .borrow_mut()
                .insert(part.part_number.clone(), part.clone());
            self.inventory.borrow_mut().insert(
                part.id.clone(),
                InventorySnapshot {
                    on_order,
                    ..Default::default()
                },
            );
            Ok(())
        }

        fn add_on_order(
            &self,
            part_id: &str,
            qty: i64,
            description: Option<&str>,
        ) -> RepositoryResult<bool> {
            self.inventory
                .borrow_mut()
                .entry(part_id.to_string())
                .or_default()
                .on_order += qty;

            let mut parts = self.parts.borrow_mut();
            let part = parts
                .values_mut()
                .find(|p| p.id == part_id)
                .ok_or_else(|| RepositoryError::NotFound {
                    entity: "Part".to_string(),
                    id: part_id.to_string(),
                })?;
            match (description, part.description.as_deref()) {
                (Some(desc), None) => {
                    part.description = Some(desc.to_string());
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        fn insert_line(&self, line: &ImportLine) -> RepositoryResult<()> {
            self.lines.borrow_mut().push(line.clone());
            Ok(())
        }
    }

    fn demand(pn: &str, qty: i64, desc: Option<&str>) -> DemandLine {
        DemandLine {
            part_number: pn.to_string(),
            required_qty: qty,
            description: desc.map(str::to_string),
        }
    }

    fn seed_part(store: &MemoryStore, pn: &str, description: Option<&str>) -> String {
        let part = NewPart {
            part_number: pn.to_string(),
            description: description.map(str::to_string),
            ..Default::default()
        }
        .into_part();
        let id = part.id.clone();
        store.parts.borrow_mut().insert(pn.to_string(), part);
        id
    }

    #[test]
    fn test_import_creates_and_updates_parts() {
        let store = MemoryStore::default();
        let existing_id = seed_part(&store, "RES_10K", None);
        store.inventory.borrow_mut().insert(
            existing_id.clone(),
            InventorySnapshot {
                on_hand: 50,
                reserved: 0,
                on_order: 200,
            },
        );

        let engine = PurchaseImportEngine::new(&store, "Mouser");
        let summary = engine
            .import(
                "order.xlsx",
                Some(" SO-1 "),
                &[
                    demand("RES_10K", 100, Some("Resistor 10k")),
                    demand("CAP_1UF", 30, Some("Capacitor")),
                ],
            )
            .unwrap();

        assert_eq!(summary.sales_order_no.as_deref(), Some("SO-1"));
        assert_eq!(summary.created_parts, 1);
        assert_eq!(summary.updated_parts, 1);
        assert_eq!(summary.description_filled, 1);
        assert_eq!(summary.error_lines, 0);

        assert_eq!(store.inventory.borrow()[&existing_id].on_order, 300);
        let parts = store.parts.borrow();
        let created = &parts["CAP_1UF"];
        assert_eq!(created.supplier.as_deref(), Some("Mouser"));
        assert_eq!(store.inventory.borrow()[&created.id].on_order, 30);

        let lines = store.lines.borrow();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].status, ImportLineStatus::UpdatedOnOrder);
        assert_eq!(lines[1].status, ImportLineStatus::CreatedPart);
        assert!(lines.iter().all(|l| l.batch_id == summary.batch_id));
    }

    #[test]
    fn test_import_rejects_empty_lines() {
        let store = MemoryStore::default();
        let engine = PurchaseImportEngine::new(&store, "Mouser");

        let result = engine.import("order.xlsx", Some("SO-1"), &[]);

        assert!(matches!(result, Err(PurchaseImportError::NoValidRows)));
        assert!(store.batches.borrow().is_empty());
    }

    #[test]
    fn test_duplicate_sales_order_is_rejected_before_writes() {
        let store = MemoryStore::default();
        let engine = PurchaseImportEngine::new(&store, "Mouser");
        let first = engine
            .import("a.xlsx", Some("SO-7"), &[demand("A", 1, None)])
            .unwrap();

        let second = engine.import("b.xlsx", Some("SO-7"), &[demand("B", 1, None)]);

        match second {
            Err(PurchaseImportError::DuplicateOrder { existing }) => {
                assert_eq!(existing.id, first.batch_id);
                assert_eq!(existing.file_name, "a.xlsx");
            }
            other => panic!("expected duplicate order, got {:?}", other),
        }
        assert!(!store.parts.borrow().contains_key("B"));
        assert_eq!(store.batches.borrow().len(), 1);
        assert_eq!(store.lines.borrow().len(), 1);
    }

    #[test]
    fn test_unique_violation_on_insert_reports_winner() {
        let winner = ImportBatch::new(
            "winner.xlsx".to_string(),
            Some("SO-9".to_string()),
            &ImportBatchMeta {
                supplier: "Mouser".to_string(),
                distinct_items: 1,
                sales_order_no: Some("SO-9".to_string()),
            },
        );
        let store = MemoryStore {
            hidden_batch: Some(winner.clone()),
            ..Default::default()
        };
        let engine = PurchaseImportEngine::new(&store, "Mouser");

        let result = engine.import("loser.xlsx", Some("SO-9"), &[demand("A", 1, None)]);

        match result {
            Err(PurchaseImportError::DuplicateOrder { existing }) => {
                assert_eq!(existing.id, winner.id)
            }
            other => panic!("expected duplicate order, got {:?}", other),
        }
        assert!(store.lines.borrow().is_empty());
    }

    #[test]
    fn test_line_failure_does_not_abort_batch() {
        let store = MemoryStore {
            reject_part_numbers: vec!["BROKEN".to_string()],
            ..Default::default()
        };
        seed_part(&store, "EXISTING", Some("kept"));
        let engine = PurchaseImportEngine::new(&store, "Mouser");

        let summary = engine
            .import(
                "order.xlsx",
                None,
                &[
                    demand("NEW", 5, None),
                    demand("BROKEN", 5, None),
                    demand("EXISTING", 5, Some("ignored")),
                ],
            )
            .unwrap();

        assert_eq!(summary.created_parts + summary.updated_parts, 2);
        assert_eq!(summary.error_lines, 1);
        assert_eq!(summary.description_filled, 0);
        assert_eq!(summary.sales_order_no, None);

        let lines = store.lines.borrow();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].status, ImportLineStatus::Error);
        assert_eq!(lines[1].error.as_deref(), Some("数据库查询失败: part rejected"));
        assert_eq!(lines[1].part_id, None);
        assert_eq!(lines[2].status, ImportLineStatus::UpdatedOnOrder);
        assert_eq!(store.parts.borrow()["EXISTING"].description.as_deref(), Some("kept"));
    }
}
