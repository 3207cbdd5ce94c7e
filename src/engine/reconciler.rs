// ==========================================
// 元器件库存系统 - 缺料核对引擎
// ==========================================
// 职责: 需求行 + 库存快照 + 下单规则 → 缺料量 / 建议下单量 / 状态
// 红线: 纯计算，不访问存储；任何输入都有结果，不返回错误
// ==========================================
// 公式:
//   available_now    = max(0, on_hand - reserved)
//   available_future = max(0, on_hand - reserved + on_order)
//   shortage_now     = max(0, required - available_now)
//   shortage_future  = max(0, required - available_future)
//   order_qty        = shortage_future <= 0 ? 0
//                      : ceil_to_multiple(max(shortage_future, moq), order_multiple)
// ==========================================

use crate::domain::demand::DemandLine;
use crate::domain::part::{InventorySnapshot, PartPolicy, PartStockView};
use crate::domain::reconciliation::ReconciliationResult;
use crate::domain::types::ReconcileStatus;
use crate::engine::collation::sort_czech;
use std::collections::HashMap;
use tracing::instrument;

/// 向上取整到倍数（倍数 ≤ 1 时原样返回）
pub fn ceil_to_multiple(value: i64, multiple: i64) -> i64 {
    if multiple <= 1 {
        return value;
    }
    // 整数除法向零截断，负数时即为向上取整
    let quotient = value / multiple;
    let quotient = if value % multiple > 0 {
        quotient + 1
    } else {
        quotient
    };
    quotient.saturating_mul(multiple)
}

// ==========================================
// Reconciler - 缺料核对
// ==========================================
pub struct Reconciler;

impl Reconciler {
    pub fn new() -> Self {
        Self
    }

    /// 核对单行
    ///
    /// `stock` 为 None 表示料号未建档: 库存按 0 计、规则按默认值，状态强制 ORDER
    pub fn reconcile_line(
        &self,
        line: &DemandLine,
        stock: Option<&PartStockView>,
    ) -> ReconciliationResult {
        let known_part = stock.is_some();
        let inventory = stock
            .and_then(|s| s.inventory)
            .unwrap_or_default();
        let policy = stock.map(|s| s.part.policy()).unwrap_or_default();

        let mut feeder_nos = stock.map(|s| s.feeder_nos.clone()).unwrap_or_default();
        sort_czech(&mut feeder_nos);

        let required = line.required_qty;
        let (available_now, available_future) = Self::availability(&inventory);
        let shortage_now = required.saturating_sub(available_now).max(0);
        let shortage_future = required.saturating_sub(available_future).max(0);
        let order_qty = Self::order_quantity(shortage_future, policy);

        let status = if !known_part {
            ReconcileStatus::Order
        } else if shortage_now <= 0 {
            ReconcileStatus::Ok
        } else if shortage_future <= 0 {
            ReconcileStatus::Waiting
        } else {
            ReconcileStatus::Order
        };

        ReconciliationResult {
            part_number: line.part_number.clone(),
            qty_required: required,
            known_part,
            assigned: !feeder_nos.is_empty(),
            feeder_nos,
            on_hand: inventory.on_hand,
            reserved: inventory.reserved,
            on_order: inventory.on_order,
            available_now,
            available_future,
            shortage_now,
            shortage_future,
            moq: policy.moq,
            order_multiple: policy.order_multiple,
            order_qty,
            status,
        }
    }

    /// 批量核对（输出顺序与需求行一致）
    #[instrument(skip(self, lines, stock), fields(lines = lines.len(), known = stock.len()))]
    pub fn reconcile(
        &self,
        lines: &[DemandLine],
        stock: &[PartStockView],
    ) -> Vec<ReconciliationResult> {
        let by_part_number: HashMap<&str, &PartStockView> = stock
            .iter()
            .map(|view| (view.part.part_number.as_str(), view))
            .collect();

        let results: Vec<ReconciliationResult> = lines
            .iter()
            .map(|line| self.reconcile_line(line, by_part_number.get(line.part_number.as_str()).copied()))
            .collect();

        let to_order = results
            .iter()
            .filter(|r| r.status == ReconcileStatus::Order)
            .count();
        tracing::debug!("核对完成: {} 行, 需下单 {} 行", results.len(), to_order);

        results
    }

    fn availability(inventory: &InventorySnapshot) -> (i64, i64) {
        let net = inventory.on_hand.saturating_sub(inventory.reserved);
        (net.max(0), net.saturating_add(inventory.on_order).max(0))
    }

    fn order_quantity(need_to_order: i64, policy: PartPolicy) -> i64 {
        if need_to_order <= 0 {
            return 0;
        }
        ceil_to_multiple(need_to_order.max(policy.moq), policy.order_multiple)
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}
