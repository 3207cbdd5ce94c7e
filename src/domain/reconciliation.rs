// ==========================================
// 元器件库存系统 - 缺料核对结果
// ==========================================

use crate::domain::types::ReconcileStatus;
use serde::{Deserialize, Serialize};

/// 单料号核对结果（BOM 核对接口的响应行）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationResult {
    pub part_number: String,
    pub qty_required: i64,

    // ===== 料号信息 =====
    pub known_part: bool,
    pub feeder_nos: Vec<String>, // 在用料站（捷克语排序，仅供展示）

    // ===== 库存快照 =====
    pub on_hand: i64,
    pub reserved: i64,
    pub on_order: i64,

    // ===== 派生 =====
    pub available_now: i64,
    pub available_future: i64,
    pub shortage_now: i64,
    pub shortage_future: i64,

    // ===== 下单建议 =====
    pub moq: i64,
    pub order_multiple: i64,
    pub order_qty: i64,

    pub status: ReconcileStatus,
    pub assigned: bool,
}
