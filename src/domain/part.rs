// ==========================================
// 元器件库存系统 - 料号与库存领域模型
// ==========================================
// 对齐: db.rs part / inventory / feeder / feeder_assignment 表
// ==========================================

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// Part - 料号主数据
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub id: String,                  // UUID
    pub part_number: String,         // 规范化料号（TRIM + UPPER，唯一）
    pub description: Option<String>, // 描述
    pub supplier: Option<String>,    // 供应商
    pub moq: i64,                    // 最小起订量
    pub order_multiple: i64,         // 订购倍数
    pub created_at: String,
    pub updated_at: String,
}

impl Part {
    pub fn policy(&self) -> PartPolicy {
        PartPolicy::new(self.moq, self.order_multiple)
    }
}

/// 新建料号参数
#[derive(Debug, Clone, Default)]
pub struct NewPart {
    pub part_number: String,
    pub description: Option<String>,
    pub supplier: Option<String>,
    pub moq: Option<i64>,
    pub order_multiple: Option<i64>,
}

impl NewPart {
    /// 生成落库实体（自动生成 UUID 和时间戳）
    pub fn into_part(self) -> Part {
        let now = Utc::now().to_rfc3339();
        let policy = PartPolicy::new(self.moq.unwrap_or(1), self.order_multiple.unwrap_or(1));
        Part {
            id: Uuid::new_v4().to_string(),
            part_number: self.part_number,
            description: self.description,
            supplier: self.supplier,
            moq: policy.moq,
            order_multiple: policy.order_multiple,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

// ==========================================
// PartPolicy - 下单取整规则
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartPolicy {
    pub moq: i64,
    pub order_multiple: i64,
}

impl PartPolicy {
    /// 非正数一律按 1 处理
    pub fn new(moq: i64, order_multiple: i64) -> Self {
        Self {
            moq: moq.max(1),
            order_multiple: order_multiple.max(1),
        }
    }
}

impl Default for PartPolicy {
    fn default() -> Self {
        Self {
            moq: 1,
            order_multiple: 1,
        }
    }
}

// ==========================================
// InventorySnapshot - 库存快照（与 Part 1:1）
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub on_hand: i64,  // 现货
    pub reserved: i64, // 已占用
    pub on_order: i64, // 在途
}

// ==========================================
// PartStockView - 核对所需的料号视图
// ==========================================
// 料号 + 库存（可能缺失）+ 在用料站号（仓储层不排序，由核对引擎排序）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartStockView {
    pub part: Part,
    pub inventory: Option<InventorySnapshot>,
    pub feeder_nos: Vec<String>,
}

// ==========================================
// Feeder - 贴片机料站
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feeder {
    pub id: String,
    pub feeder_no: String,
}

/// 料站挂料关系（active=false 表示已卸下）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeederAssignment {
    pub id: String,
    pub part_id: String,
    pub feeder_id: String,
    pub active: bool,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_clamps_to_one() {
        assert_eq!(PartPolicy::new(0, -5), PartPolicy::default());
        assert_eq!(
            PartPolicy::new(100, 20),
            PartPolicy {
                moq: 100,
                order_multiple: 20
            }
        );
    }

    #[test]
    fn test_new_part_defaults() {
        let part = NewPart {
            part_number: "RES_10K".to_string(),
            ..Default::default()
        }
        .into_part();

        assert_eq!(part.moq, 1);
        assert_eq!(part.order_multiple, 1);
        assert!(!part.id.is_empty());
        assert_eq!(part.created_at, part.updated_at);
    }
}
