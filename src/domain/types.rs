// ==========================================
// 元器件库存系统 - 领域类型定义
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库/前端一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 缺料状态 (Reconcile Status)
// ==========================================
// 判定顺序: 未知料号 → ORDER；现货足够 → OK；在途可覆盖 → WAITING；否则 ORDER
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconcileStatus {
    Ok,      // 现货满足
    Waiting, // 等待在途到货
    Order,   // 需要下单
}

impl ReconcileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileStatus::Ok => "OK",
            ReconcileStatus::Waiting => "WAITING",
            ReconcileStatus::Order => "ORDER",
        }
    }
}

impl fmt::Display for ReconcileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 导入行结果 (Import Line Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportLineStatus {
    CreatedPart,    // 新建料号 + 在途
    UpdatedOnOrder, // 已有料号，在途累加
    Error,          // 单行失败（不影响批次）
}

impl ImportLineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportLineStatus::CreatedPart => "CREATED_PART",
            ImportLineStatus::UpdatedOnOrder => "UPDATED_ON_ORDER",
            ImportLineStatus::Error => "ERROR",
        }
    }

    /// 从数据库文本还原；未知值返回 None
    pub fn from_db_str(raw: &str) -> Option<Self> {
        match raw.trim() {
            "CREATED_PART" => Some(ImportLineStatus::CreatedPart),
            "UPDATED_ON_ORDER" => Some(ImportLineStatus::UpdatedOnOrder),
            "ERROR" => Some(ImportLineStatus::Error),
            _ => None,
        }
    }
}

impl fmt::Display for ImportLineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
