// ==========================================
// 元器件库存系统 - 采购导入领域模型
// ==========================================
// 对齐: purchase_import_batch / purchase_import_line 表
// 批次: 一次创建，只追加行，不再修改
// ==========================================

use crate::domain::types::ImportLineStatus;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// ImportBatch - 导入批次
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBatch {
    pub id: String,
    pub file_name: String,
    pub sales_order_no: Option<String>, // 外部订单号（唯一）
    pub created_at: String,
    pub meta: serde_json::Value,
}

impl ImportBatch {
    pub fn new(file_name: String, sales_order_no: Option<String>, meta: &ImportBatchMeta) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            file_name,
            sales_order_no,
            created_at: Utc::now().to_rfc3339(),
            meta: serde_json::to_value(meta).unwrap_or(serde_json::Value::Null),
        }
    }
}

/// 批次元信息（以 JSON 存于 meta 列）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBatchMeta {
    pub supplier: String,
    pub distinct_items: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_order_no: Option<String>,
}

// ==========================================
// ImportLine - 导入审计行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportLine {
    pub batch_id: String,
    pub part_number_raw: String,
    pub part_id: Option<String>,
    pub qty: i64,
    pub status: ImportLineStatus,
    pub error: Option<String>,
    pub created_at: String,
}

impl ImportLine {
    pub fn success(
        batch_id: &str,
        part_number: &str,
        part_id: String,
        qty: i64,
        status: ImportLineStatus,
    ) -> Self {
        Self {
            batch_id: batch_id.to_string(),
            part_number_raw: part_number.to_string(),
            part_id: Some(part_id),
            qty,
            status,
            error: None,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    pub fn failure(
        batch_id: &str,
        part_number: &str,
        part_id: Option<String>,
        qty: i64,
        message: String,
    ) -> Self {
        Self {
            batch_id: batch_id.to_string(),
            part_number_raw: part_number.to_string(),
            part_id,
            qty,
            status: ImportLineStatus::Error,
            error: Some(message),
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

// ==========================================
// ImportSummary - 导入汇总（返回给调用方）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub batch_id: String,
    pub sales_order_no: Option<String>,
    pub created_parts: usize,
    pub updated_parts: usize,
    pub description_filled: usize,
    pub error_lines: usize,
}

/// 批次 + 全部审计行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBatchDetail {
    pub batch: ImportBatch,
    pub lines: Vec<ImportLine>,
}
