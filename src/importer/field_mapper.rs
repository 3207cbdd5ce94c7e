// ==========================================
// 元器件库存系统 - 列映射器
// ==========================================
// 职责: 源表头 → 标准字段（料号/数量/描述/销售订单号）猜测
//       + 按选定列把预览行转换为原始需求行
// 约定: 候选表头以数据表维护（按优先级），新增语言变体只改表不改代码
// ==========================================

use crate::domain::demand::RawDemandRow;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::PreviewRow;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ==========================================
// 标准字段 / 映射方案
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnKind {
    PartNumber,
    Quantity,
    Description,
    SalesOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MappingProfile {
    Bom,           // 通用 BOM 表（含捷克语表头）
    PurchaseOrder, // 供应商订单导出（Mouser）
}

type CandidateTable = &'static [(ColumnKind, &'static [&'static str])];

const BOM_CANDIDATES: CandidateTable = &[
    (
        ColumnKind::PartNumber,
        &[
            "part number",
            "part",
            "pn",
            "p/n",
            "mpn",
            "mfr part number",
            "manufacturer part number",
            "item",
            "code",
            "material",
            "soucastka",
            "součástka",
        ],
    ),
    (
        ColumnKind::Quantity,
        &[
            "qty",
            "quantity",
            "počet",
            "pocet",
            "ks",
            "pcs",
            "amount",
            "required qty",
            "req qty",
        ],
    ),
];

const PURCHASE_ORDER_CANDIDATES: CandidateTable = &[
    (
        ColumnKind::PartNumber,
        &[
            "mfr. no:",
            "mfr no:",
            "mfr no",
            "mfr part number",
            "manufacturer part number",
            "mpn",
        ],
    ),
    (
        ColumnKind::Quantity,
        &["order qty.", "order qty", "quantity", "qty"],
    ),
    (
        ColumnKind::Description,
        &[
            "desc.:",
            "desc:",
            "desc.",
            "desc",
            "description",
            "item description",
        ],
    ),
    (
        ColumnKind::SalesOrder,
        &[
            "sales order no.",
            "sales order no",
            "sales order",
            "sales order number",
        ],
    ),
];

impl MappingProfile {
    fn candidates(&self, kind: ColumnKind) -> &'static [&'static str] {
        let table = match self {
            MappingProfile::Bom => BOM_CANDIDATES,
            MappingProfile::PurchaseOrder => PURCHASE_ORDER_CANDIDATES,
        };
        table
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, c)| *c)
            .unwrap_or(&[])
    }
}

/// 表头归一化: 小写 → 合并空白 → `_`/`-` 变空格 → TRIM
pub fn normalize_header_key(header: &str) -> String {
    let lowered = header.to_lowercase();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut key = String::with_capacity(collapsed.len());
    let mut in_separator_run = false;
    for ch in collapsed.chars() {
        if ch == '_' || ch == '-' {
            if !in_separator_run {
                key.push(' ');
            }
            in_separator_run = true;
        } else {
            key.push(ch);
            in_separator_run = false;
        }
    }
    key.trim().to_string()
}

// ==========================================
// ColumnMapping - 选定列
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    pub part_number: Option<String>,
    pub quantity: Option<String>,
    pub description: Option<String>,
    pub sales_order: Option<String>,
}

// ==========================================
// ColumnGuesser - 表头猜测
// ==========================================
pub struct ColumnGuesser {
    profile: MappingProfile,
}

impl ColumnGuesser {
    pub fn new(profile: MappingProfile) -> Self {
        Self { profile }
    }

    /// 猜测某标准字段对应的原始表头
    ///
    /// 第一轮: 候选按优先级做完全匹配；第二轮: 候选按优先级做包含匹配
    pub fn guess(&self, headers: &[String], kind: ColumnKind) -> Option<String> {
        let normalized: Vec<(&String, String)> = headers
            .iter()
            .map(|h| (h, normalize_header_key(h)))
            .collect();
        let candidates = self.profile.candidates(kind);

        for candidate in candidates {
            if let Some((raw, _)) = normalized.iter().find(|(_, key)| key == candidate) {
                return Some((*raw).clone());
            }
        }

        for candidate in candidates {
            if let Some((raw, _)) = normalized.iter().find(|(_, key)| key.contains(candidate)) {
                return Some((*raw).clone());
            }
        }

        None
    }

    pub fn guess_all(&self, headers: &[String]) -> ColumnMapping {
        ColumnMapping {
            part_number: self.guess(headers, ColumnKind::PartNumber),
            quantity: self.guess(headers, ColumnKind::Quantity),
            description: self.guess(headers, ColumnKind::Description),
            sales_order: self.guess(headers, ColumnKind::SalesOrder),
        }
    }
}

// ==========================================
// 预览行 → 原始需求行
// ==========================================

/// 映射结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedRows {
    pub items: Vec<RawDemandRow>,
    pub sales_order_no: Option<String>,
}

/// 按选定列转换预览行
///
/// - 数量单元格允许小数逗号
/// - 销售订单号取第一条有效行（料号非空且数量 > 0）中的非空值
pub fn map_preview_rows(rows: &[PreviewRow], mapping: &ColumnMapping) -> ImportResult<MappedRows> {
    let pn_col = mapping
        .part_number
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ImportError::FieldMappingError("未选择料号列".to_string()))?;
    let qty_col = mapping
        .quantity
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ImportError::FieldMappingError("未选择数量列".to_string()))?;

    let cleaner = DataCleaner;
    let cell = |row: &PreviewRow, col: &str| row.get(col).cloned().unwrap_or_default();

    let mut items = Vec::with_capacity(rows.len());
    let mut sales_order_no: Option<String> = None;

    for row in rows {
        let pn_raw = cell(row, pn_col);
        let qty = cleaner.parse_quantity_text(&cell(row, qty_col));

        let mut item = RawDemandRow::new(Value::String(pn_raw.clone()), Value::from(qty));
        if let Some(desc_col) = mapping.description.as_deref() {
            item = item.with_description(Value::String(cell(row, desc_col)));
        }
        items.push(item);

        let valid = !cleaner.clean_text(&pn_raw, true).is_empty() && qty > 0;
        if valid && sales_order_no.is_none() {
            if let Some(so_col) = mapping.sales_order.as_deref() {
                sales_order_no = cleaner.normalize_null(Some(cell(row, so_col)));
            }
        }
    }

    Ok(MappedRows {
        items,
        sales_order_no,
    })
}
