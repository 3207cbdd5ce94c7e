// ==========================================
// 元器件库存系统 - 需求合并引擎
// ==========================================
// 职责: 原始行 → 每料号一行（料号规范化 + 数量求和 + 描述择优）
// 红线: 纯函数，不访问存储，不抛错；非法行直接丢弃
// ==========================================

use crate::domain::demand::{DemandLine, RawDemandRow};
use crate::importer::data_cleaner::DataCleaner;
use std::collections::HashMap;
use tracing::instrument;

// ==========================================
// DemandMerger - 需求合并
// ==========================================
pub struct DemandMerger {
    cleaner: DataCleaner,
}

impl DemandMerger {
    pub fn new() -> Self {
        Self {
            cleaner: DataCleaner,
        }
    }

    /// 合并原始行
    ///
    /// 规则:
    /// 1) 料号 TRIM + UPPER，空料号丢弃
    /// 2) 数量容错转换后 ≤ 0 丢弃
    /// 3) 同料号数量求和
    /// 4) 描述取最长的非空值（等长取先出现者）
    ///
    /// 输出顺序为料号首次出现的顺序
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub fn merge(&self, rows: &[RawDemandRow]) -> Vec<DemandLine> {
        let mut merged: Vec<DemandLine> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for row in rows {
            let Some(part_number) = self.cleaner.normalize_part_number(&row.part_number) else {
                continue;
            };
            let qty = self.cleaner.coerce_quantity(&row.qty);
            if qty <= 0 {
                continue;
            }
            let description = self.cleaner.normalize_description(&row.description);

            match index.get(&part_number) {
                Some(&pos) => {
                    let line = &mut merged[pos];
                    line.required_qty = line.required_qty.saturating_add(qty);
                    line.description = longer_description(line.description.take(), description);
                }
                None => {
                    index.insert(part_number.clone(), merged.len());
                    merged.push(DemandLine {
                        part_number,
                        required_qty: qty,
                        description,
                    });
                }
            }
        }

        tracing::debug!("需求合并完成: {} 行 → {} 个料号", rows.len(), merged.len());
        merged
    }
}

impl Default for DemandMerger {
    fn default() -> Self {
        Self::new()
    }
}

/// 择优描述: 新值严格更长才替换
fn longer_description(current: Option<String>, candidate: Option<String>) -> Option<String> {
    match (current, candidate) {
        (Some(cur), Some(cand)) => {
            if cand.chars().count() > cur.chars().count() {
                Some(cand)
            } else {
                Some(cur)
            }
        }
        (cur, cand) => cur.or(cand),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pn: serde_json::Value, qty: serde_json::Value) -> RawDemandRow {
        RawDemandRow::new(pn, qty)
    }

    #[test]
    fn test_merge_sums_quantities_in_any_order() {
        let merger = DemandMerger::new();

        let forward = merger.merge(&[row(json!("A"), json!(3)), row(json!("A"), json!(2))]);
        let backward = merger.merge(&[row(json!("A"), json!(2)), row(json!("A"), json!(3))]);

        assert_eq!(forward.len(), 1);
        assert_eq!(forward[0].required_qty, 5);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_merge_normalizes_and_drops_invalid_rows() {
        let merger = DemandMerger::new();
        let rows = vec![
            row(json!(" res_10k "), json!("10")),
            row(json!("RES_10K"), json!(5.7)),
            row(json!(""), json!(100)),
            row(json!("   "), json!(100)),
            row(json!("CAP_1UF"), json!(0)),
            row(json!("CAP_1UF"), json!(-4)),
            row(json!("LED"), json!("abc")),
            row(json!("LED"), serde_json::Value::Null),
            row(json!("IC"), json!("NaN")),
        ];

        let merged = merger.merge(&rows);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].part_number, "RES_10K");
        assert_eq!(merged[0].required_qty, 15);
    }

    #[test]
    fn test_merge_keeps_first_seen_order() {
        let merger = DemandMerger::new();
        let merged = merger.merge(&[
            row(json!("B"), json!(1)),
            row(json!("A"), json!(1)),
            row(json!("b"), json!(1)),
        ]);

        let order: Vec<&str> = merged.iter().map(|l| l.part_number.as_str()).collect();
        assert_eq!(order, vec!["B", "A"]);
        assert_eq!(merged[0].required_qty, 2);
    }

    #[test]
    fn test_merge_longest_description_wins() {
        let merger = DemandMerger::new();
        let merged = merger.merge(&[
            row(json!("A"), json!(1)).with_description("10k"),
            row(json!("A"), json!(1)).with_description("  "),
            row(json!("A"), json!(1)).with_description("RES 10k 0603"),
            row(json!("A"), json!(1)).with_description("RES 10k 0805"),
            row(json!("B"), json!(1)),
        ]);

        assert_eq!(merged[0].description.as_deref(), Some("RES 10k 0603"));
        assert_eq!(merged[1].description, None);
    }

    #[test]
    fn test_merge_empty_input() {
        assert!(DemandMerger::new().merge(&[]).is_empty());
    }
}
