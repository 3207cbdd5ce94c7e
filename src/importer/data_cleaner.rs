// ==========================================
// 元器件库存系统 - 数据清洗器
// ==========================================
// 职责: TRIM / UPPER / NULL 标准化 / 数量容错转换
// 约束: 所有方法均为全函数，不抛错；非法输入降级为“空”或 0
// ==========================================

use serde_json::Value;

pub struct DataCleaner;

impl DataCleaner {
    /// 清洗文本字段（TRIM，可选 UPPER）
    pub fn clean_text(&self, value: &str, uppercase: bool) -> String {
        let trimmed = value.trim();
        if uppercase {
            trimmed.to_uppercase()
        } else {
            trimmed.to_string()
        }
    }

    /// 标准化 NULL 值（空字符串/空白 → None）
    pub fn normalize_null(&self, value: Option<String>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    /// 任意 JSON 值 → 文本（缺失/null → 空串）
    pub fn value_to_text(&self, value: &Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            other => other.to_string(),
        }
    }

    /// 规范化料号（TRIM + UPPER），空料号返回 None
    pub fn normalize_part_number(&self, value: &Value) -> Option<String> {
        let pn = self.clean_text(&self.value_to_text(value), true);
        if pn.is_empty() {
            None
        } else {
            Some(pn)
        }
    }

    /// 规范化描述（TRIM），空描述返回 None
    pub fn normalize_description(&self, value: &Value) -> Option<String> {
        self.normalize_null(Some(self.value_to_text(value)))
    }

    /// 数量容错转换（数字或数字字符串）
    ///
    /// 规则: 非有限值 → 0；向下取整；小于 0 钳制为 0
    pub fn coerce_quantity(&self, value: &Value) -> i64 {
        let raw = match value {
            Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            Value::String(s) => parse_numeric(s),
            Value::Bool(true) => 1.0,
            Value::Bool(false) | Value::Null => 0.0,
            Value::Array(_) | Value::Object(_) => f64::NAN,
        };
        clamp_quantity(raw)
    }

    /// 表格单元格中的数量（允许小数逗号，如 "12,5"）
    pub fn parse_quantity_text(&self, value: &str) -> i64 {
        clamp_quantity(parse_numeric(&value.replacen(',', ".", 1)))
    }
}

/// 数字字符串解析：空串为 0，支持 0x/0o/0b 前缀，其余无法解析为 NaN
fn parse_numeric(value: &str) -> f64 {
    let s = value.trim();
    if s.is_empty() {
        return 0.0;
    }

    let radix_prefixed = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)];
    for (prefix, radix) in radix_prefixed {
        if let Some(digits) = s.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix)
                .map(|v| v as f64)
                .unwrap_or(f64::NAN);
        }
    }

    s.parse::<f64>().unwrap_or(f64::NAN)
}

fn clamp_quantity(raw: f64) -> i64 {
    if !raw.is_finite() {
        return 0;
    }
    // f64 → i64 的 as 转换为饱和转换
    (raw.floor() as i64).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clean_text_basic() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.clean_text("  hello  ", false), "hello");
        assert_eq!(cleaner.clean_text("  hello  ", true), "HELLO");
    }

    #[test]
    fn test_normalize_null() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.normalize_null(Some("  ".to_string())), None);
        assert_eq!(cleaner.normalize_null(Some("".to_string())), None);
        assert_eq!(
            cleaner.normalize_null(Some("  value  ".to_string())),
            Some("value".to_string())
        );
        assert_eq!(cleaner.normalize_null(None), None);
    }

    #[test]
    fn test_normalize_part_number() {
        let cleaner = DataCleaner;
        assert_eq!(
            cleaner.normalize_part_number(&json!("  res_10k ")),
            Some("RES_10K".to_string())
        );
        assert_eq!(
            cleaner.normalize_part_number(&json!(1234)),
            Some("1234".to_string())
        );
        assert_eq!(cleaner.normalize_part_number(&json!("   ")), None);
        assert_eq!(cleaner.normalize_part_number(&Value::Null), None);
    }

    #[test]
    fn test_coerce_quantity() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.coerce_quantity(&json!(5)), 5);
        assert_eq!(cleaner.coerce_quantity(&json!(5.9)), 5);
        assert_eq!(cleaner.coerce_quantity(&json!(" 12 ")), 12);
        assert_eq!(cleaner.coerce_quantity(&json!("1e3")), 1000);
        assert_eq!(cleaner.coerce_quantity(&json!("0x10")), 16);
        assert_eq!(cleaner.coerce_quantity(&json!(-3)), 0);
        assert_eq!(cleaner.coerce_quantity(&json!("abc")), 0);
        assert_eq!(cleaner.coerce_quantity(&json!("12abc")), 0);
        assert_eq!(cleaner.coerce_quantity(&json!("Infinity")), 0);
        assert_eq!(cleaner.coerce_quantity(&json!("")), 0);
        assert_eq!(cleaner.coerce_quantity(&json!(true)), 1);
        assert_eq!(cleaner.coerce_quantity(&Value::Null), 0);
        assert_eq!(cleaner.coerce_quantity(&json!([1])), 0);
    }

    #[test]
    fn test_parse_quantity_text_decimal_comma() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_quantity_text("12,5"), 12);
        assert_eq!(cleaner.parse_quantity_text(" 100 "), 100);
        assert_eq!(cleaner.parse_quantity_text("1,000,5"), 0);
        assert_eq!(cleaner.parse_quantity_text("n/a"), 0);
    }
}
