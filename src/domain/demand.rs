// ==========================================
// 元器件库存系统 - 需求行领域模型
// ==========================================
// 原始行（未清洗）→ DemandMerger → DemandLine（每料号一行）
// ==========================================

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ==========================================
// RawDemandRow - 原始行
// ==========================================
// 字段类型未知（数字 / 数字字符串 / 缺失），统一保留为 JSON 值，
// 由 DataCleaner 负责容错转换，反序列化本身永不失败：
// 非对象元素（数字 / null / 数组）视为空行，交给合并器丢弃。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDemandRow {
    pub part_number: Value,
    pub qty: Value,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub description: Value,
}

impl<'de> Deserialize<'de> for RawDemandRow {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Self::from_value(Value::deserialize(deserializer)?))
    }
}

impl RawDemandRow {
    pub fn new(part_number: impl Into<Value>, qty: impl Into<Value>) -> Self {
        Self {
            part_number: part_number.into(),
            qty: qty.into(),
            description: Value::Null,
        }
    }

    pub fn with_description(mut self, description: impl Into<Value>) -> Self {
        self.description = description.into();
        self
    }

    /// 从任意 JSON 值构造；非对象返回空行
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(mut map) => Self {
                part_number: take_field(&mut map, "partNumber"),
                qty: take_field(&mut map, "qty"),
                description: take_field(&mut map, "description"),
            },
            _ => Self::default(),
        }
    }
}

fn take_field(map: &mut Map<String, Value>, key: &str) -> Value {
    map.remove(key).unwrap_or(Value::Null)
}

// ==========================================
// DemandLine - 合并后的需求行
// ==========================================
// 不变量: part_number 非空且已规范化；required_qty > 0
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandLine {
    pub part_number: String,
    pub required_qty: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
