use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

/// 字段名 → 字段值（作者提供的期望输出）
pub type FieldMapping = BTreeMap<String, String>;

/// 模型抽取出的原始结构（不保证是映射）
pub type ExtractedFields = JsonValue;

/// 值的字符串形式，用于比较
///
/// 字符串保持原样；`null` / 布尔值还原为模型写出的 `None` / `True` / `False`；
/// 其余类型使用 JSON 文本
pub fn value_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => "None".to_string(),
        JsonValue::Bool(true) => "True".to_string(),
        JsonValue::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}
