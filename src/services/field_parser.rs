//! 宽松解析模型返回的"类字典"文本
//!
//! 模型常返回单引号的伪 JSON，或在字典前后附带说明文字/代码块标记。
//! 解析步骤：
//! 1. 截取第一个 `{` 到最后一个 `}` 之间的内容（若存在）
//! 2. 单引号统一替换为双引号
//! 3. 值位置上的 `None` / `True` / `False` 转为 JSON 字面量
//! 4. 按 JSON 解析

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value as JsonValue;

use crate::error::{ConfigError, FieldParseError};
use crate::models::{value_text, FieldMapping};

static DICT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("字典块正则无效"));

static PY_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\s*(None|True|False)\b").expect("字面量正则无效"));

/// 将模型文本解析为 JSON 值
///
/// 不要求结果是映射，类型检查留给调用方
pub fn parse_field_text(text: &str) -> Result<JsonValue, FieldParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(FieldParseError::Empty);
    }

    let candidate = DICT_BLOCK
        .find(trimmed)
        .map(|m| m.as_str())
        .unwrap_or(trimmed);

    let quoted = candidate.replace('\'', "\"");
    let normalized = PY_LITERAL.replace_all(&quoted, |caps: &Captures| {
        let literal = match &caps[1] {
            "None" => "null",
            "True" => "true",
            _ => "false",
        };
        format!(": {}", literal)
    });

    serde_json::from_str(&normalized).map_err(|source| FieldParseError::Json {
        text: trimmed.to_string(),
        source,
    })
}

/// 解析操作员提供的期望输出
///
/// 与模型输出使用同样的宽松规则，但结果必须是映射；非字符串值转为字符串
pub fn parse_expected_mapping(text: &str) -> Result<FieldMapping, ConfigError> {
    let value = parse_field_text(text).map_err(ConfigError::InvalidExpectedOutput)?;

    match value {
        JsonValue::Object(map) => Ok(map
            .iter()
            .map(|(key, value)| (key.clone(), value_text(value)))
            .collect()),
        other => Err(ConfigError::ExpectedOutputNotMapping {
            found: json_kind(&other).to_string(),
        }),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "布尔值",
        JsonValue::Number(_) => "数字",
        JsonValue::String(_) => "字符串",
        JsonValue::Array(_) => "数组",
        JsonValue::Object(_) => "映射",
    }
}
