//! 字段比较器
//!
//! 纯函数：期望映射 vs 抽取结果 → 匹配百分比 [0, 100]

use serde_json::Value as JsonValue;

use crate::models::{value_text, FieldMapping};

/// 计算期望字段中被正确抽取的百分比
///
/// - 抽取结果不是映射时返回 0（不视为错误）
/// - 期望映射为空时返回 0
/// - 值按字符串形式、忽略大小写比较，不做日期/数字语义解析
/// - 只出现在抽取结果中的键不影响分母
pub fn compare(expected: &FieldMapping, actual: &JsonValue) -> f64 {
    let Some(actual) = actual.as_object() else {
        return 0.0;
    };

    let total_keys = expected.len();
    if total_keys == 0 {
        return 0.0;
    }

    let matches = expected
        .iter()
        .filter(|(key, expected_val)| {
            actual
                .get(key.as_str())
                .is_some_and(|actual_val| {
                    value_text(actual_val).to_uppercase() == expected_val.to_uppercase()
                })
        })
        .count();

    (matches as f64 / total_keys as f64) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping(pairs: &[(&str, &str)]) -> FieldMapping {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(compare(&mapping(&[("LN", "Doe")]), &json!({"LN": "DOE"})), 100.0);
    }

    #[test]
    fn test_missing_key_counts_as_mismatch() {
        let expected = mapping(&[("LN", "Doe"), ("FN", "John")]);
        assert_eq!(compare(&expected, &json!({"LN": "Doe"})), 50.0);
    }

    #[test]
    fn test_extra_keys_ignored() {
        let expected = mapping(&[("LN", "Doe")]);
        assert_eq!(compare(&expected, &json!({"LN": "Doe", "EXTRA": "x"})), 100.0);
    }

    #[test]
    fn test_empty_expected_is_zero() {
        assert_eq!(compare(&FieldMapping::new(), &json!({"LN": "Doe"})), 0.0);
        assert_eq!(compare(&FieldMapping::new(), &json!("anything")), 0.0);
    }

    #[test]
    fn test_non_mapping_actual_is_zero() {
        let expected = mapping(&[("LN", "Doe")]);
        assert_eq!(compare(&expected, &json!(["Doe"])), 0.0);
        assert_eq!(compare(&expected, &json!(null)), 0.0);
        assert_eq!(compare(&expected, &json!("Doe")), 0.0);
    }

    #[test]
    fn test_syntactic_comparison_only() {
        let expected = mapping(&[("DOB", "17 Jan 1706"), ("YEAR", "1706")]);
        // 日期写法不同即不匹配；数字按文本比较
        let actual = json!({"DOB": "01/17/1706", "YEAR": 1706});
        assert_eq!(compare(&expected, &actual), 50.0);
    }

    #[test]
    fn test_python_literals_match_their_written_form() {
        use crate::services::field_parser::{parse_expected_mapping, parse_field_text};

        let expected = parse_expected_mapping("{'state': 'None', 'VETERAN': 'true'}").unwrap();
        let actual = parse_field_text("{'state': None, 'VETERAN': True}").unwrap();
        assert_eq!(compare(&expected, &actual), 100.0);

        let expected = parse_expected_mapping("{'state': None}").unwrap();
        assert_eq!(compare(&expected, &actual), 100.0);
    }

    #[test]
    fn test_deterministic_and_bounded() {
        let expected = mapping(&[("A", "1"), ("B", "2"), ("C", "3")]);
        let samples = [
            json!({}),
            json!({"A": "1"}),
            json!({"A": "1", "B": "x", "C": "3"}),
            json!({"A": "1", "B": "2", "C": "3", "D": "4"}),
            json!(42),
        ];
        for actual in &samples {
            let first = compare(&expected, actual);
            assert_eq!(first, compare(&expected, actual));
            assert!((0.0..=100.0).contains(&first));
        }
    }
}
