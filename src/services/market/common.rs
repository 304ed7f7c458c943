//! 公共辅助函数

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static NUMBER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]?\d[\d,]*(?:\.\d+)?|[-+]?\.\d+").unwrap());

/// 替换 URL 模板中的 `{key}` 占位符
pub fn fill_template(template: &str, key: &str, value: &str) -> String {
    template.replace(&format!("{{{}}}", key), value)
}

/// 从 "1,234.5"、"+0.52%"、"▼ -3.1" 这类文字中取出第一个数值
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned = raw.replace('\u{a0}', "");
    NUMBER_TOKEN
        .find(&cleaned)
        .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok())
}

/// 单元格可能是 JSON 数字，也可能是数字字符串
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    }
}

/// 把单元格转换成展示用文字，字符串不带引号
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_number() {
        println!("\n========== 测试数值解析 ==========");
        let test_cases = vec![
            ("1,234.5", Some(1234.5)),
            ("+0.52%", Some(0.52)),
            ("-12.30", Some(-12.3)),
            ("▼ -3.1", Some(-3.1)),
            ("\u{a0}1,800\u{a0}", Some(1800.0)),
            ("--", None),
            ("", None),
        ];

        for (input, expected) in &test_cases {
            let result = parse_number(input);
            println!("  {:?} -> {:?} (期望: {:?})", input, result, expected);
            assert_eq!(result, *expected);
        }
        println!("✅ 数值解析测试通过！");
    }

    #[test]
    fn test_value_helpers() {
        assert_eq!(value_as_f64(&json!(12.5)), Some(12.5));
        assert_eq!(value_as_f64(&json!(" 1,200.25 ")), Some(1200.25));
        assert_eq!(value_as_f64(&json!(null)), None);
        assert_eq!(value_to_text(&json!("2330")), "2330");
        assert_eq!(value_to_text(&json!(2330)), "2330");
    }

    #[test]
    fn test_fill_template() {
        assert_eq!(
            fill_template("http://host/js/{code}_sma.js", "code", "COMMGOLD"),
            "http://host/js/COMMGOLD_sma.js"
        );
    }
}
