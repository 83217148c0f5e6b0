use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ReviewError;

// 模型输出可能带 markdown 代码块包裹，解析前先剥掉
static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:[a-zA-Z]+)?\s*(.*?)\s*```").unwrap());

/// 报告模式声明：维度列表与评分范围
///
/// 校验以这里声明的模式为准，而不是在解析代码里散落假设。
#[derive(Debug, Clone, Copy)]
pub struct ReportSchema {
    pub dimensions: &'static [&'static str],
    pub min_score: u8,
    pub max_score: u8,
}

/// 默认的五维审查模式
pub const DEFAULT_SCHEMA: ReportSchema = ReportSchema {
    dimensions: &[
        "readability",
        "modularity",
        "bugs",
        "best_practices",
        "security",
    ],
    min_score: 1,
    max_score: 10,
};

/// 单个审查维度：评分 + 文字说明
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub score: u8,
    pub comments: String,
}

/// 审查报告：模式声明的每个维度各一项
///
/// 创建后不再修改，所有权直接交给 HTTP 响应。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewReport {
    #[serde(flatten)]
    pub dimensions: BTreeMap<String, Dimension>,
}

// 提取消息清理逻辑
fn clean_response(text: &str) -> String {
    let trimmed = text.trim();
    if let Some(caps) = FENCE_RE.captures(trimmed) {
        caps.get(1).map_or("", |m| m.as_str()).trim().to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// 把模型输出解析成审查报告
///
/// 严格按声明的模式校验：JSON 对象、每个维度存在、评分在范围内。
/// 任何一项不满足都整体失败，绝不返回部分填充的报告。
pub fn parse_report(raw: &str, schema: &ReportSchema) -> Result<ReviewReport, ReviewError> {
    let cleaned = clean_response(raw);

    let value: serde_json::Value = serde_json::from_str(&cleaned)
        .map_err(|e| ReviewError::malformed(format!("invalid JSON: {e}")))?;
    let obj = value
        .as_object()
        .ok_or_else(|| ReviewError::malformed("response is not a JSON object"))?;

    let mut dimensions = BTreeMap::new();
    for name in schema.dimensions {
        let entry = obj
            .get(*name)
            .ok_or_else(|| ReviewError::malformed(format!("missing dimension `{name}`")))?;
        let dim: Dimension = serde_json::from_value(entry.clone())
            .map_err(|e| ReviewError::malformed(format!("dimension `{name}` has wrong shape: {e}")))?;
        if dim.score < schema.min_score || dim.score > schema.max_score {
            return Err(ReviewError::malformed(format!(
                "dimension `{name}` score {} outside {}..={}",
                dim.score, schema.min_score, schema.max_score
            )));
        }
        dimensions.insert((*name).to_string(), dim);
    }

    Ok(ReviewReport { dimensions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_report_json() -> String {
        json!({
            "readability": {"score": 8, "comments": "clear"},
            "modularity": {"score": 6, "comments": "one large function"},
            "bugs": {"score": 9, "comments": "none found"},
            "best_practices": {"score": 7, "comments": "missing type hints"},
            "security": {"score": 10, "comments": "no issues"}
        })
        .to_string()
    }

    #[test]
    fn test_parse_valid_report() {
        let report = parse_report(&valid_report_json(), &DEFAULT_SCHEMA).unwrap();

        assert_eq!(report.dimensions.len(), 5);
        assert_eq!(report.dimensions["readability"].score, 8);
        assert_eq!(report.dimensions["readability"].comments, "clear");
        assert_eq!(report.dimensions["security"].score, 10);
    }

    #[test]
    fn test_parse_report_serializes_back_unchanged() {
        let raw = valid_report_json();
        let report = parse_report(&raw, &DEFAULT_SCHEMA).unwrap();

        let echoed: serde_json::Value = serde_json::to_value(&report).unwrap();
        let original: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(echoed, original);
    }

    #[test]
    fn test_parse_fenced_report() {
        let raw = format!("```json\n{}\n```", valid_report_json());
        let report = parse_report(&raw, &DEFAULT_SCHEMA).unwrap();
        assert_eq!(report.dimensions.len(), 5);
    }

    #[test]
    fn test_parse_fenced_report_without_language_tag() {
        let raw = format!("```\n{}\n```", valid_report_json());
        let report = parse_report(&raw, &DEFAULT_SCHEMA).unwrap();
        assert_eq!(report.dimensions.len(), 5);
    }

    #[test]
    fn test_parse_report_with_surrounding_whitespace() {
        let raw = format!("\n\n  {}  \n", valid_report_json());
        assert!(parse_report(&raw, &DEFAULT_SCHEMA).is_ok());
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_report("this is not json", &DEFAULT_SCHEMA).unwrap_err();
        assert!(matches!(err, ReviewError::MalformedResponse { .. }));
    }

    #[test]
    fn test_parse_non_object_json() {
        let err = parse_report("[1, 2, 3]", &DEFAULT_SCHEMA).unwrap_err();
        assert!(matches!(err, ReviewError::MalformedResponse { .. }));
    }

    #[test]
    fn test_parse_missing_dimension() {
        let raw = json!({
            "readability": {"score": 8, "comments": "clear"},
            "modularity": {"score": 6, "comments": "ok"},
            "bugs": {"score": 9, "comments": "none"},
            "best_practices": {"score": 7, "comments": "fine"}
            // security 缺失
        })
        .to_string();

        let err = parse_report(&raw, &DEFAULT_SCHEMA).unwrap_err();
        assert!(err.to_string().contains("security"));
    }

    #[test]
    fn test_parse_score_out_of_range() {
        let raw = valid_report_json().replace("\"score\":10", "\"score\":11");
        let err = parse_report(&raw, &DEFAULT_SCHEMA).unwrap_err();
        assert!(matches!(err, ReviewError::MalformedResponse { .. }));
        assert!(err.to_string().contains("security"));
    }

    #[test]
    fn test_parse_zero_score_rejected() {
        let raw = valid_report_json().replace("\"score\":8", "\"score\":0");
        assert!(parse_report(&raw, &DEFAULT_SCHEMA).is_err());
    }

    #[test]
    fn test_parse_wrong_dimension_shape() {
        let raw = valid_report_json().replace(
            "{\"comments\":\"clear\",\"score\":8}",
            "\"looks good\"",
        );
        let err = parse_report(&raw, &DEFAULT_SCHEMA).unwrap_err();
        assert!(err.to_string().contains("readability"));
    }

    #[test]
    fn test_parse_non_integer_score() {
        let raw = valid_report_json().replace("\"score\":8", "\"score\":\"eight\"");
        assert!(parse_report(&raw, &DEFAULT_SCHEMA).is_err());
    }

    #[test]
    fn test_parse_extra_top_level_keys_tolerated() {
        let mut value: serde_json::Value = serde_json::from_str(&valid_report_json()).unwrap();
        value["overall"] = json!("fine");

        let report = parse_report(&value.to_string(), &DEFAULT_SCHEMA).unwrap();
        // 额外字段不进入报告，输出仍然只有声明的五个维度
        assert_eq!(report.dimensions.len(), 5);
        assert!(!report.dimensions.contains_key("overall"));
    }

    #[test]
    fn test_clean_response_plain_text() {
        assert_eq!(clean_response("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn test_clean_response_strips_json_fence() {
        assert_eq!(clean_response("```json\n{\"a\":1}\n```"), "{\"a\":1}");
    }
}
