//! 原物料价格走势
//!
//! 上游是一段 JS 脚本，逐行写出数组字面量（单引号字符串）：
//!
//! ```text
//! data.addRows([
//! ['Date', 'Price', 'MA20', 'MA60'],
//! ['2020/01/02', 1527.1, 1480.25, 1470.5],
//! ...
//! ]);
//! ```
//!
//! 第一行数组是表头，其余为 `[日期, 价格, MA20, MA60, ...]`。

use super::common::{fill_template, value_as_f64, value_to_text};
use super::MarketFetcher;
use crate::errors::{Result, ScrapeError};
use crate::models::{CommoditySeries, TimeSeriesPoint};
use crate::services::http::UpstreamClient;
use async_trait::async_trait;
use serde_json::Value;

/// 原物料走势抓取器
pub struct CommoditySeriesFetcher {
    client: UpstreamClient,
    url_template: String,
}

impl CommoditySeriesFetcher {
    pub fn new(client: UpstreamClient, url_template: impl Into<String>) -> Self {
        Self {
            client,
            url_template: url_template.into(),
        }
    }
}

#[async_trait]
impl MarketFetcher for CommoditySeriesFetcher {
    type Output = CommoditySeries;

    fn source(&self) -> &'static str {
        "stockq-commodity-series"
    }

    async fn fetch(&self, code: &str) -> Result<CommoditySeries> {
        let url = fill_template(&self.url_template, "code", code);
        let body = self.client.get_text(&url, &[]).await?;
        parse_commodity_series(code, &body)
    }
}

/// 判断一行是否为数据行（含表头行）的数组字面量
///
/// 规则：行首必须是 `[`，且至少有三个字符，第三个字符不是单引号。
/// 第三个字符是单引号表示首元素是晚一列才开始的字符串（如 `[['...`、`[ '...`），
/// 这类是外层包装数组而不是数据行。
pub fn is_row_literal(line: &str) -> bool {
    let mut chars = line.chars();
    if chars.next() != Some('[') {
        return false;
    }
    matches!((chars.next(), chars.next()), (Some(_), Some(third)) if third != '\'')
}

/// 解析走势脚本
///
/// 没有任何数据行时返回空序列（上游确实没有资料）；
/// 数据行本身无法解析则视为上游格式变化，返回 `ScrapeError::Parse`。
pub fn parse_commodity_series(code: &str, body: &str) -> Result<CommoditySeries> {
    let mut literals = Vec::new();
    for line in body.lines().filter(|line| is_row_literal(line)) {
        literals.extend(split_row_literals(line)?);
    }

    let mut rows = literals
        .iter()
        .enumerate()
        .map(|(idx, literal)| parse_row_literal(idx, literal));

    let header = match rows.next() {
        Some(header) => header?,
        None => {
            log::warn!("{} 走势脚本中没有找到任何数据行", code);
            return Ok(CommoditySeries {
                code: code.to_string(),
                ..Default::default()
            });
        }
    };

    let points = rows
        .enumerate()
        .map(|(idx, row)| row.and_then(|row| row_to_point(idx + 1, &row)))
        .collect::<Result<Vec<_>>>()?;

    log::info!("📊 {} 解析到 {} 个走势数据点", code, points.len());

    Ok(CommoditySeries {
        code: code.to_string(),
        header: header.iter().map(value_to_text).collect(),
        points,
    })
}

fn parse_row_literal(idx: usize, literal: &str) -> Result<Vec<Value>> {
    serde_json::from_str(&literal.replace('\'', "\""))
        .map_err(|e| ScrapeError::parse(format!("第 {} 行不是合法数组 ({}): {}", idx, e, literal)))
}

/// 拆出一行中的所有数组字面量
///
/// 字面量之间只允许逗号、空白，行尾只允许 `]`、`)`、`;`；其他内容视为格式变化
fn split_row_literals(line: &str) -> Result<Vec<&str>> {
    let mut literals = Vec::new();
    let mut rest = line;

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ']' | ')' | ';'));
        if rest.is_empty() {
            return Ok(literals);
        }
        if !rest.starts_with('[') {
            return Err(ScrapeError::parse(format!("数组之后有多余内容 {:?}: {}", rest, line)));
        }
        let literal = balanced_literal(rest)
            .ok_or_else(|| ScrapeError::parse(format!("数组没有闭合: {}", line)))?;
        literals.push(literal);
        rest = &rest[literal.len()..];
    }
}

/// 截取到与开头 `[` 配对的 `]`
fn balanced_literal(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '[' => depth += 1,
            ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

fn row_to_point(idx: usize, row: &[Value]) -> Result<TimeSeriesPoint> {
    if row.len() < 4 {
        return Err(ScrapeError::parse(format!(
            "第 {} 行只有 {} 个字段，至少需要 4 个",
            idx,
            row.len()
        )));
    }

    // 均线在序列开头可能尚未定义，上游以 null 表示
    let number = |col: usize, label: &str| -> Result<f64> {
        match &row[col] {
            Value::Null => Ok(f64::NAN),
            value => value_as_f64(value).ok_or_else(|| {
                ScrapeError::parse(format!("第 {} 行的{}不是数值: {}", idx, label, value))
            }),
        }
    };

    Ok(TimeSeriesPoint {
        date: value_to_text(&row[0]),
        price: number(1, "价格")?,
        ma20: number(2, "MA20")?,
        ma60: number(3, "MA60")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "var data = new google.visualization.DataTable();\n\
data.addRows([\n\
['Date', 'Price', 'MA20', 'MA60'],\n\
['2020/01/02', 1527.1, 1480.25, 1470.5],\n\
['2020/01/03', 1552.4, 1483.1, 1472],\n\
['2020/01/06', 1566.2, 1486.75, 1473.9]\n\
]);\n\
[['chart', 'options']]\n";

    #[test]
    fn test_is_row_literal() {
        println!("\n========== 测试数据行判定 ==========");
        let test_cases = vec![
            ("['Date', 'Price', 'MA20', 'MA60'],", true),
            ("['2020/01/02', 1527.1, 1480.25, 1470.5],", true),
            ("[1, 2, 3]", true),
            ("[['chart', 'options']]", false),
            ("[ 'padded', 1]", false),
            ("data.addRows([", false),
            ("]);", false),
            ("[", false),
            ("[]", false),
            ("", false),
        ];

        for (line, expected) in &test_cases {
            let result = is_row_literal(line);
            println!("  {:?} -> {} (期望: {})", line, result, expected);
            assert_eq!(result, *expected);
        }
        println!("✅ 数据行判定测试通过！");
    }

    #[test]
    fn test_parse_fixture_exact_points() {
        println!("\n========== 测试走势脚本解析 ==========");
        let series = parse_commodity_series("COMMGOLD", FIXTURE).unwrap();

        assert_eq!(series.code, "COMMGOLD");
        assert_eq!(series.header, vec!["Date", "Price", "MA20", "MA60"]);
        assert_eq!(
            series.points,
            vec![
                TimeSeriesPoint {
                    date: "2020/01/02".to_string(),
                    price: 1527.1,
                    ma20: 1480.25,
                    ma60: 1470.5,
                },
                TimeSeriesPoint {
                    date: "2020/01/03".to_string(),
                    price: 1552.4,
                    ma20: 1483.1,
                    ma60: 1472.0,
                },
                TimeSeriesPoint {
                    date: "2020/01/06".to_string(),
                    price: 1566.2,
                    ma20: 1486.75,
                    ma60: 1473.9,
                },
            ]
        );

        let dates: Vec<&str> = series.points.iter().map(|p| p.date.as_str()).collect();
        assert!(dates.windows(2).all(|w| w[0] <= w[1]));
        println!("✅ 走势脚本解析测试通过！");
    }

    #[test]
    fn test_length_excludes_header() {
        let mut body = String::from("['Date', 'Price', 'MA20', 'MA60'],\n");
        for day in 1..=25 {
            body.push_str(&format!("['2021/03/{:02}', {}, {}, {}],\n", day, day, day, day));
        }
        let series = parse_commodity_series("FUTRWOIL", &body).unwrap();
        assert_eq!(series.points.len(), 25);
        assert_eq!(series.points[24].date, "2021/03/25");
    }

    #[test]
    fn test_no_rows_is_empty_series() {
        let series = parse_commodity_series("COMMSILV", "<html>404</html>").unwrap();
        assert!(series.is_empty());
        assert!(series.header.is_empty());

        let header_only = parse_commodity_series("COMMSILV", "['Date', 'Price', 'MA20', 'MA60']").unwrap();
        assert!(header_only.is_empty());
        assert_eq!(header_only.header.len(), 4);
    }

    #[test]
    fn test_malformed_row_is_parse_error() {
        println!("\n========== 测试格式异常检测 ==========");
        let truncated = "['Date', 'Price', 'MA20', 'MA60'],\n['2020/01/02', 1527.1, 1480.25\n";
        let err = parse_commodity_series("COMMGOLD", truncated).unwrap_err();
        println!("  未闭合: {}", err);
        assert!(matches!(err, ScrapeError::Parse(_)));

        let short = "['Date', 'Price'],\n['2020/01/02', 1527.1],\n";
        assert!(matches!(
            parse_commodity_series("COMMGOLD", short),
            Err(ScrapeError::Parse(_))
        ));

        let text_price = "['Date', 'Price', 'MA20', 'MA60'],\n['2020/01/02', 'n/a', 1, 1],\n";
        assert!(matches!(
            parse_commodity_series("COMMGOLD", text_price),
            Err(ScrapeError::Parse(_))
        ));
        println!("✅ 格式异常检测测试通过！");
    }

    #[test]
    fn test_several_rows_on_one_line() {
        println!("\n========== 测试同一行多个数组 ==========");
        let body = "['Date', 'Price', 'MA20', 'MA60'],\n\
['2020/01/02', 1, 2, 3], ['2020/01/03', 4, 5, 6],\n\
['2020/01/06', 7, 8, 9]]);\n";
        let series = parse_commodity_series("COMMGOLD", body).unwrap();
        let dates: Vec<&str> = series.points.iter().map(|p| p.date.as_str()).collect();
        println!("  {:?}", dates);
        assert_eq!(dates, vec!["2020/01/02", "2020/01/03", "2020/01/06"]);
        assert_eq!(series.points[1].price, 4.0);
        assert_eq!(series.points[2].ma60, 9.0);
        println!("✅ 同一行多个数组测试通过！");
    }

    #[test]
    fn test_trailing_text_is_parse_error() {
        let body = "['Date', 'Price', 'MA20', 'MA60'],\n['2020/01/02', 1, 2, 3] garbage ['x']\n";
        let err = parse_commodity_series("COMMGOLD", body).unwrap_err();
        assert!(matches!(err, ScrapeError::Parse(_)), "{}", err);

        let body = "['Date', 'Price', 'MA20', 'MA60'],\n['2020/01/02', 1, 2, 3]; var x = 1;\n";
        assert!(matches!(
            parse_commodity_series("COMMGOLD", body),
            Err(ScrapeError::Parse(_))
        ));
    }

    #[test]
    fn test_null_average_and_string_numbers() {
        let body = "['Date', 'Price', 'MA20', 'MA60'],\n['2020/01/02', '1,527.1', null, null],\n";
        let series = parse_commodity_series("COMMGOLD", body).unwrap();
        let point = &series.points[0];
        assert_eq!(point.price, 1527.1);
        assert!(point.ma20.is_nan());
        assert!(point.ma60.is_nan());
    }
}
