//! 原物料最新价格
//!
//! 行情页面有多个表格，取固定位置的那一个：
//! 前两行是标题残留，之后每行依次为 名称、价格、涨跌、涨跌幅、时间

use super::common::parse_number;
use super::MarketFetcher;
use crate::errors::{Result, ScrapeError};
use crate::models::MarketQuote;
use crate::services::http::UpstreamClient;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

/// 表格前几行不是数据
const SKIPPED_LEADING_ROWS: usize = 2;
/// COMMODITY, PRICE, CHANGE, CHANGE_PERCENT, TIME
const QUOTE_COLUMNS: usize = 5;

/// 原物料报价抓取器，按显示名称（如 黃金）查询
pub struct CommodityQuoteFetcher {
    client: UpstreamClient,
    url: String,
    table_index: usize,
}

impl CommodityQuoteFetcher {
    pub fn new(client: UpstreamClient, url: impl Into<String>, table_index: usize) -> Self {
        Self {
            client,
            url: url.into(),
            table_index,
        }
    }
}

#[async_trait]
impl MarketFetcher for CommodityQuoteFetcher {
    type Output = Option<MarketQuote>;

    fn source(&self) -> &'static str {
        "stockq-commodity-quote"
    }

    async fn fetch(&self, name: &str) -> Result<Option<MarketQuote>> {
        let html = self.client.get_text(&self.url, &[]).await?;
        let quote = parse_quote_table(&html, self.table_index, name)?;
        if quote.is_none() {
            log::warn!("行情表格中找不到原物料: {}", name);
        }
        Ok(quote)
    }
}

/// 在第 `table_index` 个表格（文档顺序，含嵌套表格）中查找 `name` 对应的报价
pub fn parse_quote_table(html: &str, table_index: usize, name: &str) -> Result<Option<MarketQuote>> {
    let document = Html::parse_document(html);
    let table_selector = selector("table")?;

    let table = document
        .select(&table_selector)
        .nth(table_index)
        .ok_or_else(|| ScrapeError::parse(format!("页面中找不到第 {} 个表格", table_index)))?;

    let rows = own_rows(table)?;
    log::debug!("行情表格共 {} 行", rows.len());

    for row in rows.into_iter().skip(SKIPPED_LEADING_ROWS) {
        let cells = row_cells(row);
        if cells.len() < QUOTE_COLUMNS {
            continue;
        }
        if cells[0] != name.trim() {
            continue;
        }

        let number = |col: usize, label: &str| {
            parse_number(&cells[col]).ok_or_else(|| {
                ScrapeError::parse(format!("{} 的{}无法解析: {:?}", name, label, cells[col]))
            })
        };

        return Ok(Some(MarketQuote {
            symbol: cells[0].clone(),
            price: number(1, "价格")?,
            change: number(2, "涨跌")?,
            change_percent: number(3, "涨跌幅")?,
            timestamp: cells[4].clone(),
        }));
    }

    Ok(None)
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScrapeError::parse(format!("选择器 {} 无效: {:?}", css, e)))
}

/// 只取属于该表格本身的行，嵌套表格的行不算
fn own_rows(table: ElementRef<'_>) -> Result<Vec<ElementRef<'_>>> {
    let tr_selector = selector("tr")?;
    Ok(table
        .select(&tr_selector)
        .filter(|row| {
            row.ancestors()
                .filter_map(ElementRef::wrap)
                .find(|el| el.value().name() == "table")
                .map(|el| el.id())
                == Some(table.id())
        })
        .collect())
}

fn row_cells(row: ElementRef<'_>) -> Vec<String> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| matches!(cell.value().name(), "td" | "th"))
        .map(|cell| {
            cell.text()
                .collect::<Vec<_>>()
                .join("")
                .replace('\u{a0}', " ")
                .trim()
                .to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with_quote_table_at(index: usize) -> String {
        let mut html = String::from("<html><body>");
        for i in 0..index {
            html.push_str(&format!("<table><tr><td>filler {}</td></tr></table>", i));
        }
        html.push_str(
            r#"<table>
<tr><td colspan="5">原物料行情</td></tr>
<tr><th>商品</th><th>價格</th><th>漲跌</th><th>比例</th><th>台北</th></tr>
<tr><td>黃金</td><td>1,923.40</td><td>+12.30</td><td>+0.64%</td><td>10/15</td></tr>
<tr><td>銀</td><td>23.05</td><td>-0.21</td><td>-0.90%</td><td>10/15</td></tr>
<tr><td>銅<table><tr><td>nested</td></tr></table></td><td>3.71</td><td>0.00</td><td>0.00%</td><td>10/14</td></tr>
</table></body></html>"#,
        );
        html
    }

    #[test]
    fn test_lookup_by_display_name() {
        println!("\n========== 测试原物料报价表格解析 ==========");
        let html = page_with_quote_table_at(2);
        let quote = parse_quote_table(&html, 2, "黃金").unwrap().unwrap();
        println!("  {:?}", quote);

        assert_eq!(quote.symbol, "黃金");
        assert_eq!(quote.price, 1923.4);
        assert_eq!(quote.change, 12.3);
        assert_eq!(quote.change_percent, 0.64);
        assert_eq!(quote.timestamp, "10/15");

        let silver = parse_quote_table(&html, 2, "銀").unwrap().unwrap();
        assert_eq!(silver.change, -0.21);
        assert_eq!(silver.change_percent, -0.9);
        println!("✅ 原物料报价表格解析测试通过！");
    }

    #[test]
    fn test_unknown_name_is_none() {
        let html = page_with_quote_table_at(1);
        assert_eq!(parse_quote_table(&html, 1, "鈀").unwrap(), None);
        // 标题行不能被当成数据
        assert_eq!(parse_quote_table(&html, 1, "商品").unwrap(), None);
    }

    #[test]
    fn test_missing_table_is_parse_error() {
        let html = page_with_quote_table_at(0);
        let err = parse_quote_table(&html, 7, "黃金").unwrap_err();
        assert!(matches!(err, ScrapeError::Parse(_)));
    }

    #[test]
    fn test_wrong_table_position_finds_nothing() {
        // 指到填充表格时只会找不到，不会误读
        let html = page_with_quote_table_at(3);
        assert_eq!(parse_quote_table(&html, 0, "黃金").unwrap(), None);
    }
}
