//! 个股当日行情
//!
//! 证交所 STOCK_DAY_ALL 一次返回全部上市股票的当日成交资料：
//! `{"stat": "OK", "data": [["2330", "台積電", "25,371,512", ...], ...]}`
//! 每次查询都重新抓取整张表，查完即丢弃。

use super::common::value_to_text;
use super::MarketFetcher;
use crate::errors::{Result, ScrapeError};
use crate::models::StockDailyRecord;
use crate::services::http::UpstreamClient;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// CODE, NAME, VOLUME, AMOUNT, OPEN, HIGH, LOW, CLOSE, PRICE_CHANGE, TRANSACTION
const STOCK_COLUMNS: usize = 10;

#[derive(Debug, Deserialize)]
struct StockDayAllResponse {
    #[serde(default)]
    stat: Option<String>,
    data: Option<Vec<Vec<Value>>>,
}

/// 个股行情抓取器，按证券代号查询
pub struct StockQuoteFetcher {
    client: UpstreamClient,
    url: String,
}

impl StockQuoteFetcher {
    pub fn new(client: UpstreamClient, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl MarketFetcher for StockQuoteFetcher {
    type Output = Option<StockDailyRecord>;

    fn source(&self) -> &'static str {
        "twse-stock-day-all"
    }

    async fn fetch(&self, code: &str) -> Result<Option<StockDailyRecord>> {
        let body = self.client.get_text(&self.url, &[]).await?;
        let mut table = parse_stock_day_all(&body)?;
        let record = table.remove(code.trim());
        if record.is_none() {
            log::warn!("证交所资料中找不到证券代号: {}", code);
        }
        Ok(record)
    }
}

/// 解析为以证券代号为键的表
pub fn parse_stock_day_all(body: &str) -> Result<HashMap<String, StockDailyRecord>> {
    let response: StockDayAllResponse = serde_json::from_str(body)?;

    let rows = response.data.ok_or_else(|| {
        ScrapeError::parse(format!(
            "响应中缺少 data 字段 (stat: {})",
            response.stat.as_deref().unwrap_or("-")
        ))
    })?;

    let mut table = HashMap::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        if row.len() != STOCK_COLUMNS {
            return Err(ScrapeError::parse(format!(
                "第 {} 行有 {} 个字段，预期 {} 个",
                idx,
                row.len(),
                STOCK_COLUMNS
            )));
        }

        let cells: Vec<String> = row.iter().map(value_to_text).collect();
        let record = StockDailyRecord {
            code: cells[0].clone(),
            name: cells[1].clone(),
            volume: cells[2].clone(),
            amount: cells[3].clone(),
            open: cells[4].clone(),
            high: cells[5].clone(),
            low: cells[6].clone(),
            close: cells[7].clone(),
            price_change: cells[8].clone(),
            transaction_count: cells[9].clone(),
        };
        table.insert(record.code.clone(), record);
    }

    log::info!("📊 证交所当日行情共 {} 档", table.len());
    Ok(table)
}
