//! 行情抓取服务
//!
//! ## 数据来源
//! - stockq.org：原物料走势 JS（内嵌类 JSON 数组）、原物料行情表格页面
//! - 台湾证交所：每日收盘行情 JSON
//!
//! 每个抓取器都实现 `MarketFetcher`，并把解析逻辑拆成纯函数以便用固定样本测试。
//! 返回 `Ok(None)` 表示查询的代码/名称在上游资料中不存在。

mod commodity_quote;
mod commodity_series;
mod common;
mod stock_quote;

use crate::errors::Result;
use async_trait::async_trait;

pub use commodity_quote::CommodityQuoteFetcher;
pub use commodity_series::CommoditySeriesFetcher;
pub use common::fill_template;
pub use stock_quote::StockQuoteFetcher;

/// 按标识符抓取并标准化上游数据
#[async_trait]
pub trait MarketFetcher: Send + Sync {
    type Output: Send;

    /// 数据源名称，用于日志
    fn source(&self) -> &'static str;

    async fn fetch(&self, id: &str) -> Result<Self::Output>;
}
