//! 公司新闻
//!
//! 新闻页面会拒绝脚本客户端，请求时带浏览器 User-Agent 和站内 Referer。
//! 新闻列表位于 `div#stock_info_news` 内，取其中前 5 个链接。

use crate::errors::{Result, ScrapeError};
use crate::models::NewsItem;
use crate::services::http::UpstreamClient;
use crate::services::market::{fill_template, MarketFetcher};
use async_trait::async_trait;
use scraper::{Html, Selector};
use url::Url;

pub const MAX_NEWS_ITEMS: usize = 5;
const NEWS_CONTAINER: &str = "div#stock_info_news";

/// 公司新闻抓取器
pub struct CompanyNewsFetcher {
    client: UpstreamClient,
    url_template: String,
    referer: String,
}

impl CompanyNewsFetcher {
    pub fn new(
        client: UpstreamClient,
        url_template: impl Into<String>,
        referer: impl Into<String>,
    ) -> Self {
        Self {
            client,
            url_template: url_template.into(),
            referer: referer.into(),
        }
    }
}

#[async_trait]
impl MarketFetcher for CompanyNewsFetcher {
    type Output = Option<Vec<NewsItem>>;

    fn source(&self) -> &'static str {
        "pchome-company-news"
    }

    async fn fetch(&self, stock_id: &str) -> Result<Option<Vec<NewsItem>>> {
        let url = fill_template(&self.url_template, "id", stock_id);
        let html = self
            .client
            .get_text(&url, &[("Referer", self.referer.as_str())])
            .await?;

        let base = Url::parse(&self.referer)
            .map_err(|e| ScrapeError::parse(format!("新闻站点地址无效 {}: {}", self.referer, e)))?;
        let news = parse_company_news(&html, &base)?;
        match &news {
            Some(items) => log::info!("📰 {} 取得 {} 则新闻", stock_id, items.len()),
            None => log::warn!("{} 的页面没有新闻区块", stock_id),
        }
        Ok(news)
    }
}

/// 解析新闻区块
///
/// 区块不存在返回 `None`；链接按 `base` 解析成绝对地址，
/// 没有标题或地址的链接略过。
pub fn parse_company_news(html: &str, base: &Url) -> Result<Option<Vec<NewsItem>>> {
    let document = Html::parse_document(html);
    let container_selector = Selector::parse(NEWS_CONTAINER)
        .map_err(|e| ScrapeError::parse(format!("选择器无效: {:?}", e)))?;
    let anchor_selector =
        Selector::parse("a").map_err(|e| ScrapeError::parse(format!("选择器无效: {:?}", e)))?;

    let Some(container) = document.select(&container_selector).next() else {
        return Ok(None);
    };

    let items = container
        .select(&anchor_selector)
        .filter_map(|anchor| {
            let title = anchor.text().collect::<Vec<_>>().join("");
            let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
            let href = anchor.value().attr("href")?.trim();
            if title.is_empty() || href.is_empty() {
                return None;
            }
            let url = base.join(href).ok()?;
            if !matches!(url.scheme(), "http" | "https") {
                return None;
            }
            Some(NewsItem {
                title,
                url: url.to_string(),
            })
        })
        .take(MAX_NEWS_ITEMS)
        .collect();

    Ok(Some(items))
}
