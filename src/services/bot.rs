//! 聊天机器人回复
//!
//! 把已解析的 `BotRequest` 分派到各抓取器，组装成文字/图片回复。
//! 抓取或绘图失败一律降级为提示文字，不向上抛错。

use crate::config::AppConfig;
use crate::errors::{Result, ScrapeError};
use crate::models::{BotReply, BotRequest, CommoditySeries, MarketQuote, NewsItem, StockDailyRecord};
use crate::services::artifact::{ArtifactHandle, ArtifactStore};
use crate::services::http::UpstreamClient;
use crate::services::industry::IndustryCatalog;
use crate::services::market::{
    CommodityQuoteFetcher, CommoditySeriesFetcher, MarketFetcher, StockQuoteFetcher,
};
use crate::services::news::CompanyNewsFetcher;
use crate::services::render::{
    render_latest_table, render_line_chart, RenderOptions, CHART_FILE, TABLE_FILE,
};
use std::path::PathBuf;

pub const QUOTE_NOT_FOUND: &str = "找不到此原物料價格。";
pub const STOCK_NOT_FOUND: &str = "找不到此公司股票。";
pub const NEWS_NOT_FOUND: &str = "查無此公司新聞。";
pub const INDUSTRY_NOT_FOUND: &str = "查無此產業資訊。";
pub const DATA_UNAVAILABLE: &str = "資料暫時無法取得，請稍後再試。";

pub struct BotService {
    series: CommoditySeriesFetcher,
    quotes: CommodityQuoteFetcher,
    stocks: StockQuoteFetcher,
    news: CompanyNewsFetcher,
    artifacts: ArtifactStore,
    industry: IndustryCatalog,
    render: RenderOptions,
    public_base_url: String,
}

impl BotService {
    pub fn new(config: &AppConfig, client: UpstreamClient, industry: IndustryCatalog) -> Self {
        let upstream = &config.upstream;
        Self {
            series: CommoditySeriesFetcher::new(client.clone(), &upstream.commodity_series_url),
            quotes: CommodityQuoteFetcher::new(
                client.clone(),
                &upstream.commodity_quote_url,
                upstream.commodity_quote_table_index,
            ),
            stocks: StockQuoteFetcher::new(client.clone(), &upstream.stock_day_all_url),
            news: CompanyNewsFetcher::new(client, &upstream.news_url, &upstream.news_referer),
            artifacts: ArtifactStore::new(
                &config.artifact.root,
                &config.artifact.url_prefix,
                config.artifact.cleanup_delay(),
            ),
            industry,
            render: RenderOptions {
                jpeg_quality: config.render.jpeg_quality,
            },
            public_base_url: config.artifact.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn series_fetcher(&self) -> &CommoditySeriesFetcher {
        &self.series
    }

    pub fn quote_fetcher(&self) -> &CommodityQuoteFetcher {
        &self.quotes
    }

    pub fn stock_fetcher(&self) -> &StockQuoteFetcher {
        &self.stocks
    }

    pub fn news_fetcher(&self) -> &CompanyNewsFetcher {
        &self.news
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    /// 处理一次请求，总是返回可直接送出的回复
    pub async fn handle(&self, request: BotRequest) -> BotReply {
        log::info!("🤖 处理请求: {:?}", request);

        let result = match &request {
            BotRequest::SeriesChart { code } => self.series_chart(code).await,
            BotRequest::LatestQuote { name } => {
                self.lookup(&self.quotes, name, QUOTE_NOT_FOUND, format_commodity_quote)
                    .await
            }
            BotRequest::StockQuote { code } => {
                self.lookup(&self.stocks, code, STOCK_NOT_FOUND, format_stock_quote)
                    .await
            }
            BotRequest::CompanyNews { stock_id } => self
                .lookup(&self.news, stock_id, NEWS_NOT_FOUND, |items: &Vec<NewsItem>| {
                    format_news(items)
                })
                .await,
            BotRequest::IndustryAnalysis { industry } => Ok(BotReply::text(
                self.industry.analysis(industry).unwrap_or(INDUSTRY_NOT_FOUND),
            )),
            BotRequest::IndustryNews { industry } => Ok(BotReply::text(
                self.industry.news(industry).unwrap_or(INDUSTRY_NOT_FOUND),
            )),
        };

        result.unwrap_or_else(|e| {
            if e.is_upstream() {
                log::warn!("上游不可用 {:?}: {}", request, e);
            } else {
                log::error!("处理请求失败 {:?}: {}", request, e);
            }
            BotReply::text(DATA_UNAVAILABLE)
        })
    }

    /// 通用文字查询：找到则格式化，找不到回复固定提示
    async fn lookup<F, T>(
        &self,
        fetcher: &F,
        id: &str,
        not_found: &str,
        format: impl Fn(&T) -> String,
    ) -> Result<BotReply>
    where
        F: MarketFetcher<Output = Option<T>>,
    {
        match fetcher.fetch(id).await? {
            Some(found) => Ok(BotReply::text(format(&found))),
            None => {
                log::warn!("{} 查无 {}", fetcher.source(), id);
                Ok(BotReply::text(not_found))
            }
        }
    }

    async fn series_chart(&self, code: &str) -> Result<BotReply> {
        let series = self.series.fetch(code).await?;
        if series.is_empty() {
            log::warn!("{} 没有走势资料，无法绘图", code);
            return Ok(BotReply::text(DATA_UNAVAILABLE));
        }
        self.chart_reply(series).await
    }

    /// 分配目录、绘图、组装图片地址；无论绘图成败都释放目录一次
    async fn chart_reply(&self, series: CommoditySeries) -> Result<BotReply> {
        let handle = self.artifacts.allocate().await?;
        log::info!("📈 绘制 {} 走势图，目录编号 {}", series.code, handle.id());
        let rendered = render_artifacts(series, handle.base_path().to_path_buf(), self.render).await;
        let reply = rendered.map(|()| {
            BotReply::images(vec![
                self.public_url(&handle, CHART_FILE),
                self.public_url(&handle, TABLE_FILE),
            ])
        });
        self.artifacts.release(handle);
        reply
    }

    fn public_url(&self, handle: &ArtifactHandle, file: &str) -> String {
        format!("{}{}", self.public_base_url, handle.url_for(file))
    }
}

async fn render_artifacts(series: CommoditySeries, dir: PathBuf, options: RenderOptions) -> Result<()> {
    tokio::task::spawn_blocking(move || -> Result<()> {
        render_line_chart(&series, &dir, &options)?;
        render_latest_table(&series, &dir, &options)?;
        Ok(())
    })
    .await
    .map_err(|e| ScrapeError::Render(format!("绘图任务中断: {}", e)))?
}

/// 按 Python 风格显示数字：整数值保留一位小数
fn display_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// 涨跌幅与行情页面一致，上涨带 `+`
fn display_percent(value: f64) -> String {
    let sign = if value > 0.0 { "+" } else { "" };
    format!("{}{}%", sign, display_number(value))
}

pub fn format_commodity_quote(quote: &MarketQuote) -> String {
    format!(
        "{}最新價格\n買價：{}\n漲跌：{}\n比例：{}",
        quote.symbol,
        display_number(quote.price),
        display_number(quote.change),
        display_percent(quote.change_percent)
    )
}

pub fn format_stock_quote(record: &StockDailyRecord) -> String {
    let mut msg = format!("證券代號：{}", record.code);
    for (caption, value) in record.labelled_fields() {
        msg.push('\n');
        msg.push_str(caption);
        msg.push('：');
        msg.push_str(value);
    }
    msg
}

/// 标题与链接交替成行；没有可用新闻时回复查无
pub fn format_news(items: &[NewsItem]) -> String {
    if items.is_empty() {
        return NEWS_NOT_FOUND.to_string();
    }
    items
        .iter()
        .flat_map(|item| [item.title.as_str(), item.url.as_str()])
        .collect::<Vec<_>>()
        .join("\n")
}
