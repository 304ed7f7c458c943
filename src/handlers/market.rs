//! 行情接口处理器
//!
//! ## API 列表
//! - GET /commodities/{code}/series - 原物料走势（含均线）
//! - GET /commodities/quote?name=黃金 - 原物料最新报价
//! - GET /stocks/{code} - 个股当日行情
//! - GET /stocks/{code}/news - 公司新闻

use super::{error_response, not_found};
use crate::models::{ApiResponse, CommoditySeries, MarketQuote, NewsItem, StockDailyRecord};
use crate::services::bot::BotService;
use crate::services::market::MarketFetcher;
use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    /// 原物料显示名称（与上游表格第一栏一致）
    pub name: String,
}

/// 获取原物料走势
///
/// GET /api/v1/commodities/{code}/series
pub async fn get_commodity_series(
    path: web::Path<String>,
    bot: web::Data<BotService>,
) -> Result<HttpResponse> {
    let code = path.into_inner();

    match bot.series_fetcher().fetch(&code).await {
        Ok(series) => Ok(HttpResponse::Ok().json(ApiResponse::success(series))),
        Err(e) => {
            log::error!("获取 {} 走势失败: {}", code, e);
            Ok(error_response::<CommoditySeries>(&e))
        }
    }
}

/// 获取原物料最新报价
///
/// GET /api/v1/commodities/quote?name=黃金
pub async fn get_commodity_quote(
    query: web::Query<QuoteQuery>,
    bot: web::Data<BotService>,
) -> Result<HttpResponse> {
    match bot.quote_fetcher().fetch(&query.name).await {
        Ok(Some(quote)) => Ok(HttpResponse::Ok().json(ApiResponse::success(quote))),
        Ok(None) => Ok(not_found::<MarketQuote>(format!("找不到原物料: {}", query.name))),
        Err(e) => {
            log::error!("获取 {} 报价失败: {}", query.name, e);
            Ok(error_response::<MarketQuote>(&e))
        }
    }
}

/// 获取个股当日行情
///
/// GET /api/v1/stocks/{code}
pub async fn get_stock_quote(
    path: web::Path<String>,
    bot: web::Data<BotService>,
) -> Result<HttpResponse> {
    let code = path.into_inner();

    match bot.stock_fetcher().fetch(&code).await {
        Ok(Some(record)) => Ok(HttpResponse::Ok().json(ApiResponse::success(record))),
        Ok(None) => Ok(not_found::<StockDailyRecord>(format!("找不到股票: {}", code))),
        Err(e) => {
            log::error!("获取 {} 行情失败: {}", code, e);
            Ok(error_response::<StockDailyRecord>(&e))
        }
    }
}

/// 获取公司新闻
///
/// GET /api/v1/stocks/{code}/news
pub async fn get_company_news(
    path: web::Path<String>,
    bot: web::Data<BotService>,
) -> Result<HttpResponse> {
    let code = path.into_inner();

    match bot.news_fetcher().fetch(&code).await {
        Ok(Some(items)) => Ok(HttpResponse::Ok().json(ApiResponse::success(items))),
        Ok(None) => Ok(not_found::<Vec<NewsItem>>(format!("查无公司新闻: {}", code))),
        Err(e) => {
            log::error!("获取 {} 新闻失败: {}", code, e);
            Ok(error_response::<Vec<NewsItem>>(&e))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/commodities")
            .route("/quote", web::get().to(get_commodity_quote))
            .route("/{code}/series", web::get().to(get_commodity_series))
    )
    .service(
        web::scope("/stocks")
            .route("/{code}", web::get().to(get_stock_quote))
            .route("/{code}/news", web::get().to(get_company_news))
    );
}
