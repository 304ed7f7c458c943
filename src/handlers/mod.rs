pub mod artifacts;
pub mod bot;
pub mod health;
pub mod market;

use crate::errors::ScrapeError;
use crate::models::ApiResponse;
use actix_web::{web, HttpResponse};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::config)
            .configure(market::config)
            .configure(bot::config)
    );
}

/// 抓取错误转为响应：上游失败或格式异常为 502，其余为 500
pub(crate) fn error_response<T: serde::Serialize>(e: &ScrapeError) -> HttpResponse {
    let response = ApiResponse::<T>::error(e.to_string());
    if e.is_upstream() || matches!(e, ScrapeError::Parse(_) | ScrapeError::Json(_)) {
        HttpResponse::BadGateway().json(response)
    } else {
        HttpResponse::InternalServerError().json(response)
    }
}

/// 查无资料
pub(crate) fn not_found<T: serde::Serialize>(message: String) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::<T>::error(message))
}
