//! 机器人回复接口
//!
//! POST /api/v1/bot/reply，请求体为已解析的 `BotRequest`

use crate::models::{ApiResponse, BotRequest};
use crate::services::bot::BotService;
use actix_web::{web, HttpResponse, Result};

/// 生成回复；抓取失败已在服务内降级为提示文字，这里总是 200
pub async fn reply(
    request: web::Json<BotRequest>,
    bot: web::Data<BotService>,
) -> Result<HttpResponse> {
    let reply = bot.handle(request.into_inner()).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(reply)))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/bot/reply", web::post().to(reply));
}
