//! 财经聊天机器人后端服务
//!
//! 为 LINE 机器人提供原物料走势图、原物料报价、个股行情、公司新闻与产业资讯
//! 数据来源：stockq.org、台湾证交所、PChome 股市

mod config;   // 配置
mod errors;   // 错误类型
mod handlers; // HTTP 请求处理器
mod models;   // 数据模型定义
mod services; // 业务逻辑服务

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use crate::config::AppConfig;
use crate::services::bot::BotService;
use crate::services::http::UpstreamClient;
use crate::services::industry::IndustryCatalog;
use crate::services::render::init_fonts;

/// 应用程序入口
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let loaded = AppConfig::load();

    // 初始化日志系统，RUST_LOG 优先于配置文件
    env_logger::init_from_env(Env::default().default_filter_or(loaded.config.log.level.as_str()));
    loaded.log_summary();
    let config = loaded.config;

    log::info!("启动财经聊天机器人服务");

    init_fonts(config.render.font_path.as_deref());

    let client = UpstreamClient::new(&config.http)?;
    let industry = IndustryCatalog::load(&config.industry.analysis_path, &config.industry.news_path)?;
    let bot = web::Data::new(BotService::new(&config, client, industry));
    if let Err(e) = bot.artifacts().sweep_stale().await {
        log::warn!("清除遗留临时目录失败: {}", e);
    }

    let url_prefix = config.artifact.url_prefix.clone();
    let bind_addr = config.bind_addr();
    log::info!("监听 {}，图片路径 {}", bind_addr, url_prefix);

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default()) // 添加请求日志中间件
            .app_data(bot.clone())
            .configure(handlers::config) // 配置路由
            .configure(handlers::artifacts::config(&url_prefix))
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(bind_addr)?.run().await?;
    Ok(())
}
