//! 临时图片访问
//!
//! GET {url_prefix}/{id}/{file}，只提供绘图产生的两种文件

use crate::services::bot::BotService;
use crate::services::render::{CHART_FILE, TABLE_FILE};
use actix_web::{web, HttpResponse, Result};
use std::io::ErrorKind;

/// 读取临时目录中的图片
pub async fn serve_artifact(
    path: web::Path<(String, String)>,
    bot: web::Data<BotService>,
) -> Result<HttpResponse> {
    let (id, file) = path.into_inner();

    let valid_id = !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit());
    if !valid_id || ![CHART_FILE, TABLE_FILE].contains(&file.as_str()) {
        return Ok(HttpResponse::NotFound().finish());
    }

    let full_path = bot.artifacts().root().join(&id).join(&file);
    match tokio::fs::read(&full_path).await {
        Ok(bytes) => Ok(HttpResponse::Ok().content_type("image/jpeg").body(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::debug!("图片 {} 不存在或已清理", full_path.display());
            Ok(HttpResponse::NotFound().finish())
        }
        Err(e) => {
            log::error!("读取图片 {} 失败: {}", full_path.display(), e);
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// 按配置的前缀注册路由
pub fn config(prefix: &str) -> impl FnOnce(&mut web::ServiceConfig) + '_ {
    move |cfg: &mut web::ServiceConfig| {
        cfg.route(
            &format!("{}/{{id}}/{{file}}", prefix.trim_end_matches('/')),
            web::get().to(serve_artifact),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::services::http::UpstreamClient;
    use crate::services::industry::IndustryCatalog;
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn test_serve_artifact() {
        println!("\n========== 测试临时图片访问 ==========");
        let tmp = tempfile::tempdir().unwrap();
        let mut app_config = AppConfig::default();
        app_config.artifact.root = tmp.path().to_string_lossy().into_owned();

        let client = UpstreamClient::new(&app_config.http).unwrap();
        let bot = BotService::new(&app_config, client, IndustryCatalog::default());
        let handle = bot.artifacts().allocate().await.unwrap();
        std::fs::write(handle.file_path(CHART_FILE), [0xFF, 0xD8, 0xFF, 0xD9]).unwrap();
        let id = handle.id();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(bot))
                .configure(config(&app_config.artifact.url_prefix)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri(&format!("/static/{}/plot.jpg", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get("content-type").unwrap(), "image/jpeg");
        let body = test::read_body(resp).await;
        assert_eq!(&body[..], &[0xFF, 0xD8, 0xFF, 0xD9]);

        for uri in [
            format!("/static/{}/table.jpg", id),
            format!("/static/{}/secret.txt", id),
            "/static/abc/plot.jpg".to_string(),
        ] {
            let req = test::TestRequest::get().uri(&uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
        }
        println!("✅ 临时图片访问测试通过！");
    }
}
