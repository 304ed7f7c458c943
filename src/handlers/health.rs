use actix_web::{web, HttpResponse, Result};
use serde::Serialize;
use crate::models::ApiResponse;
use crate::services::render::text_enabled;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    /// 是否已载入字体，未载入时图表不含文字
    pub text_rendering: bool,
}

pub async fn health_check() -> Result<HttpResponse> {
    let response = ApiResponse::success(HealthStatus {
        status: "ok",
        text_rendering: text_enabled(),
    });
    Ok(HttpResponse::Ok().json(response))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(App::new().configure(config)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "ok");
    }
}
