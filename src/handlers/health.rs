use actix_web::{HttpResponse, Result};

use crate::handlers::shared::ApiResponse;

pub async fn health() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))))
}
