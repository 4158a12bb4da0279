//! 헬스체크 핸들러

use actix_web::{get, HttpResponse};
use serde_json::json;

/// 로드밸런서용 상태 확인. 데이터베이스에 접근하지 않습니다.
///
/// # Endpoint
/// `GET /api/health`
#[get("/api/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "ok": true,
        "now": chrono::Utc::now().to_rfc3339(),
    }))
}
