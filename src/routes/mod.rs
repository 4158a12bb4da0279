//! API 라우트 설정 모듈
//!
//! 엔드포인트를 기능별로 묶어 등록합니다.
//!
//! # Routes
//!
//! | 스코프 | 인증 | 라우트 |
//! |--------|------|--------|
//! | `/api/health` | 불필요 | 헬스체크 |
//! | `/api/auth` | 일부 | register, login, me(필수), {provider}, {provider}/callback |
//! | `/api/tasks` | 필수 | 목록, 생성, 수정, 삭제 |
//!
//! # Examples
//!
//! ```rust,ignore
//! use actix_web::App;
//!
//! let app = App::new().configure(configure_all_routes);
//! ```

use actix_web::{error, web, HttpRequest};

use crate::core::errors::AppError;
use crate::handlers;
use crate::middlewares::AuthMiddleware;

const JSON_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// 모든 라우트를 설정합니다
pub fn configure_all_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config());

    cfg.service(handlers::health::health_check);

    configure_auth_routes(cfg);
    configure_task_routes(cfg);
}

/// JSON 본문 제한과 파싱 에러 응답
///
/// 잘못된 본문도 다른 에러와 같은 `{"error", "msg"}` 형태로 응답합니다.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT_BYTES)
        .error_handler(|err: error::JsonPayloadError, _req: &HttpRequest| {
            AppError::ValidationError(err.to_string()).into()
        })
}

/// 인증 관련 라우트를 설정합니다
///
/// `/me`는 `/{provider}`보다 먼저 등록해야 프로바이더 이름으로 해석되지 않습니다.
fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .service(handlers::auth::register)
            .service(handlers::auth::local_login)
            .service(
                web::scope("/me")
                    .wrap(AuthMiddleware::required())
                    .service(web::resource("").route(web::get().to(handlers::auth::get_current_user))),
            )
            .service(handlers::auth::provider_login)
            .service(handlers::auth::provider_callback),
    );
}

/// 할 일 라우트를 설정합니다. 모두 인증이 필요합니다.
fn configure_task_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/tasks")
            .wrap(AuthMiddleware::required())
            .service(handlers::tasks::list_tasks)
            .service(handlers::tasks::create_task)
            .service(handlers::tasks::update_task)
            .service(handlers::tasks::delete_task),
    );
}
