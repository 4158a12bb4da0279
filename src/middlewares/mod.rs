//! 미들웨어 모듈
//!
//! 요청 처리 파이프라인의 횡단 관심사를 담당합니다.
//!
//! # 제공 미들웨어
//!
//! ### 인증 미들웨어 (AuthMiddleware)
//! - Bearer 토큰(`Authorization`, `x-auth-token`) 또는 세션 쿠키(`sid`) 검증
//! - 인증된 호출자를 request extension에 저장
//! - 실패 시 401 `{"error": "unauthorized", "msg": ...}`
//!
//! # 사용 방법
//!
//! ```rust,ignore
//! use actix_web::web;
//! use crate::middlewares::AuthMiddleware;
//!
//! cfg.service(
//!     web::scope("/api/tasks")
//!         .wrap(AuthMiddleware::required())
//!         .service(list_tasks)
//! );
//! ```

mod auth_inner;
pub mod auth_middleware;
pub mod credentials;

pub use auth_middleware::AuthMiddleware;
pub use credentials::{Authenticator, CredentialVerifier};
