//! 인증된 호출자
//!
//! 인증 미들웨어가 요청 extensions에 넣어 두고, 핸들러는 추출자로 꺼내 씁니다.
//! 사용자 문서 전체는 조회하지 않으며 필요한 핸들러가 직접 조회합니다.
//!
//! ```rust,ignore
//! #[get("")]
//! pub async fn list_tasks(user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
//!     let tasks = TaskService::instance()?.list_for(&user.user_id).await?;
//!     ...
//! }
//! ```

use std::future::{ready, Ready};

use actix_web::{FromRequest, HttpMessage, HttpRequest};
use mongodb::bson::oid::ObjectId;
use serde::Serialize;

use crate::core::errors::AppError;

/// 호출자가 제시한 자격 증명 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    /// `Authorization: Bearer` 또는 `x-auth-token` 헤더의 JWT
    BearerToken,
    /// 서명된 세션 쿠키
    SessionCookie,
}

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: ObjectId,
    pub credential: CredentialKind,
}

impl AuthenticatedUser {
    pub fn id_string(&self) -> String {
        self.user_id.to_hex()
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(AppError::Unauthorized(
                "No token, authorization denied".to_string(),
            ))),
        }
    }
}
