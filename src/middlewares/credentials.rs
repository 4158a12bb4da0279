//! 요청 자격 증명 검증기
//!
//! 요청에서 자격 증명을 꺼내 사용자 ID로 바꾸는 방법 두 가지를 같은 트레이트 뒤에 둡니다.
//!
//! | 검증기 | 위치 | 검증 |
//! |--------|------|------|
//! | [`BearerTokenVerifier`] | `Authorization: Bearer <jwt>`, `x-auth-token: <jwt>` | [`TokenService`] |
//! | [`SessionCookieVerifier`] | `sid` 쿠키 | [`SessionService`] |
//!
//! [`Authenticator`]는 검증기를 순서대로 보고, 자격 증명이 있는 첫 검증기의 결과를
//! 그대로 씁니다. 헤더 토큰이 틀렸다고 쿠키로 넘어가지 않습니다.

use std::sync::Arc;

use actix_web::http::header::AUTHORIZATION;
use actix_web::HttpRequest;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::core::errors::{AppError, AppResult};
use crate::core::registry::Singleton;
use crate::domain::models::{AuthenticatedUser, CredentialKind};
use crate::services::auth::{SessionService, TokenService, SESSION_COOKIE};

pub const NO_CREDENTIAL_MESSAGE: &str = "No token, authorization denied";

const AUTH_TOKEN_HEADER: &str = "x-auth-token";

#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    fn kind(&self) -> CredentialKind;

    /// 요청에 이 방식의 자격 증명이 있으면 원문을 돌려줍니다.
    fn extract(&self, req: &HttpRequest) -> Option<String>;

    async fn verify(&self, credential: &str) -> AppResult<ObjectId>;
}

pub struct BearerTokenVerifier {
    tokens: Arc<TokenService>,
}

impl BearerTokenVerifier {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl CredentialVerifier for BearerTokenVerifier {
    fn kind(&self) -> CredentialKind {
        CredentialKind::BearerToken
    }

    fn extract(&self, req: &HttpRequest) -> Option<String> {
        let header = |name| {
            req.headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        if let Some(value) = header(AUTHORIZATION.as_str()) {
            return Some(value.to_string());
        }
        // x-auth-token은 스킴 없이 토큰만 담는다
        header(AUTH_TOKEN_HEADER).map(|token| format!("Bearer {}", token))
    }

    async fn verify(&self, credential: &str) -> AppResult<ObjectId> {
        let token = TokenService::extract_bearer_token(credential)?;
        self.tokens.verify_user_id(token)
    }
}

pub struct SessionCookieVerifier {
    sessions: Arc<SessionService>,
}

impl SessionCookieVerifier {
    pub fn new(sessions: Arc<SessionService>) -> Self {
        Self { sessions }
    }
}

#[async_trait]
impl CredentialVerifier for SessionCookieVerifier {
    fn kind(&self) -> CredentialKind {
        CredentialKind::SessionCookie
    }

    fn extract(&self, req: &HttpRequest) -> Option<String> {
        req.cookie(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }

    async fn verify(&self, credential: &str) -> AppResult<ObjectId> {
        self.sessions.resolve(credential).await
    }
}

pub struct Authenticator {
    verifiers: Vec<Box<dyn CredentialVerifier>>,
}

impl Singleton for Authenticator {}

impl Authenticator {
    /// 헤더 토큰이 먼저, 세션 쿠키가 다음
    pub fn new(tokens: Arc<TokenService>, sessions: Arc<SessionService>) -> Self {
        Self {
            verifiers: vec![
                Box::new(BearerTokenVerifier::new(tokens)),
                Box::new(SessionCookieVerifier::new(sessions)),
            ],
        }
    }

    pub async fn authenticate(&self, req: &HttpRequest) -> AppResult<AuthenticatedUser> {
        for verifier in &self.verifiers {
            if let Some(credential) = verifier.extract(req) {
                let user_id = verifier.verify(&credential).await?;
                return Ok(AuthenticatedUser {
                    user_id,
                    credential: verifier.kind(),
                });
            }
        }

        Err(AppError::Unauthorized(NO_CREDENTIAL_MESSAGE.to_string()))
    }
}
