//! 서버 측 세션 서비스
//!
//! 브라우저 리디렉션 흐름(소셜 로그인 콜백)에서 쓰는 쿠키 세션입니다.
//!
//! - 세션 토큰: 256비트 난수. 저장소에는 SHA-256 해시만 남깁니다.
//! - 쿠키 값: `<토큰>.<HMAC-SHA256 서명>`. 서명이 틀리면 저장소를 조회하지 않습니다.
//! - 쿠키 속성: `HttpOnly`, `Path=/`. 로컬이 아닌 환경에서는 `SameSite=None; Secure`
//!   (콜백이 프론트엔드와 다른 오리진에 도착하므로), 로컬에서는 `SameSite=Lax`.
//! - 만료: 고정 TTL. 서버 측 폐기는 하지 않습니다.

use std::sync::Arc;

use actix_web::cookie::{time, Cookie, SameSite};
use chrono::Duration;
use log::warn;
use mongodb::bson::{oid::ObjectId, DateTime};

use crate::config::{Environment, SessionConfig};
use crate::core::errors::{AppError, AppResult};
use crate::core::registry::Singleton;
use crate::domain::entities::SessionRecord;
use crate::repositories::SessionStore;
use crate::utils::crypto;

pub const SESSION_COOKIE: &str = "sid";

const SESSION_TOKEN_BYTES: usize = 32;
const INVALID_SESSION_MESSAGE: &str = "Session is not valid";

pub struct SessionService {
    store: Arc<dyn SessionStore>,
    key: Vec<u8>,
    ttl: Duration,
    cross_site: bool,
}

impl Singleton for SessionService {}

impl SessionService {
    pub fn new(store: Arc<dyn SessionStore>, config: &SessionConfig, environment: Environment) -> Self {
        let key = match &config.secret {
            Some(secret) => secret.as_bytes().to_vec(),
            None => {
                warn!("⚠️ SESSION_SECRET이 없어 임시 서명 키를 생성합니다. 재시작하면 기존 세션이 무효화됩니다");
                crypto::random_bytes(32)
            }
        };

        Self {
            store,
            key,
            ttl: Duration::minutes(config.ttl_minutes),
            cross_site: !environment.is_local(),
        }
    }

    /// 세션을 저장하고 브라우저에 내려줄 쿠키를 만듭니다.
    pub async fn establish(&self, user_id: &ObjectId) -> AppResult<Cookie<'static>> {
        let token = crypto::random_token(SESSION_TOKEN_BYTES);
        let now = DateTime::now();

        self.store
            .insert(SessionRecord {
                token_hash: crypto::sha256_hex(&token),
                user_id: *user_id,
                created_at: now,
                expires_at: DateTime::from_millis(now.timestamp_millis() + self.ttl.num_milliseconds()),
            })
            .await?;

        let signature = crypto::sign(&self.key, &token)?;
        Ok(self.cookie(format!("{}.{}", token, signature)))
    }

    /// 쿠키 값으로 세션 소유자를 찾습니다.
    pub async fn resolve(&self, cookie_value: &str) -> AppResult<ObjectId> {
        let invalid = || AppError::Unauthorized(INVALID_SESSION_MESSAGE.to_string());

        let (token, signature) = cookie_value.split_once('.').ok_or_else(invalid)?;
        if !crypto::verify_signature(&self.key, token, signature) {
            return Err(invalid());
        }

        let session = self
            .store
            .find(&crypto::sha256_hex(token))
            .await?
            .ok_or_else(invalid)?;

        if session.is_expired_at(DateTime::now()) {
            return Err(invalid());
        }

        Ok(session.user_id)
    }

    fn cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, value)
            .path("/")
            .http_only(true)
            .secure(self.cross_site)
            .same_site(if self.cross_site { SameSite::None } else { SameSite::Lax })
            .max_age(time::Duration::seconds(self.ttl.num_seconds()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::MemorySessionStore;

    fn service(environment: Environment, ttl_minutes: i64) -> SessionService {
        SessionService::new(
            Arc::new(MemorySessionStore::default()),
            &SessionConfig {
                secret: Some("session-secret".to_string()),
                ttl_minutes,
            },
            environment,
        )
    }

    #[tokio::test]
    async fn test_established_session_resolves_to_user() {
        let service = service(Environment::Development, 60);
        let user_id = ObjectId::new();

        let cookie = service.establish(&user_id).await.unwrap();

        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(service.resolve(cookie.value()).await.unwrap(), user_id);
    }

    #[tokio::test]
    async fn test_non_local_cookie_is_cross_site_and_secure() {
        let service = service(Environment::Production, 60);
        let cookie = service.establish(&ObjectId::new()).await.unwrap();

        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
        assert_eq!(cookie.max_age(), Some(time::Duration::hours(1)));
    }

    #[tokio::test]
    async fn test_tampered_cookie_is_rejected() {
        let service = service(Environment::Development, 60);
        let cookie = service.establish(&ObjectId::new()).await.unwrap();
        let (token, _) = cookie.value().split_once('.').unwrap();

        let forged = format!("{}.{}", token, "A".repeat(43));
        assert!(matches!(service.resolve(&forged).await, Err(AppError::Unauthorized(_))));
        assert!(matches!(service.resolve(token).await, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected() {
        let service = service(Environment::Development, 0);
        let cookie = service.establish(&ObjectId::new()).await.unwrap();

        assert!(matches!(
            service.resolve(cookie.value()).await,
            Err(AppError::Unauthorized(_))
        ));
    }
}
