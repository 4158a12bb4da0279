//! JWT 토큰 관리 서비스 구현
//!
//! HS256으로 서명한 액세스 토큰을 발급하고 검증합니다.
//! 페이로드에는 사용자 ID만 담고, 만료 시간은 설정값(기본 1시간)으로 고정합니다.
//!
//! 서명 키가 비어 있으면 발급을 거부합니다. 서명 없는 토큰이나 약한 토큰을 내보내지 않습니다.
//! 검증 실패는 만료, 형식 오류, 서명 불일치 모두 같은 `Unauthorized`로 보고됩니다.
//!
//! `#[service]` 싱글톤이며, 시작 시 등록된 [`JwtConfig`]를 주입받습니다.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::debug;
use mongodb::bson::oid::ObjectId;
use singleton_macro::service;

use crate::config::JwtConfig;
use crate::core::errors::{AppError, AppResult, ErrorContext};
use crate::domain::models::token::{ClaimsUser, TokenClaims};

/// 검증 실패 시 클라이언트에 보이는 유일한 메시지
pub const INVALID_TOKEN_MESSAGE: &str = "Token is not valid";

#[service(name = "token")]
pub struct TokenService {
    config: Arc<JwtConfig>,
}

impl TokenService {
    #[cfg(test)]
    pub(crate) fn with_config(config: JwtConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    fn ensure_secret(&self) -> AppResult<&[u8]> {
        if self.config.secret.trim().is_empty() {
            return Err(AppError::ConfigurationMissing("JWT 서명 키가 설정되지 않았습니다".to_string()));
        }
        Ok(self.config.secret.as_bytes())
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);
        validation
    }

    /// 사용자 ID 하나만 담은 토큰을 발급합니다.
    pub fn issue(&self, user_id: &ObjectId) -> AppResult<String> {
        let secret = self.ensure_secret()?;
        let now = Utc::now();

        let claims = TokenClaims {
            user: ClaimsUser { id: user_id.to_hex() },
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.config.expiration_hours)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret))
            .context("JWT 토큰 생성 실패")
    }

    /// 서명과 만료를 검증하고 클레임을 돌려줍니다.
    pub fn verify(&self, token: &str) -> AppResult<TokenClaims> {
        let secret = self.ensure_secret()?;

        decode::<TokenClaims>(token, &DecodingKey::from_secret(secret), &Self::validation())
            .map(|token_data| token_data.claims)
            .map_err(|e| {
                debug!("토큰 검증 실패: {:?}", e.kind());
                AppError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string())
            })
    }

    /// 검증 후 클레임의 사용자 ID를 ObjectId로 돌려줍니다.
    pub fn verify_user_id(&self, token: &str) -> AppResult<ObjectId> {
        let claims = self.verify(token)?;
        ObjectId::parse_str(claims.user_id())
            .map_err(|_| AppError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string()))
    }

    /// `Bearer <token>` 헤더 값에서 토큰 부분을 꺼냅니다.
    pub fn extract_bearer_token(auth_header: &str) -> AppResult<&str> {
        let mut parts = auth_header.trim().splitn(2, ' ');
        match (parts.next(), parts.next()) {
            (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
                Ok(token.trim())
            }
            _ => Err(AppError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::with_config(JwtConfig {
            secret: "unit-test-secret".to_string(),
            expiration_hours: 1,
        })
    }

    fn unauthorized_message(result: AppResult<TokenClaims>) -> String {
        match result {
            Err(AppError::Unauthorized(msg)) => msg,
            other => panic!("Expected Unauthorized, got {:?}", other.map(|c| c.user)),
        }
    }

    #[test]
    fn test_issued_token_carries_only_user_id() {
        let service = service();
        let user_id = ObjectId::new();

        let token = service.issue(&user_id).unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.user_id(), user_id.to_hex());
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(service.verify_user_id(&token).unwrap(), user_id);
    }

    #[test]
    fn test_expired_token_is_rejected_like_malformed_token() {
        let service = service();
        let now = Utc::now().timestamp();
        let expired_claims = TokenClaims {
            user: ClaimsUser { id: ObjectId::new().to_hex() },
            iat: now - 7200,
            exp: now - 3600,
        };
        let expired = encode(
            &Header::new(Algorithm::HS256),
            &expired_claims,
            &EncodingKey::from_secret(b"unit-test-secret"),
        )
        .unwrap();

        let expired_msg = unauthorized_message(service.verify(&expired));
        let malformed_msg = unauthorized_message(service.verify("not.a.jwt"));

        assert_eq!(expired_msg, malformed_msg);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let other = TokenService::with_config(JwtConfig {
            secret: "someone-else".to_string(),
            expiration_hours: 1,
        });
        let token = other.issue(&ObjectId::new()).unwrap();

        assert_eq!(unauthorized_message(service().verify(&token)), INVALID_TOKEN_MESSAGE);
    }

    #[test]
    fn test_issue_fails_closed_without_secret() {
        let service = TokenService::with_config(JwtConfig {
            secret: String::new(),
            expiration_hours: 1,
        });

        assert!(matches!(
            service.issue(&ObjectId::new()),
            Err(AppError::ConfigurationMissing(_))
        ));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(TokenService::extract_bearer_token("Bearer abc.def").unwrap(), "abc.def");
        assert_eq!(TokenService::extract_bearer_token("bearer abc").unwrap(), "abc");
        assert!(TokenService::extract_bearer_token("Basic abc").is_err());
        assert!(TokenService::extract_bearer_token("Bearer ").is_err());
    }
}
