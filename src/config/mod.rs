//! # Configuration Module
//!
//! 백엔드 서비스의 설정 관리를 담당하는 모듈입니다.
//! 환경 변수 기반의 설정값들을 시작 시 한 번 읽어 타입이 있는 구조체로 만들고,
//! 이후에는 [`AppConfig`]만 참조합니다.
//!
//! ## 모듈 구성
//!
//! - [`data_config`] - 데이터베이스, 서버, 환경, CORS 관련 설정
//! - [`auth_config`] - JWT, 세션, OAuth 관련 설정
//!
//! ## 설계 원칙
//!
//! - 필수 설정(`MONGO_URI`/`MONGODB_URI`, `JWT_SECRET`)이 없으면 시작하지 않습니다.
//! - 선택 설정이 없으면 해당 기능만 비활성화하고 경고를 남깁니다.
//! - 빈 문자열은 설정되지 않은 것으로 취급합니다.
//! - 모든 파서는 조회 함수([`Lookup`])를 받으므로 테스트에서 프로세스 환경을 건드리지 않습니다.
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use task_service_backend::config::AppConfig;
//!
//! let config = AppConfig::from_env()?;
//! println!("bind: {}", config.server.bind_address());
//! ```

pub mod auth_config;
pub mod data_config;

pub use auth_config::*;
pub use data_config::*;

use std::env;

use crate::core::errors::AppResult;

/// 설정 키 하나를 조회하는 함수
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// 프로세스 환경 변수 조회. 빈 값은 없는 것으로 봅니다.
pub fn env_lookup(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// 애플리케이션 전체 설정
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub bcrypt_cost: u32,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub frontend: FrontendConfig,
    pub rate_limit: RateLimitConfig,
    pub jwt: JwtConfig,
    pub session: SessionConfig,
    pub oauth: OAuthConfig,
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> AppResult<Self> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let lookup: Lookup<'_> = &non_empty;

        let environment = Environment::detect(lookup);

        Ok(Self {
            environment,
            bcrypt_cost: PasswordConfig::bcrypt_cost(lookup, &environment),
            server: ServerConfig::from_lookup(lookup),
            database: DatabaseConfig::from_lookup(lookup)?,
            frontend: FrontendConfig::from_lookup(lookup),
            rate_limit: RateLimitConfig::from_lookup(lookup),
            jwt: JwtConfig::from_lookup(lookup)?,
            session: SessionConfig::from_lookup(lookup),
            oauth: OAuthConfig::from_lookup(lookup),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::AppError;

    #[test]
    fn test_minimal_configuration() {
        let lookup = |key: &str| match key {
            "MONGO_URI" => Some("mongodb://localhost:27017/tasks".to_string()),
            "JWT_SECRET" => Some("secret".to_string()),
            "ENVIRONMENT" => Some("development".to_string()),
            "SESSION_SECRET" => Some("   ".to_string()),
            _ => None,
        };

        let config = AppConfig::from_lookup(&lookup).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.bcrypt_cost, 4);
        assert!(config.session.secret.is_none());
        assert!(config.oauth.google.is_none());
        assert!(config.oauth.github.is_none());
    }

    #[test]
    fn test_missing_jwt_secret_fails_startup() {
        let lookup = |key: &str| match key {
            "MONGODB_URI" => Some("mongodb://localhost:27017".to_string()),
            "JWT_SECRET" => Some(String::new()),
            _ => None,
        };

        assert!(matches!(
            AppConfig::from_lookup(&lookup),
            Err(AppError::ConfigurationMissing(_))
        ));
    }
}
