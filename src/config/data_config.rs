//! 데이터 및 서버 설정 관리 모듈
//!
//! 데이터베이스, 서버, 환경, CORS 및 Rate Limiting 관련 설정을 관리합니다.

use std::time::Duration;

use log::warn;

use super::Lookup;
use crate::core::errors::{AppError, AppResult};
use crate::core::registry::Singleton;

/// 애플리케이션 실행 환경
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// 개발 환경 - 빠른 개발을 위한 설정
    Development,
    /// 테스트 환경 - 자동화된 테스트용 설정
    Test,
    /// 스테이징 환경 - 프로덕션 유사 환경
    Staging,
    /// 프로덕션 환경 - 최고 수준의 보안 및 성능
    Production,
}

impl Environment {
    /// 설정 소스에서 실행 환경을 감지합니다.
    ///
    /// `ENVIRONMENT` 또는 `NODE_ENV` 값을 확인하며,
    /// 둘 다 없는 경우 `Production`을 기본값으로 사용합니다.
    pub fn detect(lookup: Lookup<'_>) -> Self {
        lookup("ENVIRONMENT")
            .or_else(|| lookup("NODE_ENV"))
            .map(|name| Self::from_name(&name))
            .unwrap_or(Environment::Production)
    }

    /// 문자열에서 Environment를 생성합니다.
    ///
    /// 알 수 없는 값인 경우 `Production`을 반환합니다.
    pub fn from_name(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" | "testing" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Production,
        }
    }

    /// 로컬(개발/테스트) 환경 여부.
    ///
    /// 로컬이 아닌 배포에서는 쿠키에 `Secure` 속성이 강제됩니다.
    pub fn is_local(&self) -> bool {
        matches!(self, Environment::Development | Environment::Test)
    }
}

/// 패스워드 해싱 설정
pub struct PasswordConfig;

impl PasswordConfig {
    /// 설정값과 실행 환경으로 bcrypt cost를 결정합니다.
    ///
    /// `BCRYPT_COST`가 4-15 범위의 정수이면 그 값을, 아니면 환경 기본값을 사용합니다.
    pub fn bcrypt_cost(lookup: Lookup<'_>, env: &Environment) -> u32 {
        if let Some(cost_str) = lookup("BCRYPT_COST") {
            match cost_str.parse::<u32>() {
                Ok(cost) if (4..=15).contains(&cost) => return cost,
                _ => warn!("BCRYPT_COST 값이 올바르지 않습니다 ({}). 환경 기본값 사용", cost_str),
            }
        }

        Self::bcrypt_cost_for_env(env)
    }

    /// 특정 환경에 대한 bcrypt cost를 반환합니다.
    ///
    /// # Environment Defaults
    ///
    /// - Development/Test: 4 (빠른 처리)
    /// - Staging: 10 (중간 보안)
    /// - Production: 12 (고보안)
    pub fn bcrypt_cost_for_env(env: &Environment) -> u32 {
        match env {
            Environment::Development => 4,
            Environment::Test => 4,
            Environment::Staging => 10,
            Environment::Production => 12,
        }
    }
}

/// 서버 바인딩 설정
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        let port = match lookup("PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("PORT 파싱 실패: {}. 기본값 5000 사용", raw);
                5000
            }),
            None => 5000,
        };

        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// MongoDB 연결 설정
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// `MONGO_URI` 또는 `MONGODB_URI`
    pub uri: String,
    /// 명시적 데이터베이스 이름. 없으면 URI의 기본 DB, 그것도 없으면 `taskboard`
    pub database_name: Option<String>,
    /// 한 번의 연결 시도에 허용되는 최대 시간
    pub connect_timeout: Duration,
}

impl DatabaseConfig {
    /// DB 연결 문자열은 필수입니다.
    pub fn from_lookup(lookup: Lookup<'_>) -> AppResult<Self> {
        let uri = lookup("MONGO_URI")
            .or_else(|| lookup("MONGODB_URI"))
            .ok_or_else(|| {
                AppError::ConfigurationMissing("MONGO_URI 또는 MONGODB_URI가 설정되지 않았습니다".to_string())
            })?;

        let timeout_secs = lookup("DB_CONNECT_TIMEOUT_SECS")
            .and_then(|raw| raw.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(10);

        Ok(Self {
            uri,
            database_name: lookup("DATABASE_NAME"),
            connect_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// 프론트엔드 오리진 설정 (CORS 및 OAuth 리디렉션 대상)
#[derive(Debug, Clone, Default)]
pub struct FrontendConfig {
    pub url: Option<String>,
}

impl Singleton for FrontendConfig {}

impl FrontendConfig {
    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        Self {
            url: lookup("FRONTEND_URL").map(|url| url.trim_end_matches('/').to_string()),
        }
    }

    /// 로그인 완료 후 브라우저를 돌려보낼 기준 URL
    pub fn redirect_base(&self) -> &str {
        self.url.as_deref().unwrap_or("http://localhost:3000")
    }

    /// 토큰을 쿼리로 실어 보내는 로그인 완료 URL
    pub fn login_redirect(&self, token: &str) -> String {
        format!("{}/login?token={}", self.redirect_base(), urlencoding::encode(token))
    }
}

/// Rate Limiting 설정
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub per_second: u64,
    pub burst_size: u32,
}

impl RateLimitConfig {
    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        let per_second = lookup("RATE_LIMIT_PER_SECOND")
            .map(|raw| {
                raw.parse::<u64>().unwrap_or_else(|e| {
                    warn!("RATE_LIMIT_PER_SECOND 파싱 실패: {}. 기본값 100 사용", e);
                    100
                })
            })
            .unwrap_or(100);

        let burst_size = lookup("RATE_LIMIT_BURST_SIZE")
            .map(|raw| {
                raw.parse::<u32>().unwrap_or_else(|e| {
                    warn!("RATE_LIMIT_BURST_SIZE 파싱 실패: {}. 기본값 200 사용", e);
                    200
                })
            })
            .unwrap_or(200);

        Self { per_second, burst_size }
    }
}
