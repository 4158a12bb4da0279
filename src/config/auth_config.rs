//! # Authentication Configuration Module
//!
//! JWT 토큰, 서버 측 세션, OAuth 프로바이더(Google, GitHub) 관련 설정을 관리하는 모듈입니다.
//!
//! ## 필수 환경 변수
//!
//! ```bash
//! export JWT_SECRET="your-super-secret-jwt-key"
//! ```
//!
//! ## 선택 환경 변수
//!
//! ```bash
//! export JWT_EXPIRATION_HOURS="1"
//! export SESSION_SECRET="cookie-signing-secret"
//! export SESSION_TTL_MINUTES="60"
//!
//! # 콜백 기준 URL (없으면 모든 소셜 로그인이 비활성화됩니다)
//! export BACKEND_URL="https://api.example.com"
//! export GOOGLE_CLIENT_ID="..."
//! export GOOGLE_CLIENT_SECRET="..."
//! export GITHUB_CLIENT_ID="..."
//! export GITHUB_CLIENT_SECRET="..."
//!
//! # 같은 이메일의 기존 계정 처리 방식: separate | link_by_email
//! export ACCOUNT_LINK_POLICY="separate"
//! ```

use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

use super::Lookup;
use crate::core::errors::{AppError, AppResult};

/// JWT 서명 설정
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
}

impl JwtConfig {
    /// 서명 키가 없으면 서비스를 시작하지 않습니다.
    pub fn from_lookup(lookup: Lookup<'_>) -> AppResult<Self> {
        let secret = lookup("JWT_SECRET")
            .ok_or_else(|| AppError::ConfigurationMissing("JWT_SECRET이 설정되지 않았습니다".to_string()))?;

        let expiration_hours = lookup("JWT_EXPIRATION_HOURS")
            .and_then(|raw| raw.parse::<i64>().ok())
            .filter(|hours| *hours > 0)
            .unwrap_or(1);

        Ok(Self { secret, expiration_hours })
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiration_hours", &self.expiration_hours)
            .finish()
    }
}

/// 세션 쿠키 설정
#[derive(Clone)]
pub struct SessionConfig {
    /// 쿠키 서명 키. 없으면 프로세스마다 임의 키를 생성합니다.
    pub secret: Option<String>,
    pub ttl_minutes: i64,
}

impl SessionConfig {
    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        Self {
            secret: lookup("SESSION_SECRET"),
            ttl_minutes: lookup("SESSION_TTL_MINUTES")
                .and_then(|raw| raw.parse::<i64>().ok())
                .filter(|minutes| *minutes > 0)
                .unwrap_or(60),
        }
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

/// 지원하는 외부 인증 프로바이더
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FederatedProvider {
    Google,
    GitHub,
}

impl FederatedProvider {
    pub const ALL: [FederatedProvider; 2] = [FederatedProvider::Google, FederatedProvider::GitHub];

    pub fn as_str(&self) -> &'static str {
        match self {
            FederatedProvider::Google => "google",
            FederatedProvider::GitHub => "github",
        }
    }

    fn env_prefix(&self) -> &'static str {
        match self {
            FederatedProvider::Google => "GOOGLE",
            FederatedProvider::GitHub => "GITHUB",
        }
    }
}

impl fmt::Display for FederatedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FederatedProvider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "google" => Ok(FederatedProvider::Google),
            "github" => Ok(FederatedProvider::GitHub),
            other => Err(AppError::NotFound(format!("지원하지 않는 인증 프로바이더: {}", other))),
        }
    }
}

/// 하나의 OAuth 클라이언트 등록 정보
#[derive(Clone)]
pub struct OAuthProviderConfig {
    pub client_id: String,
    pub client_secret: String,
    /// `<BACKEND_URL>/api/auth/<provider>/callback`
    pub callback_url: String,
}

impl fmt::Debug for OAuthProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthProviderConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("callback_url", &self.callback_url)
            .finish()
    }
}

/// 외부 계정 이메일이 기존 계정과 겹칠 때의 처리 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccountLinkPolicy {
    /// 프로바이더마다 독립된 계정을 만든다. 이메일이 이미 쓰이면 새 계정은 이메일 없이 저장된다.
    #[default]
    Separate,
    /// 같은 이메일을 가진 기존 계정에 외부 식별자를 연결한다.
    LinkByEmail,
}

impl AccountLinkPolicy {
    pub fn from_name(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "link_by_email" | "link-by-email" | "link" => AccountLinkPolicy::LinkByEmail,
            "separate" => AccountLinkPolicy::Separate,
            other => {
                warn!("알 수 없는 ACCOUNT_LINK_POLICY 값: {}. separate 사용", other);
                AccountLinkPolicy::Separate
            }
        }
    }
}

/// 소셜 로그인 설정 묶음
#[derive(Debug, Clone, Default)]
pub struct OAuthConfig {
    pub google: Option<OAuthProviderConfig>,
    pub github: Option<OAuthProviderConfig>,
    pub state_timeout_minutes: i64,
    pub link_policy: AccountLinkPolicy,
}

impl OAuthConfig {
    /// 클라이언트 ID, 시크릿, 콜백 기준 URL이 모두 있는 프로바이더만 구성합니다.
    ///
    /// 하나라도 빠지면 해당 프로바이더는 경고만 남기고 건너뜁니다.
    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        let backend_url = lookup("BACKEND_URL").map(|url| url.trim_end_matches('/').to_string());

        let provider = |provider: FederatedProvider| -> Option<OAuthProviderConfig> {
            let prefix = provider.env_prefix();
            let client_id = lookup(&format!("{}_CLIENT_ID", prefix));
            let client_secret = lookup(&format!("{}_CLIENT_SECRET", prefix));

            match (client_id, client_secret, backend_url.as_deref()) {
                (Some(client_id), Some(client_secret), Some(base)) => Some(OAuthProviderConfig {
                    client_id,
                    client_secret,
                    callback_url: format!("{}/api/auth/{}/callback", base, provider),
                }),
                _ => {
                    warn!(
                        "⚠️ {} OAuth 설정이 없어 비활성화합니다 ({}_CLIENT_ID, {}_CLIENT_SECRET, BACKEND_URL 필요)",
                        provider, prefix, prefix
                    );
                    None
                }
            }
        };

        Self {
            google: provider(FederatedProvider::Google),
            github: provider(FederatedProvider::GitHub),
            state_timeout_minutes: lookup("OAUTH_STATE_TIMEOUT_MINUTES")
                .and_then(|raw| raw.parse::<i64>().ok())
                .filter(|minutes| *minutes > 0)
                .unwrap_or(10),
            link_policy: lookup("ACCOUNT_LINK_POLICY")
                .map(|raw| AccountLinkPolicy::from_name(&raw))
                .unwrap_or_default(),
        }
    }

    pub fn provider(&self, provider: FederatedProvider) -> Option<&OAuthProviderConfig> {
        match provider {
            FederatedProvider::Google => self.google.as_ref(),
            FederatedProvider::GitHub => self.github.as_ref(),
        }
    }
}

/// 활성화된 소셜 로그인 프로바이더 목록
///
/// `OAuthService`가 프로바이더를 등록하면서 채우며, 소셜 로그인 요청은 이 목록으로 허용 여부를 판단합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub providers: Vec<FederatedProvider>,
}

impl Capabilities {
    pub fn is_enabled(&self, provider: FederatedProvider) -> bool {
        self.providers.contains(&provider)
    }
}
