//! # 소셜 로그인 서비스
//!
//! 활성화된 프로바이더 목록과 CSRF 방지용 `state` 처리를 담당합니다.
//!
//! ## State 처리
//!
//! ```text
//! 로그인 시작: state = 256비트 난수
//!             쿠키 oauth_state_<provider> = "<발급 시각>.<state>" (HttpOnly, 기본 10분)
//! 콜백:       쿼리 state == 쿠키 state (상수 시간 비교) && 발급 후 제한 시간 이내
//! ```
//!
//! 설정되지 않은 프로바이더에 대한 요청은 `ProviderDisabled`로 거부됩니다.

use std::collections::HashMap;
use std::sync::Arc;

use actix_web::cookie::{time, Cookie, SameSite};
use chrono::{Duration, Utc};
use log::warn;

use crate::config::{Capabilities, Environment, FederatedProvider, OAuthConfig};
use crate::core::errors::{AppError, AppResult};
use crate::core::registry::Singleton;
use crate::domain::dto::OAuthCallbackQuery;
use crate::domain::models::ExternalProfile;
use crate::services::auth::oauth_providers::{GitHubProvider, GoogleProvider, OAuthProvider};
use crate::utils::crypto;

const STATE_BYTES: usize = 32;
const INVALID_STATE_MESSAGE: &str = "OAuth state is not valid";

pub struct OAuthService {
    providers: HashMap<FederatedProvider, Arc<dyn OAuthProvider>>,
    capabilities: Capabilities,
    state_ttl: Duration,
    secure_cookies: bool,
}

impl Singleton for OAuthService {}

impl OAuthService {
    /// 프로바이더가 하나도 없는 서비스. [`with_provider`](Self::with_provider)로 추가합니다.
    pub fn new(state_timeout_minutes: i64, environment: Environment) -> Self {
        Self {
            providers: HashMap::new(),
            capabilities: Capabilities::default(),
            state_ttl: Duration::minutes(state_timeout_minutes),
            secure_cookies: !environment.is_local(),
        }
    }

    /// 설정된 프로바이더 클라이언트를 모두 등록합니다.
    pub fn from_config(config: &OAuthConfig, environment: Environment) -> Self {
        let mut service = Self::new(config.state_timeout_minutes, environment);

        if let Some(google) = &config.google {
            service = service.with_provider(Arc::new(GoogleProvider::new(google.clone())));
        }
        if let Some(github) = &config.github {
            service = service.with_provider(Arc::new(GitHubProvider::new(github.clone())));
        }

        service
    }

    pub fn with_provider(mut self, provider: Arc<dyn OAuthProvider>) -> Self {
        let kind = provider.kind();
        if !self.capabilities.is_enabled(kind) {
            self.capabilities.providers.push(kind);
        }
        self.providers.insert(kind, provider);
        self
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn provider(&self, kind: FederatedProvider) -> AppResult<Arc<dyn OAuthProvider>> {
        self.providers
            .get(&kind)
            .cloned()
            .ok_or_else(|| AppError::ProviderDisabled(format!("{} login is not enabled", kind)))
    }

    pub fn state_cookie_name(kind: FederatedProvider) -> String {
        format!("oauth_state_{}", kind)
    }

    /// 로그인 시작. 프로바이더 인가 URL과 state 쿠키를 돌려줍니다.
    pub fn begin(&self, kind: FederatedProvider) -> AppResult<(String, Cookie<'static>)> {
        let provider = self.provider(kind)?;
        let state = crypto::random_token(STATE_BYTES);
        let value = format!("{}.{}", Utc::now().timestamp(), state);

        let cookie = self
            .state_cookie(kind, value)
            .max_age(time::Duration::seconds(self.state_ttl.num_seconds()))
            .finish();

        Ok((provider.authorize_url(&state), cookie))
    }

    /// 콜백 처리. state를 확인한 뒤 코드를 교환해 외부 프로필을 가져옵니다.
    pub async fn complete(
        &self,
        kind: FederatedProvider,
        query: &OAuthCallbackQuery,
        state_cookie: Option<&str>,
    ) -> AppResult<ExternalProfile> {
        let provider = self.provider(kind)?;

        if let Some(error) = &query.error {
            warn!(
                "{} 로그인 거부: {} {}",
                kind,
                error,
                query.error_description.as_deref().unwrap_or_default()
            );
            return Err(AppError::Unauthorized(format!("{} login was denied", kind)));
        }

        self.verify_state(query.state.as_deref(), state_cookie)?;

        let code = query
            .code
            .as_deref()
            .filter(|code| !code.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Authorization code is missing".to_string()))?;

        provider.fetch_profile(code).await
    }

    /// 쿼리의 state와 쿠키에 저장한 state를 비교합니다.
    pub fn verify_state(&self, returned: Option<&str>, cookie_value: Option<&str>) -> AppResult<()> {
        let invalid = || AppError::Unauthorized(INVALID_STATE_MESSAGE.to_string());

        let returned = returned.filter(|state| !state.is_empty()).ok_or_else(invalid)?;
        let (issued_at, expected) = cookie_value
            .and_then(|value| value.split_once('.'))
            .ok_or_else(invalid)?;
        let issued_at: i64 = issued_at.parse().map_err(|_| invalid())?;

        if Utc::now().timestamp() - issued_at > self.state_ttl.num_seconds() {
            return Err(invalid());
        }
        if !crypto::constant_time_eq(returned.as_bytes(), expected.as_bytes()) {
            return Err(invalid());
        }

        Ok(())
    }

    /// 콜백이 끝나면 state 쿠키를 지웁니다.
    pub fn clear_state_cookie(&self, kind: FederatedProvider) -> Cookie<'static> {
        self.state_cookie(kind, String::new())
            .max_age(time::Duration::ZERO)
            .finish()
    }

    fn state_cookie(&self, kind: FederatedProvider, value: String) -> actix_web::cookie::CookieBuilder<'static> {
        // 프로바이더에서 돌아오는 최상위 GET 이동에는 Lax 쿠키가 실린다
        Cookie::build(Self::state_cookie_name(kind), value)
            .path("/")
            .http_only(true)
            .secure(self.secure_cookies)
            .same_site(SameSite::Lax)
    }
}
