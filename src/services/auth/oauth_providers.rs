//! # OAuth 2.0 프로바이더 클라이언트
//!
//! Authorization Code 흐름의 프로바이더별 부분(인가 URL, 코드 교환, 프로필 조회)입니다.
//!
//! | 프로바이더 | 인가 | 토큰 교환 | 프로필 |
//! |-----------|------|-----------|--------|
//! | Google | `accounts.google.com/o/oauth2/v2/auth` | `oauth2.googleapis.com/token` | `www.googleapis.com/oauth2/v2/userinfo` |
//! | GitHub | `github.com/login/oauth/authorize` | `github.com/login/oauth/access_token` | `api.github.com/user`, `/user/emails` |

use async_trait::async_trait;
use log::warn;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;

use crate::config::{FederatedProvider, OAuthProviderConfig};
use crate::core::errors::{AppError, AppResult};
use crate::domain::models::{ExternalProfile, GitHubEmail, GitHubUser, GoogleUserInfo, OAuthTokenResponse};

const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URI: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

const GITHUB_AUTH_URI: &str = "https://github.com/login/oauth/authorize";
const GITHUB_TOKEN_URI: &str = "https://github.com/login/oauth/access_token";
const GITHUB_USER_URI: &str = "https://api.github.com/user";
const GITHUB_EMAILS_URI: &str = "https://api.github.com/user/emails";

/// GitHub API는 User-Agent 헤더가 없는 요청을 거부한다
const CLIENT_USER_AGENT: &str = "task-service-backend";

/// 외부 ID 프로바이더
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    fn kind(&self) -> FederatedProvider;

    /// 사용자를 보낼 인가 URL
    fn authorize_url(&self, state: &str) -> String;

    /// 인가 코드를 교환하고 정규화된 프로필을 돌려줍니다.
    async fn fetch_profile(&self, code: &str) -> AppResult<ExternalProfile>;
}

fn build_url(base: &str, params: &[(&str, &str)]) -> String {
    let query_string = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", base, query_string)
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response, what: &str) -> AppResult<T> {
    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return Err(AppError::ExternalServiceError(format!(
            "{} 실패 ({}): {}",
            what, status, error_text
        )));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| AppError::ExternalServiceError(format!("{} 응답 파싱 실패: {}", what, e)))
}

async fn exchange_code(
    client: &reqwest::Client,
    token_uri: &str,
    config: &OAuthProviderConfig,
    code: &str,
    what: &str,
) -> AppResult<OAuthTokenResponse> {
    let params = [
        ("code", code),
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("redirect_uri", config.callback_url.as_str()),
        ("grant_type", "authorization_code"),
    ];

    let response = client
        .post(token_uri)
        .header(ACCEPT, "application/json")
        .form(&params)
        .send()
        .await
        .map_err(|e| AppError::ExternalServiceError(format!("{} 요청 실패: {}", what, e)))?;

    read_json(response, what).await
}

pub struct GoogleProvider {
    config: OAuthProviderConfig,
    client: reqwest::Client,
}

impl GoogleProvider {
    pub fn new(config: OAuthProviderConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl OAuthProvider for GoogleProvider {
    fn kind(&self) -> FederatedProvider {
        FederatedProvider::Google
    }

    fn authorize_url(&self, state: &str) -> String {
        build_url(
            GOOGLE_AUTH_URI,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.callback_url.as_str()),
                ("scope", "openid email profile"),
                ("response_type", "code"),
                ("state", state),
            ],
        )
    }

    async fn fetch_profile(&self, code: &str) -> AppResult<ExternalProfile> {
        let token = exchange_code(&self.client, GOOGLE_TOKEN_URI, &self.config, code, "Google 토큰 교환").await?;

        let response = self
            .client
            .get(GOOGLE_USERINFO_URI)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Google 사용자 정보 요청 실패: {}", e)))?;

        let user_info: GoogleUserInfo = read_json(response, "Google 사용자 정보 조회").await?;
        Ok(user_info.into())
    }
}

pub struct GitHubProvider {
    config: OAuthProviderConfig,
    client: reqwest::Client,
}

impl GitHubProvider {
    pub fn new(config: OAuthProviderConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    async fn get(&self, uri: &str, access_token: &str, what: &str) -> AppResult<reqwest::Response> {
        self.client
            .get(uri)
            .bearer_auth(access_token)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("{} 요청 실패: {}", what, e)))
    }
}

#[async_trait]
impl OAuthProvider for GitHubProvider {
    fn kind(&self) -> FederatedProvider {
        FederatedProvider::GitHub
    }

    fn authorize_url(&self, state: &str) -> String {
        build_url(
            GITHUB_AUTH_URI,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.callback_url.as_str()),
                ("scope", "user:email"),
                ("state", state),
            ],
        )
    }

    async fn fetch_profile(&self, code: &str) -> AppResult<ExternalProfile> {
        let token = exchange_code(&self.client, GITHUB_TOKEN_URI, &self.config, code, "GitHub 토큰 교환").await?;

        let response = self.get(GITHUB_USER_URI, &token.access_token, "GitHub 사용자 정보").await?;
        let user: GitHubUser = read_json(response, "GitHub 사용자 정보 조회").await?;

        if user.email.is_some() {
            return Ok(user.into_profile(&[]));
        }

        // 공개 이메일이 없으면 인증된 기본 이메일을 찾는다. 실패해도 로그인은 계속한다
        let emails: Vec<GitHubEmail> = match self.get(GITHUB_EMAILS_URI, &token.access_token, "GitHub 이메일 목록").await {
            Ok(response) => read_json(response, "GitHub 이메일 목록 조회").await.unwrap_or_else(|e| {
                warn!("{}", e);
                Vec::new()
            }),
            Err(e) => {
                warn!("{}", e);
                Vec::new()
            }
        };

        Ok(user.into_profile(&emails))
    }
}
