//! Authentication HTTP Handlers
//!
//! 회원가입, 로그인, 현재 사용자 조회와 소셜 로그인 엔드포인트입니다.
//!
//! # Auth Providers
//!
//! - **로컬 인증**: 이메일/비밀번호 (`POST /api/auth/register`, `POST /api/auth/login`)
//! - **OAuth 2.0**: Google, GitHub (`GET /api/auth/{provider}`, `/api/auth/{provider}/callback`)
//!
//! 로그인에 성공하면 JWT를 돌려주고 `sid` 세션 쿠키도 함께 설정합니다.
use std::str::FromStr;

use actix_web::http::header::LOCATION;
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use log::{info, warn};
use mongodb::bson::oid::ObjectId;
use validator::Validate;

use crate::config::{FederatedProvider, FrontendConfig};
use crate::core::errors::{AppError, AppResult};
use crate::core::registry::Singleton;
use crate::domain::{
    AuthenticatedUser, LocalLoginRequest, LoginResponse, OAuthCallbackQuery, RegisterRequest, TokenResponse,
    User, UserResponse, UserSummary,
};
use crate::services::auth::{OAuthService, SessionService, TokenService};
use crate::services::users::UserService;

/// 토큰 발급과 세션 생성
async fn issue_credentials(user: &User) -> AppResult<(String, actix_web::cookie::Cookie<'static>)> {
    let user_id: ObjectId = user
        .id
        .ok_or_else(|| AppError::InternalError("저장되지 않은 사용자에게 토큰을 발급할 수 없습니다".to_string()))?;

    let token = TokenService::instance().issue(&user_id)?;
    let cookie = SessionService::instance()?.establish(&user_id).await?;

    Ok((token, cookie))
}

/// 경로의 프로바이더 이름. 모르는 이름은 404.
fn parse_provider(name: &str) -> AppResult<FederatedProvider> {
    FederatedProvider::from_str(name)
}

/// 회원가입 핸들러
///
/// # Endpoint
/// `POST /api/auth/register`
#[post("/register")]
pub async fn register(payload: web::Json<RegisterRequest>) -> Result<HttpResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let user = UserService::instance()?.register(payload.into_inner()).await?;
    let (token, cookie) = issue_credentials(&user).await?;

    Ok(HttpResponse::Ok().cookie(cookie).json(TokenResponse { token }))
}

/// 로컬 로그인 핸들러
///
/// 실패 사유(없는 이메일, 틀린 비밀번호, 소셜 전용 계정)와 무관하게
/// 같은 400 `Invalid Credentials`를 돌려줍니다.
///
/// # Endpoint
/// `POST /api/auth/login`
#[post("/login")]
pub async fn local_login(payload: web::Json<LocalLoginRequest>) -> Result<HttpResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let user = UserService::instance()?
        .resolve_local(&payload.email, &payload.password)
        .await?;
    let (token, cookie) = issue_credentials(&user).await?;

    info!("로컬 로그인 성공 - 사용자 ID: {}", user.id_string().unwrap_or_default());

    Ok(HttpResponse::Ok().cookie(cookie).json(LoginResponse {
        token,
        user: UserSummary::from(&user),
    }))
}

/// 현재 사용자 정보 조회 핸들러
///
/// # Endpoint
/// `GET /api/auth/me`
///
/// 인증 미들웨어를 이 라우트에만 씌우기 위해 라우트 매크로 없이 등록합니다.
pub async fn get_current_user(user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
    let profile = UserService::instance()?.get_profile(&user.user_id).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(profile)))
}

/// 소셜 로그인 시작 핸들러
///
/// state 쿠키를 설정하고 프로바이더 인가 페이지로 보냅니다.
///
/// # Endpoint
/// `GET /api/auth/{provider}`
#[get("/{provider}")]
pub async fn provider_login(provider: web::Path<String>) -> Result<HttpResponse, AppError> {
    let provider = parse_provider(&provider)?;
    let (authorize_url, state_cookie) = OAuthService::instance()?.begin(provider)?;

    Ok(HttpResponse::Found()
        .insert_header((LOCATION, authorize_url))
        .cookie(state_cookie)
        .finish())
}

/// 소셜 로그인 콜백 핸들러
///
/// 성공하면 `<FRONTEND_URL>/login?token=...`으로, 인증 실패면 `/`로 보냅니다.
/// 데이터베이스 장애는 리디렉션하지 않고 503으로 응답합니다.
///
/// # Endpoint
/// `GET /api/auth/{provider}/callback?code={code}&state={state}`
#[get("/{provider}/callback")]
pub async fn provider_callback(
    req: HttpRequest,
    provider: web::Path<String>,
    query: web::Query<OAuthCallbackQuery>,
) -> Result<HttpResponse, AppError> {
    let provider = parse_provider(&provider)?;
    let oauth = OAuthService::instance()?;
    oauth.provider(provider)?;

    let state_cookie = req.cookie(&OAuthService::state_cookie_name(provider));
    let result = async {
        let profile = oauth
            .complete(provider, &query, state_cookie.as_ref().map(|cookie| cookie.value()))
            .await?;
        let user = UserService::instance()?.resolve_or_create_federated(&profile).await?;
        let (token, session_cookie) = issue_credentials(&user).await?;
        info!("{} 로그인 성공 - 사용자 ID: {}", provider, user.id_string().unwrap_or_default());
        AppResult::Ok((token, session_cookie))
    }
    .await;

    match result {
        Ok((token, session_cookie)) => {
            let redirect = FrontendConfig::instance()?.login_redirect(&token);
            Ok(HttpResponse::Found()
                .insert_header((LOCATION, redirect))
                .cookie(session_cookie)
                .cookie(oauth.clear_state_cookie(provider))
                .finish())
        }
        Err(e @ (AppError::Unauthorized(_) | AppError::ExternalServiceError(_) | AppError::ValidationError(_))) => {
            warn!("{} 로그인 실패: {}", provider, e);
            Ok(HttpResponse::Found()
                .insert_header((LOCATION, "/"))
                .cookie(oauth.clear_state_cookie(provider))
                .finish())
        }
        Err(e) => Err(e),
    }
}
