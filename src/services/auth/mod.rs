//! 인증 서비스 모듈
//!
//! 사용자 식별이 끝난 뒤 자격 증명을 발급하고, 이후 요청에서 그 자격 증명을 검증합니다.
//!
//! - [`TokenService`] - HS256 JWT 발급/검증
//! - [`SessionService`] - 서명된 쿠키 기반 서버 측 세션
//! - [`OAuthService`] - Google, GitHub 소셜 로그인 (Authorization Code 흐름)
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::services::auth::TokenService;
//!
//! let token_service = TokenService::instance();
//! let token = token_service.issue(&user_id)?;
//! ```

pub mod oauth_providers;
pub mod oauth_service;
pub mod session_service;
pub mod token_service;

pub use oauth_providers::{GitHubProvider, GoogleProvider, OAuthProvider};
pub use oauth_service::OAuthService;
pub use session_service::{SessionService, SESSION_COOKIE};
pub use token_service::{TokenService, INVALID_TOKEN_MESSAGE};
