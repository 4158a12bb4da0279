//! 비즈니스 로직을 담당하는 서비스 계층 모듈
//!
//! 설정만으로 만들 수 있는 서비스(`TokenService`)는 `#[service]` 매크로가 등록하고,
//! 저장소 트레이트 객체를 받는 서비스는 [`register_all`]이
//! [`ServiceLocator`](crate::core::ServiceLocator)에 직접 등록합니다.
//! 핸들러와 미들웨어는 어느 쪽이든 `instance()`로 꺼내 씁니다.
//!
//! # Features
//!
//! - 사용자 식별 (로컬 비밀번호, 소셜 로그인)
//! - JWT 토큰과 쿠키 세션 발급/검증
//! - 할 일 CRUD와 소유권 검사
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::services::{auth::TokenService, tasks::TaskService};
//!
//! let token_service = TokenService::instance();
//! let task_service = TaskService::instance()?;
//! ```

pub mod auth;
pub mod tasks;
pub mod users;

use std::sync::Arc;

use log::info;

use crate::config::AppConfig;
use crate::core::registry::ServiceLocator;
use crate::middlewares::Authenticator;
use crate::repositories::{SessionStore, TaskStore, UserStore};
use auth::{OAuthService, SessionService, TokenService};
use tasks::TaskService;
use users::UserService;

/// 서비스들이 쓰는 저장소 구현
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub sessions: Arc<dyn SessionStore>,
}

/// 모든 서비스를 만들어 [`ServiceLocator`]에 등록합니다.
pub fn register_all(config: &AppConfig, stores: Stores, oauth: OAuthService) {
    // TokenService가 주입받는 설정을 먼저 등록합니다
    ServiceLocator::set(Arc::new(config.jwt.clone()));
    let tokens = TokenService::instance();
    let sessions = Arc::new(SessionService::new(stores.sessions, &config.session, config.environment));

    ServiceLocator::set(Arc::new(config.frontend.clone()));
    ServiceLocator::set(Arc::new(Authenticator::new(tokens, sessions.clone())));
    ServiceLocator::set(sessions);
    ServiceLocator::set(Arc::new(UserService::new(
        stores.users,
        config.bcrypt_cost,
        config.oauth.link_policy,
    )));
    ServiceLocator::set(Arc::new(TaskService::new(stores.tasks)));
    ServiceLocator::set(Arc::new(oauth));

    info!("✅ 서비스 등록 완료 (bcrypt cost {})", config.bcrypt_cost);
}
