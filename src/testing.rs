//! 테스트용 서비스 구성
//!
//! 메모리 저장소와 가짜 GitHub 프로바이더로 전체 서비스를 한 번만 등록합니다.
//! 테스트들이 같은 저장소를 공유하므로 이메일과 외부 ID는 테스트마다 다르게 씁니다.

use std::sync::{Arc, Once};

use async_trait::async_trait;

use crate::config::{AppConfig, FederatedProvider};
use crate::core::errors::{AppError, AppResult};
use crate::core::registry::ServiceLocator;
use crate::domain::models::ExternalProfile;
use crate::repositories::memory::{MemorySessionStore, MemoryTaskStore, MemoryUserStore};
use crate::services::auth::{OAuthProvider, OAuthService};
use crate::services::{register_all, Stores};

pub const TEST_JWT_SECRET: &str = "http-test-secret";
pub const TEST_FRONTEND_URL: &str = "http://frontend.test";

/// 이 코드로 콜백하면 프로바이더 호출이 실패한다
pub const FAILING_CODE: &str = "exchange-fails";

static INSTALL: Once = Once::new();

/// 인가 코드를 그대로 외부 ID로 쓰는 GitHub 대역
struct FakeGitHub;

#[async_trait]
impl OAuthProvider for FakeGitHub {
    fn kind(&self) -> FederatedProvider {
        FederatedProvider::GitHub
    }

    fn authorize_url(&self, state: &str) -> String {
        format!("https://github.test/login/oauth/authorize?state={}", state)
    }

    async fn fetch_profile(&self, code: &str) -> AppResult<ExternalProfile> {
        if code == FAILING_CODE {
            return Err(AppError::ExternalServiceError("GitHub 토큰 교환 실패".to_string()));
        }
        Ok(ExternalProfile {
            provider: FederatedProvider::GitHub,
            external_id: code.to_string(),
            username: format!("octo-{}", code),
            email: None,
        })
    }
}

fn test_config() -> AppConfig {
    let lookup = |key: &str| {
        let value = match key {
            "ENVIRONMENT" => "test",
            "MONGO_URI" => "mongodb://localhost:27017/taskboard_test",
            "JWT_SECRET" => TEST_JWT_SECRET,
            "SESSION_SECRET" => "http-test-session-secret",
            "FRONTEND_URL" => TEST_FRONTEND_URL,
            _ => return None,
        };
        Some(value.to_string())
    };

    AppConfig::from_lookup(&lookup).expect("test configuration")
}

/// 서비스를 등록합니다. 여러 번 불러도 한 번만 실행됩니다.
pub fn install() {
    INSTALL.call_once(|| {
        let config = test_config();
        let users = Arc::new(MemoryUserStore::default());
        ServiceLocator::set(users.clone());

        let oauth = OAuthService::new(config.oauth.state_timeout_minutes, config.environment)
            .with_provider(Arc::new(FakeGitHub));

        register_all(
            &config,
            Stores {
                users,
                tasks: Arc::new(MemoryTaskStore::default()),
                sessions: Arc::new(MemorySessionStore::default()),
            },
            oauth,
        );
    });
}

/// 등록된 메모리 사용자 저장소
pub fn user_store() -> Arc<MemoryUserStore> {
    install();
    ServiceLocator::get::<MemoryUserStore>()
}
