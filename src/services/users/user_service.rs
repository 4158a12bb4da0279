//! # 사용자 식별 서비스 구현
//!
//! 자격 증명(로컬 비밀번호 또는 외부 프로필)으로 정규 사용자 레코드를 찾거나 만듭니다.
//!
//! ## 보안 설계
//!
//! - **bcrypt 해싱**: 사용자별 솔트, 환경별 cost. 해싱과 검증은 블로킹 스레드에서 실행합니다.
//! - **계정 열거 방지**: 사용자 없음, 비밀번호 불일치, 비밀번호 없는 소셜 계정이 모두 같은
//!   `InvalidCredentials`로 끝나며, 사용자가 없을 때도 더미 해시를 검증해 응답 시간을 맞춥니다.
//! - **중복 방지**: 유니크 인덱스 위반을 "이미 있음"으로 해석합니다. 동시 가입이나
//!   동시 소셜 로그인 콜백이 같은 계정을 두 번 만들지 못합니다.
//!
//! ## 같은 이메일의 기존 계정
//!
//! [`AccountLinkPolicy::Separate`]이면 소셜 계정을 별도 사용자로 만들고, 이메일이 이미
//! 쓰이고 있으면 새 사용자는 이메일 없이 저장합니다. [`AccountLinkPolicy::LinkByEmail`]이면
//! 그 이메일을 가진 기존 사용자에 외부 식별자를 연결합니다.

use std::sync::Arc;

use log::{info, warn};
use mongodb::bson::oid::ObjectId;

use crate::config::AccountLinkPolicy;
use crate::core::errors::{AppError, AppResult, ErrorContext};
use crate::core::registry::Singleton;
use crate::domain::dto::RegisterRequest;
use crate::domain::entities::{FederatedIdentity, User};
use crate::domain::models::ExternalProfile;
use crate::repositories::{UserStore, EMAIL_INDEX, IDENTITY_INDEX};

pub struct UserService {
    users: Arc<dyn UserStore>,
    bcrypt_cost: u32,
    link_policy: AccountLinkPolicy,
    dummy_hash: String,
}

impl Singleton for UserService {}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, bcrypt_cost: u32, link_policy: AccountLinkPolicy) -> Self {
        let dummy_hash = bcrypt::hash("timing-equalizer", bcrypt_cost).unwrap_or_default();
        Self {
            users,
            bcrypt_cost,
            link_policy,
            dummy_hash,
        }
    }

    /// 로컬 계정을 만듭니다. 이메일이 이미 있으면 `DuplicateAccount`.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<User> {
        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::DuplicateAccount);
        }

        let password_hash = self.hash_password(request.password).await?;
        let user = User::new_local(request.username, request.email, password_hash);

        match self.users.insert(user).await {
            Ok(user) => {
                info!("신규 로컬 사용자 등록: {}", user.id_string().unwrap_or_default());
                Ok(user)
            }
            Err(AppError::DuplicateKey(index)) if index == EMAIL_INDEX => Err(AppError::DuplicateAccount),
            Err(e) => Err(e),
        }
    }

    /// 이메일과 비밀번호로 사용자를 확인합니다.
    pub async fn resolve_local(&self, email: &str, password: &str) -> AppResult<User> {
        let candidate = self
            .users
            .find_by_email(email)
            .await?
            .and_then(|user| user.password_hash.clone().map(|hash| (user, hash)));

        match candidate {
            Some((user, hash)) => {
                if self.verify_password(password, hash).await? {
                    Ok(user)
                } else {
                    Err(AppError::InvalidCredentials)
                }
            }
            None => {
                self.verify_password(password, self.dummy_hash.clone()).await?;
                Err(AppError::InvalidCredentials)
            }
        }
    }

    /// 외부 식별자로 사용자를 찾고, 없으면 만듭니다.
    pub async fn resolve_or_create_federated(&self, profile: &ExternalProfile) -> AppResult<User> {
        if let Some(user) = self
            .users
            .find_by_identity(profile.provider, &profile.external_id)
            .await?
        {
            return Ok(user);
        }

        let identity = FederatedIdentity::new(profile.provider, profile.external_id.clone());
        let email = profile.email_or_synthesized();

        if self.link_policy == AccountLinkPolicy::LinkByEmail {
            if let Some(user) = self.link_to_email_owner(&email, &identity).await? {
                return Ok(user);
            }
        }

        let candidate = User::new_federated(profile.username.clone(), Some(email.clone()), identity.clone());
        if let Some(user) = self.insert_federated(candidate, &identity).await? {
            info!("신규 {} 사용자 생성: {}", profile.provider, user.id_string().unwrap_or_default());
            return Ok(user);
        }

        // 같은 외부 계정의 다른 콜백이 먼저 만들었을 수 있다
        if let Some(user) = self
            .users
            .find_by_identity(profile.provider, &profile.external_id)
            .await?
        {
            return Ok(user);
        }

        // 조회와 삽입 사이에 이메일이 다른 계정에 쓰였다
        if self.link_policy == AccountLinkPolicy::LinkByEmail {
            if let Some(user) = self.link_to_email_owner(&email, &identity).await? {
                return Ok(user);
            }
        }

        warn!(
            "{} 계정 이메일이 기존 사용자와 겹쳐 이메일 없이 별도 사용자로 생성합니다",
            profile.provider
        );
        let candidate = User::new_federated(profile.username.clone(), None, identity.clone());
        self.insert_federated(candidate, &identity)
            .await?
            .ok_or_else(|| AppError::InternalError("이메일 없는 사용자 생성이 이메일 충돌로 실패했습니다".to_string()))
    }

    pub async fn get_profile(&self, user_id: &ObjectId) -> AppResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// 삽입 결과. 이메일 충돌이면 `None`, 같은 외부 식별자가 먼저 저장됐으면 그 사용자.
    async fn insert_federated(&self, user: User, identity: &FederatedIdentity) -> AppResult<Option<User>> {
        match self.users.insert(user).await {
            Ok(user) => Ok(Some(user)),
            Err(AppError::DuplicateKey(index)) if index == IDENTITY_INDEX => {
                self.refetch_identity(identity).await.map(Some)
            }
            Err(AppError::DuplicateKey(index)) if index == EMAIL_INDEX => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn link_to_email_owner(&self, email: &str, identity: &FederatedIdentity) -> AppResult<Option<User>> {
        let Some(owner_id) = self.users.find_by_email(email).await?.and_then(|user| user.id) else {
            return Ok(None);
        };

        match self.users.add_identity(&owner_id, identity.clone()).await {
            Ok(Some(user)) => {
                info!("기존 사용자 {}에 {} 계정 연결", owner_id.to_hex(), identity.provider);
                Ok(Some(user))
            }
            Ok(None) => Ok(None),
            Err(AppError::DuplicateKey(index)) if index == IDENTITY_INDEX => {
                self.refetch_identity(identity).await.map(Some)
            }
            Err(e) => Err(e),
        }
    }

    async fn refetch_identity(&self, identity: &FederatedIdentity) -> AppResult<User> {
        self.users
            .find_by_identity(identity.provider, &identity.external_id)
            .await?
            .ok_or_else(|| AppError::InternalError("동시에 생성된 사용자를 다시 찾지 못했습니다".to_string()))
    }

    async fn hash_password(&self, password: String) -> AppResult<String> {
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .context("비밀번호 해싱 작업 실패")?
            .context("비밀번호 해싱 실패")
    }

    /// 형식이 깨진 해시는 불일치로 취급합니다.
    async fn verify_password(&self, password: &str, hash: String) -> AppResult<bool> {
        let password = password.to_string();
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
            .await
            .context("비밀번호 검증 작업 실패")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FederatedProvider;
    use crate::repositories::memory::MemoryUserStore;
    use futures_util::future::join_all;

    fn service(policy: AccountLinkPolicy) -> (UserService, Arc<MemoryUserStore>) {
        let store = Arc::new(MemoryUserStore::default());
        (UserService::new(store.clone(), 4, policy), store)
    }

    fn register_request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: "a".to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn github_profile(external_id: &str, email: Option<&str>) -> ExternalProfile {
        ExternalProfile {
            provider: FederatedProvider::GitHub,
            external_id: external_id.to_string(),
            username: "octocat".to_string(),
            email: email.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let (service, _) = service(AccountLinkPolicy::Separate);
        let registered = service.register(register_request("a@x.com", "p")).await.unwrap();

        let resolved = service.resolve_local("a@x.com", "p").await.unwrap();
        assert_eq!(resolved.id, registered.id);
        assert_ne!(resolved.password_hash.as_deref(), Some("p"));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (service, _) = service(AccountLinkPolicy::Separate);
        service.register(register_request("a@x.com", "p")).await.unwrap();
        service
            .resolve_or_create_federated(&github_profile("7", Some("gh@x.com")))
            .await
            .unwrap();

        let wrong_password = service.resolve_local("a@x.com", "nope").await.unwrap_err();
        let unknown_email = service.resolve_local("nobody@x.com", "p").await.unwrap_err();
        let federated_only = service.resolve_local("gh@x.com", "p").await.unwrap_err();

        for error in [wrong_password, unknown_email, federated_only] {
            assert!(matches!(error, AppError::InvalidCredentials));
        }
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_rejected() {
        let (service, store) = service(AccountLinkPolicy::Separate);
        service.register(register_request("a@x.com", "p")).await.unwrap();

        let second = service.register(register_request("a@x.com", "other")).await;

        assert!(matches!(second, Err(AppError::DuplicateAccount)));
        assert_eq!(store.count_with_email("a@x.com"), 1);
    }

    #[tokio::test]
    async fn test_concurrent_registration_creates_one_user() {
        let (service, store) = service(AccountLinkPolicy::Separate);

        let results = join_all((0..4).map(|_| service.register(register_request("race@x.com", "p")))).await;

        assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|result| result.as_ref().err())
            .all(|error| matches!(error, AppError::DuplicateAccount)));
        assert_eq!(store.count_with_email("race@x.com"), 1);
    }

    #[tokio::test]
    async fn test_concurrent_federated_callbacks_create_one_user() {
        let (service, store) = service(AccountLinkPolicy::Separate);
        let profile = github_profile("583231", Some("octo@x.com"));

        let results = join_all((0..8).map(|_| service.resolve_or_create_federated(&profile))).await;

        let ids: Vec<_> = results.into_iter().map(|result| result.unwrap().id).collect();
        assert!(ids.iter().all(|id| *id == ids[0]));
        assert_eq!(store.count_with_identity(FederatedProvider::GitHub, "583231"), 1);
    }

    #[tokio::test]
    async fn test_returning_federated_user_is_found() {
        let (service, _) = service(AccountLinkPolicy::Separate);
        let first = service
            .resolve_or_create_federated(&github_profile("1", None))
            .await
            .unwrap();
        let second = service
            .resolve_or_create_federated(&github_profile("1", None))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.email.as_deref(), Some("octocat@github.example"));
    }

    #[tokio::test]
    async fn test_separate_policy_keeps_accounts_apart() {
        let (service, store) = service(AccountLinkPolicy::Separate);
        let local = service.register(register_request("same@x.com", "p")).await.unwrap();

        let federated = service
            .resolve_or_create_federated(&github_profile("99", Some("same@x.com")))
            .await
            .unwrap();

        assert_ne!(local.id, federated.id);
        assert!(federated.email.is_none());
        assert!(federated.can_authenticate());
        assert_eq!(store.count_with_email("same@x.com"), 1);
    }

    #[tokio::test]
    async fn test_link_policy_attaches_identity_to_existing_account() {
        let (service, store) = service(AccountLinkPolicy::LinkByEmail);
        let local = service.register(register_request("same@x.com", "p")).await.unwrap();

        let federated = service
            .resolve_or_create_federated(&github_profile("99", Some("same@x.com")))
            .await
            .unwrap();

        assert_eq!(local.id, federated.id);
        assert!(federated.has_identity(FederatedProvider::GitHub, "99"));
        assert!(federated.can_authenticate_with_password());
        assert_eq!(store.count_with_identity(FederatedProvider::GitHub, "99"), 1);

        // 연결 후에는 비밀번호 로그인도 계속 된다
        assert!(service.resolve_local("same@x.com", "p").await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_profile_is_not_found() {
        let (service, _) = service(AccountLinkPolicy::Separate);
        assert!(matches!(
            service.get_profile(&ObjectId::new()).await,
            Err(AppError::NotFound(_))
        ));
    }
}
