//! 사용자 엔티티
//!
//! `users` 컬렉션에 저장되는 문서입니다. 로컬 계정은 bcrypt 해시를,
//! 소셜 계정은 프로바이더별 외부 식별자를 가집니다. 둘 중 하나는 반드시 있어야 합니다.

use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::config::FederatedProvider;

/// 외부 프로바이더가 보증하는 식별자
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederatedIdentity {
    pub provider: FederatedProvider,
    pub external_id: String,
}

impl FederatedIdentity {
    pub fn new(provider: FederatedProvider, external_id: impl Into<String>) -> Self {
        Self {
            provider,
            external_id: external_id.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub username: String,

    /// 없으면 문서에서 필드 자체가 빠집니다 (부분 유니크 인덱스 대상 제외).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,

    #[serde(default)]
    pub identities: Vec<FederatedIdentity>,

    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl User {
    /// 이메일/비밀번호로 가입한 로컬 사용자
    pub fn new_local(username: String, email: String, password_hash: String) -> Self {
        let now = DateTime::now();
        Self {
            id: None,
            username,
            email: Some(email),
            password_hash: Some(password_hash),
            identities: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// 외부 프로바이더로 처음 로그인한 사용자
    pub fn new_federated(username: String, email: Option<String>, identity: FederatedIdentity) -> Self {
        let now = DateTime::now();
        Self {
            id: None,
            username,
            email,
            password_hash: None,
            identities: vec![identity],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id_string(&self) -> Option<String> {
        self.id.as_ref().map(|id| id.to_hex())
    }

    /// 비밀번호 해시나 외부 식별자 중 하나라도 있는지
    pub fn can_authenticate(&self) -> bool {
        self.can_authenticate_with_password() || !self.identities.is_empty()
    }

    pub fn can_authenticate_with_password(&self) -> bool {
        self.password_hash.is_some()
    }

    pub fn has_identity(&self, provider: FederatedProvider, external_id: &str) -> bool {
        self.identities
            .iter()
            .any(|identity| identity.provider == provider && identity.external_id == external_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson;

    #[test]
    fn test_constructors_satisfy_authentication_invariant() {
        let local = User::new_local("a".into(), "a@x.com".into(), "$2b$04$hash".into());
        assert!(local.can_authenticate());
        assert!(local.can_authenticate_with_password());

        let federated = User::new_federated(
            "octo".into(),
            None,
            FederatedIdentity::new(FederatedProvider::GitHub, "42"),
        );
        assert!(federated.can_authenticate());
        assert!(!federated.can_authenticate_with_password());
        assert!(federated.has_identity(FederatedProvider::GitHub, "42"));
        assert!(!federated.has_identity(FederatedProvider::Google, "42"));
    }

    #[test]
    fn test_absent_email_is_not_stored() {
        let user = User::new_federated(
            "octo".into(),
            None,
            FederatedIdentity::new(FederatedProvider::GitHub, "42"),
        );

        let document = bson::to_document(&user).unwrap();
        assert!(!document.contains_key("email"));
        assert!(!document.contains_key("password_hash"));
        assert!(!document.contains_key("_id"));

        let identities = document.get_array("identities").unwrap();
        let first = identities[0].as_document().unwrap();
        assert_eq!(first.get_str("provider").unwrap(), "github");
        assert_eq!(first.get_str("external_id").unwrap(), "42");
    }
}
