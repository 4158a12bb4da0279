use serde::Serialize;

use crate::config::FederatedProvider;
use crate::domain::dto::format_timestamp;
use crate::domain::entities::User;

/// `GET /api/auth/me` 응답. 비밀번호 해시는 포함하지 않습니다.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub identities: Vec<IdentityResponse>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityResponse {
    pub provider: FederatedProvider,
    pub external_id: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id_string().unwrap_or_default(),
            username: user.username,
            email: user.email,
            identities: user
                .identities
                .into_iter()
                .map(|identity| IdentityResponse {
                    provider: identity.provider,
                    external_id: identity.external_id,
                })
                .collect(),
            created_at: format_timestamp(user.created_at),
            updated_at: format_timestamp(user.updated_at),
        }
    }
}

/// 로그인 응답에 포함되는 사용자 요약
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id_string().unwrap_or_default(),
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

/// `POST /api/auth/register` 응답
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// `POST /api/auth/login` 응답
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
}
