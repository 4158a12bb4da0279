//! JWT 클레임
//!
//! 페이로드에는 사용자 식별자만 담습니다. 이메일이나 비밀번호 등은 절대 넣지 않습니다.
//! 형태는 기존 클라이언트와 맞춘 `{ "user": { "id": ... }, "iat", "exp" }` 입니다.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimsUser {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub user: ClaimsUser,
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    pub fn user_id(&self) -> &str {
        &self.user.id
    }
}
