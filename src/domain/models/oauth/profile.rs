//! 프로바이더 공통 외부 프로필

use serde::Deserialize;

use crate::config::FederatedProvider;

/// 프로바이더 응답을 정규화한 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalProfile {
    pub provider: FederatedProvider,
    /// 프로바이더 안에서만 유일한 사용자 식별자
    pub external_id: String,
    /// 표시 이름 (Google: 이름, GitHub: 로그인 ID)
    pub username: String,
    /// 프로바이더가 공개한 이메일
    pub email: Option<String>,
}

impl ExternalProfile {
    /// 공개된 이메일이 없으면 `<username>@<provider>.example`을 만듭니다.
    pub fn email_or_synthesized(&self) -> String {
        match &self.email {
            Some(email) => email.clone(),
            None => {
                let local_part: String = self
                    .username
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
                    .collect();
                let local_part = if local_part.is_empty() {
                    self.external_id.as_str()
                } else {
                    local_part.as_str()
                };
                format!("{}@{}.example", local_part.to_lowercase(), self.provider)
            }
        }
    }
}

/// 인가 코드 교환 응답 (Google, GitHub 공통 필드)
#[derive(Debug, Deserialize)]
pub struct OAuthTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}
