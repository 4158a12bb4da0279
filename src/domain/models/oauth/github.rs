//! GitHub `/user`, `/user/emails` 응답

use serde::Deserialize;

use super::ExternalProfile;
use crate::config::FederatedProvider;

#[derive(Debug, Deserialize)]
pub struct GitHubUser {
    pub id: u64,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GitHubEmail {
    pub email: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub verified: bool,
}

impl GitHubUser {
    /// 프로필에 이메일이 없으면 확인된 대표 이메일을, 그것도 없으면 확인된 첫 이메일을 씁니다.
    pub fn into_profile(self, emails: &[GitHubEmail]) -> ExternalProfile {
        let verified = || emails.iter().filter(|email| email.verified);
        let email = self
            .email
            .filter(|email| !email.is_empty())
            .or_else(|| verified().find(|email| email.primary).map(|email| email.email.clone()))
            .or_else(|| verified().next().map(|email| email.email.clone()));

        ExternalProfile {
            provider: FederatedProvider::GitHub,
            external_id: self.id.to_string(),
            username: self.login,
            email,
        }
    }
}
