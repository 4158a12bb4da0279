//! Google `oauth2/v2/userinfo` 응답

use serde::Deserialize;

use super::ExternalProfile;
use crate::config::FederatedProvider;

#[derive(Debug, Deserialize)]
pub struct GoogleUserInfo {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub verified_email: Option<bool>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

impl From<GoogleUserInfo> for ExternalProfile {
    fn from(info: GoogleUserInfo) -> Self {
        // 확인되지 않은 이메일은 계정 연결에 쓰지 않는다
        let email = info.email.filter(|_| info.verified_email.unwrap_or(true));

        let username = info
            .name
            .filter(|name| !name.trim().is_empty())
            .or_else(|| {
                email
                    .as_deref()
                    .and_then(|email| email.split('@').next())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("google-{}", info.id));

        ExternalProfile {
            provider: FederatedProvider::Google,
            external_id: info.id,
            username,
            email,
        }
    }
}
