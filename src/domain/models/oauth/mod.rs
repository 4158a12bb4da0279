pub mod github;
pub mod google;
pub mod profile;

pub use github::{GitHubEmail, GitHubUser};
pub use google::GoogleUserInfo;
pub use profile::{ExternalProfile, OAuthTokenResponse};
