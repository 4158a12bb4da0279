pub mod user_response;

pub use user_response::{IdentityResponse, LoginResponse, TokenResponse, UserResponse, UserSummary};
