pub mod auth_request;

pub use auth_request::{LocalLoginRequest, OAuthCallbackQuery, RegisterRequest};
