pub mod token;

pub use token::{ClaimsUser, TokenClaims};
