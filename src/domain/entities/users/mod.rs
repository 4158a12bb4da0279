pub mod user;

pub use user::{FederatedIdentity, User};
