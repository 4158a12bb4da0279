pub mod authenticated_user;

pub use authenticated_user::{AuthenticatedUser, CredentialKind};
