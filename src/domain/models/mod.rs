//! # Domain Models
//!
//! 저장되지 않는 도메인 모델입니다.
//!
//! - [`auth`] - 인증된 호출자 정보 (요청 extensions에 저장)
//! - [`token`] - JWT 클레임
//! - [`oauth`] - 외부 프로바이더 응답과 정규화된 외부 프로필

pub mod auth;
pub mod oauth;
pub mod token;

pub use auth::*;
pub use oauth::*;
pub use token::*;
