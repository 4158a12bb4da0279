//! # Domain Entities
//!
//! MongoDB에 저장되는 영속 객체들입니다.
//!
//! - [`users`] - 사용자와 외부 식별자 연결
//! - [`tasks`] - 사용자 소유의 할 일
//! - [`sessions`] - 쿠키 기반 서버 측 세션

pub mod sessions;
pub mod tasks;
pub mod users;

pub use sessions::*;
pub use tasks::*;
pub use users::*;
