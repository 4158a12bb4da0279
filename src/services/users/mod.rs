//! 사용자 식별 서비스 모듈
//!
//! 로컬 자격 증명이나 외부 프로필로 정규 사용자 레코드를 찾거나 만듭니다.
//!
//! # Security
//!
//! - bcrypt 비밀번호 해싱 (블로킹 스레드에서 실행)
//! - 이메일, 외부 식별자 중복 방지 (유니크 인덱스)
//! - 계정 존재 여부가 드러나지 않는 로그인 실패
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::services::users::UserService;
//!
//! let user_service = UserService::instance()?;
//! let user = user_service.resolve_local(&email, &password).await?;
//! ```

pub mod user_service;

pub use user_service::UserService;
